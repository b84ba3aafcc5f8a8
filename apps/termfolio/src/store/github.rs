//! GitHub access for the resume repository: the authenticated contents API
//! tier and the unauthenticated raw tier.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::store::transport::{HttpRequest, HttpResponse, HttpTransport, USER_AGENT};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Which endpoint served (or was meant to serve) a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// `GET /repos/{repo}/contents/{path}?ref={branch}`, base64 JSON body.
    ContentsApi,
    /// `GET {raw}/{repo}/{branch}/{path}`, literal body.
    RawContent,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::ContentsApi => f.write_str("GitHub contents API"),
            Tier::RawContent => f.write_str("raw content endpoint"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundCause {
    /// No token was sent, so a private repository looks exactly like a 404.
    PrivateRepository,
    /// A token was sent; the repository, branch or path is probably wrong.
    WrongLocation,
}

impl fmt::Display for NotFoundCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundCause::PrivateRepository => f.write_str(
                "this is likely a private repository and no access token is configured \
                 (set RESUME_GITHUB_TOKEN)",
            ),
            NotFoundCause::WrongLocation => f.write_str(
                "check the repository, branch and file path, and that the token can access the repository",
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("{path} not found: {cause}")]
    NotFound { path: String, cause: NotFoundCause },

    #[error("authentication failed: the access token is invalid or expired")]
    Unauthorized,

    #[error("GitHub rate limit exhausted{}", .reset.as_deref().map(|r| format!(" (resets at {r})")).unwrap_or_default())]
    RateLimited { reset: Option<String> },

    #[error("access forbidden: the token lacks permission for this repository")]
    Forbidden,

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("unexpected content encoding {0:?} from the contents API")]
    UnexpectedEncoding(String),

    #[error("could not decode fetched content: {0}")]
    Decode(String),

    #[error("{path} is empty")]
    Empty { path: String },
}

/// Repository coordinates of the resume document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub tier: Tier,
    pub bytes: Bytes,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    encoding: Option<String>,
    content: Option<String>,
}

/// Fetches files from the resume repository. With a token it uses the
/// contents API; without one, the raw endpoint. One request per call: no
/// retries and no racing between tiers.
#[derive(Clone)]
pub struct GitHubFetcher {
    transport: Arc<dyn HttpTransport>,
    source: RemoteSource,
    token: Option<String>,
    api_url: String,
    raw_url: String,
}

impl GitHubFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        source: RemoteSource,
        token: Option<String>,
    ) -> Self {
        Self {
            transport,
            source,
            token: token.filter(|t| !t.trim().is_empty()),
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let mut fetcher = Self::new(
            transport,
            RemoteSource {
                repo: config.repo.clone(),
                branch: config.branch.clone(),
            },
            config.github_token.clone(),
        );
        fetcher.api_url = config.github_api_url.trim_end_matches('/').to_string();
        fetcher.raw_url = config.github_raw_url.trim_end_matches('/').to_string();
        fetcher
    }

    /// Drops the token, for contexts where no credential may be used.
    pub fn without_token(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn source(&self) -> &RemoteSource {
        &self.source
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn preferred_tier(&self) -> Tier {
        if self.has_token() {
            Tier::ContentsApi
        } else {
            Tier::RawContent
        }
    }

    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.api_url,
            self.source.repo,
            path.trim_start_matches('/'),
            self.source.branch
        )
    }

    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_url,
            self.source.repo,
            self.source.branch,
            path.trim_start_matches('/')
        )
    }

    /// Fetches `path` through the preferred tier and logs a diagnostic on
    /// failure. The error is returned as a value for the caller to act on.
    pub async fn fetch(&self, path: &str) -> Result<FetchedFile, FetchError> {
        let tier = self.preferred_tier();
        info!(
            repo = %self.source.repo,
            branch = %self.source.branch,
            path,
            "fetching via {tier}"
        );

        let result = match tier {
            Tier::ContentsApi => self.fetch_contents(path).await,
            Tier::RawContent => self.fetch_raw(path).await,
        };

        match result {
            Ok(bytes) => {
                info!("fetched {path} ({} bytes) via {tier}", bytes.len());
                Ok(FetchedFile { tier, bytes })
            }
            Err(e) => {
                warn!(
                    repo = %self.source.repo,
                    branch = %self.source.branch,
                    path,
                    "fetch failed: {e}"
                );
                Err(e)
            }
        }
    }

    /// Unauthenticated raw fetch; never sends the token.
    pub async fn fetch_raw(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.raw_url(path);
        let request = HttpRequest::get(&url).header("User-Agent", USER_AGENT);
        let response = self.send(request).await?;
        let body = self.check_status(path, &url, response)?;
        non_empty(path, body)
    }

    async fn fetch_contents(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.contents_url(path);
        let mut request = HttpRequest::get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.send(request).await?;
        let body = self.check_status(path, &url, response)?;

        let contents: ContentsResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let encoding = contents.encoding.unwrap_or_default();
        if encoding != "base64" {
            return Err(FetchError::UnexpectedEncoding(encoding));
        }
        // The API wraps base64 at 60 columns.
        let packed: String = contents
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let decoded = STANDARD
            .decode(packed.as_bytes())
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        non_empty(path, Bytes::from(decoded))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let url = request.url.clone();
        debug!("GET {url}");
        self.transport
            .get(request)
            .await
            .map_err(|e| FetchError::Transport {
                url,
                message: e.to_string(),
            })
    }

    fn check_status(
        &self,
        path: &str,
        url: &str,
        response: HttpResponse,
    ) -> Result<Bytes, FetchError> {
        if response.is_success() {
            return Ok(response.body);
        }

        Err(match response.status {
            404 => FetchError::NotFound {
                path: path.to_string(),
                cause: if self.has_token() {
                    NotFoundCause::WrongLocation
                } else {
                    NotFoundCause::PrivateRepository
                },
            },
            401 => FetchError::Unauthorized,
            403 if response.header("x-ratelimit-remaining") == Some("0") => {
                FetchError::RateLimited {
                    reset: response.header("x-ratelimit-reset").map(String::from),
                }
            }
            403 => FetchError::Forbidden,
            429 => FetchError::RateLimited {
                reset: response.header("x-ratelimit-reset").map(String::from),
            },
            status => FetchError::Status {
                status,
                url: url.to_string(),
            },
        })
    }
}

fn non_empty(path: &str, bytes: Bytes) -> Result<Bytes, FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::Empty {
            path: path.to_string(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::transport::fake::FakeTransport;

    const RAW: &str = "https://raw.githubusercontent.com/jane/resume/main/CV.yaml";
    const API: &str = "https://api.github.com/repos/jane/resume/contents/CV.yaml?ref=main";

    fn fetcher(transport: FakeTransport, token: Option<&str>) -> (GitHubFetcher, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let fetcher = GitHubFetcher::new(
            transport.clone(),
            RemoteSource {
                repo: "jane/resume".to_string(),
                branch: "main".to_string(),
            },
            token.map(String::from),
        );
        (fetcher, transport)
    }

    fn contents_json(body: &str) -> Vec<u8> {
        let encoded = STANDARD.encode(body);
        // wrap like the real API does
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        serde_json::json!({
            "name": "CV.yaml",
            "encoding": "base64",
            "content": wrapped.join("\n"),
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_without_token_uses_raw_endpoint() {
        let (fetcher, transport) = fetcher(FakeTransport::new().respond(RAW, 200, b"cv: {}"), None);
        let file = fetcher.fetch("CV.yaml").await.unwrap();
        assert_eq!(file.tier, Tier::RawContent);
        assert_eq!(&file.bytes[..], b"cv: {}");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].header_value("authorization").is_none());
        assert_eq!(requests[0].header_value("user-agent"), Some(USER_AGENT));
    }

    #[tokio::test]
    async fn test_with_token_uses_contents_api_and_decodes_base64() {
        let body = "cv:\n  name: Jane Doe\n  email: jane@example.com\n".repeat(5);
        let (fetcher, transport) = fetcher(
            FakeTransport::new().respond(API, 200, &contents_json(&body)),
            Some("s3cret"),
        );
        let file = fetcher.fetch("CV.yaml").await.unwrap();
        assert_eq!(file.tier, Tier::ContentsApi);
        assert_eq!(std::str::from_utf8(&file.bytes).unwrap(), body);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].url, API);
        assert_eq!(requests[0].header_value("Authorization"), Some("Bearer s3cret"));
        assert_eq!(requests[0].header_value("Accept"), Some(GITHUB_ACCEPT));
    }

    #[tokio::test]
    async fn test_not_found_without_token_blames_private_repository() {
        let (fetcher, _) = fetcher(FakeTransport::new().respond(RAW, 404, b"404: Not Found"), None);
        let err = fetcher.fetch("CV.yaml").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::NotFound {
                cause: NotFoundCause::PrivateRepository,
                ..
            }
        ));
        assert!(err.to_string().contains("private repository"));
    }

    #[tokio::test]
    async fn test_not_found_with_token_blames_location() {
        let (fetcher, _) = fetcher(FakeTransport::new().respond(API, 404, b"{}"), Some("t"));
        let err = fetcher.fetch("CV.yaml").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::NotFound {
                cause: NotFoundCause::WrongLocation,
                ..
            }
        ));
        assert!(!err.to_string().contains("private repository"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (fetcher, _) = fetcher(FakeTransport::new().respond(API, 401, b"{}"), Some("old"));
        let err = fetcher.fetch("CV.yaml").await.unwrap_err();
        assert!(matches!(err, FetchError::Unauthorized));
        assert!(err.to_string().contains("invalid or expired"));
    }

    #[tokio::test]
    async fn test_forbidden_with_exhausted_quota_is_rate_limit() {
        let (fetcher, _) = fetcher(
            FakeTransport::new().respond_with_headers(
                API,
                403,
                &[("X-RateLimit-Remaining", "0"), ("X-RateLimit-Reset", "1700000000")],
                b"{}",
            ),
            Some("t"),
        );
        let err = fetcher.fetch("CV.yaml").await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { reset: Some(ref r) } if r == "1700000000"));
        assert!(err.to_string().contains("resets at 1700000000"));
    }

    #[tokio::test]
    async fn test_forbidden_with_quota_left_is_permission_denied() {
        let (fetcher, _) = fetcher(
            FakeTransport::new().respond_with_headers(API, 403, &[("x-ratelimit-remaining", "4999")], b"{}"),
            Some("t"),
        );
        assert!(matches!(fetcher.fetch("CV.yaml").await.unwrap_err(), FetchError::Forbidden));
    }

    #[tokio::test]
    async fn test_other_status_is_generic_failure() {
        let (fetcher, _) = fetcher(FakeTransport::new().respond(RAW, 502, b"bad gateway"), None);
        assert!(matches!(
            fetcher.fetch("CV.yaml").await.unwrap_err(),
            FetchError::Status { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_is_a_value() {
        let (fetcher, _) = fetcher(FakeTransport::new().fail(RAW, "dns failure"), None);
        let err = fetcher.fetch("CV.yaml").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().contains("dns failure"));
    }

    #[tokio::test]
    async fn test_empty_body_is_a_failure() {
        let (fetcher, _) = fetcher(FakeTransport::new().respond(RAW, 200, b""), None);
        assert!(matches!(
            fetcher.fetch("CV.yaml").await.unwrap_err(),
            FetchError::Empty { .. }
        ));
    }

    #[tokio::test]
    async fn test_non_base64_encoding_is_rejected() {
        let body = serde_json::json!({"encoding": "none", "content": ""}).to_string();
        let (fetcher, _) = fetcher(FakeTransport::new().respond(API, 200, body.as_bytes()), Some("t"));
        assert!(matches!(
            fetcher.fetch("CV.yaml").await.unwrap_err(),
            FetchError::UnexpectedEncoding(ref e) if e == "none"
        ));
    }

    #[tokio::test]
    async fn test_bad_base64_is_a_decode_error() {
        let body = serde_json::json!({"encoding": "base64", "content": "!!!not base64!!!"}).to_string();
        let (fetcher, _) = fetcher(FakeTransport::new().respond(API, 200, body.as_bytes()), Some("t"));
        assert!(matches!(
            fetcher.fetch("CV.yaml").await.unwrap_err(),
            FetchError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_raw_never_sends_token() {
        let (fetcher, transport) = fetcher(FakeTransport::new().respond(RAW, 200, b"cv: {}"), Some("t"));
        fetcher.fetch_raw("CV.yaml").await.unwrap();
        let requests = transport.requests.lock().unwrap();
        assert!(requests[0].header_value("authorization").is_none());
    }

    #[test]
    fn test_urls() {
        let (fetcher, _) = fetcher(FakeTransport::new(), None);
        assert_eq!(fetcher.raw_url("/CV.yaml"), RAW);
        assert_eq!(fetcher.contents_url("CV.yaml"), API);
        assert_eq!(fetcher.preferred_tier(), Tier::RawContent);
        assert!(!fetcher.clone().without_token().has_token());
    }
}
