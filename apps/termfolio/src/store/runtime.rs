use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::resume::ResumeError;
use crate::store::github::{FetchError, GitHubFetcher};

/// Runtime source of the resume text: the published copy first, then (in
/// development only) the raw GitHub endpoint. Never authenticated, never
/// writes anything.
#[derive(Clone)]
pub struct RuntimeSource {
    published: PathBuf,
    document_path: String,
    raw_fallback: Option<GitHubFetcher>,
}

impl RuntimeSource {
    pub fn new(published: PathBuf, document_path: String, raw_fallback: Option<GitHubFetcher>) -> Self {
        Self {
            published,
            document_path,
            raw_fallback: raw_fallback.map(GitHubFetcher::without_token),
        }
    }

    pub fn from_config(config: &Config, fetcher: GitHubFetcher) -> Self {
        Self::new(
            config.published_document(),
            config.file_path.clone(),
            config.dev_mode.then_some(fetcher),
        )
    }

    pub async fn load(&self) -> Result<String, ResumeError> {
        let published_err = match tokio::fs::read_to_string(&self.published).await {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => ResumeError::Fetch(FetchError::Empty {
                path: self.published.display().to_string(),
            }),
            Err(source) => ResumeError::Read {
                path: self.published.display().to_string(),
                source,
            },
        };

        let Some(fetcher) = &self.raw_fallback else {
            return Err(published_err);
        };

        warn!("{published_err}; trying the raw endpoint (development mode)");
        let bytes = fetcher.fetch_raw(&self.document_path).await?;
        info!("loaded resume from {}", fetcher.raw_url(&self.document_path));
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ResumeError::Fetch(FetchError::Decode(e.to_string())))
    }
}
