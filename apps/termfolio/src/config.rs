use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_REPO: &str = "ahzs645/resume";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_FILE_PATH: &str = "CV.yaml";
const DEFAULT_LOCAL_FILE: &str = "resume/CV.yaml";
const DEFAULT_LOCAL_PDF: &str = "resume/CV.pdf";
const DEFAULT_PUBLISH_DIR: &str = "public";
const DEFAULT_PUBLISH_DOCUMENT: &str = "resume.yaml";
const DEFAULT_PUBLISH_ARTIFACT: &str = "resume.pdf";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Application configuration loaded from environment variables.
/// Every field has a default; nothing is required at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: String,
    pub branch: String,
    pub file_path: String,
    pub artifact_path: Option<String>,
    pub github_token: Option<String>,
    pub use_local_fallback: bool,
    pub local_document: PathBuf,
    pub local_artifact: PathBuf,
    pub publish_dir: PathBuf,
    pub publish_document_name: String,
    pub publish_artifact_name: String,
    pub dev_mode: bool,
    pub github_api_url: String,
    pub github_raw_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration from an arbitrary key lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            repo: or("RESUME_REPO", DEFAULT_REPO),
            branch: or("RESUME_BRANCH", DEFAULT_BRANCH),
            file_path: or("RESUME_FILE_PATH", DEFAULT_FILE_PATH),
            artifact_path: get("RESUME_PDF_PATH"),
            // CI runners expose GITHUB_TOKEN; an explicit token wins.
            github_token: get("RESUME_GITHUB_TOKEN").or_else(|| get("GITHUB_TOKEN")),
            use_local_fallback: get("RESUME_USE_LOCAL_FALLBACK")
                .map(|v| !v.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            local_document: PathBuf::from(or("RESUME_LOCAL_FILE", DEFAULT_LOCAL_FILE)),
            local_artifact: PathBuf::from(or("RESUME_LOCAL_PDF", DEFAULT_LOCAL_PDF)),
            publish_dir: PathBuf::from(or("PUBLISH_DIR", DEFAULT_PUBLISH_DIR)),
            publish_document_name: or("PUBLISH_DOCUMENT_NAME", DEFAULT_PUBLISH_DOCUMENT),
            publish_artifact_name: or("PUBLISH_ARTIFACT_NAME", DEFAULT_PUBLISH_ARTIFACT),
            dev_mode: get("TERMFOLIO_DEV")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false),
            github_api_url: or("GITHUB_API_URL", DEFAULT_API_URL),
            github_raw_url: or("GITHUB_RAW_URL", DEFAULT_RAW_URL),
            port: or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or("RUST_LOG", "info"),
        })
    }

    pub fn published_document(&self) -> PathBuf {
        self.publish_dir.join(&self.publish_document_name)
    }
}
