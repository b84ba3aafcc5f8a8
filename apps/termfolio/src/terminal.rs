//! Cosmetic terminal labels and download file names derived from the resume.

use reqwest::Url;
use serde::Serialize;
use tracing::warn;

use crate::resume::Document;

const DEFAULT_USERNAME: &str = "visitor";
const DEFAULT_HOSTNAME: &str = "terminal.ahmadjalil.com";
const DEFAULT_HOME_USER: &str = "user";
const HOSTNAME_PREFIX: &str = "terminal";
const REPOSITORY_URL: &str = "https://github.com/ahzs645/terminal.ahmadjalil.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalConfig {
    pub username: String,
    pub hostname: String,
    pub home_directory: String,
    pub repository_url: String,
    pub version: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            home_directory: format!("/home/{DEFAULT_HOME_USER}"),
            repository_url: REPOSITORY_URL.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNames {
    pub pdf_file_name: String,
    pub yaml_file_name: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            pdf_file_name: "CV.pdf".to_string(),
            yaml_file_name: "CV.yaml".to_string(),
        }
    }
}

pub fn derive_terminal_config(document: Option<&Document>) -> TerminalConfig {
    let defaults = TerminalConfig::default();
    let Some(document) = document else {
        return defaults;
    };

    let hostname = match website_host(&document.website) {
        Some(host) => format!("{HOSTNAME_PREFIX}.{host}"),
        None => defaults.hostname.clone(),
    };

    TerminalConfig {
        hostname,
        home_directory: format!("/home/{}", home_user(&document.name)),
        ..defaults
    }
}

pub fn derive_file_names(document: Option<&Document>) -> FileNames {
    let Some(name) = document.map(|d| d.name.trim()).filter(|n| !n.is_empty()) else {
        return FileNames::default();
    };
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    FileNames {
        pdf_file_name: format!("{stem}_CV.pdf"),
        yaml_file_name: format!("{stem}_CV.yaml"),
    }
}

/// Host of the resume website. Blank and unparsable values yield `None`.
fn website_host(website: &str) -> Option<String> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }
    match Url::parse(website) {
        Ok(url) => url.host_str().map(str::to_string),
        Err(e) => {
            warn!("ignoring unparsable website {website:?}: {e}");
            None
        }
    }
}

/// Lowercased first name token, reduced to characters safe in a path segment.
fn home_user(name: &str) -> String {
    let user: String = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();

    if user.is_empty() {
        DEFAULT_HOME_USER.to_string()
    } else {
        user
    }
}
