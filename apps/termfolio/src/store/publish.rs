//! Build-time publishing: fetch the resume (and optional PDF) from GitHub,
//! or copy the committed local copies, into the publish directory.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::store::github::{FetchError, FetchedFile, GitHubFetcher, Tier};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("remote fetch failed ({remote}) and local fallback is disabled")]
    RemoteFailedNoFallback { remote: FetchError },

    #[error("remote fetch failed ({remote}) and local fallback failed: {local}")]
    AllSourcesFailed {
        remote: FetchError,
        local: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishSource {
    Remote(Tier),
    LocalFallback,
}

#[derive(Debug, Clone)]
pub struct PublishReport {
    pub source: PublishSource,
    pub document_path: PathBuf,
    pub document_bytes: usize,
    pub artifact_path: Option<PathBuf>,
}

/// Where things come from and where they go.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub document_path: String,
    pub artifact_path: Option<String>,
    pub allow_local_fallback: bool,
    pub local_document: PathBuf,
    pub local_artifact: PathBuf,
    pub publish_dir: PathBuf,
    pub publish_document_name: String,
    pub publish_artifact_name: String,
}

impl PublishPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            document_path: config.file_path.clone(),
            artifact_path: config.artifact_path.clone(),
            allow_local_fallback: config.use_local_fallback,
            local_document: config.local_document.clone(),
            local_artifact: config.local_artifact.clone(),
            publish_dir: config.publish_dir.clone(),
            publish_document_name: config.publish_document_name.clone(),
            publish_artifact_name: config.publish_artifact_name.clone(),
        }
    }

    fn target_document(&self) -> PathBuf {
        self.publish_dir.join(&self.publish_document_name)
    }

    fn target_artifact(&self) -> PathBuf {
        self.publish_dir.join(&self.publish_artifact_name)
    }
}

/// Runs the remote tier, then the local fallback if allowed. Exactly one
/// document ends up in the publish directory on success.
pub async fn publish(fetcher: &GitHubFetcher, plan: &PublishPlan) -> Result<PublishReport, PublishError> {
    let remote = match fetch_document(fetcher, plan).await {
        Ok(file) => return publish_remote(fetcher, plan, file).await,
        Err(remote) => remote,
    };

    if !plan.allow_local_fallback {
        error!("remote fetch failed and local fallback is disabled");
        return Err(PublishError::RemoteFailedNoFallback { remote });
    }

    info!("trying local fallback {}", plan.local_document.display());
    match copy_local(plan).await {
        Ok(report) => Ok(report),
        Err(local) => {
            error!("local fallback failed: {local}");
            Err(PublishError::AllSourcesFailed { remote, local })
        }
    }
}

async fn fetch_document(fetcher: &GitHubFetcher, plan: &PublishPlan) -> Result<FetchedFile, FetchError> {
    let file = fetcher.fetch(&plan.document_path).await?;
    validate_text(&plan.document_path, &file.bytes)?;
    Ok(file)
}

async fn publish_remote(
    fetcher: &GitHubFetcher,
    plan: &PublishPlan,
    file: FetchedFile,
) -> Result<PublishReport, PublishError> {
    ensure_dir(&plan.publish_dir).await?;
    let target = plan.target_document();
    write(&target, &file.bytes).await?;
    info!(
        "published {} ({} bytes) from the {}",
        target.display(),
        file.bytes.len(),
        file.tier
    );

    let artifact_path = match &plan.artifact_path {
        Some(path) => fetch_artifact(fetcher, path, &plan.target_artifact()).await,
        None => None,
    };

    Ok(PublishReport {
        source: PublishSource::Remote(file.tier),
        document_path: target,
        document_bytes: file.bytes.len(),
        artifact_path,
    })
}

/// Best effort: a missing or unreachable artifact never fails the publish.
async fn fetch_artifact(fetcher: &GitHubFetcher, path: &str, target: &Path) -> Option<PathBuf> {
    let file = match fetcher.fetch(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("skipping artifact {path}: {e}");
            return None;
        }
    };
    match fs::write(target, &file.bytes).await {
        Ok(()) => {
            info!("published artifact {}", target.display());
            Some(target.to_path_buf())
        }
        Err(e) => {
            warn!("could not write artifact {}: {e}", target.display());
            None
        }
    }
}

/// The document must be UTF-8 and contain something other than whitespace.
fn validate_text(path: &str, bytes: &[u8]) -> Result<(), FetchError> {
    let text = std::str::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(FetchError::Empty {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Copies the committed document verbatim, plus the artifact if it exists.
async fn copy_local(plan: &PublishPlan) -> Result<PublishReport, std::io::Error> {
    fs::create_dir_all(&plan.publish_dir).await?;
    let target = plan.target_document();
    let copied = fs::copy(&plan.local_document, &target).await?;
    info!(
        "local fallback: copied {} to {}",
        plan.local_document.display(),
        target.display()
    );

    let artifact_path = if fs::try_exists(&plan.local_artifact).await.unwrap_or(false) {
        let artifact_target = plan.target_artifact();
        match fs::copy(&plan.local_artifact, &artifact_target).await {
            Ok(_) => Some(artifact_target),
            Err(e) => {
                warn!("could not copy local artifact: {e}");
                None
            }
        }
    } else {
        None
    };

    Ok(PublishReport {
        source: PublishSource::LocalFallback,
        document_path: target,
        document_bytes: copied as usize,
        artifact_path,
    })
}

async fn ensure_dir(dir: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(dir).await.map_err(|source| PublishError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), PublishError> {
    fs::write(path, bytes).await.map_err(|source| PublishError::Write {
        path: path.to_path_buf(),
        source,
    })
}
