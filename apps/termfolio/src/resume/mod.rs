//! Resume document model and the normalizer that produces it.

pub mod format;
pub mod model;
pub mod normalize;
mod raw;

use thiserror::Error;

pub use model::{Document, SectionId};
pub use normalize::normalize_document;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("malformed resume document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to read published resume {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("resume fetch failed: {0}")]
    Fetch(#[from] crate::store::FetchError),
}
