//! Process-lifetime, write-once cache of the normalized resume.
//!
//! Concurrent first readers all await the same in-flight resolution. A
//! failed resolution leaves the slot empty so the next reader tries again;
//! a successful one is never invalidated.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::resume::{normalize_document, Document, ResumeError};
use crate::store::RuntimeSource;

#[derive(Default)]
pub struct DocumentCache {
    slot: OnceCell<Arc<Document>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Document>> {
        self.slot.get().cloned()
    }

    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<Document>, ResumeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Document, ResumeError>>,
    {
        self.slot
            .get_or_try_init(|| async { init().await.map(Arc::new) })
            .await
            .cloned()
    }
}

/// Produces the raw resume text. Implemented by the runtime store; tests
/// substitute their own.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load(&self) -> Result<String, ResumeError>;
}

#[async_trait]
impl DocumentSource for RuntimeSource {
    async fn load(&self) -> Result<String, ResumeError> {
        RuntimeSource::load(self).await
    }
}

/// Loads, normalizes and caches the resume for every consumer.
pub struct DocumentResolver {
    source: Arc<dyn DocumentSource>,
    cache: DocumentCache,
}

impl DocumentResolver {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            cache: DocumentCache::new(),
        }
    }

    /// The normalized document, resolving it on first use.
    pub async fn document(&self) -> Result<Arc<Document>, ResumeError> {
        if let Some(document) = self.cache.get() {
            return Ok(document);
        }
        self.cache
            .get_or_try_init(|| async {
                let text = self.source.load().await?;
                let document = normalize_document(&text)?;
                info!("resume resolved for {}", document.name);
                Ok(document)
            })
            .await
    }

    /// Like [`document`](Self::document), but substitutes the minimal
    /// placeholder document on failure. The placeholder is not cached.
    pub async fn document_or_minimal(&self) -> Arc<Document> {
        match self.document().await {
            Ok(document) => document,
            Err(e) => {
                error!("falling back to the minimal resume: {e}");
                Arc::new(Document::minimal())
            }
        }
    }
}
