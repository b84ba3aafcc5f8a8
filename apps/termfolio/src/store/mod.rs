//! Document store accessor: where the raw resume bytes come from.
//!
//! - `github`: contents API / raw endpoint tiers and failure classification
//! - `publish`: build-time fetch with local fallback into the publish dir
//! - `runtime`: published copy first, raw endpoint in development
//! - `transport`: the HTTP seam

pub mod github;
pub mod publish;
pub mod runtime;
pub mod transport;

pub use github::{FetchError, GitHubFetcher};
pub use publish::{publish, PublishPlan, PublishSource};
pub use runtime::RuntimeSource;
pub use transport::ReqwestTransport;
