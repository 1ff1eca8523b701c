use async_trait::async_trait;

use crate::errors::Result;
use crate::ingest::checkpoint::ExecutionCheckpoint;
use crate::listings::RawListing;

/// Collaborator contract for one portal.
///
/// `can_execute` probes whether the source's backing data is reachable
/// (staging database present, endpoint responding); unavailable sources are
/// skipped by the orchestrator without counting as failures. `scrape`
/// returns the portal's current records with every canonical field filled
/// on a best-effort basis.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable source code, e.g. `"casas365"`.
    fn code(&self) -> &str;

    /// Human-readable portal name.
    fn name(&self) -> &str;

    fn base_url(&self) -> Option<&str> {
        None
    }

    /// Whether the source can be scraped right now.
    fn can_execute(&self) -> bool;

    /// Produces the portal's raw records. The checkpoint is provided so
    /// adapters that support incremental extraction can resume mid-source.
    async fn scrape(&self, checkpoint: &ExecutionCheckpoint) -> Result<Vec<RawListing>>;
}
