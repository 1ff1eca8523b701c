use async_trait::async_trait;

use super::model::RunSummary;
use crate::errors::Result;

/// Storage interface for the immutable per-run execution log.
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// Records the run outcome. A resumed run carries the same execution id
    /// as its predecessor and replaces that row.
    async fn record(&self, summary: &RunSummary) -> Result<()>;
}
