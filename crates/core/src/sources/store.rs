use async_trait::async_trait;

use super::model::Source;
use crate::errors::Result;

/// Storage interface for the portal source registry.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Inserts the source on first sight, otherwise refreshes its name and
    /// base URL. Returns the stored row either way.
    async fn upsert(&self, code: &str, name: &str, base_url: Option<&str>) -> Result<Source>;

    fn get_by_code(&self, code: &str) -> Result<Option<Source>>;
}
