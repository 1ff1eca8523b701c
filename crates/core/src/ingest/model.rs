//! Run-level models: status, per-source metrics, run summary and the
//! immutable ingest configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_BASE_SECS, DEFAULT_SCRAPE_TIMEOUT_SECS,
    DEFAULT_STALE_DAYS,
};

/// Run state machine: `Pending → Running → {Success, Failed, Partial}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
    Partial,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Partial => "partial",
        }
    }
}

/// Counters accumulated while processing one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetrics {
    pub read: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped_price: u64,
    pub errors: u64,
    pub warnings: u32,
}

/// Final report of one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub execution_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub sources_processed: u32,
    pub total_read: u64,
    pub new_listings: u64,
    pub updated_listings: u64,
    pub deactivated: u64,
    pub by_source: BTreeMap<String, SourceMetrics>,
    pub failed_sources: BTreeMap<String, String>,
}

impl RunSummary {
    pub fn exit_ok(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Immutable configuration handed to the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub max_retries: u32,
    pub retry_delay_base_secs: u64,
    /// Days without a sighting before deactivation; 0 disables the sweep.
    pub stale_days: u32,
    pub scrape_timeout: Duration,
    /// When false, an existing checkpoint is ignored and the run is strict:
    /// the first source failure aborts instead of being isolated.
    pub resume: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_base_secs: DEFAULT_RETRY_DELAY_BASE_SECS,
            stale_days: DEFAULT_STALE_DAYS,
            scrape_timeout: Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS),
            resume: true,
        }
    }
}
