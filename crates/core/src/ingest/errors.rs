//! Ingest error taxonomy.
//!
//! Record-level problems (normalization misses, price-validation rejects,
//! single-row store failures) never become errors of this type; they are
//! counted in the per-source metrics. These variants cover source-level and
//! run-level failures only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Network/timeout/remote failure during one scrape attempt; retried
    /// per the retry policy.
    #[error("transient source failure: {0}")]
    TransientSource(String),

    /// A source exhausted its retry budget.
    #[error("source '{source_name}' failed after {attempts} attempts: {last_error}")]
    SourceFailed {
        source_name: String,
        attempts: u32,
        last_error: String,
    },

    /// No adapter passed its availability probe at startup.
    #[error("no source adapters are available to execute")]
    NoAdaptersAvailable,

    /// Strict mode aborted the run on the first source failure.
    #[error("run aborted in strict mode: source '{0}' failed")]
    StrictAbort(String),
}
