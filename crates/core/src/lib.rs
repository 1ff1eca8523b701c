//! ValoraNL Core - Domain entities, services, and traits.
//!
//! This crate contains the unification engine for multi-portal property
//! listings. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod adapters;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod listings;
pub mod sources;

// Re-export the pieces callers wire together
pub use adapters::{SourceAdapter, StagingSqliteAdapter};
pub use ingest::{IngestConfig, IngestService, RunSummary};
pub use listings::{CanonicalListing, RawListing};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
