//! Source adapter contract and bundled implementations.
//!
//! Adapters are thin, swappable producers of raw field records — one per
//! portal, stateless, no shared base state. The portal-specific HTML/DOM
//! parsing lives behind this boundary and is not part of the engine.

pub mod source_adapter;
pub mod staging_sqlite;

pub use source_adapter::SourceAdapter;
pub use staging_sqlite::StagingSqliteAdapter;
