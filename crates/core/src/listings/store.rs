//! Listing storage traits.
//!
//! These traits abstract the persistence layer so the unification engine
//! can run against different backends (and in-memory doubles in tests).
//! Mutations are async and must be applied atomically: an insert seeds its
//! history rows in the same transaction, an update appends its audit rows
//! with the column changes or not at all.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::model::{CanonicalListing, FieldChange, PriceHistoryEntry, StatusHistoryEntry};
use crate::errors::Result;

/// Storage interface for canonical listings and their history tables.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Looks up the canonical row for a dedupe hash, if one exists.
    fn find_by_dedupe_hash(&self, dedupe_hash: &str) -> Result<Option<CanonicalListing>>;

    /// Inserts a first-sighting listing.
    ///
    /// In one transaction: the canonical row, a seed price-history entry
    /// (when the sighting carries a price) and a seed status-history entry
    /// (`None -> status`).
    async fn insert(&self, source_id: &str, listing: &CanonicalListing) -> Result<()>;

    /// Applies a later sighting to an existing canonical row.
    ///
    /// In one transaction: updates the mutable columns and advances
    /// `seen_last_at`, appends one field-history row per change, and
    /// appends price/status history rows when the change list contains a
    /// price or status difference.
    async fn apply_update(
        &self,
        listing_id: &str,
        source_id: &str,
        listing: &CanonicalListing,
        changes: &[FieldChange],
    ) -> Result<()>;

    /// Transitions active listings unseen since `cutoff` to inactive.
    /// Returns the number of rows deactivated. Idempotent and monotonic.
    async fn deactivate_stale(&self, cutoff: NaiveDateTime) -> Result<usize>;

    /// Price observations for a listing, oldest first.
    fn price_history(&self, listing_id: &str) -> Result<Vec<PriceHistoryEntry>>;

    /// Status transitions for a listing, oldest first.
    fn status_history(&self, listing_id: &str) -> Result<Vec<StatusHistoryEntry>>;

    /// Field-level audit rows for a listing, oldest first.
    fn field_history(&self, listing_id: &str) -> Result<Vec<FieldChange>>;
}
