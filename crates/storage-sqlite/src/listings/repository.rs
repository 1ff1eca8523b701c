//! Diesel implementation of the listing store.
//!
//! Reads go through the pool; every mutation goes through the single-writer
//! actor so the insert-or-update plus its history appends land in one
//! immediate transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::listings::model::{
    FieldHistoryDB, ListingDB, ListingUpdateDB, NewFieldHistoryDB, NewPriceHistoryDB,
    NewStatusHistoryDB, PriceHistoryDB, StatusHistoryDB,
};
use crate::schema::listing_field_history::dsl as field_history_dsl;
use crate::schema::listing_price_history::dsl as price_history_dsl;
use crate::schema::listing_status_history::dsl as status_history_dsl;
use crate::schema::listings::dsl as listings_dsl;
use valoranl_core::listings::{
    has_price_change, has_status_change, CanonicalListing, FieldChange, ListingStore,
    PriceHistoryEntry, StatusHistoryEntry,
};
use valoranl_core::Result;

pub struct ListingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ListingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ListingStore for ListingRepository {
    fn find_by_dedupe_hash(&self, dedupe_hash: &str) -> Result<Option<CanonicalListing>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<ListingDB> = listings_dsl::listings
            .filter(listings_dsl::dedupe_hash.eq(dedupe_hash))
            .first::<ListingDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(ListingDB::into_domain))
    }

    async fn insert(&self, source_id: &str, listing: &CanonicalListing) -> Result<()> {
        let row = ListingDB::from_domain(source_id, listing);
        let now = Utc::now().naive_utc();

        // Seed the price history only when the first sighting has a price;
        // the status history always starts with a None -> status row.
        let price_seed = listing.price_amount.map(|price| NewPriceHistoryDB {
            listing_id: listing.id.clone(),
            status: listing.status.as_str().to_string(),
            price_amount: Some(price),
            currency: listing.currency.clone(),
            captured_at: now,
        });
        let status_seed = NewStatusHistoryDB {
            listing_id: listing.id.clone(),
            old_status: None,
            new_status: listing.status.as_str().to_string(),
            changed_at: now,
        };

        self.writer
            .exec(move |conn| {
                diesel::insert_into(listings_dsl::listings)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                if let Some(seed) = &price_seed {
                    diesel::insert_into(price_history_dsl::listing_price_history)
                        .values(seed)
                        .execute(conn)
                        .into_core()?;
                }
                diesel::insert_into(status_history_dsl::listing_status_history)
                    .values(&status_seed)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn apply_update(
        &self,
        listing_id: &str,
        source_id: &str,
        listing: &CanonicalListing,
        changes: &[FieldChange],
    ) -> Result<()> {
        let now = Utc::now().naive_utc();
        let changeset = ListingUpdateDB::from_domain(source_id, listing, now);

        let field_rows: Vec<NewFieldHistoryDB> = changes
            .iter()
            .map(|change| NewFieldHistoryDB::from_change(listing_id, change, now))
            .collect();

        let price_row = has_price_change(changes).then(|| NewPriceHistoryDB {
            listing_id: listing_id.to_string(),
            status: listing.status.as_str().to_string(),
            price_amount: listing.price_amount,
            currency: listing.currency.clone(),
            captured_at: now,
        });

        let status_row = if has_status_change(changes) {
            let old_status = changes
                .iter()
                .find(|c| c.field_name == "status")
                .and_then(|c| c.old_value.as_ref())
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Some(NewStatusHistoryDB {
                listing_id: listing_id.to_string(),
                old_status,
                new_status: listing.status.as_str().to_string(),
                changed_at: now,
            })
        } else {
            None
        };

        let listing_id = listing_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(listings_dsl::listings.filter(listings_dsl::id.eq(&listing_id)))
                    .set(&changeset)
                    .execute(conn)
                    .into_core()?;
                if !field_rows.is_empty() {
                    diesel::insert_into(field_history_dsl::listing_field_history)
                        .values(&field_rows)
                        .execute(conn)
                        .into_core()?;
                }
                if let Some(row) = &price_row {
                    diesel::insert_into(price_history_dsl::listing_price_history)
                        .values(row)
                        .execute(conn)
                        .into_core()?;
                }
                if let Some(row) = &status_row {
                    diesel::insert_into(status_history_dsl::listing_status_history)
                        .values(row)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(())
            })
            .await
    }

    async fn deactivate_stale(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let now = Utc::now().naive_utc();
        self.writer
            .exec(move |conn| {
                diesel::update(
                    listings_dsl::listings
                        .filter(listings_dsl::status.eq("active"))
                        .filter(listings_dsl::seen_last_at.lt(cutoff)),
                )
                .set((
                    listings_dsl::status.eq("inactive"),
                    listings_dsl::updated_at.eq(now),
                ))
                .execute(conn)
                .into_core()
            })
            .await
    }

    fn price_history(&self, listing_id: &str) -> Result<Vec<PriceHistoryEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<PriceHistoryDB> = price_history_dsl::listing_price_history
            .filter(price_history_dsl::listing_id.eq(listing_id))
            .order((price_history_dsl::captured_at.asc(), price_history_dsl::id.asc()))
            .load::<PriceHistoryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(PriceHistoryEntry::from).collect())
    }

    fn status_history(&self, listing_id: &str) -> Result<Vec<StatusHistoryEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<StatusHistoryDB> = status_history_dsl::listing_status_history
            .filter(status_history_dsl::listing_id.eq(listing_id))
            .order((status_history_dsl::changed_at.asc(), status_history_dsl::id.asc()))
            .load::<StatusHistoryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(StatusHistoryEntry::from).collect())
    }

    fn field_history(&self, listing_id: &str) -> Result<Vec<FieldChange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows: Vec<FieldHistoryDB> = field_history_dsl::listing_field_history
            .filter(field_history_dsl::listing_id.eq(listing_id))
            .order((field_history_dsl::changed_at.asc(), field_history_dsl::id.asc()))
            .load::<FieldHistoryDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(FieldChange::from).collect())
    }
}
