//! End-to-end ingest flow against a real migrated database: two sources,
//! a cross-portal duplicate, checkpoint lifecycle and the stale sweep.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;

use valoranl_core::adapters::SourceAdapter;
use valoranl_core::errors::Result;
use valoranl_core::ingest::{
    CheckpointStore, ExecutionCheckpoint, ExecutionStatus, FileCheckpointStore,
    InMemoryCheckpointStore, IngestConfig, IngestService,
};
use valoranl_core::listings::{sha256_hex, ListingStatus, ListingStore, RawListing};
use valoranl_storage_sqlite::ingest::ExecutionLogRepository;
use valoranl_storage_sqlite::listings::ListingRepository;
use valoranl_storage_sqlite::schema::execution_log::dsl as execution_log_dsl;
use valoranl_storage_sqlite::schema::listings::dsl as listings_dsl;
use valoranl_storage_sqlite::sources::SourceRepository;

struct FixtureAdapter {
    code: &'static str,
    records: Vec<RawListing>,
}

#[async_trait]
impl SourceAdapter for FixtureAdapter {
    fn code(&self) -> &str {
        self.code
    }

    fn name(&self) -> &str {
        self.code
    }

    fn can_execute(&self) -> bool {
        true
    }

    async fn scrape(&self, _checkpoint: &ExecutionCheckpoint) -> Result<Vec<RawListing>> {
        Ok(self.records.clone())
    }
}

fn record(url: &str, price: &str) -> RawListing {
    RawListing {
        url: Some(url.to_string()),
        price_text: Some(price.to_string()),
        action_text: Some("venta".to_string()),
        title: Some("Casa en venta".to_string()),
        municipality: Some("Monterrey".to_string()),
        colony: Some("Contry".to_string()),
        area_construction_text: Some("200 m2".to_string()),
        bedrooms_text: Some("3".to_string()),
        ..Default::default()
    }
}

fn fast_config() -> IngestConfig {
    IngestConfig {
        max_retries: 2,
        retry_delay_base_secs: 0,
        stale_days: 30,
        scrape_timeout: std::time::Duration::from_secs(10),
        resume: true,
    }
}

fn build_service(
    db: &common::TestDb,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    checkpoints: Box<dyn CheckpointStore>,
    config: IngestConfig,
) -> IngestService {
    IngestService::new(
        adapters,
        Arc::new(ListingRepository::new(db.pool.clone(), db.writer.clone())),
        Arc::new(SourceRepository::new(db.pool.clone(), db.writer.clone())),
        Arc::new(ExecutionLogRepository::new(db.writer.clone())),
        checkpoints,
        config,
        Arc::new(AtomicBool::new(false)),
    )
}

#[tokio::test]
async fn duplicate_url_across_sources_yields_two_rows() {
    let db = common::setup();

    // Three raw records from two sources; two share one normalized URL.
    let portal_a: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "casas365",
        records: vec![
            record("https://Shared.mx/casa/9/?utm=promo", "$2,500,000"),
            record("https://casas365.mx/casa/1", "$1,800,000"),
        ],
    });
    let portal_b: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "realtyworld",
        records: vec![record("https://shared.mx/casa/9", "$2,500,000")],
    });

    let checkpoints = Box::new(InMemoryCheckpointStore::new());
    let service = build_service(&db, vec![portal_a, portal_b], checkpoints, fast_config());

    let summary = service.run().await.unwrap();
    assert_eq!(summary.status, ExecutionStatus::Success);
    assert_eq!(summary.total_read, 3);
    assert_eq!(summary.new_listings, 2);
    assert_eq!(summary.updated_listings, 1);

    let mut conn = valoranl_storage_sqlite::get_connection(&db.pool).unwrap();
    let row_count: i64 = listings_dsl::listings.count().get_result(&mut conn).unwrap();
    assert_eq!(row_count, 2);

    // The duplicate sighting changed nothing tracked, so no field history.
    let repo = ListingRepository::new(db.pool.clone(), db.writer.clone());
    let shared_hash = sha256_hex("https://shared.mx/casa/9");
    let shared = repo.find_by_dedupe_hash(&shared_hash).unwrap().unwrap();
    assert!(repo.field_history(&shared.id).unwrap().is_empty());
    assert_eq!(repo.price_history(&shared.id).unwrap().len(), 1);

    // Exactly one execution log row was written.
    let log_count: i64 = execution_log_dsl::execution_log
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(log_count, 1);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let db = common::setup();

    let records = vec![record("https://casas365.mx/casa/77", "$2,500,000")];
    let make_adapter = || -> Arc<dyn SourceAdapter> {
        Arc::new(FixtureAdapter {
            code: "casas365",
            records: records.clone(),
        })
    };

    let service = build_service(
        &db,
        vec![make_adapter()],
        Box::new(InMemoryCheckpointStore::new()),
        fast_config(),
    );
    let first = service.run().await.unwrap();
    assert_eq!(first.new_listings, 1);

    // A fresh run (new checkpoint store, same database) re-sights the same
    // record: no new row, no change history.
    let service = build_service(
        &db,
        vec![make_adapter()],
        Box::new(InMemoryCheckpointStore::new()),
        fast_config(),
    );
    let second = service.run().await.unwrap();
    assert_eq!(second.new_listings, 0);
    assert_eq!(second.updated_listings, 1);

    let repo = ListingRepository::new(db.pool.clone(), db.writer.clone());
    let hash = sha256_hex("https://casas365.mx/casa/77");
    let listing = repo.find_by_dedupe_hash(&hash).unwrap().unwrap();
    assert!(repo.field_history(&listing.id).unwrap().is_empty());
}

#[tokio::test]
async fn checkpoint_is_cleared_only_on_full_success() {
    let db = common::setup();

    let good: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "good",
        records: vec![record("https://good.mx/1", "$2,500,000")],
    });

    struct BrokenAdapter;
    #[async_trait]
    impl SourceAdapter for BrokenAdapter {
        fn code(&self) -> &str {
            "broken"
        }
        fn name(&self) -> &str {
            "broken"
        }
        fn can_execute(&self) -> bool {
            true
        }
        async fn scrape(&self, _checkpoint: &ExecutionCheckpoint) -> Result<Vec<RawListing>> {
            Err(valoranl_core::Error::Adapter("boom".to_string()))
        }
    }

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let checkpoint_path = checkpoint_dir.path().join("checkpoint.json");

    let service = build_service(
        &db,
        vec![good, Arc::new(BrokenAdapter)],
        Box::new(FileCheckpointStore::new(&checkpoint_path)),
        fast_config(),
    );

    let summary = service.run().await.unwrap();
    assert_eq!(summary.status, ExecutionStatus::Partial);
    assert!(summary.failed_sources.contains_key("broken"));
    // The checkpoint survives a partial run.
    assert!(checkpoint_path.exists());

    // Resume with the broken source fixed: the good source is skipped, the
    // failed one retried, and the checkpoint is deleted on full success.
    let good_again: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "good",
        records: vec![record("https://good.mx/1", "$2,500,000")],
    });
    let fixed: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "broken",
        records: vec![record("https://broken.mx/2", "$2,600,000")],
    });
    let service = build_service(
        &db,
        vec![good_again, fixed],
        Box::new(FileCheckpointStore::new(&checkpoint_path)),
        fast_config(),
    );

    let summary = service.run().await.unwrap();
    assert_eq!(summary.status, ExecutionStatus::Success);
    assert!(summary.failed_sources.is_empty());
    assert!(!checkpoint_path.exists());

    // The skipped source was not re-ingested: still one row per listing.
    let mut conn = valoranl_storage_sqlite::get_connection(&db.pool).unwrap();
    let row_count: i64 = listings_dsl::listings.count().get_result(&mut conn).unwrap();
    assert_eq!(row_count, 2);
}

#[tokio::test]
async fn stale_sweep_runs_after_the_full_pass() {
    let db = common::setup();
    let repo = ListingRepository::new(db.pool.clone(), db.writer.clone());
    let sources = SourceRepository::new(db.pool.clone(), db.writer.clone());

    // Pre-existing listing from an earlier sweep, unseen for 45 days.
    use valoranl_core::sources::SourceStore;
    let source = sources.upsert("casas365", "Casas 365", None).await.unwrap();
    let old_seen = Utc::now().naive_utc() - Duration::days(45);
    let mut old_listing_raw = record("https://casas365.mx/old/1", "$2,500,000");
    old_listing_raw.source_first_seen_at = Some(old_seen);
    let mut warnings = 0;
    let old_listing =
        valoranl_core::listings::canonicalize(&old_listing_raw, old_seen, &mut warnings);
    repo.insert(&source.id, &old_listing).await.unwrap();

    // A run over a source that does not re-sight the old listing.
    let fresh: Arc<dyn SourceAdapter> = Arc::new(FixtureAdapter {
        code: "casas365",
        records: vec![record("https://casas365.mx/new/2", "$2,600,000")],
    });
    let service = build_service(
        &db,
        vec![fresh],
        Box::new(InMemoryCheckpointStore::new()),
        fast_config(),
    );

    let summary = service.run().await.unwrap();
    assert_eq!(summary.deactivated, 1);

    let old_row = repo
        .find_by_dedupe_hash(&old_listing.dedupe_hash)
        .unwrap()
        .unwrap();
    assert_eq!(old_row.status, ListingStatus::Inactive);

    let new_hash = sha256_hex("https://casas365.mx/new/2");
    let new_row = repo.find_by_dedupe_hash(&new_hash).unwrap().unwrap();
    assert_eq!(new_row.status, ListingStatus::Active);
}
