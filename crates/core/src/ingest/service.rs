//! Run orchestrator.
//!
//! Drives every available source adapter through scrape → normalize →
//! validate → unify under checkpointed, retry-isolated execution, then runs
//! the stale-listing sweep once the full pass is over and records an
//! execution-log row.
//!
//! ```text
//! IngestService
//!       │
//!       ├─► SourceAdapter   (scrape raw records, per portal)
//!       ├─► SourceStore     (portal registry upserts)
//!       ├─► ListingStore    (canonical rows + history tables)
//!       ├─► CheckpointStore (crash-safe resume state)
//!       └─► ExecutionLogStore (immutable run summaries)
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::checkpoint::{CheckpointStore, ExecutionCheckpoint};
use super::errors::IngestError;
use super::model::{ExecutionStatus, IngestConfig, RunSummary, SourceMetrics};
use super::retry::RetryPolicy;
use super::store::ExecutionLogStore;
use crate::adapters::SourceAdapter;
use crate::errors::{Error, Result};
use crate::listings::{
    canonicalize, detect_changes, validate_price, CanonicalListing, FieldChange, ListingStore,
    PriceValidation,
};
use crate::sources::SourceStore;

pub struct IngestService {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    listings: Arc<dyn ListingStore>,
    sources: Arc<dyn SourceStore>,
    execution_log: Arc<dyn ExecutionLogStore>,
    checkpoints: Box<dyn CheckpointStore>,
    config: IngestConfig,
    retry: RetryPolicy,
    cancelled: Arc<AtomicBool>,
}

impl IngestService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        listings: Arc<dyn ListingStore>,
        sources: Arc<dyn SourceStore>,
        execution_log: Arc<dyn ExecutionLogStore>,
        checkpoints: Box<dyn CheckpointStore>,
        config: IngestConfig,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay_base_secs);
        Self {
            adapters,
            listings,
            sources,
            execution_log,
            checkpoints,
            config,
            retry,
            cancelled,
        }
    }

    /// Executes the full pipeline and returns the run summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();

        let available: Vec<&Arc<dyn SourceAdapter>> = self
            .adapters
            .iter()
            .filter(|adapter| {
                let ok = adapter.can_execute();
                if ok {
                    info!("source {} available", adapter.code());
                } else {
                    warn!("source {} not available, skipping", adapter.code());
                }
                ok
            })
            .collect();

        if available.is_empty() {
            error!("no source adapters available, aborting");
            let summary = self.summary(
                &ExecutionCheckpoint::new(Uuid::new_v4().to_string()),
                ExecutionStatus::Failed,
                started_at,
                BTreeMap::new(),
                0,
            );
            // Best effort: the store may be the thing that is down.
            if let Err(e) = self.execution_log.record(&summary).await {
                warn!("could not record failed run: {}", e);
            }
            return Err(IngestError::NoAdaptersAvailable.into());
        }

        let mut checkpoint = self
            .load_checkpoint()?
            .unwrap_or_else(|| ExecutionCheckpoint::new(Uuid::new_v4().to_string()));
        info!(
            "execution {} starting ({} sources)",
            checkpoint.execution_id,
            available.len()
        );

        let mut by_source: BTreeMap<String, SourceMetrics> = BTreeMap::new();
        let mut cancelled_early = false;
        let mut strict_failure: Option<String> = None;

        for adapter in &available {
            if self.cancelled.load(Ordering::SeqCst) {
                warn!("cancellation requested, stopping before next source");
                cancelled_early = true;
                break;
            }

            let code = adapter.code();
            if self.config.resume && checkpoint.is_source_completed(code) {
                info!("skipping {} (already completed)", code);
                continue;
            }

            checkpoint.current_source = Some(code.to_string());
            self.checkpoints.save(&checkpoint)?;

            match self.process_adapter(adapter.as_ref(), &checkpoint).await {
                Ok(metrics) => {
                    checkpoint.total_processed += metrics.read;
                    checkpoint.mark_completed(code);
                    self.checkpoints.save(&checkpoint)?;
                    by_source.insert(code.to_string(), metrics);
                }
                Err(e) => {
                    error!("source {} failed: {}", code, e);
                    checkpoint.mark_failed(code, e.to_string());
                    self.checkpoints.save(&checkpoint)?;
                    if !self.config.resume {
                        strict_failure = Some(code.to_string());
                        break;
                    }
                }
            }
        }

        // The stale sweep is a strict barrier: it only runs once every
        // available source has been attempted in this pass. Running it after
        // a partial pass would deactivate listings belonging to sources that
        // were never reached.
        let mut deactivated = 0u64;
        let swept_everything = !cancelled_early && strict_failure.is_none();
        if swept_everything && self.config.stale_days > 0 {
            let cutoff =
                (Utc::now() - ChronoDuration::days(i64::from(self.config.stale_days))).naive_utc();
            deactivated = self.listings.deactivate_stale(cutoff).await? as u64;
            info!(
                "deactivated {} listings unseen for {} days",
                deactivated, self.config.stale_days
            );
        }

        let status = if strict_failure.is_some() {
            ExecutionStatus::Failed
        } else if cancelled_early || !checkpoint.failed_sources.is_empty() {
            ExecutionStatus::Partial
        } else {
            ExecutionStatus::Success
        };

        let summary = self.summary(&checkpoint, status, started_at, by_source, deactivated);
        self.execution_log.record(&summary).await?;

        if status == ExecutionStatus::Success {
            self.checkpoints.clear()?;
        }

        if let Some(code) = strict_failure {
            return Err(IngestError::StrictAbort(code).into());
        }
        Ok(summary)
    }

    /// Inserts or updates one canonical listing.
    ///
    /// Returns `(inserted, changes)`: a first sighting inserts and reports
    /// no changes; a later sighting diffs the tracked fields and applies
    /// them with their audit rows. Re-upserting an unchanged record yields
    /// an empty change list and only advances `seen_last_at`.
    pub async fn unify_record(
        &self,
        source_id: &str,
        incoming: CanonicalListing,
    ) -> Result<(bool, Vec<FieldChange>)> {
        match self.listings.find_by_dedupe_hash(&incoming.dedupe_hash)? {
            None => {
                self.listings.insert(source_id, &incoming).await?;
                Ok((true, Vec::new()))
            }
            Some(existing) => {
                let changes = detect_changes(&existing, &incoming);
                self.listings
                    .apply_update(&existing.id, source_id, &incoming, &changes)
                    .await?;
                Ok((false, changes))
            }
        }
    }

    fn load_checkpoint(&self) -> Result<Option<ExecutionCheckpoint>> {
        if !self.config.resume {
            return Ok(None);
        }
        let checkpoint = self.checkpoints.load()?;
        if let Some(cp) = &checkpoint {
            info!(
                "resuming execution {} (completed: {:?}, failed: {:?})",
                cp.execution_id,
                cp.completed_sources,
                cp.failed_sources.keys().collect::<Vec<_>>()
            );
        }
        Ok(checkpoint)
    }

    async fn process_adapter(
        &self,
        adapter: &dyn SourceAdapter,
        checkpoint: &ExecutionCheckpoint,
    ) -> Result<SourceMetrics> {
        info!("processing source {}", adapter.name());
        let mut attempt = 1u32;
        loop {
            match self.attempt_source(adapter, checkpoint).await {
                Ok(metrics) => return Ok(metrics),
                Err(e) => {
                    warn!(
                        "source {} attempt {}/{} failed: {}",
                        adapter.code(),
                        attempt,
                        self.retry.max_attempts,
                        e
                    );
                    if !self.retry.has_next(attempt) {
                        return Err(IngestError::SourceFailed {
                            source_name: adapter.code().to_string(),
                            attempts: attempt,
                            last_error: e.to_string(),
                        }
                        .into());
                    }
                    let delay = self.retry.delay_for(attempt);
                    info!("retrying {} in {:?}", adapter.code(), delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One scrape-and-ingest attempt for a source. Scrape problems are
    /// transient (retryable); record-level problems are counted and the
    /// attempt continues, unless the store connection itself is lost.
    async fn attempt_source(
        &self,
        adapter: &dyn SourceAdapter,
        checkpoint: &ExecutionCheckpoint,
    ) -> Result<SourceMetrics> {
        let records =
            match tokio::time::timeout(self.config.scrape_timeout, adapter.scrape(checkpoint))
                .await
            {
                Ok(Ok(records)) => records,
                Ok(Err(e)) => {
                    return Err(IngestError::TransientSource(e.to_string()).into());
                }
                Err(_) => {
                    return Err(IngestError::TransientSource(format!(
                        "scrape timed out after {:?}",
                        self.config.scrape_timeout
                    ))
                    .into());
                }
            };

        let source = self
            .sources
            .upsert(adapter.code(), adapter.name(), adapter.base_url())
            .await?;

        let mut metrics = SourceMetrics::default();
        for raw in &records {
            metrics.read += 1;
            let now = Utc::now().naive_utc();
            let mut warnings = 0u32;
            let listing = canonicalize(raw, now, &mut warnings);
            metrics.warnings += warnings;

            if let PriceValidation::Rejected(reason) = validate_price(
                listing.price_amount,
                listing.area_construction_m2,
                listing.price_type,
            ) {
                metrics.skipped_price += 1;
                warn!(
                    "{}: skipping record, {} (url={:?})",
                    adapter.code(),
                    reason,
                    listing.url
                );
                continue;
            }

            match self.unify_record(&source.id, listing).await {
                Ok((true, _)) => metrics.inserted += 1,
                Ok((false, changes)) => {
                    metrics.updated += 1;
                    if !changes.is_empty() {
                        debug!(
                            "{}: {} field changes recorded",
                            adapter.code(),
                            changes.len()
                        );
                    }
                }
                Err(Error::Database(db)) if db.is_connection_loss() => {
                    // The store is gone; the whole source fails.
                    return Err(Error::Database(db));
                }
                Err(e) => {
                    metrics.errors += 1;
                    error!("{}: record failed to persist: {}", adapter.code(), e);
                }
            }
        }

        info!(
            "{}: read={} inserted={} updated={} skipped_price={} errors={}",
            adapter.code(),
            metrics.read,
            metrics.inserted,
            metrics.updated,
            metrics.skipped_price,
            metrics.errors
        );
        Ok(metrics)
    }

    fn summary(
        &self,
        checkpoint: &ExecutionCheckpoint,
        status: ExecutionStatus,
        started_at: chrono::DateTime<Utc>,
        by_source: BTreeMap<String, SourceMetrics>,
        deactivated: u64,
    ) -> RunSummary {
        let total_read = by_source.values().map(|m| m.read).sum();
        let new_listings = by_source.values().map(|m| m.inserted).sum();
        let updated_listings = by_source.values().map(|m| m.updated).sum();
        RunSummary {
            execution_id: checkpoint.execution_id.clone(),
            status,
            started_at,
            completed_at: Utc::now(),
            sources_processed: by_source.len() as u32,
            total_read,
            new_listings,
            updated_listings,
            deactivated,
            by_source,
            failed_sources: checkpoint.failed_sources.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::checkpoint::InMemoryCheckpointStore;
    use crate::listings::model::{ListingStatus, PriceHistoryEntry, RawListing, StatusHistoryEntry};
    use crate::sources::Source;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MemoryListingStore {
        rows: Mutex<HashMap<String, CanonicalListing>>,
        field_history: Mutex<Vec<FieldChange>>,
    }

    #[async_trait]
    impl ListingStore for MemoryListingStore {
        fn find_by_dedupe_hash(&self, dedupe_hash: &str) -> Result<Option<CanonicalListing>> {
            Ok(self.rows.lock().unwrap().get(dedupe_hash).cloned())
        }

        async fn insert(&self, _source_id: &str, listing: &CanonicalListing) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(listing.dedupe_hash.clone(), listing.clone());
            Ok(())
        }

        async fn apply_update(
            &self,
            listing_id: &str,
            _source_id: &str,
            listing: &CanonicalListing,
            changes: &[FieldChange],
        ) -> Result<()> {
            let mut updated = listing.clone();
            updated.id = listing_id.to_string();
            self.rows
                .lock()
                .unwrap()
                .insert(listing.dedupe_hash.clone(), updated);
            self.field_history
                .lock()
                .unwrap()
                .extend(changes.iter().cloned());
            Ok(())
        }

        async fn deactivate_stale(&self, cutoff: NaiveDateTime) -> Result<usize> {
            let mut count = 0;
            for listing in self.rows.lock().unwrap().values_mut() {
                if listing.status == ListingStatus::Active && listing.seen_last_at < cutoff {
                    listing.status = ListingStatus::Inactive;
                    count += 1;
                }
            }
            Ok(count)
        }

        fn price_history(&self, _listing_id: &str) -> Result<Vec<PriceHistoryEntry>> {
            Ok(Vec::new())
        }

        fn status_history(&self, _listing_id: &str) -> Result<Vec<StatusHistoryEntry>> {
            Ok(Vec::new())
        }

        fn field_history(&self, _listing_id: &str) -> Result<Vec<FieldChange>> {
            Ok(self.field_history.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct MemorySourceStore {
        rows: Mutex<HashMap<String, Source>>,
    }

    #[async_trait]
    impl SourceStore for MemorySourceStore {
        async fn upsert(&self, code: &str, name: &str, base_url: Option<&str>) -> Result<Source> {
            let now = Utc::now().naive_utc();
            let mut rows = self.rows.lock().unwrap();
            let source = rows.entry(code.to_string()).or_insert_with(|| Source {
                id: Uuid::new_v4().to_string(),
                code: code.to_string(),
                name: name.to_string(),
                base_url: base_url.map(str::to_string),
                is_active: true,
                created_at: now,
                updated_at: now,
            });
            Ok(source.clone())
        }

        fn get_by_code(&self, code: &str) -> Result<Option<Source>> {
            Ok(self.rows.lock().unwrap().get(code).cloned())
        }
    }

    #[derive(Default)]
    struct MemoryExecutionLog {
        records: Mutex<Vec<RunSummary>>,
    }

    #[async_trait]
    impl ExecutionLogStore for MemoryExecutionLog {
        async fn record(&self, summary: &RunSummary) -> Result<()> {
            self.records.lock().unwrap().push(summary.clone());
            Ok(())
        }
    }

    struct ScriptedAdapter {
        code: String,
        records: Vec<RawListing>,
        available: bool,
        /// Number of leading scrape calls that fail before one succeeds.
        failures_before_success: u32,
        calls: AtomicU32,
    }

    impl ScriptedAdapter {
        fn new(code: &str, records: Vec<RawListing>) -> Self {
            Self {
                code: code.to_string(),
                records,
                available: true,
                failures_before_success: 0,
                calls: AtomicU32::new(0),
            }
        }

        fn failing(code: &str) -> Self {
            let mut adapter = Self::new(code, Vec::new());
            adapter.failures_before_success = u32::MAX;
            adapter
        }
    }

    #[async_trait]
    impl SourceAdapter for ScriptedAdapter {
        fn code(&self) -> &str {
            &self.code
        }

        fn name(&self) -> &str {
            &self.code
        }

        fn can_execute(&self) -> bool {
            self.available
        }

        async fn scrape(&self, _checkpoint: &ExecutionCheckpoint) -> Result<Vec<RawListing>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                return Err(Error::Adapter("connection reset".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    fn raw_record(url: &str, price: &str) -> RawListing {
        RawListing {
            url: Some(url.to_string()),
            price_text: Some(price.to_string()),
            action_text: Some("venta".to_string()),
            municipality: Some("Monterrey".to_string()),
            area_construction_text: Some("200".to_string()),
            bedrooms_text: Some("3".to_string()),
            ..Default::default()
        }
    }

    fn fast_config() -> IngestConfig {
        IngestConfig {
            max_retries: 2,
            retry_delay_base_secs: 0,
            stale_days: 0,
            scrape_timeout: Duration::from_secs(5),
            resume: true,
        }
    }

    fn service(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        config: IngestConfig,
    ) -> (IngestService, Arc<MemoryListingStore>, Arc<MemoryExecutionLog>) {
        let listings = Arc::new(MemoryListingStore::default());
        let log = Arc::new(MemoryExecutionLog::default());
        let svc = IngestService::new(
            adapters,
            listings.clone(),
            Arc::new(MemorySourceStore::default()),
            log.clone(),
            Box::new(InMemoryCheckpointStore::new()),
            config,
            Arc::new(AtomicBool::new(false)),
        );
        (svc, listings, log)
    }

    #[tokio::test]
    async fn successful_run_over_two_sources() {
        let a: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "a",
            vec![raw_record("https://a.mx/1", "$2,500,000")],
        ));
        let b: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "b",
            vec![raw_record("https://b.mx/1", "$3,000,000")],
        ));
        let (svc, listings, log) = service(vec![a, b], fast_config());

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.status, ExecutionStatus::Success);
        assert_eq!(summary.new_listings, 2);
        assert_eq!(summary.sources_processed, 2);
        assert!(summary.failed_sources.is_empty());
        assert_eq!(listings.rows.lock().unwrap().len(), 2);
        assert_eq!(log.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn shared_url_collapses_to_one_row() {
        // The same property listed on two portals under one URL.
        let a: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "a",
            vec![
                raw_record("https://Shared.mx/casa/9/", "$2,500,000"),
                raw_record("https://a.mx/1", "$1,800,000"),
            ],
        ));
        let b: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "b",
            vec![raw_record("https://shared.mx/casa/9", "$2,500,000")],
        ));
        let (svc, listings, _log) = service(vec![a, b], fast_config());

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.new_listings, 2);
        assert_eq!(summary.updated_listings, 1);
        assert_eq!(listings.rows.lock().unwrap().len(), 2);
        // The duplicate sighting changed nothing tracked.
        assert!(listings.field_history.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_source_is_isolated() {
        let good: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "good",
            vec![raw_record("https://g.mx/1", "$2,500,000")],
        ));
        let bad: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::failing("bad"));
        let (svc, _listings, log) = service(vec![bad, good], fast_config());

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.status, ExecutionStatus::Partial);
        assert_eq!(summary.new_listings, 1);
        assert!(summary.failed_sources.contains_key("bad"));
        assert_eq!(
            log.records.lock().unwrap()[0].status,
            ExecutionStatus::Partial
        );
    }

    #[tokio::test]
    async fn strict_mode_aborts_on_first_failure() {
        let bad: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::failing("bad"));
        let good: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "good",
            vec![raw_record("https://g.mx/1", "$2,500,000")],
        ));
        let mut config = fast_config();
        config.resume = false;
        let (svc, listings, log) = service(vec![bad, good], config);

        let err = svc.run().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ingest(IngestError::StrictAbort(ref code)) if code == "bad"
        ));
        // The second source was never reached.
        assert!(listings.rows.lock().unwrap().is_empty());
        assert_eq!(
            log.records.lock().unwrap()[0].status,
            ExecutionStatus::Failed
        );
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let mut flaky = ScriptedAdapter::new("flaky", vec![raw_record("https://f.mx/1", "$2,500,000")]);
        flaky.failures_before_success = 1;
        let flaky: Arc<dyn SourceAdapter> = Arc::new(flaky);
        let (svc, _listings, _log) = service(vec![flaky.clone()], fast_config());

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.status, ExecutionStatus::Success);
        assert_eq!(summary.new_listings, 1);
    }

    #[tokio::test]
    async fn resume_skips_completed_and_retries_failed() {
        let a = Arc::new(ScriptedAdapter::new(
            "a",
            vec![raw_record("https://a.mx/1", "$2,500,000")],
        ));
        let b = Arc::new(ScriptedAdapter::new(
            "b",
            vec![raw_record("https://b.mx/1", "$3,000,000")],
        ));

        let checkpoints = InMemoryCheckpointStore::new();
        let mut prior = ExecutionCheckpoint::new("prior-run".to_string());
        prior.mark_completed("a");
        prior.mark_failed("b", "timeout".to_string());
        checkpoints.save(&prior).unwrap();

        let listings = Arc::new(MemoryListingStore::default());
        let svc = IngestService::new(
            vec![a.clone() as Arc<dyn SourceAdapter>, b.clone() as Arc<dyn SourceAdapter>],
            listings.clone(),
            Arc::new(MemorySourceStore::default()),
            Arc::new(MemoryExecutionLog::default()),
            Box::new(checkpoints),
            fast_config(),
            Arc::new(AtomicBool::new(false)),
        );

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.status, ExecutionStatus::Success);
        assert_eq!(summary.execution_id, "prior-run");
        // A was never re-scraped; B was.
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert!(summary.failed_sources.is_empty());
    }

    #[tokio::test]
    async fn no_available_adapters_is_fatal() {
        let mut offline = ScriptedAdapter::new("offline", Vec::new());
        offline.available = false;
        let offline: Arc<dyn SourceAdapter> = Arc::new(offline);
        let (svc, _listings, log) = service(vec![offline], fast_config());

        let err = svc.run().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ingest(IngestError::NoAdaptersAvailable)
        ));
        assert_eq!(
            log.records.lock().unwrap()[0].status,
            ExecutionStatus::Failed
        );
    }

    #[tokio::test]
    async fn price_rejected_records_are_skipped() {
        let a: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "a",
            vec![
                raw_record("https://a.mx/cheap", "$50,000"),
                raw_record("https://a.mx/ok", "$2,500,000"),
            ],
        ));
        let (svc, listings, _log) = service(vec![a], fast_config());

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.new_listings, 1);
        assert_eq!(summary.by_source["a"].skipped_price, 1);
        assert_eq!(listings.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_between_sources() {
        let a: Arc<dyn SourceAdapter> = Arc::new(ScriptedAdapter::new(
            "a",
            vec![raw_record("https://a.mx/1", "$2,500,000")],
        ));
        let listings = Arc::new(MemoryListingStore::default());
        let log = Arc::new(MemoryExecutionLog::default());
        let cancelled = Arc::new(AtomicBool::new(true));
        let svc = IngestService::new(
            vec![a],
            listings,
            Arc::new(MemorySourceStore::default()),
            log.clone(),
            Box::new(InMemoryCheckpointStore::new()),
            fast_config(),
            cancelled,
        );

        let summary = svc.run().await.unwrap();
        assert_eq!(summary.status, ExecutionStatus::Partial);
        assert_eq!(summary.sources_processed, 0);
    }
}
