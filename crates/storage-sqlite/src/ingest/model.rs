use chrono::NaiveDateTime;
use diesel::prelude::*;

use valoranl_core::ingest::RunSummary;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::execution_log)]
pub struct NewExecutionLogDB {
    pub execution_id: String,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub status: String,
    pub sources_processed: i32,
    pub total_listings: i64,
    pub new_listings: i64,
    pub updated_listings: i64,
    pub deactivated: i64,
    pub failed_sources: Option<String>,
    pub metrics_json: Option<String>,
    pub created_at: NaiveDateTime,
}

impl NewExecutionLogDB {
    pub fn from_summary(summary: &RunSummary, now: NaiveDateTime) -> Self {
        let failed_sources = if summary.failed_sources.is_empty() {
            None
        } else {
            serde_json::to_string(&summary.failed_sources).ok()
        };
        Self {
            execution_id: summary.execution_id.clone(),
            started_at: summary.started_at.naive_utc(),
            completed_at: Some(summary.completed_at.naive_utc()),
            status: summary.status.as_str().to_string(),
            sources_processed: summary.sources_processed as i32,
            total_listings: summary.total_read as i64,
            new_listings: summary.new_listings as i64,
            updated_listings: summary.updated_listings as i64,
            deactivated: summary.deactivated as i64,
            failed_sources,
            metrics_json: serde_json::to_string(&summary.by_source).ok(),
            created_at: now,
        }
    }
}
