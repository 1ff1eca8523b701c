//! Diesel implementation of the execution log.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::db::WriteHandle;
use crate::errors::IntoCore;
use crate::ingest::model::NewExecutionLogDB;
use crate::schema::execution_log::dsl as execution_log_dsl;
use valoranl_core::ingest::{ExecutionLogStore, RunSummary};
use valoranl_core::Result;

pub struct ExecutionLogRepository {
    writer: WriteHandle,
}

impl ExecutionLogRepository {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl ExecutionLogStore for ExecutionLogRepository {
    async fn record(&self, summary: &RunSummary) -> Result<()> {
        let row = NewExecutionLogDB::from_summary(summary, Utc::now().naive_utc());
        self.writer
            .exec(move |conn| {
                // A resumed run re-records under its original execution id.
                diesel::replace_into(execution_log_dsl::execution_log)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
