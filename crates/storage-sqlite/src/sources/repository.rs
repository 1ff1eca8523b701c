//! Diesel implementation of the portal source registry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::sources::dsl as sources_dsl;
use crate::sources::model::SourceDB;
use valoranl_core::sources::{Source, SourceStore};
use valoranl_core::Result;

pub struct SourceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SourceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SourceStore for SourceRepository {
    async fn upsert(&self, code: &str, name: &str, base_url: Option<&str>) -> Result<Source> {
        let code = code.to_string();
        let name = name.to_string();
        let base_url = base_url.map(str::to_string);

        let row = self
            .writer
            .exec(move |conn| {
                let now = Utc::now().naive_utc();
                let existing: Option<SourceDB> = sources_dsl::sources
                    .filter(sources_dsl::code.eq(&code))
                    .first::<SourceDB>(conn)
                    .optional()
                    .into_core()?;

                match existing {
                    Some(mut row) => {
                        row.name = name;
                        row.base_url = base_url;
                        row.updated_at = now;
                        diesel::update(sources_dsl::sources.filter(sources_dsl::id.eq(&row.id)))
                            .set((
                                sources_dsl::name.eq(&row.name),
                                sources_dsl::base_url.eq(&row.base_url),
                                sources_dsl::updated_at.eq(row.updated_at),
                            ))
                            .execute(conn)
                            .into_core()?;
                        Ok(row)
                    }
                    None => {
                        let row = SourceDB {
                            id: Uuid::new_v4().to_string(),
                            code,
                            name,
                            base_url,
                            is_active: true,
                            created_at: now,
                            updated_at: now,
                        };
                        diesel::insert_into(sources_dsl::sources)
                            .values(&row)
                            .execute(conn)
                            .into_core()?;
                        Ok(row)
                    }
                }
            })
            .await?;

        Ok(row.into())
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Source>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<SourceDB> = sources_dsl::sources
            .filter(sources_dsl::code.eq(code))
            .first::<SourceDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Source::from))
    }
}
