use chrono::NaiveDateTime;
use diesel::prelude::*;

use valoranl_core::sources::Source;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::sources)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SourceDB {
    pub id: String,
    pub code: String,
    pub name: String,
    pub base_url: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SourceDB> for Source {
    fn from(row: SourceDB) -> Self {
        Source {
            id: row.id,
            code: row.code,
            name: row.name,
            base_url: row.base_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
