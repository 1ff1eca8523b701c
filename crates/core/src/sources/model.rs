use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row per upstream portal, upserted by code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub code: String,
    pub name: String,
    pub base_url: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
