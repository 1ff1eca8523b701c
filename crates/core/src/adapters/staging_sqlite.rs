//! Adapter for per-portal scraper staging databases.
//!
//! The portal scrapers dump their raw extractions into small SQLite files
//! (one per portal, conventionally a `propiedades` table). This adapter
//! reads such a file and maps its rows to `RawListing` best-effort: column
//! names differ per portal, so each field is resolved against a list of
//! known synonyms and anything unrecognized survives in the raw snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::info;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{json, Map, Value};

use super::source_adapter::SourceAdapter;
use crate::errors::{Error, Result};
use crate::ingest::checkpoint::ExecutionCheckpoint;
use crate::listings::normalizer::parse_datetime;
use crate::listings::RawListing;

type Row = BTreeMap<String, Value>;

pub struct StagingSqliteAdapter {
    code: String,
    name: String,
    base_url: Option<String>,
    db_path: PathBuf,
}

impl StagingSqliteAdapter {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        base_url: Option<String>,
        db_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            base_url,
            db_path: db_path.into(),
        }
    }

    /// Prefers the conventional `propiedades` table, otherwise the first
    /// user table in the file.
    fn discover_table(conn: &Connection) -> Result<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(|e| Error::Adapter(e.to_string()))?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Adapter(e.to_string()))?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Adapter(e.to_string()))?;

        if tables.is_empty() {
            return Err(Error::Adapter("staging database has no tables".to_string()));
        }
        if tables.iter().any(|t| t == "propiedades") {
            return Ok("propiedades".to_string());
        }
        Ok(tables[0].clone())
    }

    fn read_rows(&self) -> Result<Vec<Row>> {
        let conn =
            Connection::open(&self.db_path).map_err(|e| Error::Adapter(e.to_string()))?;
        let table = Self::discover_table(&conn)?;
        info!("source {}: staging table {}", self.code, table);

        let mut stmt = conn
            .prepare(&format!("SELECT * FROM \"{}\"", table))
            .map_err(|e| Error::Adapter(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = Vec::new();
        let mut query = stmt.query([]).map_err(|e| Error::Adapter(e.to_string()))?;
        while let Some(row) = query.next().map_err(|e| Error::Adapter(e.to_string()))? {
            let mut record = Row::new();
            for (idx, column) in columns.iter().enumerate() {
                let value = match row.get_ref(idx).map_err(|e| Error::Adapter(e.to_string()))? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(i) => json!(i),
                    ValueRef::Real(f) => json!(f),
                    ValueRef::Text(t) => json!(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(_) => Value::Null,
                };
                record.insert(column.clone(), value);
            }
            rows.push(record);
        }
        Ok(rows)
    }

    fn map_record(&self, row: &Row) -> RawListing {
        // Portals name their status and geographic-state columns
        // inconsistently; when both exist, `estado` is the listing status
        // and `estado_geo` the state.
        let (status_text, state) = if row.contains_key("estado_geo") {
            (text(row, &["estado"]), text(row, &["estado_geo"]))
        } else {
            (None, text(row, &["estado"]))
        };

        let contact = contact_blob(row);
        let first_seen = text(row, &["fecha_scraping"]).as_deref().and_then(parse_datetime);
        let last_seen = text(row, &["fecha_actualizacion"])
            .as_deref()
            .and_then(parse_datetime)
            .or(first_seen);

        RawListing {
            source_listing_id: text(row, &["property_id", "external_id"]),
            url: text(row, &["url"]),
            status_text,
            action_text: text(row, &["accion"]),
            price_text: text(row, &["precio", "precio_texto", "price"]),
            currency: text(row, &["moneda", "currency"]),
            maintenance_fee_text: text(row, &["mantenimiento", "cuota_mantenimiento"]),
            property_type: text(row, &["tipo", "tipo_propiedad"]),
            area_construction_text: text(row, &["construccion_m2", "m2_construidos"]),
            area_land_text: text(row, &["terreno_m2", "m2_terreno"]),
            bedrooms_text: text(row, &["recamaras", "habitaciones"]),
            bathrooms_text: text(row, &["banos"]),
            half_bathrooms_text: text(row, &["medios_banos"]),
            parking_text: text(row, &["estacionamientos"]),
            floors_text: text(row, &["plantas", "pisos"]),
            year_built: integer(row, &["ano_construccion"]),
            title: text(row, &["titulo", "title", "modelo"]),
            description: text(row, &["descripcion", "description"]),
            street: text(row, &["calle"]),
            colony: text(row, &["colonia", "fraccionamiento"]),
            municipality: text(row, &["ciudad", "municipio"]),
            state,
            country: None,
            postal_code: text(row, &["codigo_postal", "cp"]),
            lat: float(row, &["latitud", "lat"]),
            lng: float(row, &["longitud", "lng"]),
            images: split_list(text(row, &["imagenes", "imagen_url"])),
            amenities: split_list(text(row, &["amenidades"])),
            contact,
            details: None,
            raw: Some(Value::Object(
                row.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<String, Value>>(),
            )),
            source_first_seen_at: first_seen,
            source_last_seen_at: last_seen,
        }
    }
}

#[async_trait]
impl SourceAdapter for StagingSqliteAdapter {
    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn can_execute(&self) -> bool {
        Path::new(&self.db_path).exists()
    }

    async fn scrape(&self, _checkpoint: &ExecutionCheckpoint) -> Result<Vec<RawListing>> {
        let rows = self.read_rows()?;
        info!("source {}: {} staged rows", self.code, rows.len());
        Ok(rows.iter().map(|row| self.map_record(row)).collect())
    }
}

fn text(row: &Row, keys: &[&str]) -> Option<String> {
    for key in keys {
        match row.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

fn float(row: &Row, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match row.get(*key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse() {
                    return Some(v);
                }
            }
            _ => continue,
        }
    }
    None
}

fn integer(row: &Row, keys: &[&str]) -> Option<i32> {
    float(row, keys).map(|v| v.round() as i32)
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn contact_blob(row: &Row) -> Option<Value> {
    let fields = [
        ("agent_name", "agente_nombre"),
        ("agent_phone", "agente_telefono"),
        ("agent_whatsapp", "agente_whatsapp"),
        ("agent_email", "agente_email"),
    ];
    let mut blob = Map::new();
    for (out_key, column) in fields {
        if let Some(value) = text(row, &[column]) {
            blob.insert(out_key.to_string(), json!(value));
        }
    }
    if blob.is_empty() {
        None
    } else {
        Some(Value::Object(blob))
    }
}
