//! Tracked-field diffing between a stored listing and a new sighting.
//!
//! The tracked set is fixed; every differing field emits exactly one
//! `FieldChange` tagged with its audit category. Both sides are normalized
//! before comparison (floats rounded to 2 decimals, blank strings treated
//! as absent) so re-scrapes of unchanged listings produce zero changes.

use serde_json::{json, Value};

use super::model::{CanonicalListing, ChangeCategory, FieldChange};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn cmp_float(value: Option<f64>) -> Option<Value> {
    value.map(|v| json!(round2(v)))
}

fn cmp_text(value: Option<&str>) -> Option<Value> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| json!(v))
}

fn cmp_int(value: Option<i32>) -> Option<Value> {
    value.map(|v| json!(v))
}

fn raw_float(value: Option<f64>) -> Option<Value> {
    value.map(|v| json!(v))
}

fn raw_text(value: Option<&str>) -> Option<Value> {
    value.map(|v| json!(v))
}

/// Diffs the fixed tracked-field set between the stored listing and the
/// incoming sighting.
pub fn detect_changes(existing: &CanonicalListing, incoming: &CanonicalListing) -> Vec<FieldChange> {
    // (field, category, old compare, new compare, old raw, new raw)
    let fields: Vec<(
        &str,
        ChangeCategory,
        Option<Value>,
        Option<Value>,
        Option<Value>,
        Option<Value>,
    )> = vec![
        (
            "price_amount",
            ChangeCategory::Price,
            cmp_float(existing.price_amount),
            cmp_float(incoming.price_amount),
            raw_float(existing.price_amount),
            raw_float(incoming.price_amount),
        ),
        (
            "status",
            ChangeCategory::Status,
            Some(json!(existing.status.as_str())),
            Some(json!(incoming.status.as_str())),
            Some(json!(existing.status.as_str())),
            Some(json!(incoming.status.as_str())),
        ),
        (
            "title",
            ChangeCategory::Content,
            cmp_text(existing.title.as_deref()),
            cmp_text(incoming.title.as_deref()),
            raw_text(existing.title.as_deref()),
            raw_text(incoming.title.as_deref()),
        ),
        (
            "description",
            ChangeCategory::Content,
            cmp_text(existing.description.as_deref()),
            cmp_text(incoming.description.as_deref()),
            raw_text(existing.description.as_deref()),
            raw_text(incoming.description.as_deref()),
        ),
        (
            "bedrooms",
            ChangeCategory::Content,
            cmp_int(existing.bedrooms),
            cmp_int(incoming.bedrooms),
            cmp_int(existing.bedrooms),
            cmp_int(incoming.bedrooms),
        ),
        (
            "bathrooms",
            ChangeCategory::Content,
            cmp_float(existing.bathrooms),
            cmp_float(incoming.bathrooms),
            raw_float(existing.bathrooms),
            raw_float(incoming.bathrooms),
        ),
        (
            "area_construction_m2",
            ChangeCategory::Content,
            cmp_float(existing.area_construction_m2),
            cmp_float(incoming.area_construction_m2),
            raw_float(existing.area_construction_m2),
            raw_float(incoming.area_construction_m2),
        ),
        (
            "colony",
            ChangeCategory::Location,
            cmp_text(existing.colony.as_deref()),
            cmp_text(incoming.colony.as_deref()),
            raw_text(existing.colony.as_deref()),
            raw_text(incoming.colony.as_deref()),
        ),
        (
            "municipality",
            ChangeCategory::Location,
            cmp_text(existing.municipality.as_deref()),
            cmp_text(incoming.municipality.as_deref()),
            raw_text(existing.municipality.as_deref()),
            raw_text(incoming.municipality.as_deref()),
        ),
        (
            "lat",
            ChangeCategory::Location,
            cmp_float(existing.lat),
            cmp_float(incoming.lat),
            raw_float(existing.lat),
            raw_float(incoming.lat),
        ),
        (
            "lng",
            ChangeCategory::Location,
            cmp_float(existing.lng),
            cmp_float(incoming.lng),
            raw_float(existing.lng),
            raw_float(incoming.lng),
        ),
        (
            "images",
            ChangeCategory::Metadata,
            Some(json!(existing.images)),
            Some(json!(incoming.images)),
            Some(json!(existing.images)),
            Some(json!(incoming.images)),
        ),
    ];

    fields
        .into_iter()
        .filter(|(_, _, old_cmp, new_cmp, _, _)| old_cmp != new_cmp)
        .map(|(name, category, _, _, old_raw, new_raw)| FieldChange {
            field_name: name.to_string(),
            old_value: old_raw,
            new_value: new_raw,
            category,
        })
        .collect()
}

/// Whether a change list contains a price difference (drives the price
/// history append).
pub fn has_price_change(changes: &[FieldChange]) -> bool {
    changes.iter().any(|c| c.field_name == "price_amount")
}

/// Whether a change list contains a status difference (drives the status
/// history append).
pub fn has_status_change(changes: &[FieldChange]) -> bool {
    changes.iter().any(|c| c.field_name == "status")
}
