//! Listing domain models.
//!
//! `RawListing` is the best-effort handoff contract from source adapters:
//! every canonical field may be absent, and fields the portals disagree on
//! (prices, areas, counts) arrive as raw text. `CanonicalListing` is the
//! deduplicated representation persisted to the canonical store; all parsing
//! and validation happens at the normalizer boundary, never downstream.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commercial state of a canonical listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Inactive,
    Sold,
    Unknown,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Inactive => "inactive",
            ListingStatus::Sold => "sold",
            ListingStatus::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "active" => ListingStatus::Active,
            "inactive" => ListingStatus::Inactive,
            "sold" => ListingStatus::Sold,
            _ => ListingStatus::Unknown,
        }
    }
}

/// Whether the price is a sale or rent amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Sale,
    Rent,
    Unknown,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Sale => "sale",
            PriceType::Rent => "rent",
            PriceType::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "sale" => PriceType::Sale,
            "rent" => PriceType::Rent,
            _ => PriceType::Unknown,
        }
    }
}

/// How trustworthy the listing's coordinates are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoPrecision {
    Exact,
    Approx,
    Colony,
    Unknown,
}

impl GeoPrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoPrecision::Exact => "exact",
            GeoPrecision::Approx => "approx",
            GeoPrecision::Colony => "colony",
            GeoPrecision::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "exact" => GeoPrecision::Exact,
            "approx" => GeoPrecision::Approx,
            "colony" => GeoPrecision::Colony,
            _ => GeoPrecision::Unknown,
        }
    }
}

/// Audit category of a tracked-field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Content,
    Price,
    Status,
    Location,
    Metadata,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Content => "content",
            ChangeCategory::Price => "price",
            ChangeCategory::Status => "status",
            ChangeCategory::Location => "location",
            ChangeCategory::Metadata => "metadata",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "content" => ChangeCategory::Content,
            "price" => ChangeCategory::Price,
            "status" => ChangeCategory::Status,
            "location" => ChangeCategory::Location,
            _ => ChangeCategory::Metadata,
        }
    }
}

/// One detected difference between the stored listing and a new sighting.
///
/// Values are kept as JSON so numeric, string and array fields share one
/// append-only history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field_name: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub category: ChangeCategory,
}

/// Raw record emitted by a source adapter.
///
/// Everything is optional; adapters fill what their portal exposes and leave
/// the rest empty. Text fields that need parsing keep the portal's original
/// representation (`price_text`, `area_construction_text`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub source_listing_id: Option<String>,
    pub url: Option<String>,

    pub status_text: Option<String>,
    /// Portal's sale/rent hint ("venta", "renta", ...), when separate from the title.
    pub action_text: Option<String>,
    pub price_text: Option<String>,
    pub currency: Option<String>,
    pub maintenance_fee_text: Option<String>,

    pub property_type: Option<String>,
    pub area_construction_text: Option<String>,
    pub area_land_text: Option<String>,
    pub bedrooms_text: Option<String>,
    pub bathrooms_text: Option<String>,
    pub half_bathrooms_text: Option<String>,
    pub parking_text: Option<String>,
    pub floors_text: Option<String>,
    pub year_built: Option<i32>,

    pub title: Option<String>,
    pub description: Option<String>,

    pub street: Option<String>,
    pub colony: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,

    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub contact: Option<Value>,
    pub details: Option<Value>,
    pub raw: Option<Value>,

    pub source_first_seen_at: Option<NaiveDateTime>,
    pub source_last_seen_at: Option<NaiveDateTime>,
}

/// The single deduplicated representation of a property listing.
///
/// Exactly one row exists per `dedupe_hash`; rows are never hard-deleted,
/// they transition to `inactive` once unseen past the staleness threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalListing {
    pub id: String,
    pub source_listing_id: Option<String>,
    pub parse_version: String,

    pub url: Option<String>,
    pub url_normalized: Option<String>,
    pub url_hash: Option<String>,
    pub fingerprint_hash: String,
    pub dedupe_hash: String,

    pub status: ListingStatus,
    pub price_type: PriceType,
    pub price_amount: Option<f64>,
    pub currency: String,
    pub maintenance_fee: Option<f64>,

    pub property_type: Option<String>,
    pub area_construction_m2: Option<f64>,
    pub area_land_m2: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub half_bathrooms: Option<f64>,
    pub parking: Option<i32>,
    pub floors: Option<i32>,
    pub age_years: Option<i32>,

    pub title: Option<String>,
    pub description: Option<String>,

    pub street: Option<String>,
    pub colony: Option<String>,
    pub municipality: Option<String>,
    pub state: String,
    pub country: String,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub geo_precision: GeoPrecision,

    pub images: Vec<String>,
    pub contact: Option<Value>,
    pub amenities: Vec<String>,
    pub details: Option<Value>,
    pub raw_snapshot: Option<Value>,

    pub source_first_seen_at: Option<NaiveDateTime>,
    pub source_last_seen_at: Option<NaiveDateTime>,
    pub seen_first_at: NaiveDateTime,
    pub seen_last_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Append-only price observation for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub listing_id: String,
    pub status: ListingStatus,
    pub price_amount: Option<f64>,
    pub currency: String,
    pub captured_at: NaiveDateTime,
}

/// Append-only status transition for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub listing_id: String,
    pub old_status: Option<ListingStatus>,
    pub new_status: ListingStatus,
    pub changed_at: NaiveDateTime,
}
