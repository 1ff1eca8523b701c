//! Database models for listings and their history tables, with
//! conversions to and from the core domain types.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::Value;

use valoranl_core::listings::{
    CanonicalListing, ChangeCategory, FieldChange, GeoPrecision, ListingStatus,
    PriceHistoryEntry, PriceType, StatusHistoryEntry,
};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::listings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListingDB {
    pub id: String,
    pub source_id: String,
    pub source_listing_id: Option<String>,
    pub parse_version: String,
    pub url: Option<String>,
    pub url_normalized: Option<String>,
    pub url_hash: Option<String>,
    pub fingerprint_hash: String,
    pub dedupe_hash: String,
    pub status: String,
    pub price_type: String,
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
    pub geo_precision: String,
    pub images_json: Option<String>,
    pub contact_json: Option<String>,
    pub amenities_json: Option<String>,
    pub details_json: Option<String>,
    pub raw_json: Option<String>,
    pub source_first_seen_at: Option<NaiveDateTime>,
    pub source_last_seen_at: Option<NaiveDateTime>,
    pub seen_first_at: NaiveDateTime,
    pub seen_last_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn encode_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        serde_json::to_string(values).ok()
    }
}

fn decode_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default()
}

fn encode_blob(value: &Option<Value>) -> Option<String> {
    value.as_ref().and_then(|v| serde_json::to_string(v).ok())
}

fn decode_blob(value: &Option<String>) -> Option<Value> {
    value.as_deref().and_then(|v| serde_json::from_str(v).ok())
}

impl ListingDB {
    pub fn from_domain(source_id: &str, listing: &CanonicalListing) -> Self {
        Self {
            id: listing.id.clone(),
            source_id: source_id.to_string(),
            source_listing_id: listing.source_listing_id.clone(),
            parse_version: listing.parse_version.clone(),
            url: listing.url.clone(),
            url_normalized: listing.url_normalized.clone(),
            url_hash: listing.url_hash.clone(),
            fingerprint_hash: listing.fingerprint_hash.clone(),
            dedupe_hash: listing.dedupe_hash.clone(),
            status: listing.status.as_str().to_string(),
            price_type: listing.price_type.as_str().to_string(),
            price_amount: listing.price_amount,
            currency: listing.currency.clone(),
            maintenance_fee: listing.maintenance_fee,
            property_type: listing.property_type.clone(),
            area_construction_m2: listing.area_construction_m2,
            area_land_m2: listing.area_land_m2,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            half_bathrooms: listing.half_bathrooms,
            parking: listing.parking,
            floors: listing.floors,
            age_years: listing.age_years,
            title: listing.title.clone(),
            description: listing.description.clone(),
            street: listing.street.clone(),
            colony: listing.colony.clone(),
            municipality: listing.municipality.clone(),
            state: listing.state.clone(),
            country: listing.country.clone(),
            postal_code: listing.postal_code.clone(),
            lat: listing.lat,
            lng: listing.lng,
            geo_precision: listing.geo_precision.as_str().to_string(),
            images_json: encode_list(&listing.images),
            contact_json: encode_blob(&listing.contact),
            amenities_json: encode_list(&listing.amenities),
            details_json: encode_blob(&listing.details),
            raw_json: encode_blob(&listing.raw_snapshot),
            source_first_seen_at: listing.source_first_seen_at,
            source_last_seen_at: listing.source_last_seen_at,
            seen_first_at: listing.seen_first_at,
            seen_last_at: listing.seen_last_at,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }

    pub fn into_domain(self) -> CanonicalListing {
        CanonicalListing {
            id: self.id,
            source_listing_id: self.source_listing_id,
            parse_version: self.parse_version,
            url: self.url,
            url_normalized: self.url_normalized,
            url_hash: self.url_hash,
            fingerprint_hash: self.fingerprint_hash,
            dedupe_hash: self.dedupe_hash,
            status: ListingStatus::parse(&self.status),
            price_type: PriceType::parse(&self.price_type),
            price_amount: self.price_amount,
            currency: self.currency,
            maintenance_fee: self.maintenance_fee,
            property_type: self.property_type,
            area_construction_m2: self.area_construction_m2,
            area_land_m2: self.area_land_m2,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            half_bathrooms: self.half_bathrooms,
            parking: self.parking,
            floors: self.floors,
            age_years: self.age_years,
            title: self.title,
            description: self.description,
            street: self.street,
            colony: self.colony,
            municipality: self.municipality,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            lat: self.lat,
            lng: self.lng,
            geo_precision: GeoPrecision::parse(&self.geo_precision),
            images: decode_list(&self.images_json),
            contact: decode_blob(&self.contact_json),
            amenities: decode_list(&self.amenities_json),
            details: decode_blob(&self.details_json),
            raw_snapshot: decode_blob(&self.raw_json),
            source_first_seen_at: self.source_first_seen_at,
            source_last_seen_at: self.source_last_seen_at,
            seen_first_at: self.seen_first_at,
            seen_last_at: self.seen_last_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Changeset applied on a later sighting. `seen_first_at`, `created_at`,
/// `dedupe_hash` and `source_first_seen_at` are immutable after insert.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::listings)]
#[diesel(treat_none_as_null = true)]
pub struct ListingUpdateDB {
    pub source_id: String,
    pub source_listing_id: Option<String>,
    pub parse_version: String,
    pub url: Option<String>,
    pub url_normalized: Option<String>,
    pub url_hash: Option<String>,
    pub fingerprint_hash: String,
    pub status: String,
    pub price_type: String,
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
    pub geo_precision: String,
    pub images_json: Option<String>,
    pub contact_json: Option<String>,
    pub amenities_json: Option<String>,
    pub details_json: Option<String>,
    pub raw_json: Option<String>,
    pub source_last_seen_at: Option<NaiveDateTime>,
    pub seen_last_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ListingUpdateDB {
    pub fn from_domain(source_id: &str, listing: &CanonicalListing, now: NaiveDateTime) -> Self {
        Self {
            source_id: source_id.to_string(),
            source_listing_id: listing.source_listing_id.clone(),
            parse_version: listing.parse_version.clone(),
            url: listing.url.clone(),
            url_normalized: listing.url_normalized.clone(),
            url_hash: listing.url_hash.clone(),
            fingerprint_hash: listing.fingerprint_hash.clone(),
            status: listing.status.as_str().to_string(),
            price_type: listing.price_type.as_str().to_string(),
            price_amount: listing.price_amount,
            currency: listing.currency.clone(),
            maintenance_fee: listing.maintenance_fee,
            property_type: listing.property_type.clone(),
            area_construction_m2: listing.area_construction_m2,
            area_land_m2: listing.area_land_m2,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            half_bathrooms: listing.half_bathrooms,
            parking: listing.parking,
            floors: listing.floors,
            age_years: listing.age_years,
            title: listing.title.clone(),
            description: listing.description.clone(),
            street: listing.street.clone(),
            colony: listing.colony.clone(),
            municipality: listing.municipality.clone(),
            state: listing.state.clone(),
            country: listing.country.clone(),
            postal_code: listing.postal_code.clone(),
            lat: listing.lat,
            lng: listing.lng,
            geo_precision: listing.geo_precision.as_str().to_string(),
            images_json: encode_list(&listing.images),
            contact_json: encode_blob(&listing.contact),
            amenities_json: encode_list(&listing.amenities),
            details_json: encode_blob(&listing.details),
            raw_json: encode_blob(&listing.raw_snapshot),
            source_last_seen_at: listing.source_last_seen_at,
            seen_last_at: now,
            updated_at: now,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::listing_price_history)]
pub struct NewPriceHistoryDB {
    pub listing_id: String,
    pub status: String,
    pub price_amount: Option<f64>,
    pub currency: String,
    pub captured_at: NaiveDateTime,
}

#[derive(Queryable, Debug)]
pub struct PriceHistoryDB {
    pub id: i64,
    pub listing_id: String,
    pub status: String,
    pub price_amount: Option<f64>,
    pub currency: String,
    pub captured_at: NaiveDateTime,
}

impl From<PriceHistoryDB> for PriceHistoryEntry {
    fn from(row: PriceHistoryDB) -> Self {
        PriceHistoryEntry {
            listing_id: row.listing_id,
            status: ListingStatus::parse(&row.status),
            price_amount: row.price_amount,
            currency: row.currency,
            captured_at: row.captured_at,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::listing_status_history)]
pub struct NewStatusHistoryDB {
    pub listing_id: String,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_at: NaiveDateTime,
}

#[derive(Queryable, Debug)]
pub struct StatusHistoryDB {
    pub id: i64,
    pub listing_id: String,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_at: NaiveDateTime,
}

impl From<StatusHistoryDB> for StatusHistoryEntry {
    fn from(row: StatusHistoryDB) -> Self {
        StatusHistoryEntry {
            listing_id: row.listing_id,
            old_status: row.old_status.as_deref().map(ListingStatus::parse),
            new_status: ListingStatus::parse(&row.new_status),
            changed_at: row.changed_at,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::listing_field_history)]
pub struct NewFieldHistoryDB {
    pub listing_id: String,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub category: String,
    pub changed_at: NaiveDateTime,
}

impl NewFieldHistoryDB {
    pub fn from_change(listing_id: &str, change: &FieldChange, now: NaiveDateTime) -> Self {
        Self {
            listing_id: listing_id.to_string(),
            field_name: change.field_name.clone(),
            old_value: change
                .old_value
                .as_ref()
                .and_then(|v| serde_json::to_string(v).ok()),
            new_value: change
                .new_value
                .as_ref()
                .and_then(|v| serde_json::to_string(v).ok()),
            category: change.category.as_str().to_string(),
            changed_at: now,
        }
    }
}

#[derive(Queryable, Debug)]
pub struct FieldHistoryDB {
    pub id: i64,
    pub listing_id: String,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub category: String,
    pub changed_at: NaiveDateTime,
}

impl From<FieldHistoryDB> for FieldChange {
    fn from(row: FieldHistoryDB) -> Self {
        FieldChange {
            field_name: row.field_name,
            old_value: row.old_value.as_deref().and_then(|v| serde_json::from_str(v).ok()),
            new_value: row.new_value.as_deref().and_then(|v| serde_json::from_str(v).ok()),
            category: ChangeCategory::parse(&row.category),
        }
    }
}
