//! Field normalization for raw portal records.
//!
//! Portals disagree about everything: price formats, area suffixes,
//! municipality spellings, half-bathroom glyphs. All of that is resolved
//! here, once, so the rest of the engine only ever sees canonical values.
//! Every function is pure; a value that cannot be parsed becomes `None`,
//! never an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::warn;
use regex::Regex;
use uuid::Uuid;

use super::fingerprint::{build_fingerprint, normalize_url, sha256_hex};
use super::model::{CanonicalListing, GeoPrecision, ListingStatus, PriceType, RawListing};
use crate::constants::{DEFAULT_COUNTRY, DEFAULT_CURRENCY, DEFAULT_STATE, PARSE_VERSION};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid regex"));

static BUILT_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:construi(?:da|do)\s+en|año\s+(?:de\s+)?construcci[oó]n[:\s]*|built\s+in)\s*(\d{4})")
        .expect("valid regex")
});

static AGE_YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3})\s*años?\s+de\s+antig[uü]edad").expect("valid regex")
});

static COLONY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),?\s*(?:nuevo\s+león|n\.?\s*l\.?)\s*$").expect("valid regex")
});

/// Known spelling variants for Nuevo León municipalities.
static MUNICIPALITY_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("sta. catarina", "Santa Catarina"),
        ("sta catarina", "Santa Catarina"),
        ("santa catarina, n.l.", "Santa Catarina"),
        ("mty", "Monterrey"),
        ("mty.", "Monterrey"),
        ("monterrey, n.l.", "Monterrey"),
        ("san pedro", "San Pedro Garza García"),
        ("san pedro garza garcia", "San Pedro Garza García"),
        ("san pedro garza garcía, n.l.", "San Pedro Garza García"),
        ("spgg", "San Pedro Garza García"),
        ("gral. escobedo", "General Escobedo"),
        ("gral escobedo", "General Escobedo"),
        ("general escobedo", "General Escobedo"),
        ("guadalupe, n.l.", "Guadalupe"),
        ("garcia", "García"),
        ("juarez", "Juárez"),
        ("cadereyta jimenez", "Cadereyta Jiménez"),
        ("cienega de flores", "Ciénega de Flores"),
        ("santiago, n.l.", "Santiago"),
    ])
});

static COLONY_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("valle ote.", "Valle Oriente"),
        ("valle ote", "Valle Oriente"),
        ("san jeronimo", "San Jerónimo"),
        ("col. del valle", "Del Valle"),
        ("cumbres 2do sector", "Cumbres 2° Sector"),
    ])
});

static PROPERTY_TYPE_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("casa", "casa"),
        ("casas", "casa"),
        ("house", "casa"),
        ("residencia", "casa"),
        ("departamento", "departamento"),
        ("departamentos", "departamento"),
        ("depto", "departamento"),
        ("depto.", "departamento"),
        ("apartment", "departamento"),
        ("terreno", "terreno"),
        ("terrenos", "terreno"),
        ("lote", "terreno"),
        ("land", "terreno"),
        ("local", "local"),
        ("local comercial", "local"),
        ("oficina", "oficina"),
        ("bodega", "bodega"),
        ("rancho", "rancho"),
    ])
});

// Sanity bounds for sale prices in Nuevo León, in MXN.
const MIN_SALE_PRICE: f64 = 100_000.0;
const MAX_SALE_PRICE: f64 = 100_000_000.0;
const MIN_PRICE_PER_M2: f64 = 3_000.0;
const MAX_PRICE_PER_M2: f64 = 80_000.0;

/// Outcome of the price sanity check.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceValidation {
    Accepted,
    /// The record must be skipped; the reason is logged, never raised.
    Rejected(String),
}

/// Trims a raw text value, mapping empty/whitespace-only input to `None`.
pub fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn clean_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(clean_text)
}

fn first_number(text: &str) -> Option<f64> {
    NUMBER_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Parses a portal price text into an amount.
///
/// Handles "$ 2,500,000 MXN", "MXN2,890,000", "USD 5,000", the millions
/// shorthand "2.5 MDP", and placeholder texts ("Precio a consultar",
/// "price on request") which map to `None`.
pub fn parse_money(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_uppercase();
    if upper.contains("CONSULT") || upper.contains("PRICE ON REQUEST") || upper.contains("A TRATAR")
    {
        return None;
    }
    if upper.contains("MDP") || upper.contains("MILLON") {
        let cleaned = upper.replace(',', "");
        return first_number(&cleaned).map(|v| v * 1_000_000.0);
    }
    let cleaned = upper.replace('$', "").replace(',', "");
    first_number(&cleaned)
}

/// Guesses the currency from a price text. USD markers win; anything else
/// that carries a price at all is assumed MXN.
pub fn detect_currency(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_uppercase();
    if upper.contains("USD") || upper.contains("DÓLAR") || upper.contains("DOLAR") {
        Some("USD".to_string())
    } else {
        Some(DEFAULT_CURRENCY.to_string())
    }
}

/// Parses an area text ("120 m²", "250m2", "300 mts") into square meters.
pub fn parse_area(text: &str) -> Option<f64> {
    let cleaned = text
        .to_lowercase()
        .replace("m²", "")
        .replace("m2", "")
        .replace("mts", "")
        .replace('$', "")
        .replace(',', "");
    first_number(&cleaned)
}

/// Parses an integer-like count (bedrooms, parking, floors), rounding
/// fractional portal values.
pub fn parse_count(text: &str) -> Option<i32> {
    parse_area(text).map(|v| v.round() as i32)
}

/// Parses a bathroom count, treating the half-unit glyph as `.5`
/// ("2½" → 2.5).
pub fn parse_bathroom_count(text: &str) -> Option<f64> {
    let cleaned = text.replace('½', ".5");
    first_number(&cleaned)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonicalizes a municipality name via the alias table, falling back to
/// title-casing. The fallback is intentionally lossy: unrecognized variants
/// stay distinct rather than failing.
pub fn normalize_municipality(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let lookup = text.to_lowercase();
    if let Some(canonical) = MUNICIPALITY_ALIASES.get(lookup.as_str()) {
        return Some((*canonical).to_string());
    }
    Some(title_case(&text))
}

/// Canonicalizes a colony name: strips the noisy ", Nuevo León"/"N.L."
/// suffixes portals append, then alias lookup with a title-case fallback.
pub fn normalize_colony(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let stripped = COLONY_SUFFIX_RE.replace(&text, "");
    let text = stripped.trim().trim_matches(',').trim();
    if text.is_empty() {
        return None;
    }
    let lookup = text.to_lowercase();
    if let Some(canonical) = COLONY_ALIASES.get(lookup.as_str()) {
        return Some((*canonical).to_string());
    }
    Some(title_case(text))
}

/// Maps free-text property types onto the closed canonical set. Unknown
/// values pass through lower-cased instead of failing.
pub fn normalize_property_type(raw: &str) -> Option<String> {
    let text = clean_text(raw)?;
    let key = text.to_lowercase();
    Some(
        PROPERTY_TYPE_MAP
            .get(key.as_str())
            .map(|t| (*t).to_string())
            .unwrap_or(key),
    )
}

/// Derives the commercial status from the portal's status text.
pub fn normalize_status(raw: Option<&str>) -> ListingStatus {
    let text = raw.unwrap_or("").trim().to_lowercase();
    if ["vend", "sold"].iter().any(|w| text.contains(w)) {
        return ListingStatus::Sold;
    }
    if ["inactiv", "baja", "no disponible"]
        .iter()
        .any(|w| text.contains(w))
    {
        return ListingStatus::Inactive;
    }
    ListingStatus::Active
}

/// Derives sale-vs-rent from whatever texts hint at it (action label,
/// title).
pub fn normalize_price_type(texts: &[Option<&str>]) -> PriceType {
    let joined = texts
        .iter()
        .map(|t| t.unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if joined.contains("renta") || joined.contains("rent") {
        return PriceType::Rent;
    }
    if joined.contains("venta") || joined.contains("sale") {
        return PriceType::Sale;
    }
    PriceType::Unknown
}

/// Infers the property age in years.
///
/// An explicit build year in (1900, current_year] wins; otherwise the two
/// fixed phrasings ("construida en 2018", "15 años de antigüedad") are
/// matched against the given texts. No match means `None`.
pub fn infer_age_years(
    year_built: Option<i32>,
    texts: &[Option<&str>],
    current_year: i32,
) -> Option<i32> {
    if let Some(year) = year_built {
        if year > 1900 && year <= current_year {
            return Some(current_year - year);
        }
    }

    for text in texts.iter().flatten() {
        if let Some(captures) = BUILT_YEAR_RE.captures(text) {
            if let Ok(year) = captures[1].parse::<i32>() {
                if year > 1900 && year <= current_year {
                    return Some(current_year - year);
                }
            }
        }
        if let Some(captures) = AGE_YEARS_RE.captures(text) {
            if let Ok(years) = captures[1].parse::<i32>() {
                if (0..=120).contains(&years) {
                    return Some(years);
                }
            }
        }
    }

    None
}

/// Caps a text field to its column width, counting a warning on truncation.
/// Some portals stuff full descriptions into address fields.
pub fn truncate_text(
    value: Option<String>,
    max_len: usize,
    field: &str,
    warnings: &mut u32,
) -> Option<String> {
    let value = value?;
    if value.chars().count() <= max_len {
        return Some(value);
    }
    *warnings += 1;
    warn!(
        "truncating field {} (len={} > {})",
        field,
        value.chars().count(),
        max_len
    );
    Some(value.chars().take(max_len).collect())
}

/// Parses the handful of date formats the portals emit.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Sanity-checks a sale price against absolute and per-m² bounds.
///
/// Rejected records are skipped entirely by the caller with the returned
/// reason; scraping noise must not reach the canonical store. Rent and
/// unknown price types pass, as do records without a price.
pub fn validate_price(
    price: Option<f64>,
    area_construction_m2: Option<f64>,
    price_type: PriceType,
) -> PriceValidation {
    let price = match price {
        Some(p) => p,
        None => return PriceValidation::Accepted,
    };
    if price_type != PriceType::Sale {
        return PriceValidation::Accepted;
    }

    if price < MIN_SALE_PRICE {
        return PriceValidation::Rejected(format!(
            "sale price {:.0} below minimum {:.0}",
            price, MIN_SALE_PRICE
        ));
    }
    if price > MAX_SALE_PRICE {
        return PriceValidation::Rejected(format!(
            "sale price {:.0} above maximum {:.0}",
            price, MAX_SALE_PRICE
        ));
    }

    if let Some(area) = area_construction_m2 {
        if area > 0.0 {
            let per_m2 = price / area;
            if per_m2 < MIN_PRICE_PER_M2 {
                return PriceValidation::Rejected(format!(
                    "price per m² {:.0} below minimum {:.0}",
                    per_m2, MIN_PRICE_PER_M2
                ));
            }
            if per_m2 > MAX_PRICE_PER_M2 {
                return PriceValidation::Rejected(format!(
                    "price per m² {:.0} above maximum {:.0}",
                    per_m2, MAX_PRICE_PER_M2
                ));
            }
        }
    }

    PriceValidation::Accepted
}

/// Assembles a canonical listing from a raw portal record.
///
/// Applies every field normalizer, computes the identity hashes and stamps
/// the unification clock. `warnings` accumulates truncation counts into the
/// per-source metrics.
pub fn canonicalize(raw: &RawListing, now: NaiveDateTime, warnings: &mut u32) -> CanonicalListing {
    let url = clean_opt(&raw.url);
    let url_normalized = url.as_deref().and_then(normalize_url);
    let url_hash = url_normalized.as_deref().map(sha256_hex);

    let price_amount = raw.price_text.as_deref().and_then(parse_money);
    let currency = clean_opt(&raw.currency)
        .map(|c| c.chars().take(3).collect::<String>().to_uppercase())
        .or_else(|| raw.price_text.as_deref().and_then(detect_currency))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let municipality = raw.municipality.as_deref().and_then(normalize_municipality);
    let colony = raw.colony.as_deref().and_then(normalize_colony);
    let title = clean_opt(&raw.title);
    let description = clean_opt(&raw.description);

    let area_construction_m2 = raw.area_construction_text.as_deref().and_then(parse_area);
    let area_land_m2 = raw.area_land_text.as_deref().and_then(parse_area);
    let bedrooms = raw.bedrooms_text.as_deref().and_then(parse_count);

    let fingerprint_hash = build_fingerprint(
        municipality.as_deref(),
        colony.as_deref(),
        area_construction_m2,
        price_amount,
        bedrooms,
    );
    let dedupe_hash = url_hash
        .clone()
        .unwrap_or_else(|| fingerprint_hash.clone());

    let age_years = infer_age_years(
        raw.year_built,
        &[description.as_deref(), title.as_deref()],
        now.year(),
    );

    let geo_precision = if raw.lat.is_some() && raw.lng.is_some() {
        GeoPrecision::Exact
    } else {
        GeoPrecision::Unknown
    };

    let images: Vec<String> = raw
        .images
        .iter()
        .filter_map(|i| clean_text(i))
        .collect();
    let amenities: Vec<String> = raw
        .amenities
        .iter()
        .filter_map(|a| clean_text(a))
        .collect();

    CanonicalListing {
        id: Uuid::new_v4().to_string(),
        source_listing_id: clean_opt(&raw.source_listing_id),
        parse_version: PARSE_VERSION.to_string(),
        url,
        url_normalized,
        url_hash,
        fingerprint_hash,
        dedupe_hash,
        status: normalize_status(raw.status_text.as_deref()),
        price_type: normalize_price_type(&[raw.action_text.as_deref(), raw.title.as_deref()]),
        price_amount,
        currency,
        maintenance_fee: raw.maintenance_fee_text.as_deref().and_then(parse_money),
        property_type: raw.property_type.as_deref().and_then(normalize_property_type),
        area_construction_m2,
        area_land_m2,
        bedrooms,
        bathrooms: raw.bathrooms_text.as_deref().and_then(parse_bathroom_count),
        half_bathrooms: raw
            .half_bathrooms_text
            .as_deref()
            .and_then(parse_bathroom_count),
        parking: raw.parking_text.as_deref().and_then(parse_count),
        floors: raw.floors_text.as_deref().and_then(parse_count),
        age_years,
        title: truncate_text(title, 500, "title", warnings),
        description,
        street: truncate_text(clean_opt(&raw.street), 255, "street", warnings),
        colony: truncate_text(colony, 180, "colony", warnings),
        municipality: truncate_text(municipality, 180, "municipality", warnings),
        state: truncate_text(clean_opt(&raw.state), 120, "state", warnings)
            .unwrap_or_else(|| DEFAULT_STATE.to_string()),
        country: clean_opt(&raw.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        postal_code: clean_opt(&raw.postal_code),
        lat: raw.lat,
        lng: raw.lng,
        geo_precision,
        images,
        contact: raw.contact.clone(),
        amenities,
        details: raw.details.clone(),
        raw_snapshot: raw.raw.clone(),
        source_first_seen_at: raw.source_first_seen_at,
        source_last_seen_at: raw.source_last_seen_at.or(raw.source_first_seen_at),
        seen_first_at: now,
        seen_last_at: now,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_formatted_prices() {
        assert_eq!(parse_money("$ 2,500,000 MXN"), Some(2_500_000.0));
        assert_eq!(parse_money("MXN2,890,000"), Some(2_890_000.0));
        assert_eq!(parse_money("USD 5,000"), Some(5_000.0));
        assert_eq!(parse_money("1850000"), Some(1_850_000.0));
    }

    #[test]
    fn parses_millions_shorthand() {
        assert_eq!(parse_money("2.5 MDP"), Some(2_500_000.0));
        assert_eq!(parse_money("3 millones"), Some(3_000_000.0));
    }

    #[test]
    fn placeholder_prices_are_none() {
        assert_eq!(parse_money("Precio a consultar"), None);
        assert_eq!(parse_money("price on request"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("sin datos"), None);
    }

    #[test]
    fn detects_currency_from_price_text() {
        assert_eq!(detect_currency("USD 5,000"), Some("USD".to_string()));
        assert_eq!(detect_currency("$2,500,000"), Some("MXN".to_string()));
        assert_eq!(detect_currency("  "), None);
    }

    #[test]
    fn parses_areas_with_unit_suffixes() {
        assert_eq!(parse_area("120 m²"), Some(120.0));
        assert_eq!(parse_area("250m2"), Some(250.0));
        assert_eq!(parse_area("300.5 mts"), Some(300.5));
        assert_eq!(parse_area("sin dato"), None);
    }

    #[test]
    fn parses_bathrooms_with_half_glyph() {
        assert_eq!(parse_bathroom_count("2½"), Some(2.5));
        assert_eq!(parse_bathroom_count("3"), Some(3.0));
        assert_eq!(parse_bathroom_count("baños"), None);
    }

    #[test]
    fn municipality_aliases_resolve() {
        assert_eq!(
            normalize_municipality("SPGG"),
            Some("San Pedro Garza García".to_string())
        );
        assert_eq!(normalize_municipality("mty."), Some("Monterrey".to_string()));
        // Unrecognized input falls back to title casing.
        assert_eq!(
            normalize_municipality("villa de santiago"),
            Some("Villa De Santiago".to_string())
        );
        assert_eq!(normalize_municipality("  "), None);
    }

    #[test]
    fn colony_suffix_noise_is_stripped() {
        assert_eq!(
            normalize_colony("Cumbres Elite, Nuevo León"),
            Some("Cumbres Elite".to_string())
        );
        assert_eq!(normalize_colony("Contry N.L."), Some("Contry".to_string()));
        assert_eq!(normalize_colony(", N.L."), None);
    }

    #[test]
    fn property_types_map_to_closed_set() {
        assert_eq!(normalize_property_type("Casas"), Some("casa".to_string()));
        assert_eq!(
            normalize_property_type("Depto."),
            Some("departamento".to_string())
        );
        // Unknown values pass through lower-cased.
        assert_eq!(
            normalize_property_type("Penthouse"),
            Some("penthouse".to_string())
        );
    }

    #[test]
    fn status_and_price_type_normalization() {
        assert_eq!(normalize_status(Some("VENDIDA")), ListingStatus::Sold);
        assert_eq!(normalize_status(Some("dado de baja")), ListingStatus::Inactive);
        assert_eq!(normalize_status(Some("disponible")), ListingStatus::Active);
        assert_eq!(normalize_status(None), ListingStatus::Active);

        assert_eq!(
            normalize_price_type(&[Some("Casa en Renta"), None]),
            PriceType::Rent
        );
        assert_eq!(
            normalize_price_type(&[None, Some("Venta de terreno")]),
            PriceType::Sale
        );
        assert_eq!(normalize_price_type(&[None, None]), PriceType::Unknown);
    }

    #[test]
    fn infers_age_from_explicit_year() {
        assert_eq!(infer_age_years(Some(2018), &[], 2025), Some(7));
        // Out-of-range years are ignored.
        assert_eq!(infer_age_years(Some(1850), &[], 2025), None);
        assert_eq!(infer_age_years(Some(2030), &[], 2025), None);
    }

    #[test]
    fn infers_age_from_free_text() {
        assert_eq!(
            infer_age_years(None, &[Some("Hermosa casa construida en 2015")], 2025),
            Some(10)
        );
        assert_eq!(
            infer_age_years(None, &[Some("built in 2020, excellent condition")], 2025),
            Some(5)
        );
        assert_eq!(
            infer_age_years(None, &[Some("15 años de antigüedad")], 2025),
            Some(15)
        );
        assert_eq!(infer_age_years(None, &[Some("casa nueva")], 2025), None);
    }

    #[test]
    fn sale_price_bounds() {
        assert_eq!(
            validate_price(Some(50_000.0), None, PriceType::Sale),
            PriceValidation::Rejected("sale price 50000 below minimum 100000".to_string())
        );
        assert_eq!(
            validate_price(Some(2_500_000.0), Some(200.0), PriceType::Sale),
            PriceValidation::Accepted
        );
    }

    #[test]
    fn price_density_bounds() {
        // 150_000 / 100 = 1_500 per m², below the floor.
        assert!(matches!(
            validate_price(Some(150_000.0), Some(100.0), PriceType::Sale),
            PriceValidation::Rejected(_)
        ));
        // 9M / 100 = 90_000 per m², above the ceiling.
        assert!(matches!(
            validate_price(Some(9_000_000.0), Some(100.0), PriceType::Sale),
            PriceValidation::Rejected(_)
        ));
    }

    #[test]
    fn rent_and_missing_prices_pass_validation() {
        assert_eq!(
            validate_price(Some(12_000.0), None, PriceType::Rent),
            PriceValidation::Accepted
        );
        assert_eq!(
            validate_price(None, Some(200.0), PriceType::Sale),
            PriceValidation::Accepted
        );
    }

    #[test]
    fn parses_portal_date_formats() {
        assert!(parse_datetime("2026-01-15 10:30:00").is_some());
        assert!(parse_datetime("2026-01-15").is_some());
        assert!(parse_datetime("15/01/2026").is_some());
        assert!(parse_datetime("15-01-2026").is_some());
        assert!(parse_datetime("enero 15").is_none());
    }

    #[test]
    fn truncation_counts_warnings() {
        let mut warnings = 0;
        let long = "x".repeat(300);
        let out = truncate_text(Some(long), 255, "street", &mut warnings);
        assert_eq!(out.unwrap().chars().count(), 255);
        assert_eq!(warnings, 1);

        let out = truncate_text(Some("short".to_string()), 255, "street", &mut warnings);
        assert_eq!(out.unwrap(), "short");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn canonicalize_prefers_url_identity() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let raw = RawListing {
            url: Some("https://Portal.mx/casa/123?utm=x".to_string()),
            price_text: Some("$2,500,000".to_string()),
            municipality: Some("mty".to_string()),
            bedrooms_text: Some("3".to_string()),
            ..Default::default()
        };
        let mut warnings = 0;
        let listing = canonicalize(&raw, now, &mut warnings);
        assert_eq!(
            listing.url_normalized.as_deref(),
            Some("https://portal.mx/casa/123")
        );
        assert_eq!(listing.dedupe_hash, listing.url_hash.clone().unwrap());
        assert_eq!(listing.municipality.as_deref(), Some("Monterrey"));
        assert_eq!(listing.price_amount, Some(2_500_000.0));
        assert_eq!(listing.currency, "MXN");
        assert_eq!(listing.state, "Nuevo León");
    }

    #[test]
    fn canonicalize_falls_back_to_fingerprint() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let raw = RawListing {
            municipality: Some("Monterrey".to_string()),
            colony: Some("Contry".to_string()),
            price_text: Some("1,500,000".to_string()),
            area_construction_text: Some("120 m2".to_string()),
            bedrooms_text: Some("3".to_string()),
            ..Default::default()
        };
        let mut warnings = 0;
        let listing = canonicalize(&raw, now, &mut warnings);
        assert!(listing.url_hash.is_none());
        assert_eq!(listing.dedupe_hash, listing.fingerprint_hash);
    }
}
