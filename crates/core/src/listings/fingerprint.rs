//! Listing identity: URL normalization, hashing and the fallback
//! fingerprint.
//!
//! The dedupe key is the SHA-256 of the normalized URL whenever the portal
//! provides a stable per-listing URL, otherwise a fingerprint over rounded
//! physical/price attributes. The fallback is a documented heuristic, not a
//! proven identity function: two distinct listings sharing identical rounded
//! tuple values collapse into one row.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

static MULTI_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("valid regex"));

/// Normalizes a listing URL into its canonical comparable form: lower-cased
/// scheme and host, duplicate slashes collapsed, trailing slash stripped,
/// query and fragment dropped. Unparseable input yields `None` and the
/// caller falls back to the fingerprint.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    let mut path = MULTI_SLASH_RE.replace_all(parsed.path(), "/").into_owned();
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if path == "/" {
        path.clear();
    }

    let mut normalized = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{}", port));
    }
    normalized.push_str(&path);
    Some(normalized)
}

/// Hex-encoded SHA-256 of a string.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the fallback identity fingerprint from rounded listing
/// attributes: municipality, colony, construction area (1 decimal), price
/// (whole units) and bedroom count, joined with `|` and hashed.
pub fn build_fingerprint(
    municipality: Option<&str>,
    colony: Option<&str>,
    area_construction_m2: Option<f64>,
    price_amount: Option<f64>,
    bedrooms: Option<i32>,
) -> String {
    let key = format!(
        "{}|{}|{:.1}|{:.0}|{}",
        municipality.unwrap_or("").trim().to_lowercase(),
        colony.unwrap_or("").trim().to_lowercase(),
        area_construction_m2.unwrap_or(0.0),
        price_amount.unwrap_or(0.0),
        bedrooms.unwrap_or(0),
    );
    sha256_hex(&key)
}
