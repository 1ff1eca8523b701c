//! Canonical listing domain: models, normalization, identity and diffing.

pub mod changes;
pub mod fingerprint;
pub mod model;
pub mod normalizer;
pub mod store;

pub use changes::{detect_changes, has_price_change, has_status_change};
pub use fingerprint::{build_fingerprint, normalize_url, sha256_hex};
pub use model::{
    CanonicalListing, ChangeCategory, FieldChange, GeoPrecision, ListingStatus, PriceHistoryEntry,
    PriceType, RawListing, StatusHistoryEntry,
};
pub use normalizer::{canonicalize, validate_price, PriceValidation};
pub use store::ListingStore;
