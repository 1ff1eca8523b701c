/// Parse version stamped on every canonical listing row.
pub const PARSE_VERSION: &str = "unify_v2";

/// Default currency when a portal does not state one.
pub const DEFAULT_CURRENCY: &str = "MXN";

/// Default geographic defaults for listings that omit them.
pub const DEFAULT_STATE: &str = "Nuevo León";
pub const DEFAULT_COUNTRY: &str = "México";

/// Retry defaults for per-source scrape attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_BASE_SECS: u64 = 2;

/// Days without a sighting before an active listing is deactivated.
pub const DEFAULT_STALE_DAYS: u32 = 30;

/// Per-source scrape timeout.
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 30;
