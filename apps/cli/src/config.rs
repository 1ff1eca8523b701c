//! Environment-driven configuration for the CLI.

use std::path::PathBuf;
use std::time::Duration;

use valoranl_core::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_BASE_SECS, DEFAULT_SCRAPE_TIMEOUT_SECS,
};

/// One staging database per portal, scraped by the out-of-scope collaborator
/// processes into the staging directory.
pub struct PortalEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub db_file: &'static str,
}

pub const PORTALS: &[PortalEntry] = &[
    PortalEntry {
        code: "casas365",
        name: "Casas 365",
        base_url: "https://casas365.mx",
        db_file: "casas365_propiedades.db",
    },
    PortalEntry {
        code: "gpvivienda",
        name: "GP Vivienda",
        base_url: "https://gpvivienda.com",
        db_file: "gpvivienda_nuevoleon.db",
    },
    PortalEntry {
        code: "realtyworld",
        name: "Realty World",
        base_url: "https://www.realtyworld.com.mx",
        db_file: "realtyworld_propiedades.db",
    },
];

pub struct Config {
    pub database_path: String,
    pub checkpoint_file: PathBuf,
    pub staging_dir: PathBuf,
    pub max_retries: u32,
    pub retry_delay_base_secs: u64,
    pub scrape_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var("DATABASE_PATH")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "valoranl.db".to_string());
        let checkpoint_file = std::env::var("CHECKPOINT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("valoranl_checkpoint.json"));
        let staging_dir = std::env::var("VALORA_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let max_retries = std::env::var("VALORA_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let retry_delay_base_secs = std::env::var("VALORA_RETRY_DELAY_BASE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_DELAY_BASE_SECS);
        let scrape_timeout = std::env::var("VALORA_SCRAPE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS));

        Self {
            database_path,
            checkpoint_file,
            staging_dir,
            max_retries,
            retry_delay_base_secs,
            scrape_timeout,
        }
    }
}
