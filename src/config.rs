use std::env;
use std::path::PathBuf;

use crate::rates::{DOLARAPI_BLUE_URL, FALLBACK_USD_ARS_RATE};
use crate::top_players::DEFAULT_TOP_N;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub silver_db: PathBuf,
    pub gold_db: PathBuf,
    pub bronze_dir: PathBuf,
    pub top_n: usize,
    pub rates: RateConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let top_n = env::var("TOP_N")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N)
            .clamp(1, 100);
        Self {
            silver_db: PathBuf::from(env_or("SILVER_DB_PATH", "silver.db")),
            gold_db: PathBuf::from(env_or("GOLD_DB_PATH", "gold.db")),
            bronze_dir: PathBuf::from(env_or("BRONZE_DIR", "bronze")),
            top_n,
            rates: RateConfig::from_env(),
            search: SearchConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateConfig {
    pub url: String,
    pub fallback: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            url: DOLARAPI_BLUE_URL.to_string(),
            fallback: FALLBACK_USD_ARS_RATE,
        }
    }
}

impl RateConfig {
    pub fn from_env() -> Self {
        let fallback = env::var("RATE_FALLBACK")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(FALLBACK_USD_ARS_RATE);
        Self {
            url: env_or("RATE_URL", DOLARAPI_BLUE_URL),
            fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub enabled: bool,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub collection: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 8108,
            api_key: "xyz123".to_string(),
            collection: "players".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            enabled: env_bool("SEARCH_ENABLED", d.enabled),
            protocol: env_or("TYPESENSE_PROTOCOL", &d.protocol).to_ascii_lowercase(),
            host: env_or("TYPESENSE_HOST", &d.host),
            port: env::var("TYPESENSE_PORT")
                .ok()
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(d.port),
            api_key: env_or("TYPESENSE_API_KEY", &d.api_key),
            collection: env_or("TYPESENSE_COLLECTION", &d.collection),
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Load `.env.local` then `.env`; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
