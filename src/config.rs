use crate::error::SyncError;
use std::env;
use std::time::Duration;

pub const INSIDER_API_BASE_URL: &str = "https://api.trendlinelabs.ai";
pub const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const ESPN_API_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";
pub const RANKINGS_BASE_URL: &str = "http://localhost:3003";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Pause between per-game prop requests to stay under the odds feed rate limit
pub const PROP_REQUEST_DELAY: Duration = Duration::from_millis(100);
/// Pause between per-game box score ingests
pub const BOX_SCORE_DELAY: Duration = Duration::from_millis(500);

/// Credentials for the ClickHouse HTTP interface
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub host: String,
    pub key_id: String,
    pub key_secret: String,
}

/// Runtime configuration, read from the environment (and `.env` if present).
///
/// Credentials are optional here; each client checks for the one it needs
/// when it is built, so the widget routes work without warehouse access and
/// the sync routes work without the stats provider key.
#[derive(Debug, Clone)]
pub struct Config {
    pub insider_api_key: Option<String>,
    pub insider_base_url: String,
    pub odds_api_key: Option<String>,
    pub odds_base_url: String,
    pub espn_base_url: String,
    pub rankings_base_url: String,
    pub warehouse: Option<WarehouseConfig>,
    pub http_timeout: Duration,
    pub bind_address: String,
    pub prop_request_delay: Duration,
    pub box_score_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            insider_api_key: None,
            insider_base_url: INSIDER_API_BASE_URL.to_string(),
            odds_api_key: None,
            odds_base_url: ODDS_API_BASE_URL.to_string(),
            espn_base_url: ESPN_API_BASE_URL.to_string(),
            rankings_base_url: RANKINGS_BASE_URL.to_string(),
            warehouse: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            prop_request_delay: PROP_REQUEST_DELAY,
            box_score_delay: BOX_SCORE_DELAY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let warehouse = match (
            get("CLICKHOUSE_HOST"),
            get("CLICKHOUSE_KEY_ID"),
            get("CLICKHOUSE_KEY_SECRET"),
        ) {
            (Some(host), Some(key_id), Some(key_secret)) => Some(WarehouseConfig {
                host,
                key_id,
                key_secret,
            }),
            _ => None,
        };

        let http_timeout = get("HTTP_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            insider_api_key: get("INSIDER_API_KEY"),
            insider_base_url: get("INSIDER_API_BASE_URL").unwrap_or(defaults.insider_base_url),
            odds_api_key: get("ODDS_API_KEY"),
            odds_base_url: get("ODDS_API_BASE_URL").unwrap_or(defaults.odds_base_url),
            espn_base_url: get("ESPN_API_BASE_URL").unwrap_or(defaults.espn_base_url),
            rankings_base_url: get("RANKINGS_BASE_URL").unwrap_or(defaults.rankings_base_url),
            warehouse,
            http_timeout,
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            prop_request_delay: defaults.prop_request_delay,
            box_score_delay: defaults.box_score_delay,
        }
    }

    pub fn require_insider_key(&self) -> Result<&str, SyncError> {
        self.insider_api_key
            .as_deref()
            .ok_or(SyncError::MissingConfig("INSIDER_API_KEY"))
    }

    pub fn require_odds_key(&self) -> Result<&str, SyncError> {
        self.odds_api_key
            .as_deref()
            .ok_or(SyncError::MissingConfig("ODDS_API_KEY"))
    }

    pub fn require_warehouse(&self) -> Result<&WarehouseConfig, SyncError> {
        self.warehouse
            .as_ref()
            .ok_or(SyncError::MissingConfig("CLICKHOUSE_HOST/CLICKHOUSE_KEY_ID/CLICKHOUSE_KEY_SECRET"))
    }

    /// Shared reqwest client with the configured timeout
    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}
