use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub booking: BookingRules,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Hub terminal assumed when the client omits `origen`.
    #[serde(default = "default_origin")]
    pub default_origin: String,
    #[serde(default = "default_availability_days")]
    pub availability_days: u32,
}

fn default_origin() -> String {
    "SCL".to_string()
}

fn default_availability_days() -> u32 {
    7
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Floor a coupon may not push the purchase total below.
    #[serde(default = "default_min_total")]
    pub min_total_after_discount: i64,
}

fn default_min_total() -> i64 {
    10000
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub dpa_base: String,
    pub airports_csv: String,
    pub countries_base: String,
    pub geocoding_base: String,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_cache_ttl() -> u64 {
    86400
}

fn default_http_timeout() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("AIRLINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
