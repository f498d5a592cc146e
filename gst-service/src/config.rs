//! `GstConfig` (§6.6): layered config-file + env override, the way the
//! teacher's own services load settings via the `config` crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserProviderConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_retries() -> i32 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    pub primary: ParserProviderConfig,
    pub secondary: Option<ParserProviderConfig>,
    pub tertiary: Option<ParserProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_expiry")]
    pub access_expiry_secs: u64,
    #[serde(default = "default_refresh_expiry")]
    pub refresh_expiry_secs: u64,
    pub issuer: String,
}

fn default_access_expiry() -> u64 {
    900
}

fn default_refresh_expiry() -> u64 {
    1_209_600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTierConfig {
    pub tenant_slug: String,
    pub monthly_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseQueueConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_concurrency() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GstConfig {
    pub db: DbConfig,
    pub s3: S3Config,
    pub parser: ParserConfig,
    pub jwt: JwtConfig,
    pub free_tier: Option<FreeTierConfig>,
    pub parse_queue: ParseQueueConfig,
}

impl GstConfig {
    /// Layered load: `config/default.toml`, then `config/<env>.toml`, then
    /// `GST_`-prefixed environment variables, matching the config-file +
    /// env-override approach visible in the teacher's own services.
    pub fn load(env: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("GST").separator("__"));
        builder.build()?.try_deserialize()
    }
}
