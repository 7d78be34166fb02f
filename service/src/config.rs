use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with BILLS_ prefix (always wins)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub swagger: SwaggerConfig,
    #[serde(default)]
    pub oireachtas: OireachtasConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests.
    /// Use `"*"` to allow any origin (not recommended for production).
    /// Accepts either an array or comma-separated string.
    /// Example: `["http://localhost:5173"]` or `"http://localhost:5173,https://bills.example.com"`
    #[serde(
        default = "default_allowed_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub allowed_origins: Vec<String>,
}

/// Deserialize origins from comma-separated string or array, filtering empty values.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let origins: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(origins.into_iter().filter(|s| !s.is_empty()).collect())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwaggerConfig {
    /// Enable Swagger UI at /swagger-ui.
    /// Default: false (disabled for security - exposes API documentation).
    /// Enable in development via `BILLS_SWAGGER__ENABLED=true`
    #[serde(default)]
    pub enabled: bool,
}

/// Upstream legislation API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OireachtasConfig {
    /// Base URL of the Oireachtas API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Query engine, cache, and feed tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Number of records fetched from offset 0 to back client-side search.
    /// The upstream API has no text search, so matches beyond this window
    /// are invisible and the reported match count is bounded by it.
    #[serde(default = "default_search_window")]
    pub search_window: u32,

    /// Retries after a failed fetch (transient failures only).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay for the exponential retry backoff, in milliseconds.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Upper bound on a single retry delay, in milliseconds.
    #[serde(default = "default_retry_cap_ms")]
    pub retry_cap_ms: u64,

    /// Maximum number of cached query results.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cached query results expire after this many seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Quiet period after the last search edit before a query is issued,
    /// in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Page size used when the caller does not specify one.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_allowed_origins() -> Vec<String> {
    // Default to empty (no cross-origin requests allowed) - safe for production
    // Configure explicitly via BILLS_CORS__ALLOWED_ORIGINS or config.yaml
    vec![]
}

fn default_base_url() -> String {
    "https://api.oireachtas.ie/v1".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    10
}

#[allow(clippy::missing_const_for_fn)]
fn default_search_window() -> u32 {
    200
}

#[allow(clippy::missing_const_for_fn)]
fn default_retries() -> u32 {
    2
}

#[allow(clippy::missing_const_for_fn)]
fn default_retry_base_ms() -> u64 {
    1_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_retry_cap_ms() -> u64 {
    30_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_capacity() -> usize {
    64
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_ttl_secs() -> u64 {
    600
}

#[allow(clippy::missing_const_for_fn)]
fn default_debounce_ms() -> u64 {
    600
}

#[allow(clippy::missing_const_for_fn)]
fn default_page_size() -> u32 {
    10
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for OireachtasConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_window: default_search_window(),
            retries: default_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_cap_ms: default_retry_cap_ms(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: default_port(),
                host: default_host(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
            cors: CorsConfig::default(),
            swagger: SwaggerConfig::default(),
            oireachtas: OireachtasConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with BILLS_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("BILLS_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Port must be non-zero
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        // Upstream base URL must be an http(s) origin
        if !self.oireachtas.base_url.starts_with("http://")
            && !self.oireachtas.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "oireachtas.base_url must start with http:// or https://, got: '{}'",
                self.oireachtas.base_url
            )));
        }

        if self.oireachtas.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "oireachtas.timeout_secs cannot be 0".into(),
            ));
        }

        // The search window bounds both request size and result completeness
        if self.query.search_window == 0 {
            return Err(ConfigError::Validation(
                "query.search_window cannot be 0".into(),
            ));
        }
        if self.query.search_window > 10_000 {
            return Err(ConfigError::Validation(format!(
                "query.search_window too large ({}); the upstream API caps bulk reads",
                self.query.search_window
            )));
        }

        if self.query.retries > 10 {
            return Err(ConfigError::Validation(format!(
                "query.retries too large ({}); keep the retry budget small",
                self.query.retries
            )));
        }

        if self.query.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "query.cache_capacity cannot be 0".into(),
            ));
        }

        if self.query.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "query.debounce_ms cannot be 0".into(),
            ));
        }

        if self.query.page_size == 0 {
            return Err(ConfigError::Validation(
                "query.page_size cannot be 0".into(),
            ));
        }

        // CORS origins must be valid URLs or "*"
        for origin in &self.cors.allowed_origins {
            if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "cors.allowed_origins contains invalid origin '{origin}'. Must be '*' or start with http:// or https://"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.oireachtas.base_url, "https://api.oireachtas.ie/v1");
        assert_eq!(config.oireachtas.timeout_secs, 10);
        assert_eq!(config.query.search_window, 200);
        assert_eq!(config.query.retries, 2);
        assert_eq!(config.query.retry_base_ms, 1_000);
        assert_eq!(config.query.retry_cap_ms, 30_000);
        assert_eq!(config.query.debounce_ms, 600);
        assert_eq!(config.query.page_size, 10);
        assert!(!config.swagger.enabled);
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = Config::default();
        config.oireachtas.base_url = "ftp://api.oireachtas.ie".into();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("oireachtas.base_url"));
    }

    #[test]
    fn test_cors_defaults_to_empty() {
        let config = CorsConfig::default();
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_cors_deserialize_comma_separated_string() {
        // Simulate what figment does with env var
        let json = r#"{"allowed_origins": "http://localhost:5173,https://bills.example.com"}"#;
        let config: CorsConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.allowed_origins[0], "http://localhost:5173");
        assert_eq!(config.allowed_origins[1], "https://bills.example.com");
    }

    #[test]
    fn test_cors_deserialize_array() {
        let json = r#"{"allowed_origins": ["http://localhost:5173", "https://bills.example.com"]}"#;
        let config: CorsConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_cors_deserialize_empty_string() {
        let json = r#"{"allowed_origins": ""}"#;
        let config: CorsConfig = serde_json::from_str(json).expect("should parse");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_swagger_disabled_by_default() {
        let config = SwaggerConfig::default();
        assert!(!config.enabled);
    }

    #[test]
    fn test_swagger_can_be_enabled() {
        let json = r#"{"enabled": true}"#;
        let config: SwaggerConfig = serde_json::from_str(json).expect("should parse");
        assert!(config.enabled);
    }

    #[test]
    fn test_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BILLS_SERVER__PORT", "9090");
            jail.set_env("BILLS_QUERY__SEARCH_WINDOW", "50");
            let config = Config::load().expect("load");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.query.search_window, 50);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
server:
  port: 3000
query:
  debounce_ms: 250
",
            )?;
            let config = Config::load().expect("load");
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.query.debounce_ms, 250);
            Ok(())
        });
    }

    // Table-driven boundary tests for validation rules

    #[test]
    fn port_boundaries() {
        let cases = [
            (0u16, false, "zero port"),
            (1, true, "minimum valid port"),
            (80, true, "common HTTP port"),
            (8080, true, "default port"),
            (65535, true, "maximum port"),
        ];

        for (port, should_pass, desc) in cases {
            let mut config = Config::default();
            config.server.port = port;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn search_window_boundaries() {
        let cases = [
            (0u32, false, "zero window"),
            (1, true, "minimum window"),
            (200, true, "default window"),
            (10_000, true, "maximum window"),
            (10_001, false, "over the cap"),
        ];

        for (window, should_pass, desc) in cases {
            let mut config = Config::default();
            config.query.search_window = window;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn retries_boundaries() {
        let cases = [
            (0u32, true, "retries disabled"),
            (2, true, "default retries"),
            (10, true, "maximum retries"),
            (11, false, "over the budget"),
        ];

        for (retries, should_pass, desc) in cases {
            let mut config = Config::default();
            config.query.retries = retries;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn cors_origin_boundaries() {
        let cases = [
            (vec!["*"], true, "wildcard"),
            (vec!["http://localhost"], true, "http localhost"),
            (vec!["https://example.com"], true, "https domain"),
            (vec!["http://localhost:3000"], true, "with port"),
            (vec![], true, "empty list"),
            (vec!["ftp://files.com"], false, "ftp scheme"),
            (vec!["localhost"], false, "no scheme"),
            (vec!["//example.com"], false, "protocol-relative"),
        ];

        for (origins, should_pass, desc) in cases {
            let mut config = Config::default();
            config.cors.allowed_origins = origins.into_iter().map(String::from).collect();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }
}
