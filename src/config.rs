use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL of the external search API
    pub search_api_url: String,
    /// Optional bearer token for the external search API
    pub search_api_token: Option<String>,
    /// Page size requested from the external search API
    pub search_page_size: u32,
    /// Search result cache TTL in seconds (default: 900 = 15 minutes)
    pub cache_ttl_secs: u64,
    /// Maximum request quota granted by the external API per window
    pub rate_limit_quota: u32,
    /// Minimum spacing between outbound API requests in milliseconds
    pub min_request_interval_ms: u64,
    /// Outbound HTTP timeout in seconds
    pub http_timeout_secs: u64,
    /// Overall per-request deadline for search operations in seconds
    pub request_timeout_secs: u64,
    /// Account names always excluded from search results (comma-separated)
    pub excluded_users: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let search_api_url =
            env::var("SEARCH_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());

        let search_api_token = env::var("SEARCH_API_TOKEN").ok().filter(|t| !t.is_empty());

        let search_page_size = env::var("SEARCH_PAGE_SIZE")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SEARCH_PAGE_SIZE"))?;

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CACHE_TTL_SECS"))?;

        let rate_limit_quota = env::var("RATE_LIMIT_QUOTA")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_QUOTA"))?;

        let min_request_interval_ms = env::var("MIN_REQUEST_INTERVAL_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MIN_REQUEST_INTERVAL_MS"))?;

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS"))?;

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS"))?;

        let excluded_users = env::var("EXCLUDED_USERS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host,
            port,
            search_api_url,
            search_api_token,
            search_page_size,
            cache_ttl_secs,
            rate_limit_quota,
            min_request_interval_ms,
            http_timeout_secs,
            request_timeout_secs,
            excluded_users,
        })
    }

    /// Overall deadline applied around a single search operation
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
