use std::time::Duration;

/// API client configuration
///
/// Built with chained setters, then checked with [`ClientConfig::validate`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub base_url: String,

    /// Bearer token issued by the identity provider
    pub bearer_token: Option<String>,

    /// Request timeout. `None` leaves the transport default in place
    pub request_timeout: Option<Duration>,

    /// Maximum number of completed pages kept in the query cache
    pub cache_capacity: usize,

    /// Age after which a cached page is fetched again. `None` keeps pages until evicted
    pub stale_after: Option<Duration>,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    const DEFAULT_CACHE_CAPACITY: usize = 64;

    /// Create a new configuration for the given API base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
            request_timeout: None,
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            stale_after: None,
            user_agent: format!("explorebd/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the bearer token
    pub fn bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set query cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set cache staleness
    pub fn stale_after(mut self, age: Duration) -> Self {
        self.stale_after = Some(age);
        self
    }

    /// Set the User-Agent
    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    /// Load from `EXPLOREBD_*` environment variables
    ///
    /// - `EXPLOREBD_API_URL` (default `http://localhost:5000`)
    /// - `EXPLOREBD_TOKEN`
    /// - `EXPLOREBD_CACHE_CAPACITY`
    /// - `EXPLOREBD_STALE_SECS`
    /// - `EXPLOREBD_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let base_url = lookup("EXPLOREBD_API_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url);

        if let Some(token) = lookup("EXPLOREBD_TOKEN").filter(|t| !t.trim().is_empty()) {
            config = config.bearer_token(token.trim());
        }

        if let Some(raw) = lookup("EXPLOREBD_CACHE_CAPACITY") {
            let capacity = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("EXPLOREBD_CACHE_CAPACITY must be a number, got '{}'", raw))?;
            config = config.cache_capacity(capacity);
        }

        if let Some(raw) = lookup("EXPLOREBD_STALE_SECS") {
            config = config.stale_after(parse_secs("EXPLOREBD_STALE_SECS", &raw)?);
        }

        if let Some(raw) = lookup("EXPLOREBD_TIMEOUT_SECS") {
            config = config.request_timeout(parse_secs("EXPLOREBD_TIMEOUT_SECS", &raw)?);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url cannot be empty".to_string());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base_url must start with http:// or https://, got '{}'", self.base_url));
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }

        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err("request_timeout must be > 0".to_string());
            }
        }

        Ok(())
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, String> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| format!("{} must be a whole number of seconds, got '{}'", key, raw))
}
