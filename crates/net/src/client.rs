//! HTTP client with connection pooling

use obae_config::NetworkConfig;
use obae_errors::{Error, NetworkError};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            pool_idle_timeout: Duration::from_secs(config.pool_idle_timeout_secs),
            pool_max_idle_per_host: config.pool_max_idle_per_host,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Pooled HTTP client shared by every download strategy
///
/// There is no overall request timeout on the client. Each caller bounds
/// its attempt with its own deadline, so one slow source cannot eat into
/// another's budget.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Send a GET request and return once the response headers arrive
    ///
    /// The status is not inspected here.
    ///
    /// # Errors
    ///
    /// Returns a classified `NetworkError` for malformed URLs and transport
    /// failures.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let parsed =
            url::Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
        self.client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.classify(&e, url))
    }

    /// Map a reqwest failure onto the network taxonomy
    #[must_use]
    pub fn classify(&self, error: &reqwest::Error, url: &str) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
                timeout_ms: self.config.connect_timeout.as_millis(),
            }
            .into()
        } else if error.is_connect() {
            NetworkError::ConnectionFailed(format!("{url}: {error}")).into()
        } else {
            NetworkError::DownloadFailed(format!("{url}: {error}")).into()
        }
    }
}

/// Reject non-2xx responses with the status classification
///
/// A 429 carries the `Retry-After` delay when the server sent one in
/// seconds.
///
/// # Errors
///
/// Returns `NetworkError::from_status` for any non-success status.
pub fn ensure_success(response: Response, url: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut err = NetworkError::from_status(status.as_u16(), url);
    if let NetworkError::RateLimited { retry_after, .. } = &mut err {
        *retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
    }
    Err(err.into())
}
