//! Client configuration.

use std::time::Duration;

use crate::retry::RetryConfig;

/// Authentication attached to every request.
///
/// A closed enum: a client is configured with Basic auth or an API key, never both.
/// Secrets are redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP Basic auth (WordPress application passwords).
    Basic { username: String, password: String },
    /// API key sent in the configured API-key header.
    ApiKey(String),
}

impl Credentials {
    /// Basic auth credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// API-key credentials.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[REDACTED]").finish(),
        }
    }
}

/// Configuration for the resilient client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL relative endpoints are joined to.
    pub base_url: String,
    /// Timeout for a single attempt.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Whether to emit tracing events for attempts and retry decisions.
    pub enable_logging: bool,
    /// User-Agent header value.
    pub user_agent: String,
    /// Header name used for API-key authentication.
    pub api_key_header: String,
    /// Optional credentials.
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            enable_logging: true,
            user_agent: crate::USER_AGENT.to_string(),
            api_key_header: crate::DEFAULT_API_KEY_HEADER.to_string(),
            credentials: None,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Disable retries: one attempt per request.
    pub fn without_retry(mut self) -> Self {
        self.config.retry = RetryConfig::no_retry();
        self
    }

    /// Enable or disable per-attempt logging.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the header name used for API-key authentication.
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.config.api_key_header = header.into();
        self
    }

    /// Set the credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Set or clear the credentials.
    pub fn with_optional_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
