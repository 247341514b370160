//! Resilient HTTP client with per-attempt timeouts and retry.

use std::time::{Duration, Instant};

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument, warn};

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, ErrorKind, Result};
use crate::request::{FilePayload, RequestBody, RequestDescriptor};
use crate::response::Response;
use crate::retry::RetryPolicy;

/// HTTP client with per-attempt timeouts, retry with exponential backoff and
/// content-type aware decoding.
///
/// The client holds no per-call state. Clones share the connection pool and
/// independent calls may run concurrently.
///
/// ## Security
///
/// Credentials are redacted in Debug output and never appear in tracing spans.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

/// Result of [`ResilientClient::health_check`].
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the endpoint answered with a 2xx status.
    pub healthy: bool,
    /// Last HTTP status seen, if any.
    pub status: Option<u16>,
    /// `"OK"` on success, the failure message otherwise.
    pub detail: String,
    /// Wall-clock time spent, retries included.
    pub elapsed: Duration,
}

impl ResilientClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an endpoint against the base URL.
    ///
    /// Absolute `http://`/`https://` endpoints pass through unchanged. Relative
    /// endpoints are joined with exactly one `/`.
    pub fn url(&self, endpoint: &str) -> Result<String> {
        let full = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if self.config.base_url.is_empty() {
            return Err(Error::new(ErrorKind::InvalidUrl(format!(
                "relative endpoint '{endpoint}' with no base URL configured"
            ))));
        } else if endpoint.is_empty() {
            self.config.base_url.clone()
        } else {
            format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            )
        };

        url::Url::parse(&full)?;
        Ok(full)
    }

    // =========================================================================
    // Verb methods
    // =========================================================================

    /// GET request.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.send(&RequestDescriptor::get(endpoint)).await
    }

    /// POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response> {
        self.send(&RequestDescriptor::post(endpoint).json(body)?).await
    }

    /// PUT request with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response> {
        self.send(&RequestDescriptor::put(endpoint).json(body)?).await
    }

    /// PATCH request with a JSON body.
    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response> {
        self.send(&RequestDescriptor::patch(endpoint).json(body)?).await
    }

    /// DELETE request.
    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.send(&RequestDescriptor::delete(endpoint)).await
    }

    /// GET request with JSON response deserialization.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.get(endpoint).await?.json()
    }

    /// Multipart upload of one file plus additional form fields.
    pub async fn upload(
        &self,
        endpoint: &str,
        file: FilePayload,
        fields: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Response> {
        self.send(&RequestDescriptor::post(endpoint).multipart(file, fields))
            .await
    }

    /// GET the given path and report health instead of failing.
    #[instrument(skip(self))]
    pub async fn health_check(&self, path: &str) -> HealthStatus {
        let started = Instant::now();
        match self.get(path).await {
            Ok(response) => HealthStatus {
                healthy: true,
                status: Some(response.status()),
                detail: "OK".to_string(),
                elapsed: started.elapsed(),
            },
            Err(err) => HealthStatus {
                healthy: false,
                status: err.status(),
                detail: err.to_string(),
                elapsed: started.elapsed(),
            },
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute one logical request, retrying eligible failures.
    ///
    /// Attempts are strictly sequential. Returns on the first 2xx response.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn send(&self, request: &RequestDescriptor) -> Result<Response> {
        let url = self.url(&request.endpoint)?;
        let mut policy = RetryPolicy::new(self.config.retry.clone());

        loop {
            let attempt = policy.attempt();
            if self.config.enable_logging {
                debug!(attempt, method = %request.method, url = %url, "Sending request");
            }

            let err = match self.execute_once(request, &url).await {
                Ok(response) => {
                    if self.config.enable_logging {
                        debug!(attempt, status = response.status(), "Request succeeded");
                    }
                    return Ok(response);
                }
                Err(err) => err,
            };

            match policy.next_delay(&err.kind) {
                Some(delay) => {
                    if self.config.enable_logging {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Request failed, retrying"
                        );
                    }
                    tokio::time::sleep(delay).await;
                }
                None => {
                    let eligible = self.config.retry.is_eligible(&err.kind);
                    let final_err = if eligible {
                        exhausted(err, attempt)
                    } else {
                        err
                    };
                    if self.config.enable_logging {
                        error!(attempt, error = %final_err, "Request failed");
                    }
                    return Err(final_err);
                }
            }
        }
    }

    /// Run a single attempt under the configured timeout.
    async fn execute_once(&self, request: &RequestDescriptor, url: &str) -> Result<Response> {
        let timeout = self.config.timeout;

        // Dropping the future on expiry aborts the in-flight request.
        match tokio::time::timeout(timeout, self.dispatch(request, url)).await {
            Ok(result) => result,
            Err(_) => Err(Error::new(ErrorKind::Timeout {
                timeout,
                attempts: 1,
            })),
        }
    }

    /// Send the request and read the whole response.
    async fn dispatch(&self, request: &RequestDescriptor, url: &str) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), url)
            .headers(self.build_headers(request)?);

        req = match &request.body {
            Some(RequestBody::Json(value)) => req.json(value),
            Some(RequestBody::Text(text)) => req.body(text.clone()),
            Some(RequestBody::Multipart(payload)) => req.multipart(payload.to_form()?),
            None => req,
        };

        let response = req.send().await?;
        if response.status().is_success() {
            Response::from_reqwest(response).await
        } else {
            Err(Response::into_http_error(response).await)
        }
    }

    /// Default headers, then credentials, then caller overrides.
    fn build_headers(&self, request: &RequestDescriptor) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if !matches!(request.body, Some(RequestBody::Multipart(_))) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));

        match &self.config.credentials {
            Some(Credentials::Basic { username, password }) => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                let mut value = header_value(&format!("Basic {encoded}"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Some(Credentials::ApiKey(key)) => {
                let mut value = header_value(key)?;
                value.set_sensitive(true);
                headers.insert(header_name(&self.config.api_key_header)?, value);
            }
            None => {}
        }

        for (name, value) in &request.headers {
            headers.insert(header_name(name)?, header_value(value)?);
        }

        Ok(headers)
    }
}

/// Wrap the last eligible failure once every attempt is used up.
///
/// A final timeout stays a timeout so callers can tell the two apart.
fn exhausted(last: Error, attempts: u32) -> Error {
    if let ErrorKind::Timeout { timeout, .. } = last.kind {
        return Error {
            kind: ErrorKind::Timeout { timeout, attempts },
            source: last.source,
        };
    }

    let kind = ErrorKind::RetriesExhausted {
        attempts,
        status: last.status(),
        last_error: match last.body() {
            Some(body) if !body.is_empty() => format!("{last} ({})", body.error_detail()),
            _ => last.to_string(),
        },
        body: last.body().cloned(),
    };
    Error::with_source(kind, last)
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::with_source(ErrorKind::Config(format!("invalid header name '{name}'")), e))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::with_source(ErrorKind::Config("invalid header value".to_string()), e))
}
