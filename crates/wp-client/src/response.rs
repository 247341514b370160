//! HTTP response decoding.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON (`application/json` or any `+json` content type).
    Json(serde_json::Value),
    /// Any other content type, as text.
    Text(String),
    /// No body (204/205 or zero-length).
    Empty,
}

impl ResponseBody {
    /// Decode a successful response body. JSON content that fails to parse is an error.
    pub(crate) fn decode(status: u16, content_type: Option<&str>, bytes: &[u8]) -> Result<Self> {
        if status == 204 || status == 205 || bytes.is_empty() {
            return Ok(ResponseBody::Empty);
        }

        if content_type.is_some_and(is_json_content_type) {
            let value = serde_json::from_slice(bytes)?;
            return Ok(ResponseBody::Json(value));
        }

        Ok(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Decode an error response body. Never fails: unparsable JSON falls back to text.
    pub(crate) fn decode_lossy(status: u16, content_type: Option<&str>, bytes: &[u8]) -> Self {
        Self::decode(status, content_type, bytes)
            .unwrap_or_else(|_| ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Returns true for an empty body.
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    /// The JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if the body was not JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short, sanitized description suitable for error messages and logs.
    ///
    /// For WordPress-style error objects (`{"code": ..., "message": ...}`) this
    /// is the `message` field.
    pub fn error_detail(&self) -> String {
        let raw = match self {
            ResponseBody::Json(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Empty => String::new(),
        };
        sanitize_error_message(&raw)
    }
}

/// Returns true for `application/json` and structured `+json` types.
fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: ResponseBody,
}

impl Response {
    /// Read and decode a successful reqwest response.
    pub(crate) async fn from_reqwest(resp: reqwest::Response) -> Result<Self> {
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let bytes = resp.bytes().await?;
        let body = ResponseBody::decode(
            status,
            headers.get("content-type").map(String::as_str),
            &bytes,
        )?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Read a non-success reqwest response into an HTTP failure.
    pub(crate) async fn into_http_error(resp: reqwest::Response) -> Error {
        let status = resp.status();
        let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match resp.bytes().await {
            Ok(bytes) => Error::new(ErrorKind::Http {
                status: status.as_u16(),
                reason,
                body: ResponseBody::decode_lossy(status.as_u16(), content_type.as_deref(), &bytes),
            }),
            // The status arrived but the body stream broke: a transport failure.
            Err(err) => err.into(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Total item count reported by the WordPress REST API.
    pub fn wp_total(&self) -> Option<u64> {
        self.header("x-wp-total")?.trim().parse().ok()
    }

    /// Total page count reported by the WordPress REST API.
    pub fn wp_total_pages(&self) -> Option<u64> {
        self.header("x-wp-totalpages")?.trim().parse().ok()
    }

    /// The decoded body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Take the decoded body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Deserialize the body into a typed value. An empty body deserializes from `null`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        match self.body {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(text) => Ok(serde_json::from_str(&text)?),
            ResponseBody::Empty => Ok(serde_json::from_value(serde_json::Value::Null)?),
        }
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

static AUTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(basic|bearer)\s+[A-Za-z0-9+/=._~-]{8,}").expect("static regex")
});

static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(password|api_?key|token)=[^&\s]+").expect("static regex")
});

/// Sanitize an error message to prevent exposing sensitive data.
///
/// This function:
/// - Redacts `Basic`/`Bearer` authorization values
/// - Redacts `password=`, `api_key=` and `token=` style parameters
/// - Truncates messages longer than 500 characters
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = AUTH_PATTERN
        .replace_all(message, "$1 [REDACTED]")
        .to_string();
    sanitized = PARAM_PATTERN
        .replace_all(&sanitized, "$1=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
