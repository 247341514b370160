//! # wp-client
//!
//! Resilient HTTP client used by the content migration pipeline.
//!
//! This crate provides a small HTTP client with:
//! - Per-attempt timeouts
//! - Retry with exponential backoff on configured statuses and transport errors
//! - Basic or API-key authentication
//! - JSON, text and multipart request bodies
//! - Content-type aware response decoding
//! - Chunked, order-preserving batch execution
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Extraction pipeline                      │
//! │        (fetch from CMS, transform, write output files)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ResilientClient                          │
//! │  - get / post / put / patch / delete / upload               │
//! │  - batch with bounded concurrency                           │
//! │  - health_check                                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │           RetryPolicy + reqwest::Client                     │
//! │  - one attempt at a time under a timeout                    │
//! │  - backoff between eligible failures                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use wp_migrate_client::{ClientConfig, Credentials, ResilientClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wp_migrate_client::Error> {
//!     let config = ClientConfig::builder()
//!         .with_base_url("https://polything.co.uk/wp-json/wp/v2")
//!         .with_credentials(Credentials::basic("editor", "app-password"))
//!         .build();
//!     let client = ResilientClient::new(config)?;
//!
//!     let posts: Vec<serde_json::Value> = client.get_json("/posts?per_page=10").await?;
//!     println!("fetched {} posts", posts.len());
//!     Ok(())
//! }
//! ```

mod batch;
mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;

pub use batch::{BatchFailure, BatchOutcome, BatchSuccess};
pub use client::{HealthStatus, ResilientClient};
pub use config::{ClientConfig, ClientConfigBuilder, Credentials};
pub use error::{Error, ErrorKind, Result};
pub use request::{FilePayload, MultipartPayload, RequestBody, RequestDescriptor, RequestMethod};
pub use response::{Response, ResponseBody};
pub use retry::{RetryConfig, RetryPolicy};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("wp-migrate/", env!("CARGO_PKG_VERSION"));

/// Header used for API-key authentication unless configured otherwise.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
