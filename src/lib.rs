//! # wp-migrate
//!
//! Resilience layer for a one-time WordPress content migration.
//!
//! The extraction pipeline (fetch from the CMS, transform, write files) builds
//! on three independent pieces:
//!
//! - **wp-migrate-client** - HTTP client with per-attempt timeouts, retry with
//!   exponential backoff, Basic/API-key auth and batching
//! - **wp-migrate-config** - JSON configuration with `WP_<SITE>_<FIELD>`
//!   environment overrides, validation and masking
//! - **wp-migrate-logger** - categorized error logging to per-level files with
//!   rotation and a Markdown summary
//!
//! This crate re-exports all three and wires them together.
//!
//! ## Security
//!
//! - Credentials are redacted in Debug output of every configuration type
//! - Error bodies are sanitized before they reach error messages
//! - [`config::mask_sensitive_data`] makes a configuration safe to print
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wp_migrate::{client_config_for_site, record_request_failure};
//! use wp_migrate::{ConfigManager, ErrorLogger, LoggerConfig, ResilientClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ConfigManager::default();
//!     let export = manager.get_export_config("polything.co.uk")?;
//!
//!     let client = ResilientClient::new(client_config_for_site(
//!         &export.site,
//!         Some(&export.export),
//!     )?)?;
//!     let mut logger = ErrorLogger::new(LoggerConfig::default());
//!     logger.initialize().await;
//!
//!     match client.get("/posts?per_page=10").await {
//!         Ok(response) => println!("{:?}", response.body()),
//!         Err(e) => record_request_failure(&mut logger, "/posts", &e).await,
//!     }
//!     Ok(())
//! }
//! ```

mod compose;

// Re-export all crates for convenient access
pub use wp_migrate_client as client;
pub use wp_migrate_config as config;
pub use wp_migrate_logger as logger;

// Re-export commonly used types at the top level
pub use wp_migrate_client::{ClientConfig, Credentials, ResilientClient, RetryConfig};
pub use wp_migrate_config::{ConfigDocument, ConfigManager, EnvSnapshot, SiteConfig};
pub use wp_migrate_logger::{ErrorLogger, ErrorStats, LogLevel, LoggerConfig};

pub use compose::{client_config_for_site, logger_config_from, record_request_failure};
