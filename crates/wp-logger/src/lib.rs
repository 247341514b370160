//! # wp-logger
//!
//! Categorized error recording for long-running, partially failing
//! migrations.
//!
//! Entries go to two places:
//! - `tracing` events with target `wp_migrate_logger` (console mirror)
//! - one append-only file per level (`debug.log`, `info.log`, `warn.log`,
//!   `error.log`) with size-based rotation
//!
//! Failures are counted per category (content, media, field mapping, API)
//! and rendered as a Markdown summary once the run is over.
//!
//! ## Example
//!
//! ```rust,ignore
//! use serde_json::Map;
//! use wp_migrate_logger::{ErrorLogger, LogLevel, LoggerConfig};
//!
//! let mut logger = ErrorLogger::new(LoggerConfig::default().with_level(LogLevel::Debug));
//! logger.initialize().await;
//!
//! logger.log_content_error(5307, "missing title", Map::new()).await;
//! logger.log_media_error("https://polything.co.uk/hero.mp4", "404 Not Found", Map::new()).await;
//!
//! assert_eq!(logger.get_error_stats().total, 2);
//! logger.save_error_summary(wp_migrate_logger::DEFAULT_SUMMARY_PATH).await?;
//! ```

mod level;
mod logger;
mod record;
mod rotation;
mod summary;

pub use level::{LogLevel, ParseLevelError};
pub use logger::{format_line, ErrorLogger, LoggerConfig, CONSOLE_TARGET};
pub use record::{ErrorCategory, ErrorRecord, ErrorStats};
pub use rotation::rotate_if_needed;
pub use summary::{render_summary, DEFAULT_SUMMARY_PATH};
