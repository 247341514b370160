//! The error logger.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tracing::error;

use crate::level::LogLevel;
use crate::record::{ErrorCategory, ErrorRecord, ErrorStats};
use crate::rotation::rotate_if_needed;
use crate::summary::render_summary;

/// Target of console events, so subscribers can filter them.
pub const CONSOLE_TARGET: &str = "wp_migrate_logger";

/// Logger configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    /// Minimum level that is emitted.
    pub level: LogLevel,
    /// Mirror entries as `tracing` events.
    pub console: bool,
    /// Append entries to `<level>.log` under `log_dir`.
    pub file: bool,
    /// Rotation threshold in bytes.
    pub max_file_size: u64,
    /// Number of rotated files kept per level.
    pub max_files: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            level: LogLevel::Info,
            console: true,
            file: true,
            max_file_size: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

impl LoggerConfig {
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file = enabled;
        self
    }

    pub fn with_rotation(mut self, max_file_size: u64, max_files: u32) -> Self {
        self.max_file_size = max_file_size;
        self.max_files = max_files;
        self
    }
}

/// Format one log file line: `[timestamp] LEVEL: message {context}`.
///
/// The context is left out when empty.
pub fn format_line(
    at: DateTime<Utc>,
    level: LogLevel,
    message: &str,
    context: &Map<String, Value>,
) -> String {
    let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    if context.is_empty() {
        format!("[{timestamp}] {}: {message}\n", level.label())
    } else {
        let context = Value::Object(context.clone());
        format!("[{timestamp}] {}: {message} {context}\n", level.label())
    }
}

fn id_value(id: impl Into<Value>) -> (Value, String) {
    let value = id.into();
    let shown = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (value, shown)
}

/// Records categorized failures to the console and per-level log files.
///
/// Logging never fails: IO problems are reported through `tracing::error!`
/// and otherwise ignored, so a broken log directory cannot abort a migration.
///
/// # Example
///
/// ```rust,no_run
/// use wp_migrate_logger::{ErrorLogger, LoggerConfig};
///
/// # async fn run() -> std::io::Result<()> {
/// let mut logger = ErrorLogger::new(LoggerConfig::default());
/// logger.initialize().await;
///
/// logger
///     .log_api_error("/posts?page=4", "Request failed: 502 Bad Gateway", Some(502))
///     .await;
///
/// logger.save_error_summary("./error-summary.md").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ErrorLogger {
    config: LoggerConfig,
    stats: ErrorStats,
}

impl ErrorLogger {
    /// Create a logger. Nothing is touched on disk until [`initialize`](Self::initialize).
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            stats: ErrorStats::default(),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Create the log directory.
    pub async fn initialize(&self) {
        if !self.config.file {
            return;
        }
        if let Err(e) = tokio::fs::create_dir_all(&self.config.log_dir).await {
            error!(
                log_dir = %self.config.log_dir.display(),
                error = %e,
                "Failed to create log directory"
            );
        }
    }

    /// Path of a level's log file.
    pub fn log_file(&self, level: LogLevel) -> PathBuf {
        self.config.log_dir.join(level.file_name())
    }

    /// Returns true if entries at `level` are emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.config.level
    }

    /// Emit one entry at `level`.
    pub async fn log(&self, level: LogLevel, message: &str, context: &Map<String, Value>) {
        if !self.enabled(level) {
            return;
        }
        if self.config.console {
            emit_console(level, message, context);
        }
        if self.config.file {
            self.append(level, &format_line(Utc::now(), level, message, context))
                .await;
        }
    }

    pub async fn debug(&self, message: &str, context: &Map<String, Value>) {
        self.log(LogLevel::Debug, message, context).await;
    }

    pub async fn info(&self, message: &str, context: &Map<String, Value>) {
        self.log(LogLevel::Info, message, context).await;
    }

    pub async fn warn(&self, message: &str, context: &Map<String, Value>) {
        self.log(LogLevel::Warn, message, context).await;
    }

    pub async fn error(&self, message: &str, context: &Map<String, Value>) {
        self.log(LogLevel::Error, message, context).await;
    }

    /// Count a failure and log it at its category's level.
    ///
    /// Counters are updated even when the level is filtered out.
    pub async fn record(&mut self, record: ErrorRecord) {
        self.stats.increment(record.category);

        let mut context = Map::with_capacity(record.context.len() + 1);
        context.insert("type".into(), Value::from(record.category.as_str()));
        context.extend(record.context);

        self.log(record.category.level(), &record.message, &context)
            .await;
    }

    /// A post could not be fetched or transformed.
    pub async fn log_content_error(
        &mut self,
        post_id: impl Into<Value>,
        error: impl Display,
        context: Map<String, Value>,
    ) {
        let (post_id, shown) = id_value(post_id);
        let record = ErrorRecord::new(
            ErrorCategory::Content,
            format!("Content processing failed for post {shown}"),
        )
        .with("postId", post_id)
        .with("error", error.to_string())
        .with_context(context);
        self.record(record).await;
    }

    /// A media file could not be downloaded.
    pub async fn log_media_error(
        &mut self,
        media_url: &str,
        error: impl Display,
        context: Map<String, Value>,
    ) {
        let record = ErrorRecord::new(
            ErrorCategory::Media,
            format!("Media download failed: {media_url}"),
        )
        .with("mediaUrl", media_url)
        .with("error", error.to_string())
        .with_context(context);
        self.record(record).await;
    }

    /// A source field could not be mapped.
    pub async fn log_field_error(
        &mut self,
        post_id: impl Into<Value>,
        field: &str,
        error: impl Display,
    ) {
        let (post_id, shown) = id_value(post_id);
        let record = ErrorRecord::new(
            ErrorCategory::FieldMapping,
            format!("Field mapping failed for post {shown}: {field}"),
        )
        .with("postId", post_id)
        .with("field", field)
        .with("error", error.to_string());
        self.record(record).await;
    }

    /// An API request failed.
    pub async fn log_api_error(&mut self, endpoint: &str, error: impl Display, status: Option<u16>) {
        let record = ErrorRecord::new(
            ErrorCategory::Api,
            format!("API request failed: {endpoint}"),
        )
        .with("endpoint", endpoint)
        .with("error", error.to_string())
        .with("status", status.map_or(Value::Null, Value::from));
        self.record(record).await;
    }

    pub fn get_error_stats(&self) -> ErrorStats {
        self.stats
    }

    /// Reset every counter to zero.
    pub fn clear_error_counts(&mut self) {
        self.stats = ErrorStats::default();
    }

    /// Markdown report of the current counters.
    pub fn generate_error_summary(&self) -> String {
        render_summary(&self.stats, &self.config.log_dir, Utc::now())
    }

    /// Write the report to `path`, creating parent directories.
    pub async fn save_error_summary(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.generate_error_summary()).await
    }

    async fn append(&self, level: LogLevel, line: &str) {
        let path = self.log_file(level);

        if let Err(e) =
            rotate_if_needed(&path, self.config.max_file_size, self.config.max_files).await
        {
            error!(file = %path.display(), error = %e, "Failed to rotate log file");
        }

        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = result {
            error!(file = %path.display(), error = %e, "Failed to write log file");
        }
    }
}

fn emit_console(level: LogLevel, message: &str, context: &Map<String, Value>) {
    let context = (!context.is_empty()).then(|| Value::Object(context.clone()).to_string());
    let context = context.as_deref().unwrap_or("");
    match level {
        LogLevel::Debug => tracing::debug!(target: CONSOLE_TARGET, context, "{message}"),
        LogLevel::Info => tracing::info!(target: CONSOLE_TARGET, context, "{message}"),
        LogLevel::Warn => tracing::warn!(target: CONSOLE_TARGET, context, "{message}"),
        LogLevel::Error => tracing::error!(target: CONSOLE_TARGET, context, "{message}"),
    }
}
