//! Markdown error summary.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::record::ErrorStats;

/// Default location of the written summary.
pub const DEFAULT_SUMMARY_PATH: &str = "./error-summary.md";

/// Render the summary report for `stats`.
pub fn render_summary(stats: &ErrorStats, log_dir: &Path, generated_at: DateTime<Utc>) -> String {
    let status = if stats.is_clean() {
        "✅ No errors encountered. Migration completed successfully.".to_string()
    } else {
        format!(
            "⚠️ {} errors encountered. Review the log files in `{}` for details.",
            stats.total,
            log_dir.display()
        )
    };

    format!(
        "# Migration Error Summary\n\
         \n\
         Generated: {generated}\n\
         \n\
         ## Statistics\n\
         \n\
         - Content errors: {content}\n\
         - Media errors: {media}\n\
         - Field mapping errors: {field_mapping}\n\
         - API errors: {api}\n\
         - **Total errors: {total}**\n\
         \n\
         ## Status\n\
         \n\
         {status}\n",
        generated = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        content = stats.content,
        media = stats.media,
        field_mapping = stats.field_mapping,
        api = stats.api,
        total = stats.total,
    )
}
