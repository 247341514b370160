//! Glue between configuration, client and logger.

use wp_migrate_client::{ClientConfig, Credentials, RetryConfig};
use wp_migrate_config::{ErrorKind, ExportSettings, LoggingSettings, SiteConfig, SiteField};
use wp_migrate_logger::{ErrorLogger, LogLevel, LoggerConfig};

/// Build a client configuration for one site.
///
/// The base URL is the site's `apiBase`. Timeout and retry come from the
/// export settings when given, otherwise the client defaults apply. A
/// username/password pair takes precedence over an API key.
pub fn client_config_for_site(
    site: &SiteConfig,
    export: Option<&ExportSettings>,
) -> wp_migrate_config::Result<ClientConfig> {
    let api_base = site.field(SiteField::ApiBase).ok_or_else(|| {
        wp_migrate_config::Error::new(ErrorKind::Validation(vec![
            "Missing required field: apiBase".to_string(),
        ]))
    })?;

    let credentials = match (
        site.field(SiteField::Username),
        site.field(SiteField::Password),
        site.field(SiteField::ApiKey),
    ) {
        (Some(username), Some(password), _) => Some(Credentials::basic(username, password)),
        (_, _, Some(key)) => Some(Credentials::api_key(key)),
        _ => None,
    };

    let mut builder = ClientConfig::builder()
        .with_base_url(api_base)
        .with_optional_credentials(credentials);

    if let Some(export) = export {
        builder = builder.with_timeout(export.timeout()).with_retry(
            RetryConfig::default()
                .with_max_attempts(export.retry_attempts())
                .with_initial_delay(export.retry_delay()),
        );
    }

    Ok(builder.build())
}

/// Convert the `logging` section of the configuration file.
///
/// Keys missing from the section take their defaults.
pub fn logger_config_from(settings: &LoggingSettings) -> LoggerConfig {
    LoggerConfig {
        log_dir: settings.log_dir(),
        level: LogLevel::parse_or_default(settings.level()),
        console: settings.console(),
        file: settings.file(),
        max_file_size: settings.max_file_size(),
        max_files: settings.max_files(),
    }
}

/// Record a failed request as an API error, with its HTTP status if any.
pub async fn record_request_failure(
    logger: &mut ErrorLogger,
    endpoint: &str,
    error: &wp_migrate_client::Error,
) {
    logger.log_api_error(endpoint, error, error.status()).await;
}
