//! # wp-config
//!
//! Layered configuration for the content migration pipeline.
//!
//! The configuration lives in a JSON document (`./config/wordpress.json` by
//! default) with one record per site. Secrets are usually supplied through
//! environment variables of the form `WP_<SITE>_<FIELD>`, which are merged on
//! top of the file every time a site is looked up.
//!
//! ## Security
//!
//! - `SiteConfig`'s Debug output redacts passwords, API keys and tokens
//! - [`mask_sensitive_data`] produces a copy safe to print or log
//! - Saved files are readable by the owner only (Unix)
//!
//! ## Example
//!
//! ```rust,ignore
//! use wp_migrate_config::{ConfigManager, EnvSnapshot};
//!
//! let manager = ConfigManager::new("./config/wordpress.json")
//!     .with_env(EnvSnapshot::capture());
//!
//! manager.create_config_from_template()?;
//! let doc = manager.resolved_config();
//! manager.validate_config(&doc).into_result()?;
//!
//! let export = manager.get_export_config("polything.co.uk")?;
//! println!("{}", export.site.api_base);
//! ```

mod document;
mod env;
mod error;
mod manager;
mod mask;
mod template;
mod validation;

pub use document::{
    ConfigDocument, ExportSettings, FieldMapping, LoggingSettings, SiteConfig, SiteField, TestId,
};
pub use env::{
    merge_env_vars, normalize_site_key, parse_override, EnvOverride, EnvSnapshot,
    DEFAULT_ENV_PREFIX,
};
pub use error::{Error, ErrorKind, Result};
pub use manager::{ConfigManager, MediaConfig, SiteExportConfig, DEFAULT_CONFIG_PATH};
pub use mask::{mask_sensitive_data, mask_site, REDACTION_MARKER};
pub use template::generate_default_config;
pub use validation::{
    validate_config, validate_credentials, validate_site_config, ValidationReport,
    MIN_API_KEY_LENGTH, MIN_PASSWORD_LENGTH,
};
