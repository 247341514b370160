//! File-backed configuration access.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::document::{ConfigDocument, ExportSettings, FieldMapping, SiteConfig};
use crate::env::{self, EnvSnapshot, DEFAULT_ENV_PREFIX};
use crate::error::{Error, ErrorKind, Result};
use crate::{mask, template, validation};
use crate::validation::ValidationReport;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config/wordpress.json";

/// Everything the extraction pipeline needs for one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteExportConfig {
    pub domain: String,
    pub site: SiteConfig,
    pub export: ExportSettings,
    pub field_mapping: FieldMapping,
}

/// Settings for downloading one site's media library.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConfig {
    pub domain: String,
    /// Public site URL, used to resolve relative media links.
    pub site_url: String,
    pub api_base: String,
    pub media_dir: PathBuf,
    pub batch_size: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

/// Loads, merges, validates and writes the configuration document.
///
/// Nothing is cached: every lookup reads the file again and merges the
/// environment into a fresh copy.
///
/// # Example
///
/// ```rust,no_run
/// use wp_migrate_config::{ConfigManager, EnvSnapshot};
///
/// let manager = ConfigManager::new("./config/wordpress.json")
///     .with_env(EnvSnapshot::capture());
///
/// for domain in manager.list_sites() {
///     let site = manager.get_site_config(&domain);
///     println!("{domain}: {:?}", site.map(|s| s.api_base));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    env_prefix: String,
    env: Option<EnvSnapshot>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigManager {
    /// Create a manager for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env: None,
        }
    }

    /// Set the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Use a fixed environment snapshot instead of the process environment.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Environment variable prefix.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Read the document, or `None` if the file does not exist.
    ///
    /// Only unreadable files and invalid JSON are errors. A site record or
    /// settings section of the wrong shape is reported through `tracing` and
    /// skipped, so one bad value does not hide the rest of the file. A
    /// skipped settings section is kept verbatim in `extra` and written back
    /// unchanged by [`save_config`](Self::save_config).
    pub fn try_load_config(&self) -> Result<Option<ConfigDocument>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(root) => Ok(Some(self.parse_sections(root))),
            // Not an object: let serde report the type mismatch
            other => Ok(Some(serde_json::from_value(other)?)),
        }
    }

    fn parse_sections(&self, root: Map<String, Value>) -> ConfigDocument {
        let mut doc = ConfigDocument::default();

        for (key, value) in root {
            match key.as_str() {
                "sites" => match value {
                    Value::Object(sites) => {
                        for (domain, record) in sites {
                            match serde_json::from_value::<SiteConfig>(record) {
                                Ok(site) => {
                                    doc.sites.insert(domain, site);
                                }
                                Err(e) => error!(
                                    path = %self.path.display(),
                                    site = %domain,
                                    error = %e,
                                    "Skipping invalid site record"
                                ),
                            }
                        }
                    }
                    _ => error!(
                        path = %self.path.display(),
                        "Ignoring `sites`, expected an object"
                    ),
                },
                "export" => doc.export = self.section(&key, value, &mut doc.extra),
                "fieldMapping" => doc.field_mapping = self.section(&key, value, &mut doc.extra),
                "logging" => doc.logging = self.section(&key, value, &mut doc.extra),
                _ => {
                    doc.extra.insert(key, value);
                }
            }
        }

        doc
    }

    /// Deserialize one settings section, parking it in `extra` if it does not fit.
    fn section<T: DeserializeOwned>(
        &self,
        key: &str,
        value: Value,
        extra: &mut Map<String, Value>,
    ) -> Option<T> {
        match T::deserialize(&value) {
            Ok(section) => Some(section),
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    section = key,
                    error = %e,
                    "Invalid configuration section, using defaults"
                );
                extra.insert(key.to_string(), value);
                None
            }
        }
    }

    /// Read the document.
    ///
    /// A missing or unparsable file yields an empty document; the problem is
    /// reported through `tracing` only.
    pub fn load_config(&self) -> ConfigDocument {
        match self.try_load_config() {
            Ok(Some(doc)) => {
                debug!(path = %self.path.display(), sites = doc.sites.len(), "Loaded configuration");
                doc
            }
            Ok(None) => {
                warn!(path = %self.path.display(), "Configuration file not found, using empty configuration");
                ConfigDocument::default()
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load configuration");
                ConfigDocument::default()
            }
        }
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn save_config(&self, doc: &ConfigDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');
        std::fs::write(&self.path, json)?;

        // The file may hold credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }

    /// Merge environment overrides into a copy of `doc`.
    pub fn merge_env_vars(&self, doc: &ConfigDocument) -> ConfigDocument {
        match &self.env {
            Some(snapshot) => env::merge_env_vars(doc, snapshot, &self.env_prefix),
            None => env::merge_env_vars(doc, &EnvSnapshot::capture(), &self.env_prefix),
        }
    }

    /// Load the file and merge the environment.
    pub fn resolved_config(&self) -> ConfigDocument {
        self.merge_env_vars(&self.load_config())
    }

    /// Look up one site; `None` if it is not configured.
    pub fn get_site_config(&self, domain: &str) -> Option<SiteConfig> {
        self.resolved_config().sites.remove(domain)
    }

    /// Configured domains, sorted.
    pub fn list_sites(&self) -> Vec<String> {
        self.resolved_config().sites.into_keys().collect()
    }

    /// Site record plus export settings and field mapping.
    pub fn get_export_config(&self, domain: &str) -> Result<SiteExportConfig> {
        let mut doc = self.resolved_config();
        let site = doc
            .sites
            .remove(domain)
            .ok_or_else(|| Error::new(ErrorKind::SiteNotFound(domain.to_string())))?;

        Ok(SiteExportConfig {
            domain: domain.to_string(),
            site,
            export: doc.export.unwrap_or_default(),
            field_mapping: doc.field_mapping.unwrap_or_default(),
        })
    }

    /// Media download settings for one site.
    pub fn get_media_config(&self, domain: &str) -> Result<MediaConfig> {
        let doc = self.resolved_config();
        let site = doc
            .site(domain)
            .ok_or_else(|| Error::new(ErrorKind::SiteNotFound(domain.to_string())))?;
        let export = doc.export_or_default();

        Ok(MediaConfig {
            domain: domain.to_string(),
            site_url: site.url.clone(),
            api_base: site.api_base.clone(),
            media_dir: export.media_dir(),
            batch_size: export.batch_size(),
            retry_attempts: export.retry_attempts(),
            retry_delay: export.retry_delay(),
            timeout: export.timeout(),
        })
    }

    /// See [`validation::validate_site_config`].
    pub fn validate_site_config(&self, site: &SiteConfig) -> ValidationReport {
        validation::validate_site_config(site)
    }

    /// See [`validation::validate_credentials`].
    pub fn validate_credentials(&self, site: &SiteConfig) -> ValidationReport {
        validation::validate_credentials(site)
    }

    /// See [`validation::validate_config`].
    pub fn validate_config(&self, doc: &ConfigDocument) -> ValidationReport {
        validation::validate_config(doc)
    }

    /// See [`template::generate_default_config`].
    pub fn generate_default_config(&self) -> ConfigDocument {
        template::generate_default_config()
    }

    /// Write the template unless a file already exists.
    ///
    /// Returns `false` without touching the file when it exists.
    pub fn create_config_from_template(&self) -> Result<bool> {
        if self.path.exists() {
            warn!(path = %self.path.display(), "Configuration file already exists, not overwriting");
            return Ok(false);
        }
        self.save_config(&template::generate_default_config())?;
        Ok(true)
    }

    /// Like [`create_config_from_template`](Self::create_config_from_template)
    /// but an existing file is an error.
    pub fn create_config_from_template_strict(&self) -> Result<()> {
        if self.create_config_from_template()? {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::AlreadyExists(self.path.clone())))
        }
    }

    /// See [`mask::mask_sensitive_data`].
    pub fn mask_sensitive_data(&self, doc: &ConfigDocument) -> ConfigDocument {
        mask::mask_sensitive_data(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_in(dir: &tempfile::TempDir) -> ConfigManager {
        ConfigManager::new(dir.path().join("config").join("wordpress.json"))
            .with_env(EnvSnapshot::empty())
    }

    #[test]
    fn test_defaults() {
        let manager = ConfigManager::default();
        assert_eq!(manager.path(), Path::new(DEFAULT_CONFIG_PATH));
        assert_eq!(manager.env_prefix(), "WP_");
    }

    #[test]
    fn test_try_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(manager_in(&dir).try_load_config().unwrap().is_none());
    }

    #[test]
    fn test_try_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        std::fs::create_dir_all(manager.path().parent().unwrap()).unwrap();
        std::fs::write(manager.path(), "{ not json").unwrap();

        let err = manager.try_load_config().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
        assert!(manager.load_config().is_empty());
    }

    #[test]
    fn test_strict_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        manager.create_config_from_template_strict().unwrap();

        let err = manager.create_config_from_template_strict().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AlreadyExists(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        manager.save_config(&ConfigDocument::default()).unwrap();

        let mode = std::fs::metadata(manager.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
