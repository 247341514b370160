//! The persisted configuration document.
//!
//! Field names follow the camelCase keys of `config/wordpress.json`. Optional
//! fields are omitted when absent and unknown keys are carried in `extra`
//! maps, so loading and saving a document does not change its content.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Top-level configuration document.
///
/// `Clone` is the structural deep copy every transforming operation starts from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Site records keyed by domain.
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mapping: Option<FieldMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigDocument {
    /// Returns true if the document has no sites and no settings sections.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.export.is_none()
            && self.field_mapping.is_none()
            && self.logging.is_none()
            && self.extra.is_empty()
    }

    /// Look up a site record.
    pub fn site(&self, domain: &str) -> Option<&SiteConfig> {
        self.sites.get(domain)
    }

    /// Export settings, or the defaults when the section is absent.
    pub fn export_or_default(&self) -> ExportSettings {
        self.export.clone().unwrap_or_default()
    }

    /// Field mapping, or the defaults when the section is absent.
    pub fn field_mapping_or_default(&self) -> FieldMapping {
        self.field_mapping.clone().unwrap_or_default()
    }

    /// Logging settings, or the defaults when the section is absent.
    pub fn logging_or_default(&self) -> LoggingSettings {
        self.logging.clone().unwrap_or_default()
    }
}

/// A per-type test identifier: a numeric post id or a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestId {
    Id(u64),
    Slug(String),
}

/// One externally hosted content source.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SiteRecord", into = "SiteRecord")]
pub struct SiteConfig {
    /// Public site URL.
    pub url: String,
    /// REST API base URL.
    pub api_base: String,
    /// Diagnostic endpoint, absolute or relative to `api_base`.
    pub test_endpoint: Option<String>,
    pub content_types: Option<Vec<String>>,
    /// Test identifiers per content type.
    pub test_data: Option<BTreeMap<String, Vec<TestId>>>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
    /// Optional fields written as an explicit `null`, kept so saving writes them back.
    pub explicit_nulls: BTreeSet<SiteField>,
    pub extra: Map<String, Value>,
}

/// On-disk shape of a site record.
///
/// The outer `Option` tells a missing key from an explicit `null`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteRecord {
    #[serde(default)]
    url: String,
    #[serde(default)]
    api_base: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    test_endpoint: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_data: Option<BTreeMap<String, Vec<TestId>>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    username: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    password: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    api_key: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    token: Option<Option<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<SiteRecord> for SiteConfig {
    fn from(record: SiteRecord) -> Self {
        let mut explicit_nulls = BTreeSet::new();
        let mut present = |field: SiteField, value: Option<Option<String>>| match value {
            Some(None) => {
                explicit_nulls.insert(field);
                None
            }
            other => other.flatten(),
        };

        let test_endpoint = present(SiteField::TestEndpoint, record.test_endpoint);
        let username = present(SiteField::Username, record.username);
        let password = present(SiteField::Password, record.password);
        let api_key = present(SiteField::ApiKey, record.api_key);
        let token = present(SiteField::Token, record.token);

        Self {
            url: record.url,
            api_base: record.api_base,
            test_endpoint,
            content_types: record.content_types,
            test_data: record.test_data,
            username,
            password,
            api_key,
            token,
            explicit_nulls,
            extra: record.extra,
        }
    }
}

impl From<SiteConfig> for SiteRecord {
    fn from(site: SiteConfig) -> Self {
        let SiteConfig {
            url,
            api_base,
            test_endpoint,
            content_types,
            test_data,
            username,
            password,
            api_key,
            token,
            explicit_nulls,
            extra,
        } = site;
        let stored = |field: SiteField, value: Option<String>| match value {
            Some(value) => Some(Some(value)),
            None if explicit_nulls.contains(&field) => Some(None),
            None => None,
        };

        Self {
            url,
            api_base,
            test_endpoint: stored(SiteField::TestEndpoint, test_endpoint),
            content_types,
            test_data,
            username: stored(SiteField::Username, username),
            password: stored(SiteField::Password, password),
            api_key: stored(SiteField::ApiKey, api_key),
            token: stored(SiteField::Token, token),
            extra,
        }
    }
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("SiteConfig")
            .field("url", &self.url)
            .field("api_base", &self.api_base)
            .field("test_endpoint", &self.test_endpoint)
            .field("content_types", &self.content_types)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .field("token", &redact(&self.token))
            .finish_non_exhaustive()
    }
}

/// A field of [`SiteConfig`] addressable by name, e.g. from an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SiteField {
    Url,
    ApiBase,
    TestEndpoint,
    Username,
    Password,
    ApiKey,
    Token,
}

impl SiteField {
    /// Every addressable field, multi-word names first.
    pub const ALL: [SiteField; 7] = [
        SiteField::TestEndpoint,
        SiteField::ApiBase,
        SiteField::ApiKey,
        SiteField::Url,
        SiteField::Username,
        SiteField::Password,
        SiteField::Token,
    ];

    /// JSON key of the field.
    pub fn json_name(&self) -> &'static str {
        match self {
            SiteField::Url => "url",
            SiteField::ApiBase => "apiBase",
            SiteField::TestEndpoint => "testEndpoint",
            SiteField::Username => "username",
            SiteField::Password => "password",
            SiteField::ApiKey => "apiKey",
            SiteField::Token => "token",
        }
    }

    /// Environment-variable spelling of the field (`API_BASE`).
    pub fn env_name(&self) -> &'static str {
        match self {
            SiteField::Url => "URL",
            SiteField::ApiBase => "API_BASE",
            SiteField::TestEndpoint => "TEST_ENDPOINT",
            SiteField::Username => "USERNAME",
            SiteField::Password => "PASSWORD",
            SiteField::ApiKey => "API_KEY",
            SiteField::Token => "TOKEN",
        }
    }

    /// Match a field token case-insensitively against the JSON or environment spelling.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| {
            token.eq_ignore_ascii_case(field.json_name()) || token.eq_ignore_ascii_case(field.env_name())
        })
    }
}

impl SiteConfig {
    /// Current value of a field, if set and non-empty.
    pub fn field(&self, field: SiteField) -> Option<&str> {
        let value = match field {
            SiteField::Url => Some(self.url.as_str()),
            SiteField::ApiBase => Some(self.api_base.as_str()),
            SiteField::TestEndpoint => self.test_endpoint.as_deref(),
            SiteField::Username => self.username.as_deref(),
            SiteField::Password => self.password.as_deref(),
            SiteField::ApiKey => self.api_key.as_deref(),
            SiteField::Token => self.token.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Set a field.
    pub fn set_field(&mut self, field: SiteField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SiteField::Url => self.url = value,
            SiteField::ApiBase => self.api_base = value,
            SiteField::TestEndpoint => self.test_endpoint = Some(value),
            SiteField::Username => self.username = Some(value),
            SiteField::Password => self.password = Some(value),
            SiteField::ApiKey => self.api_key = Some(value),
            SiteField::Token => self.token = Some(value),
        }
        self.explicit_nulls.remove(&field);
    }

    /// Returns true if a username/password pair is present.
    pub fn has_basic_auth(&self) -> bool {
        self.field(SiteField::Username).is_some() && self.field(SiteField::Password).is_some()
    }

    /// Content types, empty when not configured.
    pub fn content_types(&self) -> &[String] {
        self.content_types.as_deref().unwrap_or_default()
    }
}

/// Export settings consumed by the extraction pipeline.
///
/// Every key is optional; the accessors fill in defaults for missing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    /// Base retry delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<u64>,
    /// Request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportSettings {
    pub const DEFAULT_OUTPUT_DIR: &'static str = "./content";
    pub const DEFAULT_MEDIA_DIR: &'static str = "./public/images";
    pub const DEFAULT_BATCH_SIZE: usize = 10;
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Settings with every key spelled out at its default.
    pub fn explicit_defaults() -> Self {
        Self {
            output_dir: Some(PathBuf::from(Self::DEFAULT_OUTPUT_DIR)),
            media_dir: Some(PathBuf::from(Self::DEFAULT_MEDIA_DIR)),
            batch_size: Some(Self::DEFAULT_BATCH_SIZE),
            retry_attempts: Some(Self::DEFAULT_RETRY_ATTEMPTS),
            retry_delay: Some(Self::DEFAULT_RETRY_DELAY_MS),
            timeout: Some(Self::DEFAULT_TIMEOUT_MS),
            extra: Map::new(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_OUTPUT_DIR))
    }

    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_MEDIA_DIR))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(Self::DEFAULT_BATCH_SIZE)
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts.unwrap_or(Self::DEFAULT_RETRY_ATTEMPTS)
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout.unwrap_or(Self::DEFAULT_TIMEOUT_MS))
    }

    /// Base retry delay as a Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay.unwrap_or(Self::DEFAULT_RETRY_DELAY_MS))
    }
}

type NameLists = BTreeMap<String, Vec<String>>;

fn name_lists(entries: &[(&str, &[&str])]) -> NameLists {
    entries
        .iter()
        .map(|(target, names)| {
            (
                target.to_string(),
                names.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

fn default_hero() -> NameLists {
    name_lists(&[
        ("video", &["hero_video", "video_url", "background_video"][..]),
        ("image", &["hero_image", "featured_image", "background_image"][..]),
        ("title", &["hero_title", "banner_title"][..]),
        ("subtitle", &["hero_subtitle", "banner_subtitle"][..]),
        ("text", &["hero_text", "hero_content"][..]),
    ])
}

fn default_links() -> NameLists {
    name_lists(&[
        ("url", &["link_url", "external_url", "website_url"][..]),
        ("image", &["link_image", "logo"][..]),
    ])
}

/// Candidate source field names per target field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<NameLists>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<NameLists>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldMapping {
    /// Mapping with both groups spelled out at their defaults.
    pub fn explicit_defaults() -> Self {
        Self {
            hero: Some(default_hero()),
            links: Some(default_links()),
            extra: Map::new(),
        }
    }

    /// Hero field candidates, the defaults when the group is absent.
    pub fn hero(&self) -> NameLists {
        self.hero.clone().unwrap_or_else(default_hero)
    }

    /// Link field candidates, the defaults when the group is absent.
    pub fn links(&self) -> NameLists {
        self.links.clone().unwrap_or_else(default_links)
    }
}

/// Logging section, converted into the logger's own configuration by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<bool>,
    /// Rotation threshold in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoggingSettings {
    pub const DEFAULT_LOG_DIR: &'static str = "./logs";
    pub const DEFAULT_LEVEL: &'static str = "info";
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    pub const DEFAULT_MAX_FILES: u32 = 5;

    /// Settings with every key spelled out at its default.
    pub fn explicit_defaults() -> Self {
        Self {
            log_dir: Some(PathBuf::from(Self::DEFAULT_LOG_DIR)),
            level: Some(Self::DEFAULT_LEVEL.to_string()),
            console: Some(true),
            file: Some(true),
            max_file_size: Some(Self::DEFAULT_MAX_FILE_SIZE),
            max_files: Some(Self::DEFAULT_MAX_FILES),
            extra: Map::new(),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_LOG_DIR))
    }

    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(Self::DEFAULT_LEVEL)
    }

    pub fn console(&self) -> bool {
        self.console.unwrap_or(true)
    }

    pub fn file(&self) -> bool {
        self.file.unwrap_or(true)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(Self::DEFAULT_MAX_FILE_SIZE)
    }

    pub fn max_files(&self) -> u32 {
        self.max_files.unwrap_or(Self::DEFAULT_MAX_FILES)
    }
}
