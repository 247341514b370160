//! Structural, URL and credential validation.
//!
//! Validation never fails: problems are collected into a [`ValidationReport`].

use crate::document::{ConfigDocument, SiteConfig};
use crate::error::{Error, ErrorKind, Result};

/// Minimum length of a password (WordPress application passwords are 24).
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum length of an API key.
pub const MIN_API_KEY_LENGTH: usize = 16;

/// Overall validity flag plus one message per problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationReport {
    /// Record a problem.
    pub fn push(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    /// Fold another report in, prefixing its messages.
    pub fn absorb(&mut self, prefix: &str, other: ValidationReport) {
        for message in other.errors {
            self.push(format!("{prefix}: {message}"));
        }
    }

    /// Turn an invalid report into an error for `?` call sites.
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::Validation(self.errors)))
        }
    }
}

fn check_url(report: &mut ValidationReport, field: &str, value: &str) {
    if value.trim().is_empty() {
        report.push(format!("Missing required field: {field}"));
    } else if url::Url::parse(value).is_err() {
        report.push(format!("Invalid URL format for {field}: {value}"));
    }
}

/// Check required fields and URL formats of one site record.
pub fn validate_site_config(site: &SiteConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_url(&mut report, "url", &site.url);
    check_url(&mut report, "apiBase", &site.api_base);

    if let Some(endpoint) = &site.test_endpoint {
        if !endpoint.starts_with('/') && url::Url::parse(endpoint).is_err() {
            report.push(format!(
                "Invalid testEndpoint: {endpoint} (expected an absolute URL or a path starting with '/')"
            ));
        }
    }

    if site.content_types().iter().any(|t| t.trim().is_empty()) {
        report.push("contentTypes contains an empty name");
    }

    report
}

/// Check credential fields of one site record.
///
/// A record with no credentials at all is valid.
pub fn validate_credentials(site: &SiteConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if site.username.is_some() || site.password.is_some() {
        if site.username.as_deref().unwrap_or_default().trim().is_empty() {
            report.push("Username is required");
        }
        let password_len = site.password.as_deref().map(|p| p.chars().count()).unwrap_or(0);
        if password_len < MIN_PASSWORD_LENGTH {
            report.push(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
    }

    if let Some(key) = &site.api_key {
        if key.chars().count() < MIN_API_KEY_LENGTH {
            report.push(format!(
                "API key must be at least {MIN_API_KEY_LENGTH} characters"
            ));
        }
    }

    report
}

/// Validate every site of a document; messages are prefixed with the domain.
pub fn validate_config(doc: &ConfigDocument) -> ValidationReport {
    let mut report = ValidationReport::default();

    if doc.sites.is_empty() {
        report.push("No sites configured");
    }

    for (domain, site) in &doc.sites {
        report.absorb(domain, validate_site_config(site));
        report.absorb(domain, validate_credentials(site));
    }

    report
}
