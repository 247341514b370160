//! Redaction of secrets before a document is logged or printed.

use serde_json::{Map, Value};

use crate::document::{ConfigDocument, SiteConfig};

/// Replacement for secret values.
pub const REDACTION_MARKER: &str = "***REDACTED***";

const SECRET_KEYS: [&str; 5] = ["password", "apikey", "api_key", "token", "secret"];

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|s| key.eq_ignore_ascii_case(s))
}

fn mask_option(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| !v.is_empty()) {
        *value = Some(REDACTION_MARKER.to_string());
    }
}

fn mask_map(map: &mut Map<String, Value>) {
    for (key, value) in map.iter_mut() {
        if is_secret_key(key) {
            if !matches!(value, Value::Null) && value.as_str() != Some("") {
                *value = Value::String(REDACTION_MARKER.to_string());
            }
        } else {
            mask_value(value);
        }
    }
}

fn mask_value(value: &mut Value) {
    match value {
        Value::Object(map) => mask_map(map),
        Value::Array(items) => items.iter_mut().for_each(mask_value),
        _ => {}
    }
}

/// A copy of one site record with secrets replaced.
pub fn mask_site(site: &SiteConfig) -> SiteConfig {
    let mut masked = site.clone();
    mask_option(&mut masked.password);
    mask_option(&mut masked.api_key);
    mask_option(&mut masked.token);
    mask_map(&mut masked.extra);
    masked
}

/// A copy of the document with every password, API key and token replaced.
///
/// Non-secret fields are copied unchanged.
pub fn mask_sensitive_data(doc: &ConfigDocument) -> ConfigDocument {
    let mut masked = doc.clone();

    for site in masked.sites.values_mut() {
        *site = mask_site(site);
    }
    if let Some(export) = masked.export.as_mut() {
        mask_map(&mut export.extra);
    }
    if let Some(mapping) = masked.field_mapping.as_mut() {
        mask_map(&mut mapping.extra);
    }
    if let Some(logging) = masked.logging.as_mut() {
        mask_map(&mut logging.extra);
    }
    mask_map(&mut masked.extra);

    masked
}
