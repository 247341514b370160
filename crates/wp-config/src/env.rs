//! Environment-variable overrides.
//!
//! The process environment is read once into an [`EnvSnapshot`], which is
//! then passed explicitly to the merge. Tests build synthetic snapshots
//! instead of mutating the real environment.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::document::{ConfigDocument, SiteConfig, SiteField};

/// Default prefix of override variables.
pub const DEFAULT_ENV_PREFIX: &str = "WP_";

/// Immutable copy of a set of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Target of one override variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    /// Normalized site key.
    pub site: String,
    /// Known field, or `None` for an unknown one.
    pub field: Option<SiteField>,
    /// Lower-cased field token as it appeared in the variable name.
    pub token: String,
}

/// Parse `<PREFIX><SITE>_<FIELD>`.
///
/// Known field names may span several words (`API_KEY`), so they are matched
/// as suffixes first; otherwise the name is split at its last underscore and
/// the tail is matched against the JSON spelling (`APIKEY`). The
/// site token is lower-cased with `_` turned into `.`, so `POLYTHING_CO_UK`
/// names `polything.co.uk` while `POLYTHING` names `polything`.
pub fn parse_override(name: &str, prefix: &str) -> Option<EnvOverride> {
    let rest = name.strip_prefix(prefix)?;

    let known = SiteField::ALL.into_iter().find_map(|field| {
        let suffix = field.env_name();
        if rest.len() <= suffix.len() + 1 {
            return None;
        }
        let split = rest.len() - suffix.len();
        if !rest.is_char_boundary(split) {
            return None;
        }
        let (site, tail) = rest.split_at(split);
        let site = site.strip_suffix('_')?;
        tail.eq_ignore_ascii_case(suffix)
            .then(|| (site.to_string(), Some(field), tail.to_ascii_lowercase()))
    });

    let (site, field, token) = match known {
        Some(found) => found,
        None => {
            let (site, token) = rest.rsplit_once('_')?;
            (site.to_string(), SiteField::parse(token), token.to_ascii_lowercase())
        }
    };

    if site.is_empty() || token.is_empty() {
        return None;
    }

    Some(EnvOverride {
        site: normalize_site_key(&site),
        field,
        token,
    })
}

/// Lower-case a site token and turn underscores into dots.
pub fn normalize_site_key(token: &str) -> String {
    token.to_lowercase().replace('_', ".")
}

/// Merge matching variables into a deep copy of `doc`.
///
/// Empty values are ignored, so an existing value is never blanked. Missing
/// site records are created. `doc` itself is left untouched.
pub fn merge_env_vars(doc: &ConfigDocument, env: &EnvSnapshot, prefix: &str) -> ConfigDocument {
    let mut merged = doc.clone();

    for (name, value) in env.iter() {
        if value.is_empty() {
            continue;
        }
        let Some(target) = parse_override(name, prefix) else {
            continue;
        };

        debug!(variable = name, site = %target.site, field = %target.token, "Applying environment override");

        let site: &mut SiteConfig = merged.sites.entry(target.site).or_default();
        match target.field {
            Some(field) => site.set_field(field, value),
            None => {
                site.extra.insert(target.token, Value::String(value.to_string()));
            }
        }
    }

    merged
}
