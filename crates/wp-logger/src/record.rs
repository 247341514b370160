//! Error categories, records and counters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::LogLevel;

/// Failure class tracked by its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Content,
    Media,
    FieldMapping,
    Api,
}

impl ErrorCategory {
    /// Level the category is logged at.
    pub fn level(&self) -> LogLevel {
        match self {
            ErrorCategory::Content | ErrorCategory::Api => LogLevel::Error,
            ErrorCategory::Media | ErrorCategory::FieldMapping => LogLevel::Warn,
        }
    }

    /// Value of the `type` key in the record context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Content => "content",
            ErrorCategory::Media => "media",
            ErrorCategory::FieldMapping => "field_mapping",
            ErrorCategory::Api => "api",
        }
    }
}

/// One categorized failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub message: String,
    pub context: Map<String, Value>,
}

impl ErrorRecord {
    /// Create a record with an empty context.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Add a context entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Add every entry of `extra`, overriding existing keys.
    pub fn with_context(mut self, extra: Map<String, Value>) -> Self {
        self.context.extend(extra);
        self
    }
}

/// Per-category error counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub content: u64,
    pub media: u64,
    pub field_mapping: u64,
    pub api: u64,
    pub total: u64,
}

impl ErrorStats {
    /// Count one error of `category`.
    pub fn increment(&mut self, category: ErrorCategory) {
        match category {
            ErrorCategory::Content => self.content += 1,
            ErrorCategory::Media => self.media += 1,
            ErrorCategory::FieldMapping => self.field_mapping += 1,
            ErrorCategory::Api => self.api += 1,
        }
        self.total += 1;
    }

    /// Count for one category.
    pub fn count(&self, category: ErrorCategory) -> u64 {
        match category {
            ErrorCategory::Content => self.content,
            ErrorCategory::Media => self.media,
            ErrorCategory::FieldMapping => self.field_mapping,
            ErrorCategory::Api => self.api,
        }
    }

    /// Returns true if nothing has been counted.
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment() {
        let mut stats = ErrorStats::default();
        stats.increment(ErrorCategory::Content);
        stats.increment(ErrorCategory::Api);
        stats.increment(ErrorCategory::Api);

        assert_eq!(stats.content, 1);
        assert_eq!(stats.api, 2);
        assert_eq!(stats.count(ErrorCategory::Media), 0);
        assert_eq!(stats.total, 3);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_record_context() {
        let mut extra = Map::new();
        extra.insert("retry".into(), Value::Bool(true));

        let record = ErrorRecord::new(ErrorCategory::Media, "Media download failed")
            .with("mediaUrl", "https://a.example/x.jpg")
            .with_context(extra);

        assert_eq!(record.category.level(), LogLevel::Warn);
        assert_eq!(record.context["mediaUrl"], "https://a.example/x.jpg");
        assert_eq!(record.context["retry"], true);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let value = serde_json::to_value(ErrorStats::default()).unwrap();
        assert_eq!(value["fieldMapping"], 0);
    }
}
