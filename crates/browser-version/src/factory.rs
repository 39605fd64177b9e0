//! Parser factory

use serde::{Deserialize, Serialize};

use crate::version_parser::VersionParser;

/// Creates [`VersionParser`] instances, optionally with a configured pattern.
///
/// Deserializable so that host applications can keep the pattern in their own
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionParserFactory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
}

impl VersionParserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        VersionParserFactory {
            pattern: Some(pattern.into()),
        }
    }

    /// The configured pattern, if any
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Create a parser. An explicit pattern wins over the configured one.
    pub fn create(&self, pattern: Option<&str>) -> VersionParser {
        match pattern.or(self.pattern.as_deref()) {
            Some(pattern) => VersionParser::with_pattern(pattern),
            None => VersionParser::new(),
        }
    }
}
