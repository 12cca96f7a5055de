//! Engine configuration.

use serde::{Deserialize, Serialize};
use snippet_parser::ParseOptions;

use crate::engine::ScopeMode;

/// Tunable limits and defaults for an [`Engine`](crate::Engine).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use snippet_eval::EngineConfig;
/// let config = EngineConfig::from_json(r#"{ "max_call_depth": 16 }"#).unwrap();
/// assert_eq!(config.max_call_depth, 16);
/// assert_eq!(config.max_format_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Script call depth before `RangeError: Maximum call stack size exceeded`.
    pub max_call_depth: usize,
    /// Nesting bound for the value formatter.
    pub max_format_depth: usize,
    /// Nesting bound for the parser.
    pub max_nesting_depth: u32,
    /// Scope used when a caller does not pick one.
    pub default_scope: ScopeMode,
    /// File name shown in stack frames.
    pub file_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 48,
            max_format_depth: 64,
            max_nesting_depth: 32,
            default_scope: ScopeMode::Shared,
            file_name: "<anonymous>".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every run fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_call_depth"));
        }
        if self.max_format_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_format_depth"));
        }
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_nesting_depth"));
        }
        Ok(())
    }

    /// Parser options for a run under `scope`.
    pub fn parse_options(&self, scope: ScopeMode) -> ParseOptions {
        ParseOptions {
            allow_top_level_return: scope.allows_top_level_return(),
            max_nesting_depth: self.max_nesting_depth,
        }
    }
}

/// Errors from loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_call_depth, 48);
        assert_eq!(config.max_nesting_depth, 32);
        assert_eq!(config.default_scope, ScopeMode::Shared);
        assert_eq!(config.file_name, "<anonymous>");
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"default_scope": "isolated"}"#).unwrap();
        assert_eq!(config.default_scope, ScopeMode::Isolated);
        assert_eq!(config.max_format_depth, 64);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = EngineConfig::from_json(r#"{"max_call_depth": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "max_call_depth must be at least 1");
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EngineConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_parse_options_follow_scope() {
        let config = EngineConfig::default();
        assert!(config.parse_options(ScopeMode::Isolated).allow_top_level_return);
        assert!(!config.parse_options(ScopeMode::Shared).allow_top_level_return);
    }
}
