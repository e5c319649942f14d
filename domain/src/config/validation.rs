//! Configuration validation results.
//!
//! Loaders report problems as structured [`ConfigIssue`]s instead of failing
//! outright, so the binary can log warnings and still start.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A required string field is empty.
    EmptyField { field: String },
    /// A numeric limit is zero where at least one is needed.
    ZeroLimit { field: String },
    /// No API key could be found in config or environment.
    MissingApiKey { env_var: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_severity() {
        let issue = ConfigIssue::error(
            ConfigIssueCode::EmptyField {
                field: "llm.model".to_string(),
            },
            "llm.model is empty",
        );
        assert!(issue.is_error());

        let issue = ConfigIssue::warning(
            ConfigIssueCode::ZeroLimit {
                field: "bridge.max_tool_turns".to_string(),
            },
            "no tool turns allowed",
        );
        assert!(!issue.is_error());
        assert_eq!(issue.severity, Severity::Warning);
    }
}
