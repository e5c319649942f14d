//! Bridge behavior configuration from TOML (`[bridge]` section)

use bridge_application::ExecutionParams;
use bridge_domain::{ConfigIssue, ConfigIssueCode, DEFAULT_SYSTEM_PROMPT, DEFAULT_WELCOME_MESSAGE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw bridge configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBridgeConfig {
    /// Persona and formatting instructions sent as the system turn
    pub system_prompt: String,
    /// Greeting for members joining the conversation
    pub welcome_message: String,
    /// Tool-call rounds allowed per message
    pub max_tool_turns: usize,
    /// Wall-clock budget per message in seconds; 0 disables it
    pub time_budget_secs: u64,
}

impl Default for FileBridgeConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            max_tool_turns: 10,
            time_budget_secs: 300,
        }
    }
}

impl FileBridgeConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_tool_turns(self.max_tool_turns)
            .with_time_budget(
                (self.time_budget_secs > 0).then(|| Duration::from_secs(self.time_budget_secs)),
            )
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_tool_turns == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroLimit {
                    field: "bridge.max_tool_turns".to_string(),
                },
                "bridge.max_tool_turns is 0; any tool request will exceed the budget",
            ));
        }
        if self.system_prompt.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyField {
                    field: "bridge.system_prompt".to_string(),
                },
                "bridge.system_prompt is empty",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time_budget_disables_it() {
        let config = FileBridgeConfig {
            max_tool_turns: 4,
            time_budget_secs: 0,
            ..Default::default()
        };
        let params = config.to_execution_params();
        assert_eq!(params.max_tool_turns, 4);
        assert!(params.time_budget.is_none());

        let params = FileBridgeConfig::default().to_execution_params();
        assert_eq!(params.time_budget, Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_turns_is_warning() {
        let config = FileBridgeConfig {
            max_tool_turns: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }
}
