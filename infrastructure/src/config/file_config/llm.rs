//! LLM endpoint configuration from TOML (`[llm]` section)

use crate::openai::{DEFAULT_API_VERSION, OpenAiSettings};
use bridge_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw LLM configuration from TOML
///
/// ```toml
/// [llm]
/// api_key_env = "OPENAI_API_KEY"
/// endpoint = "https://my-resource.openai.azure.com"
/// model = "gpt-4o"
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Endpoint base; unset selects the hosted OpenAI API
    pub endpoint: Option<String>,
    /// Model (or deployment) name
    pub model: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// `api-version` for managed-cloud deployments
    pub api_version: String,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            endpoint: None,
            model: "gpt-4o".to_string(),
            timeout_secs: 120,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl FileLlmConfig {
    /// The inline key if set, otherwise the value of `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    /// Client settings; a missing key yields an empty string (reported by
    /// [`validate`](Self::validate)).
    pub fn to_settings(&self) -> OpenAiSettings {
        let mut settings = OpenAiSettings::new(
            self.resolve_api_key().unwrap_or_default(),
            self.model.clone(),
        )
        .with_timeout(Duration::from_secs(self.timeout_secs))
        .with_api_version(self.api_version.clone());
        if let Some(endpoint) = self.endpoint.as_ref().filter(|e| !e.trim().is_empty()) {
            settings = settings.with_endpoint(endpoint.clone());
        }
        settings
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyField {
                    field: "llm.model".to_string(),
                },
                "llm.model must not be empty",
            ));
        }
        if self.resolve_api_key().is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey {
                    env_var: self.api_key_env.clone(),
                },
                format!(
                    "No API key: set llm.api_key or the {} environment variable",
                    self.api_key_env
                ),
            ));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroLimit {
                    field: "llm.timeout_secs".to_string(),
                },
                "llm.timeout_secs is 0; every request will time out immediately",
            ));
        }

        issues
    }
}
