//! Endpoint profiles for OpenAI-compatible chat completion APIs.
//!
//! | Profile | Base URL | Auth |
//! |---------|----------|------|
//! | [`OpenAi`](EndpointProfile::OpenAi) | `https://api.openai.com/v1` | `Authorization: Bearer` |
//! | [`AzureDeployment`](EndpointProfile::AzureDeployment) | `<endpoint>/openai/deployments/<model>` + `api-version` | `api-key` |
//! | [`Custom`](EndpointProfile::Custom) | the configured endpoint | `Authorization: Bearer` |

/// Base URL of the hosted OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `api-version` query value for managed-cloud deployments.
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Hosts that identify a managed-cloud (Azure) deployment.
const AZURE_HOST_MARKERS: [&str; 2] = ["cognitiveservices.azure.com", "openai.azure.com"];

/// Where completion requests go and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointProfile {
    OpenAi,
    AzureDeployment {
        base_url: String,
        api_version: String,
    },
    Custom {
        base_url: String,
    },
}

impl EndpointProfile {
    /// Pick a profile from the configured endpoint.
    ///
    /// No endpoint (or a blank one) selects the hosted default. An endpoint
    /// on an Azure host is turned into that model's deployment URL. Anything
    /// else is used as-is, minus a trailing slash.
    pub fn detect(endpoint: Option<&str>, model: &str, api_version: &str) -> Self {
        let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) else {
            return EndpointProfile::OpenAi;
        };
        let endpoint = endpoint.trim_end_matches('/');

        if AZURE_HOST_MARKERS.iter().any(|m| endpoint.contains(m)) {
            EndpointProfile::AzureDeployment {
                base_url: format!("{}/openai/deployments/{}", endpoint, model),
                api_version: api_version.to_string(),
            }
        } else {
            EndpointProfile::Custom {
                base_url: endpoint.to_string(),
            }
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            EndpointProfile::OpenAi => DEFAULT_BASE_URL,
            EndpointProfile::AzureDeployment { base_url, .. } => base_url,
            EndpointProfile::Custom { base_url } => base_url,
        }
    }

    /// Full URL of the chat completions resource.
    pub fn completions_url(&self) -> String {
        match self {
            EndpointProfile::AzureDeployment {
                base_url,
                api_version,
            } => format!(
                "{}/chat/completions?api-version={}",
                base_url, api_version
            ),
            other => format!("{}/chat/completions", other.base_url()),
        }
    }

    /// Header carrying the API key.
    pub fn auth_header(&self, api_key: &str) -> (&'static str, String) {
        match self {
            EndpointProfile::AzureDeployment { .. } => ("api-key", api_key.to_string()),
            _ => ("Authorization", format!("Bearer {}", api_key)),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            EndpointProfile::OpenAi => "OpenAI (default endpoint)",
            EndpointProfile::AzureDeployment { .. } => "Azure OpenAI deployment",
            EndpointProfile::Custom { .. } => "custom endpoint",
        }
    }
}
