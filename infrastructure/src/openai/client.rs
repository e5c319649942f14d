//! Chat completions client implementing [`LlmClient`].

use super::endpoint::{DEFAULT_API_VERSION, EndpointProfile};
use super::types::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use bridge_application::ports::llm_client::{LlmClient, LlmError};
use bridge_domain::util::log_preview;
use bridge_domain::{Completion, ConversationTurn, FunctionSchema};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback wait when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Settings for the completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// `None` selects the hosted OpenAI endpoint.
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout: Duration,
    /// Only used for managed-cloud deployments.
    pub api_version: String,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            model: model.into(),
            timeout: Duration::from_secs(120),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

/// Stateless client for an OpenAI-compatible chat completions endpoint
pub struct OpenAiClient {
    http: reqwest::Client,
    profile: EndpointProfile,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Network(format!("failed to build HTTP client: {}", e)))?;

        let profile = EndpointProfile::detect(
            settings.endpoint.as_deref(),
            &settings.model,
            &settings.api_version,
        );
        debug!(
            "LLM client: {} at {} (model {})",
            profile.describe(),
            profile.base_url(),
            settings.model
        );

        Ok(Self {
            http,
            profile,
            api_key: settings.api_key,
            model: settings.model,
        })
    }

    pub fn profile(&self) -> &EndpointProfile {
        &self.profile
    }
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[FunctionSchema],
    ) -> Result<Completion, LlmError> {
        let request = ApiRequest::new(&self.model, turns, tools);
        let (header, value) = self.profile.auth_header(&self.api_key);

        debug!(
            "POST chat completion: {} turns, {} tools",
            turns.len(),
            tools.len()
        );

        let response = self
            .http
            .post(self.profile.completions_url())
            .header(header, value)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after_secs(&response);
            warn!("LLM endpoint rate limited; retry after {}s", retry_after_secs);
            return Err(LlmError::RateLimited { retry_after_secs });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Authentication(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::InvalidResponse(format!("{} (body: {})", e, log_preview(&body, 200)))
        })?;
        let completion = parsed
            .into_completion()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        debug!(
            "Completion: {} tool calls, text {}",
            completion.tool_calls.len(),
            completion
                .non_empty_text()
                .map(|t| log_preview(t, 80))
                .unwrap_or_else(|| "<none>".to_string())
        );
        Ok(completion)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
