// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI analysis backend for ReviewPulse.
//!
//! Implements [`AnalysisProvider`] over the Chat Completions API, sending the
//! shared system prompt as a system message and the review block as the
//! user message.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use reviewpulse_config::ReviewPulseConfig;
use reviewpulse_core::analysis::{build_prompt, parse_analysis};
use reviewpulse_core::{
    AdapterType, AnalysisProvider, AnalysisResult, HealthStatus, PluginAdapter, Review,
    ReviewPulseError,
};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI-backed review analyzer.
pub struct OpenAiAnalyzer {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiAnalyzer {
    /// Builds the analyzer. The key comes from `openai.api_key`, then `OPENAI_API_KEY`.
    pub fn new(config: &ReviewPulseConfig) -> Result<Self, ReviewPulseError> {
        let api_key = resolve_api_key(
            config.openai.api_key.as_deref(),
            std::env::var(API_KEY_ENV).ok(),
        )?;
        let client = OpenAiClient::new(&api_key, Duration::from_secs(config.analysis.timeout_secs))?;
        info!(model = %config.openai.model, "OpenAI analyzer initialized");
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: OpenAiClient, config: &ReviewPulseConfig) -> Self {
        Self {
            client,
            model: config.openai.model.clone(),
            temperature: config.analysis.temperature,
            max_tokens: config.analysis.max_tokens,
        }
    }
}

fn resolve_api_key(
    config_key: Option<&str>,
    env_key: Option<String>,
) -> Result<String, ReviewPulseError> {
    config_key
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or(env_key.filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            ReviewPulseError::Config(format!(
                "OpenAI API key not found. Set openai.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })
}

#[async_trait]
impl PluginAdapter for OpenAiAnalyzer {
    fn name(&self) -> &str {
        "openai"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReviewPulseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReviewPulseError> {
        Ok(())
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiAnalyzer {
    async fn analyze(
        &self,
        reviews: &[Review],
        language: &str,
    ) -> Result<AnalysisResult, ReviewPulseError> {
        let prompt = build_prompt(reviews, language);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompt.system),
                ChatMessage::user(prompt.user),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(model = %self.model, reviews = reviews.len(), language = prompt.language, "requesting analysis");

        let response = self.client.complete(&request).await?;
        parse_analysis(response.first_content().unwrap_or_default(), prompt.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewpulse_test_utils::fixtures::sample_reviews;
    use tracing_test::traced_test;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANALYSIS_JSON: &str = r#"{"summary":"Mixed.","pros":["a","b","c"],"cons":["x","y","z"],"sentiment":{"positive":1,"neutral":1,"negative":0},"keywords":["k1","k2","k3","k4","k5"]}"#;

    fn analyzer(server: &MockServer, api_key: &str) -> OpenAiAnalyzer {
        let client = OpenAiClient::new(api_key, Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        OpenAiAnalyzer::with_client(client, &ReviewPulseConfig::default())
    }

    fn reply(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        }))
    }

    #[test]
    fn api_key_resolution() {
        assert_eq!(resolve_api_key(Some("sk-cfg"), None).unwrap(), "sk-cfg");
        assert_eq!(resolve_api_key(None, Some("sk-env".into())).unwrap(), "sk-env");
        assert!(resolve_api_key(Some(""), Some(String::new())).is_err());
    }

    #[tokio::test]
    async fn analyzes_in_requested_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Respond ENTIRELY in Spanish"))
            .and(body_string_contains("\"model\":\"gpt-4o-mini\""))
            .respond_with(reply(serde_json::json!(ANALYSIS_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let result = analyzer(&server, "sk-test")
            .analyze(&sample_reviews(2), "es")
            .await
            .unwrap();
        assert_eq!(result.language, "es");
        assert_eq!(result.pros.len(), 3);
    }

    #[tokio::test]
    async fn null_content_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(serde_json::Value::Null))
            .mount(&server)
            .await;

        let err = analyzer(&server, "sk-test")
            .analyze(&sample_reviews(1), "en")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty response"), "got: {err}");
    }

    #[traced_test]
    #[tokio::test]
    async fn api_key_never_leaks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let secret = "sk-proj-super-secret";
        let err = analyzer(&server, secret)
            .analyze(&sample_reviews(1), "vi")
            .await
            .unwrap_err();
        assert!(!err.to_string().contains(secret));
        assert!(!logs_contain(secret));
    }
}
