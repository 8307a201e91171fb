// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude analysis backend for ReviewPulse.
//!
//! Implements [`AnalysisProvider`] over the Anthropic Messages API using the
//! shared prompt contract in [`reviewpulse_core::analysis`].

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

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic-backed review analyzer.
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicAnalyzer {
    client: AnthropicClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicAnalyzer {
    pub fn new(config: &ReviewPulseConfig) -> Result<Self, ReviewPulseError> {
        let api_key = resolve_api_key(
            config.anthropic.api_key.as_deref(),
            std::env::var(API_KEY_ENV).ok(),
        )?;
        let client = AnthropicClient::new(
            &api_key,
            &config.anthropic.api_version,
            Duration::from_secs(config.analysis.timeout_secs),
        )?;

        info!(model = %config.anthropic.model, "Anthropic analyzer initialized");
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: AnthropicClient, config: &ReviewPulseConfig) -> Self {
        Self {
            client,
            model: config.anthropic.model.clone(),
            temperature: config.analysis.temperature,
            max_tokens: config.analysis.max_tokens,
        }
    }
}

/// Picks the configured key, falling back to the environment value.
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
                "Anthropic API key not found. Set anthropic.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })
}

#[async_trait]
impl PluginAdapter for AnthropicAnalyzer {
    fn name(&self) -> &str {
        "anthropic"
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
impl AnalysisProvider for AnthropicAnalyzer {
    async fn analyze(
        &self,
        reviews: &[Review],
        language: &str,
    ) -> Result<AnalysisResult, ReviewPulseError> {
        let prompt = build_prompt(reviews, language);
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: prompt.system,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: prompt.user,
            }],
        };
        debug!(model = %self.model, reviews = reviews.len(), language = prompt.language, "requesting analysis");

        let response = self.client.complete_message(&request).await?;
        parse_analysis(response.first_text().unwrap_or_default(), prompt.language)
    }
}
