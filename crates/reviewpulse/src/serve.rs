// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reviewpulse serve` command implementation.
//!
//! Connects the shared store and the broker, picks the analysis backend,
//! starts the result consumer, and serves HTTP until a shutdown signal.

use std::sync::Arc;

use reviewpulse_anthropic::AnthropicAnalyzer;
use reviewpulse_config::{ProviderKind, ReviewPulseConfig};
use reviewpulse_core::{AnalysisProvider, MessageBroker, PluginAdapter, ReviewPulseError};
use reviewpulse_gateway::GatewayState;
use reviewpulse_openai::OpenAiAnalyzer;
use reviewpulse_queue::AmqpBroker;
use reviewpulse_store::RedisStore;
use reviewpulse_workflow::{ResultConsumer, SessionService, shutdown};
use tracing::{error, info, warn};

/// Runs the `reviewpulse serve` command.
///
/// Store and broker connectivity are checked before anything is served; a
/// failure there aborts startup.
pub async fn run_serve(config: ReviewPulseConfig) -> Result<(), ReviewPulseError> {
    init_tracing(&config.server.log_level);

    info!(service = %config.server.service_name, "starting reviewpulse serve");

    let store = Arc::new(RedisStore::new(config.redis.clone()));
    store.connect().await?;
    info!("shared store connected");

    let broker = Arc::new(AmqpBroker::new(config.rabbitmq.clone()));
    broker.connect().await?;
    info!(
        jobs = %config.rabbitmq.jobs_queue,
        results = %config.rabbitmq.results_queue,
        "broker connected"
    );

    let analyzer = build_analyzer(&config)?;
    info!(provider = analyzer.name(), "analysis backend ready");

    let cancel = shutdown::install_signal_handler();

    let results = broker.subscribe_results(cancel.clone()).await?;
    let consumer = ResultConsumer::new(
        SessionService::from_config(store.clone(), &config.session),
        analyzer.clone(),
    );
    let consumer_task = tokio::spawn(consumer.run(results, cancel.clone()));

    let state = GatewayState::new(&config, store.clone(), broker.clone(), cancel.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let served = reviewpulse_gateway::serve(&addr, state).await;

    // The server may stop on its own (bind failure); take everything else down too.
    cancel.cancel();
    if let Err(e) = consumer_task.await {
        warn!(error = %e, "result consumer task ended abnormally");
    }

    shutdown_adapter(store.as_ref()).await;
    shutdown_adapter(broker.as_ref()).await;
    shutdown_adapter(analyzer.as_ref()).await;

    if let Err(e) = &served {
        error!(error = %e, "gateway stopped with an error");
    }
    info!("reviewpulse serve shutdown complete");
    served
}

async fn shutdown_adapter<A: PluginAdapter + ?Sized>(adapter: &A) {
    if let Err(e) = adapter.shutdown().await {
        warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
    }
}

/// Builds the analysis backend named by `analysis.provider`.
fn build_analyzer(config: &ReviewPulseConfig) -> Result<Arc<dyn AnalysisProvider>, ReviewPulseError> {
    let analyzer: Arc<dyn AnalysisProvider> = match config.analysis.provider {
        ProviderKind::Anthropic => Arc::new(AnthropicAnalyzer::new(config)?),
        ProviderKind::OpenAi => Arc::new(OpenAiAnalyzer::new(config)?),
    };
    Ok(analyzer)
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reviewpulse={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_backend_from_config() {
        let mut config = ReviewPulseConfig::default();
        config.anthropic.api_key = Some("sk-ant-test".into());
        config.openai.api_key = Some("sk-openai-test".into());

        let analyzer = build_analyzer(&config).unwrap();
        assert_eq!(analyzer.name(), "anthropic");

        config.analysis.provider = ProviderKind::OpenAi;
        let analyzer = build_analyzer(&config).unwrap();
        assert_eq!(analyzer.name(), "openai");
    }
}
