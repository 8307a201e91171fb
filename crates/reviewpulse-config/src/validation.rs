// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation. Collects every failure instead of
//! stopping at the first.

use crate::diagnostic::ConfigError;
use crate::model::ReviewPulseConfig;

/// Minimum progress stream polling interval.
const MIN_POLL_INTERVAL_MS: u64 = 100;

pub fn validate_config(config: &ReviewPulseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }

    if !has_scheme(&config.redis.url, &["redis://", "rediss://"]) {
        fail("redis.url must start with redis:// or rediss://".to_string());
    }

    if !has_scheme(&config.rabbitmq.url, &["amqp://", "amqps://"]) {
        fail("rabbitmq.url must start with amqp:// or amqps://".to_string());
    }

    let rabbit = &config.rabbitmq;
    if rabbit.jobs_queue.trim().is_empty() {
        fail("rabbitmq.jobs_queue must not be empty".to_string());
    }
    if rabbit.results_queue.trim().is_empty() {
        fail("rabbitmq.results_queue must not be empty".to_string());
    }
    if !rabbit.jobs_queue.is_empty() && rabbit.jobs_queue == rabbit.results_queue {
        fail(format!(
            "rabbitmq.jobs_queue and rabbitmq.results_queue must differ, both are `{}`",
            rabbit.jobs_queue
        ));
    }

    if config.session.ttl_secs < 1 {
        fail("session.ttl_secs must be at least 1".to_string());
    }
    if config.session.stream_poll_interval_ms < MIN_POLL_INTERVAL_MS {
        fail(format!(
            "session.stream_poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
            config.session.stream_poll_interval_ms
        ));
    }

    let temperature = config.analysis.temperature;
    if !(0.0..=1.0).contains(&temperature) {
        fail(format!(
            "analysis.temperature must be between 0.0 and 1.0, got {temperature}"
        ));
    }

    if config.rate_limit.max_requests < 1 {
        fail("rate_limit.max_requests must be at least 1".to_string());
    }
    if config.rate_limit.window_secs < 1 {
        fail("rate_limit.window_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// URLs may carry credentials, so messages name the field, never the value.
fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    schemes.iter().any(|s| url.starts_with(s))
}
