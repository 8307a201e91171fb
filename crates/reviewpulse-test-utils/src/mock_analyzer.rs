// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock analysis backend for deterministic testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use reviewpulse_core::catalog::normalize_language;
use reviewpulse_core::{
    AdapterType, AnalysisProvider, AnalysisResult, HealthStatus, PluginAdapter, Review,
    ReviewPulseError,
};

use crate::fixtures::sample_analysis;

/// One recorded `analyze` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeCall {
    pub review_count: usize,
    pub language: String,
}

/// A mock backend that replays scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a
/// [`sample_analysis`] in the normalized language is returned.
#[derive(Default)]
pub struct MockAnalyzer {
    outcomes: Mutex<VecDeque<Result<AnalysisResult, String>>>,
    calls: Mutex<Vec<AnalyzeCall>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful outcome.
    pub async fn push_result(&self, result: AnalysisResult) {
        self.outcomes.lock().await.push_back(Ok(result));
    }

    /// Queues a failure with the given provider message.
    pub async fn push_failure(&self, message: &str) {
        self.outcomes
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    /// Calls received so far.
    pub async fn calls(&self) -> Vec<AnalyzeCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockAnalyzer {
    fn name(&self) -> &str {
        "mock-analyzer"
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
impl AnalysisProvider for MockAnalyzer {
    async fn analyze(
        &self,
        reviews: &[Review],
        language: &str,
    ) -> Result<AnalysisResult, ReviewPulseError> {
        self.calls.lock().await.push(AnalyzeCall {
            review_count: reviews.len(),
            language: language.to_string(),
        });
        let (code, _) = normalize_language(language);
        match self.outcomes.lock().await.pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(ReviewPulseError::Provider {
                message,
                source: None,
            }),
            None => Ok(sample_analysis(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_reviews;

    #[tokio::test]
    async fn replays_then_falls_back() {
        let analyzer = MockAnalyzer::new();
        analyzer.push_failure("boom").await;

        let err = analyzer.analyze(&sample_reviews(2), "vi").await.unwrap_err();
        assert!(err.to_string().contains("boom"));

        let ok = analyzer.analyze(&sample_reviews(3), "xx").await.unwrap();
        assert_eq!(ok.language, "en");

        let calls = analyzer.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].review_count, 2);
        assert_eq!(calls[0].language, "vi");
    }
}
