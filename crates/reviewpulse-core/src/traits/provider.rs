// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analysis provider trait for hosted summarization backends (Anthropic, OpenAI).

use async_trait::async_trait;

use crate::error::ReviewPulseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AnalysisResult, Review};

/// Capability: turn a list of reviews into an [`AnalysisResult`].
///
/// Implementations follow the contract in [`crate::analysis`]: unknown
/// language codes fall back to English, and any backend error, empty body,
/// or unparseable body surfaces as a single `Provider` error whose message
/// never includes credentials.
#[async_trait]
pub trait AnalysisProvider: PluginAdapter {
    /// Summarizes `reviews`, writing the output in `language`.
    async fn analyze(
        &self,
        reviews: &[Review],
        language: &str,
    ) -> Result<AnalysisResult, ReviewPulseError>;
}
