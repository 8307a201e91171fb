// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result consumption: drives each session from `scraping` to a terminal state.
//!
//! Results arrive already acknowledged, so nothing here is redelivered. Every
//! failure is resolved by recording it on the session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use reviewpulse_core::{AnalysisProvider, ScrapeResult, Session, SessionStatus};

use crate::session::SessionService;

pub const NO_REVIEWS: &str = "No reviews found for this product";
pub const STORE_REVIEWS_FAILED: &str = "Failed to store reviews";
pub const SESSION_EXPIRED: &str = "Session expired during analysis";
pub const ANALYSIS_FAILED: &str = "AI analysis failed";
pub const STORE_ANALYSIS_FAILED: &str = "Failed to store analysis";
pub const INTERRUPTED: &str = "Analysis interrupted by gateway shutdown";

/// How one result was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Analysis stored.
    Completed { reviews: usize, language: String },
    /// The workflow ended in `error` with this message.
    Failed(String),
    /// The session was not waiting for a result and was left untouched.
    Ignored(SessionStatus),
}

/// The single long-lived handler of scrape results.
#[derive(Clone)]
pub struct ResultConsumer {
    sessions: SessionService,
    analyzer: Arc<dyn AnalysisProvider>,
}

impl ResultConsumer {
    pub fn new(sessions: SessionService, analyzer: Arc<dyn AnalysisProvider>) -> Self {
        Self { sessions, analyzer }
    }

    /// Processes results one at a time until cancelled or the channel closes.
    ///
    /// Results already handed over when cancellation fires were acknowledged
    /// upstream, so they are drained and their sessions marked interrupted.
    pub async fn run(self, mut results: mpsc::Receiver<ScrapeResult>, cancel: CancellationToken) {
        info!("result consumer started");
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                next = results.recv() => match next {
                    Some(result) => result,
                    None => {
                        warn!("result channel closed");
                        info!("result consumer stopped");
                        return;
                    }
                },
            };
            self.process(result).await;
        }

        let mut drained = 0usize;
        while let Some(result) = results.recv().await {
            drained += 1;
            self.interrupt(&result.token).await;
        }
        info!(drained, "result consumer stopped");
    }

    /// Resolves one result to a terminal session state.
    ///
    /// Only a session in `scraping` accepts a result; anything else is a
    /// stray or duplicate delivery and is ignored.
    pub async fn process(&self, result: ScrapeResult) -> Outcome {
        let token = result.token.as_str();

        if let Err(outcome) = self.awaiting_result(token).await {
            return outcome;
        }

        if let Some(scrape_error) = result.scrape_error() {
            warn!(token, error = scrape_error, "scraping failed");
            return self.fail(token, format!("Scraping failed: {scrape_error}")).await;
        }
        if result.reviews.is_empty() {
            return self.fail(token, NO_REVIEWS.to_string()).await;
        }

        if let Err(e) = self.sessions.store_reviews(token, &result.reviews).await {
            error!(token, error = %e, "failed to store reviews");
            return self.fail(token, STORE_REVIEWS_FAILED.to_string()).await;
        }

        let session = match self
            .sessions
            .update_status(token, SessionStatus::Analyzing)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                error!(token, error = %e, "failed to start analysis");
                return self.fail(token, SESSION_EXPIRED.to_string()).await;
            }
        };

        let analysis = match self
            .analyzer
            .analyze(&result.reviews, &session.output_language)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                error!(token, provider = self.analyzer.name(), error = %e, "analysis failed");
                return self.fail(token, ANALYSIS_FAILED.to_string()).await;
            }
        };

        if let Err(e) = self.sessions.store_analysis(token, &analysis).await {
            error!(token, error = %e, "failed to store analysis");
            return self.fail(token, STORE_ANALYSIS_FAILED.to_string()).await;
        }

        if let Err(e) = self
            .sessions
            .update_status(token, SessionStatus::Complete)
            .await
        {
            error!(token, error = %e, "failed to mark session complete");
        }

        info!(
            token,
            reviews = result.reviews.len(),
            language = %analysis.language,
            "analysis complete"
        );
        Outcome::Completed {
            reviews: result.reviews.len(),
            language: analysis.language,
        }
    }

    /// Loads the session and checks it is waiting for a scrape result.
    async fn awaiting_result(&self, token: &str) -> Result<Session, Outcome> {
        match self.sessions.get(token).await {
            Ok(session) if session.status == SessionStatus::Scraping => Ok(session),
            Ok(session) => {
                warn!(token, status = %session.status, "ignoring result for session not awaiting one");
                Err(Outcome::Ignored(session.status))
            }
            Err(e) if e.is_not_found() => {
                warn!(token, "result for unknown or expired session");
                Err(Outcome::Failed(SESSION_EXPIRED.to_string()))
            }
            Err(e) => {
                error!(token, error = %e, "failed to load session for result");
                Err(self.fail(token, SESSION_EXPIRED.to_string()).await)
            }
        }
    }

    async fn interrupt(&self, token: &str) {
        match self.awaiting_result(token).await {
            Ok(_) => {
                warn!(token, "result dropped by shutdown");
                self.fail(token, INTERRUPTED.to_string()).await;
            }
            Err(outcome) => debug!(token, ?outcome, "drained result needed no action"),
        }
    }

    async fn fail(&self, token: &str, message: String) -> Outcome {
        if let Err(e) = self.sessions.set_error(token, &message).await {
            error!(token, error = %e, "failed to record workflow error");
        }
        Outcome::Failed(message)
    }
}
