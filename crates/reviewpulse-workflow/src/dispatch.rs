// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job dispatch: one session, one published scrape job.

use std::sync::Arc;

use tracing::{error, info};

use reviewpulse_core::catalog::{is_supported_language, supported_platform_names};
use reviewpulse_core::{MessageBroker, ReviewPulseError, ScrapeJob, Session, SessionStatus};

use crate::session::SessionService;

/// Message recorded on a session whose job could not be published.
pub const ENQUEUE_FAILED: &str = "failed to enqueue scraping job";

/// Starts workflows. Publication is never retried.
#[derive(Clone)]
pub struct Dispatcher {
    sessions: SessionService,
    broker: Arc<dyn MessageBroker>,
}

impl Dispatcher {
    pub fn new(sessions: SessionService, broker: Arc<dyn MessageBroker>) -> Self {
        Self { sessions, broker }
    }

    /// Creates a session, marks it `scraping`, and publishes its job.
    ///
    /// Returns the session as of the publish. Any failure after the session
    /// exists leaves it in `error`, so observers never wait on a job that was
    /// not sent. Inputs are checked before anything is written.
    pub async fn dispatch(
        &self,
        url: &str,
        platform: &str,
        output_language: &str,
    ) -> Result<Session, ReviewPulseError> {
        check_submission(url, platform, output_language)?;
        let created = self.sessions.create(url, platform, output_language).await?;
        let token = created.token.clone();

        let session = match self
            .sessions
            .update_status(&token, SessionStatus::Scraping)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                self.abandon(&token, "failed to start scraping").await;
                return Err(e);
            }
        };

        let job = ScrapeJob {
            token: token.clone(),
            url: session.url.clone(),
            platform: session.platform.clone(),
        };
        if let Err(e) = self.broker.publish_job(&job).await {
            error!(token = %token, error = %e, "failed to publish scrape job");
            self.abandon(&token, ENQUEUE_FAILED).await;
            return Err(e);
        }

        info!(token = %token, platform, language = output_language, "scrape job dispatched");
        Ok(session)
    }

    async fn abandon(&self, token: &str, message: &str) {
        if let Err(e) = self.sessions.set_error(token, message).await {
            error!(token, error = %e, "failed to mark session as failed");
        }
    }
}

fn check_submission(url: &str, platform: &str, language: &str) -> Result<(), ReviewPulseError> {
    if url.trim().is_empty() {
        return Err(ReviewPulseError::Validation("url is required".into()));
    }
    if !supported_platform_names().contains(&platform) {
        return Err(ReviewPulseError::Validation("unsupported platform".into()));
    }
    if !is_supported_language(language) {
        return Err(ReviewPulseError::Validation("unsupported language".into()));
    }
    Ok(())
}
