// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events progress stream for `GET /analyze/{token}/stream`.
//!
//! The stream re-reads the session on a fixed interval and diffs its status
//! against the last one sent:
//!
//! ```text
//! event: status
//! data: {"status":"analyzing","message":"Analyzing reviews with AI..."}
//!
//! : heartbeat
//! ```
//!
//! A terminal status ends the stream after its event. A failed lookup emits
//! one `error` event and ends the stream.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use serde::Serialize;
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use reviewpulse_core::{Session, SessionStatus};

use crate::error::ApiError;
use crate::server::GatewayState;

const FALLBACK_ERROR: &str = "An error occurred.";
const LOOKUP_FAILED: &str = "session expired or not found";

/// Payload of a `status` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: SessionStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Status unchanged since the last observation.
    KeepAlive,
    Status { update: StatusUpdate, terminal: bool },
}

/// Remembers the last status sent on one stream.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: Option<SessionStatus>,
}

impl ProgressTracker {
    pub fn observe(&mut self, session: &Session) -> Step {
        if self.last == Some(session.status) {
            return Step::KeepAlive;
        }
        self.last = Some(session.status);
        Step::Status {
            update: StatusUpdate {
                status: session.status,
                message: status_message(session),
            },
            terminal: session.status.is_terminal(),
        }
    }
}

/// Human-readable text for the session's current status.
pub fn status_message(session: &Session) -> String {
    match session.status {
        SessionStatus::Pending => "Waiting to start...".to_string(),
        SessionStatus::Scraping => format!("Scraping reviews from {}...", session.platform),
        SessionStatus::Analyzing => "Analyzing reviews with AI...".to_string(),
        SessionStatus::Complete => "Analysis complete!".to_string(),
        SessionStatus::Error => session
            .error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ERROR)
            .to_string(),
    }
}

fn status_event(update: &StatusUpdate) -> Event {
    Event::default()
        .event("status")
        .data(json!(update).to_string())
}

fn lookup_failed_event() -> Event {
    Event::default()
        .event("error")
        .data(json!({"status": "error", "message": LOOKUP_FAILED}).to_string())
}

/// Streams status transitions of one session until it terminates, the
/// client disconnects, or the process shuts down.
pub async fn stream_progress(
    State(state): State<GatewayState>,
    Path(token): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if !state.sessions.exists(&token).await? {
        return Err(ApiError::SessionNotFound);
    }

    let sessions = state.sessions.clone();
    let shutdown = state.shutdown.clone();
    let poll_interval = state.poll_interval;

    let stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tracker = ProgressTracker::default();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(token = %token, "progress stream closed by shutdown");
                    break;
                }
                _ = ticker.tick() => {}
            }

            match sessions.get(&token).await {
                Ok(session) => match tracker.observe(&session) {
                    Step::KeepAlive => yield Ok(Event::default().comment("heartbeat")),
                    Step::Status { update, terminal } => {
                        yield Ok(status_event(&update));
                        if terminal {
                            break;
                        }
                    }
                },
                Err(e) => {
                    debug!(token = %token, error = %e, "progress stream lost its session");
                    yield Ok(lookup_failed_event());
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(status: SessionStatus, error: Option<&str>) -> Session {
        Session {
            token: "tok".into(),
            url: "https://shopee.vn/item/1".into(),
            platform: "shopee".into(),
            status,
            output_language: "vi".into(),
            error_message: error.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn first_observation_always_emits() {
        let mut tracker = ProgressTracker::default();
        let step = tracker.observe(&session(SessionStatus::Scraping, None));
        assert_eq!(
            step,
            Step::Status {
                update: StatusUpdate {
                    status: SessionStatus::Scraping,
                    message: "Scraping reviews from shopee...".into(),
                },
                terminal: false,
            }
        );
    }

    #[test]
    fn unchanged_status_is_keep_alive() {
        let mut tracker = ProgressTracker::default();
        tracker.observe(&session(SessionStatus::Analyzing, None));
        assert_eq!(
            tracker.observe(&session(SessionStatus::Analyzing, None)),
            Step::KeepAlive
        );
    }

    #[test]
    fn terminal_statuses_end_the_stream() {
        let mut tracker = ProgressTracker::default();
        match tracker.observe(&session(SessionStatus::Complete, None)) {
            Step::Status { update, terminal } => {
                assert!(terminal);
                assert_eq!(update.message, "Analysis complete!");
            }
            other => panic!("expected status, got {other:?}"),
        }
    }

    #[test]
    fn error_message_falls_back_when_missing() {
        assert_eq!(
            status_message(&session(SessionStatus::Error, Some("AI analysis failed"))),
            "AI analysis failed"
        );
        assert_eq!(
            status_message(&session(SessionStatus::Error, None)),
            FALLBACK_ERROR
        );
        assert_eq!(
            status_message(&session(SessionStatus::Pending, None)),
            "Waiting to start..."
        );
    }
}
