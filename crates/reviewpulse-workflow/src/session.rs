// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session records in the shared store.
//!
//! Each token owns three keys that share one TTL:
//! `session:{token}:meta`, `session:{token}:reviews` and
//! `session:{token}:analysis`. Expiry is the only teardown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use reviewpulse_config::model::SessionConfig;
use reviewpulse_core::{
    AnalysisResult, Review, ReviewPulseError, Session, SessionStatus, StateStore,
};

pub fn meta_key(token: &str) -> String {
    format!("session:{token}:meta")
}

pub fn reviews_key(token: &str) -> String {
    format!("session:{token}:reviews")
}

pub fn analysis_key(token: &str) -> String {
    format!("session:{token}:analysis")
}

/// Reads and writes session records. Cheap to clone.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn StateStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn StateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn from_config(store: Arc<dyn StateStore>, config: &SessionConfig) -> Self {
        Self::new(store, Duration::from_secs(config.ttl_secs))
    }

    /// Creates a `pending` session under a fresh random token.
    pub async fn create(
        &self,
        url: &str,
        platform: &str,
        output_language: &str,
    ) -> Result<Session, ReviewPulseError> {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            url: url.to_string(),
            platform: platform.to_string(),
            status: SessionStatus::Pending,
            output_language: output_language.to_string(),
            error_message: None,
            created_at: Utc::now(),
        };
        self.save(&session).await?;
        debug!(token = %session.token, platform, "session created");
        Ok(session)
    }

    /// Loads a session. Missing and expired tokens are `NotFound`.
    pub async fn get(&self, token: &str) -> Result<Session, ReviewPulseError> {
        self.read_json(&meta_key(token))
            .await?
            .ok_or_else(|| ReviewPulseError::NotFound {
                token: token.to_string(),
            })
    }

    /// Moves a session to `status`, refusing any move the status graph forbids.
    pub async fn update_status(
        &self,
        token: &str,
        status: SessionStatus,
    ) -> Result<Session, ReviewPulseError> {
        let mut session = self.get(token).await?;
        if !session.status.can_transition_to(status) {
            return Err(ReviewPulseError::InvalidTransition {
                from: session.status,
                to: status,
            });
        }
        session.status = status;
        self.save(&session).await?;
        debug!(token, %status, "session status updated");
        Ok(session)
    }

    /// Forces a non-terminal session into `error` with `message`.
    pub async fn set_error(&self, token: &str, message: &str) -> Result<(), ReviewPulseError> {
        let mut session = self.get(token).await?;
        if session.status.is_terminal() {
            return Err(ReviewPulseError::InvalidTransition {
                from: session.status,
                to: SessionStatus::Error,
            });
        }
        session.status = SessionStatus::Error;
        session.error_message = Some(message.to_string());
        self.save(&session).await
    }

    /// Extends the expiry of every key the session owns.
    ///
    /// Keys are refreshed one at a time and missing keys are skipped, so a
    /// failure partway leaves uneven expiries until the next heartbeat.
    pub async fn heartbeat(&self, token: &str) -> Result<(), ReviewPulseError> {
        if !self.store.expire(&meta_key(token), self.ttl).await? {
            return Err(ReviewPulseError::NotFound {
                token: token.to_string(),
            });
        }
        for key in [reviews_key(token), analysis_key(token)] {
            self.store.expire(&key, self.ttl).await?;
        }
        Ok(())
    }

    pub async fn exists(&self, token: &str) -> Result<bool, ReviewPulseError> {
        self.store.exists(&meta_key(token)).await
    }

    pub async fn store_reviews(
        &self,
        token: &str,
        reviews: &[Review],
    ) -> Result<(), ReviewPulseError> {
        self.write_json(&reviews_key(token), reviews).await
    }

    /// Stored reviews, or an empty list if none were stored.
    pub async fn get_reviews(&self, token: &str) -> Result<Vec<Review>, ReviewPulseError> {
        Ok(self
            .read_json(&reviews_key(token))
            .await?
            .unwrap_or_default())
    }

    pub async fn store_analysis(
        &self,
        token: &str,
        analysis: &AnalysisResult,
    ) -> Result<(), ReviewPulseError> {
        self.write_json(&analysis_key(token), analysis).await
    }

    pub async fn get_analysis(
        &self,
        token: &str,
    ) -> Result<Option<AnalysisResult>, ReviewPulseError> {
        self.read_json(&analysis_key(token)).await
    }

    async fn save(&self, session: &Session) -> Result<(), ReviewPulseError> {
        self.write_json(&meta_key(&session.token), session).await
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), ReviewPulseError> {
        let json = serde_json::to_string(value)
            .map_err(|e| ReviewPulseError::storage(format!("failed to encode {key}"), e))?;
        self.store.set(key, &json, self.ttl).await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, ReviewPulseError> {
        match self.store.get(key).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ReviewPulseError::storage(format!("failed to decode {key}"), e)),
            None => Ok(None),
        }
    }
}
