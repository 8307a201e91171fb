// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ReviewPulse gateway.

use thiserror::Error;

use crate::types::SessionStatus;

/// The primary error type used across all ReviewPulse adapter traits and workflow operations.
#[derive(Debug, Error)]
pub enum ReviewPulseError {
    /// Configuration errors (invalid TOML, missing credentials, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Rejected client input (missing URL, unsupported language or platform).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown or expired session token.
    #[error("session not found: {token}")]
    NotFound { token: String },

    /// Shared state store errors (connection failure, command failure, codec failure).
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Message broker errors (connection failure, publish failure, consumer failure).
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Analysis provider errors (API failure, empty response, unparseable output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A status change that the session state machine does not allow.
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReviewPulseError {
    /// Wraps a store-side failure with context.
    pub fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps a broker-side failure with context.
    pub fn queue(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Queue {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for errors caused by an unknown or expired token.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true when a shared store or broker could not be reached.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Queue { .. })
    }
}
