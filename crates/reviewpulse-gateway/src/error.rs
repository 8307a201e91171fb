// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use reviewpulse_core::ReviewPulseError;
use reviewpulse_core::catalog::{supported_language_map, supported_platform_names};

/// A request failure, rendered as a JSON `{"error": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    MissingUrl,
    UnsupportedLanguage,
    UnsupportedPlatform,
    SessionNotFound,
    RateLimited,
    /// The session was created but its job could not be started.
    StartFailed,
    Internal(ReviewPulseError),
}

impl From<ReviewPulseError> for ApiError {
    fn from(err: ReviewPulseError) -> Self {
        if err.is_not_found() {
            ApiError::SessionNotFound
        } else {
            ApiError::Internal(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingUrl => (StatusCode::BAD_REQUEST, json!({"error": "url is required"})),
            ApiError::UnsupportedLanguage => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "unsupported language",
                    "supported_languages": supported_language_map(),
                }),
            ),
            ApiError::UnsupportedPlatform => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "unsupported platform",
                    "supported_platforms": supported_platform_names(),
                }),
            ),
            ApiError::SessionNotFound => {
                (StatusCode::NOT_FOUND, json!({"error": "session not found"}))
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({"error": "rate limit exceeded, please try again later"}),
            ),
            ApiError::StartFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "failed to start analysis"}),
            ),
            ApiError::Internal(ReviewPulseError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, json!({"error": status.canonical_reason().unwrap_or("error").to_lowercase()}))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err: ApiError = ReviewPulseError::NotFound { token: "t".into() }.into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_maps_to_500() {
        let err: ApiError =
            ReviewPulseError::storage("GET failed", std::io::Error::other("refused")).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_maps_to_400() {
        let err: ApiError = ReviewPulseError::Validation("url is required".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_is_429() {
        assert_eq!(
            ApiError::RateLimited.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
