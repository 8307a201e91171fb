// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the session and analysis routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use reviewpulse_core::catalog::{DEFAULT_LANGUAGE, detect_platform, is_supported_language};
use reviewpulse_core::{
    AnalysisResult, HealthStatus, PluginAdapter, ReviewPulseError, Session, SessionStatus,
};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for `POST /analyze`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub output_language: Option<String>,
    /// Accepted for compatibility; every submission gets a fresh session.
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Response body for `GET /session/{token}`.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

/// Liveness plus a per-adapter report. Always 200; `status` reads
/// `degraded` while any adapter is not healthy.
pub async fn health(State(state): State<GatewayState>) -> Json<Value> {
    let (store, broker) = tokio::join!(
        adapter_health(state.store.as_ref()),
        adapter_health(state.broker.as_ref()),
    );
    let status = if store == "healthy" && broker == "healthy" {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "service": state.service_name,
        "adapters": {
            "store": store,
            "broker": broker,
        },
    }))
}

/// Reason strings go to the log only.
async fn adapter_health<A: PluginAdapter + ?Sized>(adapter: &A) -> &'static str {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => "healthy",
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), kind = %adapter.adapter_type(), %reason, "adapter degraded");
            "degraded"
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), kind = %adapter.adapter_type(), %reason, "adapter unhealthy");
            "unhealthy"
        }
        Err(e) => {
            warn!(adapter = adapter.name(), kind = %adapter.adapter_type(), error = %e, "adapter health check failed");
            "unhealthy"
        }
    }
}

pub async fn create_session(State(state): State<GatewayState>) -> Result<Json<Value>, ApiError> {
    let session = state.sessions.create("", "", DEFAULT_LANGUAGE).await?;
    Ok(Json(json!({"token": session.token})))
}

pub async fn heartbeat(
    State(state): State<GatewayState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.sessions.heartbeat(&token).await?;
    Ok(Json(json!({"status": "ok"})))
}

/// Returns the session, plus its analysis once the session is complete.
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(token): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.get(&token).await?;
    let analysis = if session.status == SessionStatus::Complete {
        state.sessions.get_analysis(&token).await?
    } else {
        None
    };
    Ok(Json(SessionView { session, analysis }))
}

/// Validates a submission and dispatches its scrape job.
///
/// Validation runs before anything is written, so a rejected request leaves
/// no session behind and publishes nothing.
pub async fn analyze(
    State(state): State<GatewayState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "rejected analyze body");
            return Err(ApiError::MissingUrl);
        }
    };

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let language = request
        .output_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    if !is_supported_language(language) {
        return Err(ApiError::UnsupportedLanguage);
    }

    let platform = detect_platform(url).ok_or(ApiError::UnsupportedPlatform)?;

    if let Some(previous) = request.session_token.as_deref().filter(|t| !t.is_empty()) {
        debug!(previous_token = %previous, "analyze request carried a session token");
    }

    let session = state
        .dispatcher
        .dispatch(url, platform, language)
        .await
        .map_err(|e| match e {
            ReviewPulseError::Validation(_) => ApiError::from(e),
            _ => ApiError::StartFailed,
        })?;

    info!(token = %session.token, platform, language, "analysis started");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "token": session.token,
            "status": session.status,
            "platform": platform,
            "language": language,
        })),
    ))
}
