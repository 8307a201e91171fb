// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use reviewpulse_config::ReviewPulseConfig;
use reviewpulse_core::{MessageBroker, ReviewPulseError, StateStore};
use reviewpulse_workflow::{Dispatcher, SessionService};

use crate::handlers;
use crate::ratelimit::{RateGovernor, rate_limit};
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: SessionService,
    pub store: Arc<dyn StateStore>,
    pub broker: Arc<dyn MessageBroker>,
    pub dispatcher: Dispatcher,
    /// `None` when rate limiting is disabled.
    pub governor: Option<Arc<RateGovernor>>,
    pub trust_forwarded_for: bool,
    /// Reported by `/health`.
    pub service_name: String,
    /// How often an open progress stream re-reads its session.
    pub poll_interval: Duration,
    /// Process-wide shutdown signal; ends open progress streams.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(
        config: &ReviewPulseConfig,
        store: Arc<dyn StateStore>,
        broker: Arc<dyn MessageBroker>,
        shutdown: CancellationToken,
    ) -> Self {
        let sessions = SessionService::from_config(store.clone(), &config.session);
        let dispatcher = Dispatcher::new(sessions.clone(), broker.clone());
        let governor = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateGovernor::from_config(store.clone(), &config.rate_limit)));

        Self {
            sessions,
            store,
            broker,
            dispatcher,
            governor,
            trust_forwarded_for: config.rate_limit.trust_forwarded_for,
            service_name: config.server.service_name.clone(),
            poll_interval: Duration::from_millis(config.session.stream_poll_interval_ms),
            shutdown,
        }
    }
}

fn routes() -> Router<GatewayState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/session", post(handlers::create_session))
        .route("/session/{token}", get(handlers::get_session))
        .route("/session/{token}/heartbeat", post(handlers::heartbeat))
        .route("/analyze", post(handlers::analyze))
        .route("/analyze/{token}/stream", get(sse::stream_progress))
}

/// Builds the full application: every route at the root and under `/api`,
/// all behind the rate governor.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the gateway on `addr` until the shutdown token fires.
pub async fn serve(addr: &str, state: GatewayState) -> Result<(), ReviewPulseError> {
    let shutdown = state.shutdown.clone();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ReviewPulseError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| ReviewPulseError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
