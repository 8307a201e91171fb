// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window rate governor.
//!
//! Each client gets one counter, `ratelimit:{client}`, in the shared store.
//! The first request of a window creates the counter and pins its expiry to
//! the window length. When the store cannot be reached the request is let
//! through.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use reviewpulse_config::model::RateLimitConfig;
use reviewpulse_core::StateStore;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Identity used when neither a peer address nor a trusted header is available.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited,
}

/// Counts requests per client in the shared store.
pub struct RateGovernor {
    store: Arc<dyn StateStore>,
    max_requests: u64,
    window: Duration,
}

impl RateGovernor {
    pub fn new(store: Arc<dyn StateStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn from_config(store: Arc<dyn StateStore>, config: &RateLimitConfig) -> Self {
        Self::new(
            store,
            config.max_requests,
            Duration::from_secs(config.window_secs),
        )
    }

    /// Counts one request from `client` and decides whether it may proceed.
    pub async fn check(&self, client: &str) -> Decision {
        let key = format!("ratelimit:{client}");
        match self.store.incr_with_expiry(&key, self.window).await {
            Ok(count) if count > self.max_requests => {
                debug!(client, count, "rate limit exceeded");
                Decision::Limited
            }
            Ok(_) => Decision::Allowed,
            Err(e) => {
                warn!(client, error = %e, "rate limiter store unavailable, allowing request");
                Decision::Allowed
            }
        }
    }
}

/// Resolves the identity a request is counted under.
///
/// With `trust_forwarded_for`, the first `X-Forwarded-For` entry wins over
/// the peer address.
pub fn client_identity(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    let forwarded = trust_forwarded_for
        .then(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .flatten();

    match (forwarded, peer) {
        (Some(client), _) => client.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

/// Middleware applied to every route.
pub async fn rate_limit(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(governor) = state.governor.as_ref() else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identity(request.headers(), peer, state.trust_forwarded_for);

    match governor.check(&client).await {
        Decision::Allowed => next.run(request).await,
        Decision::Limited => ApiError::RateLimited.into_response(),
    }
}
