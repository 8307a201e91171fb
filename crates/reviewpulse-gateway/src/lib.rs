// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for ReviewPulse.
//!
//! Serves the session and analysis routes (at the root and under `/api`),
//! streams session progress as Server-Sent Events, and throttles clients
//! with a fixed-window counter kept in the shared store.
//!
//! Possession of a session token is the only authorization for reading,
//! streaming, or extending that session.

pub mod error;
pub mod handlers;
pub mod ratelimit;
pub mod server;
pub mod sse;

pub use error::ApiError;
pub use ratelimit::RateGovernor;
pub use server::{GatewayState, router, serve};
