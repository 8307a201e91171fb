// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow orchestration for the ReviewPulse gateway.
//!
//! A submission becomes a session record, a published scrape job, and later
//! a scrape result that drives the session to a terminal state:
//!
//! - [`SessionService`] owns the per-token records in the shared store and
//!   enforces the forward-only status graph.
//! - [`Dispatcher`] creates a session and publishes its job.
//! - [`ResultConsumer`] handles scrape results one at a time.
//!
//! At most one workflow may be in flight per token. Status changes are
//! read-modify-write against the store with no conditional write.

pub mod consumer;
pub mod dispatch;
pub mod session;
pub mod shutdown;

pub use consumer::{Outcome, ResultConsumer};
pub use dispatch::Dispatcher;
pub use session::SessionService;
