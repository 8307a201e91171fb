// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable queue adapter for the ReviewPulse gateway.
//!
//! Scrape jobs go out on one queue and scrape results come back on another.
//! Both are declared durable and every published message is persistent, so
//! a broker restart loses neither.

pub mod broker;
pub mod pump;

pub use broker::AmqpBroker;
