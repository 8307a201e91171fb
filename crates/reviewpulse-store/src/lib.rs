// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state store for the ReviewPulse gateway.
//!
//! Session records, scraped reviews, analysis output, and rate-limit
//! counters all live in Redis so that the gateway and the scraper worker
//! see the same data. Every key carries an expiry.

pub mod adapter;

pub use adapter::RedisStore;
