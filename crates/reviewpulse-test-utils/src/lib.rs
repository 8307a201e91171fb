// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ReviewPulse integration tests.
//!
//! In-memory stand-ins for the shared store, the queue, and the analysis
//! backend, so workflow and gateway tests run without Redis, RabbitMQ, or
//! network access.
//!
//! # Components
//!
//! - [`MemoryStore`] - TTL-aware key-value store with fault injection
//! - [`MemoryBroker`] - Job recorder and raw result injector
//! - [`MockAnalyzer`] - Analysis backend with scripted outcomes

pub mod fixtures;
pub mod memory_broker;
pub mod memory_store;
pub mod mock_analyzer;

pub use memory_broker::MemoryBroker;
pub use memory_store::MemoryStore;
pub use mock_analyzer::{AnalyzeCall, MockAnalyzer};
