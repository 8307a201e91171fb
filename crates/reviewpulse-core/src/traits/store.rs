// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state store trait: a key-value store with per-key expiry.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReviewPulseError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the shared, TTL-bounded key-value store.
///
/// The store is the single source of truth for session metadata, reviews,
/// analysis output, and rate-limit counters. No operation is conditional:
/// callers that read-modify-write must not race each other on a key.
#[async_trait]
pub trait StateStore: PluginAdapter {
    /// Reads a value. Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>, ReviewPulseError>;

    /// Writes a value with the given time-to-live, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ReviewPulseError>;

    /// Removes a key. Returns true if it existed.
    async fn delete(&self, key: &str) -> Result<bool, ReviewPulseError>;

    /// Returns true if the key exists and has not expired.
    async fn exists(&self, key: &str) -> Result<bool, ReviewPulseError>;

    /// Resets the time-to-live of an existing key. Returns false if the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ReviewPulseError>;

    /// Increments a counter and returns the new value.
    ///
    /// The expiry is set only when the increment creates the counter, which
    /// pins a fixed window to the first use.
    async fn incr_with_expiry(&self, key: &str, window: Duration)
        -> Result<u64, ReviewPulseError>;
}
