// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory StateStore with expiry and fault injection.
//!
//! Expiry uses `tokio::time::Instant`, so tests running with a paused clock
//! can advance past a TTL deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use reviewpulse_core::{AdapterType, HealthStatus, PluginAdapter, ReviewPulseError, StateStore};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// An in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
    failing_suffixes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes writes to any key ending in `suffix` fail.
    pub async fn fail_writes_to(&self, suffix: &str) {
        self.failing_suffixes.lock().await.push(suffix.to_string());
    }

    /// Remaining lifetime of a live key.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(key)
            .filter(|e| e.live(now))
            .map(|e| e.expires_at - now)
    }

    /// Removes a key as if it had expired.
    pub async fn evict(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// All live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .await
            .iter()
            .filter(|(_, e)| e.live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<(), ReviewPulseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ReviewPulseError::Storage {
                message: "memory store unavailable".into(),
                source: None,
            });
        }
        Ok(())
    }

    async fn check_writable(&self, key: &str) -> Result<(), ReviewPulseError> {
        self.check_available()?;
        let failing = self.failing_suffixes.lock().await;
        if failing.iter().any(|s| key.ends_with(s.as_str())) {
            return Err(ReviewPulseError::Storage {
                message: format!("write to {key} rejected"),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ReviewPulseError> {
        match self.check_available() {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ReviewPulseError> {
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ReviewPulseError> {
        self.check_available()?;
        let now = Instant::now();
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .filter(|e| e.live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ReviewPulseError> {
        self.check_writable(key).await?;
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, ReviewPulseError> {
        self.check_available()?;
        let now = Instant::now();
        Ok(self
            .entries
            .lock()
            .await
            .remove(key)
            .is_some_and(|e| e.live(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool, ReviewPulseError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ReviewPulseError> {
        self.check_writable(key).await?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key).filter(|e| e.live(now)) {
            Some(entry) => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn incr_with_expiry(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<u64, ReviewPulseError> {
        self.check_writable(key).await?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let current = entries
            .get(key)
            .filter(|e| e.live(now))
            .map(|e| {
                e.value.parse::<u64>().map_err(|_| ReviewPulseError::Storage {
                    message: format!("{key} does not hold an integer"),
                    source: None,
                })
            })
            .transpose()?;

        let count = current.unwrap_or(0) + 1;
        let expires_at = match (current, entries.get(key)) {
            (Some(_), Some(entry)) => entry.expires_at,
            _ => now + window,
        };
        entries.insert(
            key.to_string(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }
}
