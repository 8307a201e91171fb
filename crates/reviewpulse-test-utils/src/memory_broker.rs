// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory MessageBroker that records jobs and injects raw results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use reviewpulse_core::traits::RESULT_BUFFER;
use reviewpulse_core::{
    AdapterType, Delivery, HealthStatus, MessageBroker, PluginAdapter, ReviewPulseError,
    ScrapeJob, ScrapeResult,
};

type Subscription = (mpsc::Sender<ScrapeResult>, CancellationToken);

/// A broker that never leaves the process.
///
/// Raw result bodies pushed through [`MemoryBroker::push_raw`] go through
/// the same ack/reject classification as real deliveries.
#[derive(Default)]
pub struct MemoryBroker {
    published: Mutex<Vec<ScrapeJob>>,
    fail_publish: AtomicBool,
    results: Arc<Mutex<Option<Subscription>>>,
    acked: AtomicUsize,
    rejected: AtomicUsize,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Jobs published so far, in order.
    pub async fn published(&self) -> Vec<ScrapeJob> {
        self.published.lock().await.clone()
    }

    /// Delivers a raw body to the active subscription.
    ///
    /// Returns false when no subscription is active or it was cancelled.
    pub async fn push_raw(&self, body: &[u8]) -> bool {
        let sender = self.results.lock().await.clone();
        let Some((sender, cancel)) = sender else {
            return false;
        };
        if cancel.is_cancelled() {
            return false;
        }
        match Delivery::classify(body) {
            Delivery::Ack(result) => {
                self.acked.fetch_add(1, Ordering::SeqCst);
                sender.send(result).await.is_ok()
            }
            Delivery::Reject(_) => {
                self.rejected.fetch_add(1, Ordering::SeqCst);
                true
            }
        }
    }

    /// Encodes and delivers a result.
    pub async fn push_result(&self, result: &ScrapeResult) -> bool {
        match serde_json::to_vec(result) {
            Ok(body) => self.push_raw(&body).await,
            Err(_) => false,
        }
    }

    /// Ends the active subscription as if the broker closed it.
    pub async fn close_results(&self) {
        self.results.lock().await.take();
    }

    pub fn acked(&self) -> usize {
        self.acked.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MemoryBroker {
    fn name(&self) -> &str {
        "memory-broker"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Broker
    }

    async fn health_check(&self) -> Result<HealthStatus, ReviewPulseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReviewPulseError> {
        self.close_results().await;
        Ok(())
    }
}

#[async_trait]
impl MessageBroker for MemoryBroker {
    async fn publish_job(&self, job: &ScrapeJob) -> Result<(), ReviewPulseError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(ReviewPulseError::Queue {
                message: "memory broker publish failure".into(),
                source: None,
            });
        }
        self.published.lock().await.push(job.clone());
        Ok(())
    }

    async fn subscribe_results(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<ScrapeResult>, ReviewPulseError> {
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        *self.results.lock().await = Some((tx, cancel.clone()));

        // Cancellation drops the sender; buffered results stay readable.
        let slot = Arc::clone(&self.results);
        tokio::spawn(async move {
            cancel.cancelled().await;
            let mut slot = slot.lock().await;
            if slot.as_ref().is_some_and(|(_, c)| c.is_cancelled()) {
                slot.take();
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn classifies_raw_bodies() {
        let broker = MemoryBroker::new();
        let mut rx = broker
            .subscribe_results(CancellationToken::new())
            .await
            .unwrap();

        assert!(broker.push_raw(br#"{"token":"t1","reviews":[]}"#).await);
        assert!(broker.push_raw(b"garbage").await);

        assert_eq!(rx.recv().await.unwrap().token, "t1");
        assert_eq!(broker.acked(), 1);
        assert_eq!(broker.rejected(), 1);
    }

    #[tokio::test]
    async fn records_and_fails_publishes() {
        let broker = MemoryBroker::new();
        let job = ScrapeJob {
            token: "t".into(),
            url: "u".into(),
            platform: "ebay".into(),
        };
        broker.publish_job(&job).await.unwrap();
        broker.set_fail_publish(true);
        assert!(broker.publish_job(&job).await.is_err());
        assert_eq!(broker.published().await, vec![job]);
    }

    #[tokio::test]
    async fn close_ends_the_stream() {
        let broker = MemoryBroker::new();
        let mut rx = broker
            .subscribe_results(CancellationToken::new())
            .await
            .unwrap();
        broker.close_results().await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancel_keeps_buffered_results_then_ends() {
        let broker = MemoryBroker::new();
        let cancel = CancellationToken::new();
        let mut rx = broker.subscribe_results(cancel.clone()).await.unwrap();
        assert!(broker.push_raw(br#"{"token":"kept"}"#).await);
        cancel.cancel();

        assert_eq!(rx.recv().await.unwrap().token, "kept");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_subscription_takes_no_results() {
        let broker = MemoryBroker::new();
        let cancel = CancellationToken::new();
        let _rx = broker.subscribe_results(cancel.clone()).await.unwrap();
        cancel.cancel();
        assert!(!broker.push_raw(br#"{"token":"t"}"#).await);
        assert_eq!(broker.acked(), 0);
    }
}
