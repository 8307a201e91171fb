// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message broker trait for the job and result channels.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ReviewPulseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ScrapeJob, ScrapeResult};

/// Capacity of the in-process hand-off between the subscription and the consumer.
///
/// When the consumer falls behind, the subscription blocks on this buffer
/// and stops pulling from the broker instead of dropping results.
pub const RESULT_BUFFER: usize = 10;

/// Outcome of decoding one raw delivery from the result channel.
#[derive(Debug)]
pub enum Delivery {
    /// Decoded; acknowledge before handing it to the consumer.
    Ack(ScrapeResult),
    /// Undecodable; reject without requeue.
    Reject(serde_json::Error),
}

impl Delivery {
    /// Classifies a raw message body.
    ///
    /// Acknowledgement covers decoding only. Everything after a successful
    /// decode is the consumer's responsibility and is never redelivered.
    pub fn classify(body: &[u8]) -> Self {
        match ScrapeResult::from_slice(body) {
            Ok(result) => Delivery::Ack(result),
            Err(e) => Delivery::Reject(e),
        }
    }
}

/// Adapter for the durable queue connecting the gateway and the scraper worker.
#[async_trait]
pub trait MessageBroker: PluginAdapter {
    /// Publishes one scrape job, marked for durable delivery. Never retried.
    async fn publish_job(&self, job: &ScrapeJob) -> Result<(), ReviewPulseError>;

    /// Starts the single long-lived result subscription.
    ///
    /// Returns a bounded receiver of [`RESULT_BUFFER`] decoded results. The
    /// subscription ends when `cancel` fires or the broker closes the channel.
    async fn subscribe_results(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<ScrapeResult>, ReviewPulseError>;
}
