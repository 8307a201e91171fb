// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hand-off of raw deliveries into the bounded result channel.
//!
//! A delivery is acknowledged once it decodes, then forwarded. Cancellation
//! is only observed while waiting for the next delivery, so a result that
//! has been acknowledged always reaches the channel.

use std::fmt::Display;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use lapin::message::Delivery as AmqpDelivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use reviewpulse_core::{Delivery, ScrapeResult};

/// One received message that can be settled with the broker.
#[async_trait]
pub trait Settle: Send + Sized {
    type Error: Display + Send;

    fn body(&self) -> &[u8];

    async fn ack(self) -> Result<(), Self::Error>;

    /// Rejects without requeue.
    async fn reject(self) -> Result<(), Self::Error>;
}

#[async_trait]
impl Settle for AmqpDelivery {
    type Error = lapin::Error;

    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn ack(self) -> Result<(), lapin::Error> {
        self.acker.ack(BasicAckOptions::default()).await
    }

    async fn reject(self) -> Result<(), lapin::Error> {
        let options = BasicNackOptions {
            requeue: false,
            ..BasicNackOptions::default()
        };
        self.acker.nack(options).await
    }
}

/// Moves deliveries into `tx` until cancelled or the source ends.
pub async fn pump_results<S, D, E>(
    mut deliveries: S,
    tx: mpsc::Sender<ScrapeResult>,
    cancel: CancellationToken,
) where
    S: Stream<Item = Result<D, E>> + Unpin,
    D: Settle,
    E: Display,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("result subscription cancelled");
                break;
            }
            next = deliveries.next() => next,
        };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(e)) => {
                error!(error = %e, "result consumer failed");
                break;
            }
            None => {
                warn!("result consumer closed by broker");
                break;
            }
        };

        match Delivery::classify(delivery.body()) {
            Delivery::Ack(result) => {
                if let Err(e) = delivery.ack().await {
                    // Unacknowledged messages return to the queue.
                    error!(error = %e, token = %result.token, "failed to ack scrape result");
                    continue;
                }
                let token = result.token.clone();
                if tx.send(result).await.is_err() {
                    error!(token = %token, "result receiver dropped, acknowledged result lost");
                    break;
                }
            }
            Delivery::Reject(e) => {
                warn!(error = %e, "discarding undecodable scrape result");
                if let Err(e) = delivery.reject().await {
                    error!(error = %e, "failed to reject scrape result");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeDelivery {
        body: Vec<u8>,
        log: Log,
        fail_ack: bool,
    }

    #[async_trait]
    impl Settle for FakeDelivery {
        type Error = String;

        fn body(&self) -> &[u8] {
            &self.body
        }

        async fn ack(self) -> Result<(), String> {
            if self.fail_ack {
                return Err("channel closed".into());
            }
            self.log.lock().unwrap().push("ack".into());
            Ok(())
        }

        async fn reject(self) -> Result<(), String> {
            self.log.lock().unwrap().push("reject".into());
            Ok(())
        }
    }

    fn delivery(log: &Log, body: &str) -> Result<FakeDelivery, String> {
        Ok(FakeDelivery {
            body: body.as_bytes().to_vec(),
            log: Arc::clone(log),
            fail_ack: false,
        })
    }

    fn settled(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn acks_then_forwards_and_rejects_garbage() {
        let log = Log::default();
        let source = futures::stream::iter(vec![
            delivery(&log, r#"{"token":"a","reviews":[]}"#),
            delivery(&log, "not json"),
            delivery(&log, r#"{"token":"b","reviews":null,"error":"blocked"}"#),
        ]);
        let (tx, mut rx) = mpsc::channel(10);

        pump_results(source, tx, CancellationToken::new()).await;

        assert_eq!(settled(&log), ["ack", "reject", "ack"]);
        assert_eq!(rx.recv().await.unwrap().token, "a");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.scrape_error(), Some("blocked"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failed_ack_is_not_forwarded() {
        let log = Log::default();
        let source = futures::stream::iter(vec![Ok::<_, String>(FakeDelivery {
            body: br#"{"token":"a"}"#.to_vec(),
            log: Arc::clone(&log),
            fail_ack: true,
        })]);
        let (tx, mut rx) = mpsc::channel(10);

        pump_results(source, tx, CancellationToken::new()).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn source_error_ends_the_pump() {
        let log = Log::default();
        let source = futures::stream::iter(vec![
            Err("connection reset".to_string()),
            delivery(&log, r#"{"token":"late"}"#),
        ]);
        let (tx, mut rx) = mpsc::channel(10);

        pump_results(source, tx, CancellationToken::new()).await;
        assert!(settled(&log).is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_before_start_takes_nothing() {
        let log = Log::default();
        let source = futures::stream::iter(vec![delivery(&log, r#"{"token":"a"}"#)]);
        let (tx, mut rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        pump_results(source, tx, cancel).await;
        assert!(settled(&log).is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn acknowledged_result_survives_cancel_while_buffer_is_full() {
        let log = Log::default();
        let source = futures::stream::iter(vec![
            delivery(&log, r#"{"token":"first"}"#),
            delivery(&log, r#"{"token":"second"}"#),
        ])
        .chain(futures::stream::pending());
        let (tx, mut rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let pump = tokio::spawn(pump_results(source, tx, cancel.clone()));

        while settled(&log).len() < 2 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        assert_eq!(rx.recv().await.unwrap().token, "first");
        assert_eq!(rx.recv().await.unwrap().token, "second");
        assert!(rx.recv().await.is_none());
        pump.await.unwrap();
    }
}
