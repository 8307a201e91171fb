// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RabbitMQ implementation of the MessageBroker trait.

use async_trait::async_trait;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, QueueDeclareOptions};
use lapin::types::{FieldTable, ShortString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::{OnceCell, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use reviewpulse_config::model::RabbitMqConfig;
use reviewpulse_core::{
    AdapterType, HealthStatus, MessageBroker, PluginAdapter, ReviewPulseError,
    ScrapeJob, ScrapeResult, traits::RESULT_BUFFER,
};

use crate::pump::pump_results;

/// Persistent delivery mode in AMQP 0-9-1.
const PERSISTENT: u8 = 2;

struct Channels {
    connection: Connection,
    publish: Channel,
    consume: Channel,
}

/// RabbitMQ-backed broker.
///
/// Publishing and consuming use separate channels on one connection.
pub struct AmqpBroker {
    config: RabbitMqConfig,
    channels: OnceCell<Channels>,
}

impl AmqpBroker {
    pub fn new(config: RabbitMqConfig) -> Self {
        Self {
            config,
            channels: OnceCell::new(),
        }
    }

    /// Connects, opens both channels, declares both queues durable, and
    /// applies the prefetch limit to the consuming channel.
    pub async fn connect(&self) -> Result<(), ReviewPulseError> {
        let connection = Connection::connect(&self.config.url, ConnectionProperties::default())
            .await
            .map_err(|e| ReviewPulseError::queue("failed to connect to rabbitmq", e))?;

        let publish = open_channel(&connection).await?;
        let consume = open_channel(&connection).await?;

        for queue in [&self.config.jobs_queue, &self.config.results_queue] {
            declare_durable(&publish, queue).await?;
        }

        consume
            .basic_qos(self.config.prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| ReviewPulseError::queue("failed to set prefetch", e))?;

        self.channels
            .set(Channels {
                connection,
                publish,
                consume,
            })
            .map_err(|_| ReviewPulseError::Queue {
                message: "rabbitmq broker already connected".into(),
                source: None,
            })?;

        info!(
            jobs = %self.config.jobs_queue,
            results = %self.config.results_queue,
            prefetch = self.config.prefetch,
            "connected to rabbitmq"
        );
        Ok(())
    }

    fn channels(&self) -> Result<&Channels, ReviewPulseError> {
        self.channels.get().ok_or_else(|| ReviewPulseError::Queue {
            message: "rabbitmq broker not connected".into(),
            source: None,
        })
    }
}

async fn open_channel(connection: &Connection) -> Result<Channel, ReviewPulseError> {
    connection
        .create_channel()
        .await
        .map_err(|e| ReviewPulseError::queue("failed to open channel", e))
}

async fn declare_durable(channel: &Channel, queue: &str) -> Result<(), ReviewPulseError> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| ReviewPulseError::queue(format!("failed to declare queue {queue}"), e))?;
    Ok(())
}

/// Message properties for a published job: persistent JSON, stamped with the send time.
fn job_properties() -> BasicProperties {
    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
    BasicProperties::default()
        .with_delivery_mode(PERSISTENT)
        .with_content_type(ShortString::from("application/json"))
        .with_timestamp(now)
}

#[async_trait]
impl PluginAdapter for AmqpBroker {
    fn name(&self) -> &str {
        "rabbitmq"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Broker
    }

    async fn health_check(&self) -> Result<HealthStatus, ReviewPulseError> {
        let Ok(channels) = self.channels() else {
            return Ok(HealthStatus::Unhealthy("not connected".into()));
        };
        if channels.connection.status().connected() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("connection closed".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), ReviewPulseError> {
        if let Some(channels) = self.channels.get() {
            channels
                .connection
                .close(200, "gateway shutting down")
                .await
                .map_err(|e| ReviewPulseError::queue("failed to close rabbitmq connection", e))?;
            debug!("rabbitmq connection closed");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageBroker for AmqpBroker {
    async fn publish_job(&self, job: &ScrapeJob) -> Result<(), ReviewPulseError> {
        let channels = self.channels()?;
        let payload = serde_json::to_vec(job)
            .map_err(|e| ReviewPulseError::queue("failed to encode scrape job", e))?;

        channels
            .publish
            .basic_publish(
                "",
                &self.config.jobs_queue,
                BasicPublishOptions::default(),
                &payload,
                job_properties(),
            )
            .await
            .map_err(|e| ReviewPulseError::queue("failed to publish scrape job", e))?
            .await
            .map_err(|e| ReviewPulseError::queue("scrape job publish not confirmed", e))?;

        debug!(token = %job.token, platform = %job.platform, "scrape job published");
        Ok(())
    }

    async fn subscribe_results(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<ScrapeResult>, ReviewPulseError> {
        let channels = self.channels()?;
        let consumer = channels
            .consume
            .basic_consume(
                &self.config.results_queue,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ReviewPulseError::queue("failed to start result consumer", e))?;

        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        tokio::spawn(pump_results(consumer, tx, cancel));
        info!(queue = %self.config.results_queue, "result subscription started");
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_are_persistent_json() {
        let props = job_properties();
        assert_eq!(props.delivery_mode(), &Some(PERSISTENT));
        assert_eq!(
            props.content_type().as_ref().map(|s| s.as_str()),
            Some("application/json")
        );
        assert!(props.timestamp().is_some());
    }

    #[test]
    fn identifies_as_broker_adapter() {
        let broker = AmqpBroker::new(RabbitMqConfig::default());
        assert_eq!(broker.name(), "rabbitmq");
        assert_eq!(broker.adapter_type(), AdapterType::Broker);
    }

    #[tokio::test]
    async fn publish_before_connect_is_a_queue_error() {
        let broker = AmqpBroker::new(RabbitMqConfig::default());
        let job = ScrapeJob {
            token: "t".into(),
            url: "https://amazon.com/dp/1".into(),
            platform: "amazon".into(),
        };
        let err = broker.publish_job(&job).await.unwrap_err();
        assert!(matches!(err, ReviewPulseError::Queue { .. }));
    }

    #[tokio::test]
    async fn unhealthy_before_connect() {
        let broker = AmqpBroker::new(RabbitMqConfig::default());
        assert!(matches!(
            broker.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
