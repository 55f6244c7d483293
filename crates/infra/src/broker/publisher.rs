//! Publisher for `event.created` notifications

use std::sync::Arc;

use async_trait::async_trait;
use forecal_core::{Clock, EventPublisher};
use forecal_domain::constants::CONTENT_TYPE_JSON;
use forecal_domain::{EventCreated, Result, WeatherError};
use lapin::options::BasicPublishOptions;
use lapin::publisher_confirm::Confirmation;
use lapin::{BasicProperties, Channel};
use tracing::{debug, instrument};

use super::topology::BrokerConnection;
use crate::errors::conversions::to_weather_error;

/// AMQP persistent delivery mode.
const PERSISTENT: u8 = 2;

/// Publishes to the configured exchange with the `event.created` routing key.
pub struct AmqpEventPublisher {
    channel: Channel,
    exchange: String,
    routing_key: String,
    clock: Arc<dyn Clock>,
}

impl AmqpEventPublisher {
    /// Publishes on its own confirm-mode channel so every send waits for the
    /// broker's ack.
    pub async fn new(broker: &BrokerConnection, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            channel: broker.open_confirm_channel().await?,
            exchange: broker.config().exchange.clone(),
            routing_key: broker.config().routing_key.clone(),
            clock,
        })
    }

    fn properties(&self, message_id: &str) -> BasicProperties {
        message_properties(message_id, self.clock.now().timestamp())
    }
}

fn message_properties(message_id: &str, timestamp: i64) -> BasicProperties {
    BasicProperties::default()
        .with_content_type(CONTENT_TYPE_JSON.into())
        .with_message_id(message_id.into())
        .with_timestamp(u64::try_from(timestamp).unwrap_or_default())
        .with_delivery_mode(PERSISTENT)
}

fn check_confirmation(confirmation: Confirmation) -> Result<()> {
    match confirmation {
        Confirmation::Ack(_) => Ok(()),
        Confirmation::Nack(_) => {
            Err(WeatherError::Connectivity("broker rejected event.created".into()))
        }
        Confirmation::NotRequested => {
            Err(WeatherError::Internal("publisher channel is not in confirm mode".into()))
        }
    }
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    #[instrument(skip(self, message), fields(event_id = %message.id))]
    async fn publish_event_created(&self, message: &EventCreated) -> Result<()> {
        let payload = serde_json::to_vec(message)
            .map_err(|err| WeatherError::InvalidInput(format!("unencodable event: {err}")))?;
        let message_id = uuid::Uuid::new_v4().to_string();

        let confirm = self
            .channel
            .basic_publish(
                &self.exchange,
                &self.routing_key,
                BasicPublishOptions::default(),
                &payload,
                self.properties(&message_id),
            )
            .await
            .map_err(to_weather_error)?;
        check_confirmation(confirm.await.map_err(to_weather_error)?)?;

        debug!(%message_id, bytes = payload.len(), "event.created published");
        Ok(())
    }
}
