//! Connection setup and exchange/queue declarations

use forecal_domain::{BrokerConfig, Result};
use lapin::options::{
    BasicQosOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::{debug, info, instrument, warn};

use crate::errors::conversions::to_weather_error;

/// Close code for an orderly shutdown.
const REPLY_SUCCESS: u16 = 200;

/// An open connection with one channel and the exchange declared.
pub struct BrokerConnection {
    connection: Connection,
    channel: Channel,
    config: BrokerConfig,
}

impl BrokerConnection {
    /// Connect, open a channel and declare the durable topic exchange.
    #[instrument(skip(config), fields(exchange = %config.exchange))]
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(to_weather_error)?;
        let channel = connection.create_channel().await.map_err(to_weather_error)?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions { durable: true, ..ExchangeDeclareOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(to_weather_error)?;

        info!("connected to broker");
        Ok(Self { connection, channel, config: config.clone() })
    }

    /// Declare the durable consumer queue, bind it to the routing key and
    /// limit unacknowledged deliveries to the configured prefetch.
    #[instrument(skip(self), fields(queue = %self.config.queue))]
    pub async fn declare_consumer_queue(&self) -> Result<()> {
        self.channel
            .queue_declare(
                &self.config.queue,
                QueueDeclareOptions { durable: true, ..QueueDeclareOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(to_weather_error)?;

        self.channel
            .queue_bind(
                &self.config.queue,
                &self.config.exchange,
                &self.config.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(to_weather_error)?;

        self.channel
            .basic_qos(self.config.prefetch, BasicQosOptions::default())
            .await
            .map_err(to_weather_error)?;

        debug!(routing_key = %self.config.routing_key, prefetch = self.config.prefetch, "queue bound");
        Ok(())
    }

    /// Open a separate channel in publisher-confirm mode.
    pub async fn open_confirm_channel(&self) -> Result<Channel> {
        let channel = self.connection.create_channel().await.map_err(to_weather_error)?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(to_weather_error)?;
        Ok(channel)
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Close the channel and the connection. Failures are logged.
    pub async fn close(&self) {
        if let Err(err) = self.channel.close(REPLY_SUCCESS, "shutting down").await {
            warn!(error = %err, "failed to close broker channel");
        }
        if let Err(err) = self.connection.close(REPLY_SUCCESS, "shutting down").await {
            warn!(error = %err, "failed to close broker connection");
        }
    }
}
