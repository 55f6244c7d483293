//! AMQP plumbing for the `calendar` topic exchange
//!
//! Connections are opened by the process entry point and handed to the
//! consumer and publisher. Nothing here reconnects; a lost connection ends
//! the owning process with a `Connectivity` error.

pub mod consumer;
pub mod publisher;
pub mod topology;

pub use consumer::{ConsumerStats, EnrichmentConsumer, InboundDelivery};
pub use publisher::AmqpEventPublisher;
pub use topology::BrokerConnection;
