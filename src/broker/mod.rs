//! Broker client abstraction
//!
//! The probe talks to the broker only through these traits, so the publish
//! cycle can run against a real AMQP 0-9-1 server (`amqp`) or an in-memory
//! recorder (`memory`) used for dry runs and tests.

pub mod amqp;
pub mod memory;

pub use amqp::AmqpBrokerClient;
pub use memory::{InMemoryBroker, PublishedMessage};

use crate::{error::Result, models::MessageProperties};
use async_trait::async_trait;

/// Client connection name announced to the broker
pub const CONNECTION_NAME: &str = "amqp-publish-probe";

/// Everything needed to open a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSettings {
    pub uri: String,
    /// Replaces the URI user when present
    pub username: Option<String>,
    /// Replaces the URI password when present
    pub password: Option<String>,
    pub connection_name: String,
}

impl ConnectSettings {
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self {
            uri: uri.into(),
            username: None,
            password: None,
            connection_name: CONNECTION_NAME.to_string(),
        }
    }

    pub fn with_credentials(mut self, username: Option<&str>, password: Option<&str>) -> Self {
        self.username = username.map(str::to_string);
        self.password = password.map(str::to_string);
        self
    }
}

/// Factory for broker connections
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Open a transport connection
    async fn connect(&self, settings: &ConnectSettings) -> Result<Box<dyn BrokerConnection>>;
}

/// An open transport connection
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Open a channel for publishing
    async fn create_channel(&self) -> Result<Box<dyn PublishChannel>>;

    fn is_open(&self) -> bool;

    async fn close(&self) -> Result<()>;
}

/// A channel that can publish messages
#[async_trait]
pub trait PublishChannel: Send + Sync {
    fn is_open(&self) -> bool;

    /// Fire-and-forget publish; no broker acknowledgement is awaited
    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: &MessageProperties,
        payload: &[u8],
    ) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
