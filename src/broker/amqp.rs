//! AMQP 0-9-1 broker client backed by lapin

use super::{BrokerClient, BrokerConnection, ConnectSettings, PublishChannel};
use crate::{
    error::{AppError, Result},
    models::MessageProperties,
};
use async_trait::async_trait;
use lapin::{
    options::BasicPublishOptions, types::ShortString, uri::AMQPUri, BasicProperties, Channel,
    Connection, ConnectionProperties,
};

/// Reply code sent with a normal channel/connection close
const REPLY_SUCCESS: u16 = 200;

/// Connects to a real broker
#[derive(Debug, Clone, Default)]
pub struct AmqpBrokerClient;

impl AmqpBrokerClient {
    pub fn new() -> Self {
        Self
    }

    /// Parse the URI and apply credential overrides
    pub fn resolve_uri(settings: &ConnectSettings) -> Result<AMQPUri> {
        let mut uri: AMQPUri = settings
            .uri
            .parse()
            .map_err(|e: String| AppError::invalid_uri(format!("'{}': {}", settings.uri, e)))?;

        if let Some(username) = &settings.username {
            uri.authority.userinfo.username = username.clone();
        }
        if let Some(password) = &settings.password {
            uri.authority.userinfo.password = password.clone();
        }

        Ok(uri)
    }
}

#[async_trait]
impl BrokerClient for AmqpBrokerClient {
    async fn connect(&self, settings: &ConnectSettings) -> Result<Box<dyn BrokerConnection>> {
        let uri = Self::resolve_uri(settings)?;
        let properties = ConnectionProperties::default()
            .with_connection_name(settings.connection_name.clone().into());

        let connection = Connection::connect_uri(uri, properties)
            .await
            .map_err(|e| AppError::connection(format!("Failed to connect: {}", e)))?;

        Ok(Box::new(AmqpConnection { inner: connection }))
    }
}

struct AmqpConnection {
    inner: Connection,
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    async fn create_channel(&self) -> Result<Box<dyn PublishChannel>> {
        let channel = self
            .inner
            .create_channel()
            .await
            .map_err(|e| AppError::connection(format!("Failed to open channel: {}", e)))?;

        Ok(Box::new(AmqpChannel { inner: channel }))
    }

    fn is_open(&self) -> bool {
        self.inner.status().connected()
    }

    async fn close(&self) -> Result<()> {
        self.inner
            .close(REPLY_SUCCESS, "probe teardown")
            .await
            .map_err(|e| AppError::teardown(format!("Failed to close connection: {}", e)))
    }
}

struct AmqpChannel {
    inner: Channel,
}

/// Convert probe properties to lapin's basic properties
fn basic_properties(properties: &MessageProperties) -> BasicProperties {
    BasicProperties::default()
        .with_correlation_id(ShortString::from(properties.correlation_id.clone()))
        .with_content_type(ShortString::from(properties.content_type.clone()))
        .with_delivery_mode(properties.delivery_mode.as_u8())
}

#[async_trait]
impl PublishChannel for AmqpChannel {
    fn is_open(&self) -> bool {
        self.inner.status().connected()
    }

    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: &MessageProperties,
        payload: &[u8],
    ) -> Result<()> {
        // The returned confirm is dropped: confirms are not enabled on this channel.
        let _confirm = self
            .inner
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                basic_properties(properties),
            )
            .await?;

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.inner
            .close(REPLY_SUCCESS, "probe teardown")
            .await
            .map_err(|e| AppError::teardown(format!("Failed to close channel: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeliveryMode;

    #[test]
    fn test_resolve_uri_keeps_embedded_credentials() {
        let settings = ConnectSettings::new("amqp://alice:pw@broker:5673/vhost");
        let uri = AmqpBrokerClient::resolve_uri(&settings).unwrap();
        assert_eq!(uri.authority.userinfo.username, "alice");
        assert_eq!(uri.authority.userinfo.password, "pw");
        assert_eq!(uri.authority.host, "broker");
        assert_eq!(uri.authority.port, 5673);
        assert_eq!(uri.vhost, "vhost");
    }

    #[test]
    fn test_resolve_uri_applies_overrides() {
        let settings = ConnectSettings::new("amqp://alice:pw@broker:5672")
            .with_credentials(Some("bob"), Some("s3cret"));
        let uri = AmqpBrokerClient::resolve_uri(&settings).unwrap();
        assert_eq!(uri.authority.userinfo.username, "bob");
        assert_eq!(uri.authority.userinfo.password, "s3cret");
    }

    #[test]
    fn test_resolve_uri_rejects_garbage() {
        let settings = ConnectSettings::new("http://not-amqp");
        let error = AmqpBrokerClient::resolve_uri(&settings).unwrap_err();
        assert!(matches!(error, AppError::InvalidUri(_)));
    }

    #[test]
    fn test_basic_properties_mapping() {
        let properties = MessageProperties {
            correlation_id: "id-1".to_string(),
            content_type: "application/json".to_string(),
            delivery_mode: DeliveryMode::Persistent,
        };
        let basic = basic_properties(&properties);
        assert_eq!(basic.correlation_id().as_ref().map(|s| s.as_str()), Some("id-1"));
        assert_eq!(basic.content_type().as_ref().map(|s| s.as_str()), Some("application/json"));
        assert_eq!(*basic.delivery_mode(), Some(2));
    }
}
