//! In-memory broker that records publishes instead of sending them
//!
//! Used by the `--dry-run` mode of the binary and by tests. Failures can be
//! scripted per stage (connect, channel open, publish, close).

use super::{BrokerClient, BrokerConnection, ConnectSettings, PublishChannel};
use crate::{
    error::{AppError, Result},
    models::MessageProperties,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A message captured by the in-memory broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub properties: MessageProperties,
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct BrokerState {
    published: Vec<PublishedMessage>,
    publish_count: usize,
    count_only: bool,
    close_sequence: Vec<&'static str>,
    connect_attempts: usize,
    last_settings: Option<ConnectSettings>,
    connection_open: bool,
    channel_open: bool,
    channel_closes: usize,
    connection_closes: usize,
    connect_delay: Option<Duration>,
    fail_connect: Option<String>,
    fail_channel: Option<String>,
    fail_publish: Option<String>,
    close_channel_after_publish: bool,
    fail_channel_close: bool,
    fail_connection_close: bool,
}

/// Recording broker; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reject connection attempts with `reason`
    pub fn fail_connect<S: Into<String>>(self, reason: S) -> Self {
        self.state().fail_connect = Some(reason.into());
        self
    }

    /// Accept connections but refuse to open channels
    pub fn fail_channel<S: Into<String>>(self, reason: S) -> Self {
        self.state().fail_channel = Some(reason.into());
        self
    }

    /// Reject every publish with `reason`
    pub fn fail_publish<S: Into<String>>(self, reason: S) -> Self {
        self.state().fail_publish = Some(reason.into());
        self
    }

    /// Delay connection establishment
    pub fn connect_delay(self, delay: Duration) -> Self {
        self.state().connect_delay = Some(delay);
        self
    }

    /// Make closes report errors
    pub fn fail_close(self) -> Self {
        {
            let mut state = self.state();
            state.fail_channel_close = true;
            state.fail_connection_close = true;
        }
        self
    }

    /// Mark the channel closed after the next successful publish
    pub fn close_channel_after_publish(self) -> Self {
        self.state().close_channel_after_publish = true;
        self
    }

    /// Count publishes without keeping the messages
    pub fn count_only(self) -> Self {
        self.state().count_only = true;
        self
    }

    /// Simulate the broker closing the channel
    pub fn drop_channel(&self) {
        self.state().channel_open = false;
    }

    /// Stop failing publishes
    pub fn clear_publish_failure(&self) {
        self.state().fail_publish = None;
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state().published.clone()
    }

    /// Successful publishes, including ones not recorded in count-only mode
    pub fn publish_count(&self) -> usize {
        self.state().publish_count
    }

    pub fn connect_attempts(&self) -> usize {
        self.state().connect_attempts
    }

    pub fn last_settings(&self) -> Option<ConnectSettings> {
        self.state().last_settings.clone()
    }

    pub fn connection_open(&self) -> bool {
        self.state().connection_open
    }

    pub fn channel_open(&self) -> bool {
        self.state().channel_open
    }

    /// (channel closes, connection closes) performed so far
    pub fn close_counts(&self) -> (usize, usize) {
        let state = self.state();
        (state.channel_closes, state.connection_closes)
    }

    /// Order in which closes were requested: "channel" or "connection"
    pub fn close_sequence(&self) -> Vec<&'static str> {
        self.state().close_sequence.clone()
    }
}

#[async_trait]
impl BrokerClient for InMemoryBroker {
    async fn connect(&self, settings: &ConnectSettings) -> Result<Box<dyn BrokerConnection>> {
        let delay = {
            let mut state = self.state();
            state.connect_attempts += 1;
            state.last_settings = Some(settings.clone());
            state.connect_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        if let Some(reason) = &state.fail_connect {
            return Err(AppError::connection(reason.clone()));
        }
        state.connection_open = true;

        Ok(Box::new(InMemoryConnection { broker: self.clone() }))
    }
}

struct InMemoryConnection {
    broker: InMemoryBroker,
}

#[async_trait]
impl BrokerConnection for InMemoryConnection {
    async fn create_channel(&self) -> Result<Box<dyn PublishChannel>> {
        let mut state = self.broker.state();
        if let Some(reason) = &state.fail_channel {
            return Err(AppError::connection(reason.clone()));
        }
        state.channel_open = true;

        Ok(Box::new(InMemoryChannel { broker: self.broker.clone() }))
    }

    fn is_open(&self) -> bool {
        self.broker.state().connection_open
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.broker.state();
        state.connection_closes += 1;
        state.close_sequence.push("connection");
        state.connection_open = false;
        state.channel_open = false;
        if state.fail_connection_close {
            return Err(AppError::teardown("connection close rejected"));
        }
        Ok(())
    }
}

struct InMemoryChannel {
    broker: InMemoryBroker,
}

#[async_trait]
impl PublishChannel for InMemoryChannel {
    fn is_open(&self) -> bool {
        self.broker.state().channel_open
    }

    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: &MessageProperties,
        payload: &[u8],
    ) -> Result<()> {
        let mut state = self.broker.state();
        if !state.channel_open {
            return Err(AppError::channel_unavailable("channel closed by broker"));
        }
        if let Some(reason) = &state.fail_publish {
            return Err(AppError::publish(reason.clone()));
        }

        state.publish_count += 1;
        if !state.count_only {
            state.published.push(PublishedMessage {
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                properties: properties.clone(),
                payload: payload.to_vec(),
            });
        }

        if state.close_channel_after_publish {
            state.channel_open = false;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.broker.state();
        state.channel_closes += 1;
        state.close_sequence.push("channel");
        state.channel_open = false;
        if state.fail_channel_close {
            return Err(AppError::teardown("channel close rejected"));
        }
        Ok(())
    }
}
