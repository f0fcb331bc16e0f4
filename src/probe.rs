//! The publish probe: connection lifecycle and the per-iteration publish cycle
//!
//! A harness drives a probe through `set_up`, any number of `run_once`
//! calls, then `tear_down`. Every phase takes `&mut self`, so a single probe
//! instance can only ever be driven by one caller at a time. Failures never
//! escape: set-up reports a `SetupOutcome`, each iteration an
//! `IterationResult`, and teardown only logs.

use crate::{
    broker::{BrokerClient, BrokerConnection, ConnectSettings, PublishChannel},
    config::{resolve_config, ProbeParameters},
    error::{AppError, Result},
    logging::Logger,
    models::{IterationResult, MessageEnvelope, ProbeConfig, SampleTimer, TimingBoundary},
    types::{ProbeState, SetupOutcome},
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// The three-phase capability a load harness drives
#[async_trait]
pub trait Sampler: Send {
    /// Parameter table offered to the harness user before a run
    fn default_parameters() -> ProbeParameters
    where
        Self: Sized;

    async fn set_up(&mut self) -> SetupOutcome;

    /// Perform one sample; must always return a result
    async fn run_once(&mut self) -> IterationResult;

    /// Release resources; must be safe to call in any state
    async fn tear_down(&mut self);
}

/// Open connection and publish channel owned by one probe
struct ConnectionHandle {
    connection: Box<dyn BrokerConnection>,
    channel: Box<dyn PublishChannel>,
}

/// Publishes one AMQP message per iteration and times the publish call
pub struct PublishProbe {
    client: Arc<dyn BrokerClient>,
    config: ProbeConfig,
    logger: Logger,
    state: ProbeState,
    handle: Option<ConnectionHandle>,
}

impl PublishProbe {
    /// Resolve the raw parameters and bind the probe to a broker client and log sink
    pub fn configure(client: Arc<dyn BrokerClient>, params: &ProbeParameters, logger: Logger) -> Self {
        Self::with_config(client, resolve_config(params), logger)
    }

    /// Build a probe from an already-resolved configuration
    pub fn with_config(client: Arc<dyn BrokerClient>, config: ProbeConfig, logger: Logger) -> Self {
        Self {
            client,
            config,
            logger,
            state: ProbeState::Uninitialized,
            handle: None,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Whether a handle exists and its channel reports open
    pub fn is_ready(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.channel.is_open())
    }

    /// Open the connection and channel; failures leave the probe `Failed`
    pub async fn set_up(&mut self) -> SetupOutcome {
        if self.state == ProbeState::Ready && self.handle.is_some() {
            self.logger.debug("Set-up skipped: connection already open").log().await;
            return SetupOutcome::Ready;
        }

        self.state = ProbeState::Connecting;
        self.logger.info("Connecting to broker")
            .field("uri", self.config.redacted_uri())
            .field("connect_timeout_ms", self.config.connect_timeout_ms)
            .log()
            .await;

        match self.open_handle().await {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = ProbeState::Ready;
                self.logger.info("AMQP connection and channel open")
                    .field("exchange", &self.config.exchange)
                    .field("routing_key", &self.config.routing_key)
                    .log()
                    .await;
                SetupOutcome::Ready
            }
            Err(error) => {
                self.handle = None;
                self.state = ProbeState::Failed;
                self.logger.error(&format!("AMQP set-up failed: {}", error))
                    .error_info(&error)
                    .field("uri", self.config.redacted_uri())
                    .log()
                    .await;
                SetupOutcome::Failed { reason: error.to_string() }
            }
        }
    }

    async fn open_handle(&self) -> Result<ConnectionHandle> {
        let settings = ConnectSettings::new(self.config.uri.as_str())
            .with_credentials(self.config.username_override(), self.config.password_override());

        let connect = self.client.connect(&settings);
        let connection = match self.config.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| {
                    AppError::timeout(format!(
                        "connection not established within {}ms",
                        self.config.connect_timeout_ms
                    ))
                })??,
            None => connect.await?,
        };

        match connection.create_channel().await {
            Ok(channel) => Ok(ConnectionHandle { connection, channel }),
            Err(error) => {
                if let Err(close_error) = connection.close().await {
                    self.logger.warn("Failed to close connection after channel error")
                        .error_info(&close_error)
                        .log()
                        .await;
                }
                Err(error)
            }
        }
    }

    /// Publish one freshly built message and report the outcome
    pub async fn run_once(&mut self) -> IterationResult {
        let started_at = Utc::now();

        let channel = match self.handle.as_ref() {
            Some(handle) if handle.channel.is_open() => &handle.channel,
            _ => {
                let error = AppError::channel_unavailable("AMQP channel is not open (set-up likely failed)");
                self.logger.error("AMQP publish skipped: channel not open")
                    .error_info(&error)
                    .field("state", self.state.as_str())
                    .log()
                    .await;
                return IterationResult::failed(&error, started_at, TimingBoundary::not_started());
            }
        };

        let envelope = match MessageEnvelope::for_iteration(&self.config) {
            Ok(envelope) => envelope,
            Err(error) => {
                self.logger.error(&format!("AMQP publish skipped: {}", error))
                    .error_info(&error)
                    .field("message_size_bytes", self.config.message_size_bytes)
                    .log()
                    .await;
                return IterationResult::failed(&error, started_at, TimingBoundary::not_started());
            }
        };

        let mut timer = SampleTimer::start();
        let outcome = channel
            .basic_publish(
                &self.config.exchange,
                &self.config.routing_key,
                &envelope.properties,
                &envelope.payload,
            )
            .await;
        let timing = timer.stop();

        match outcome {
            Ok(()) => {
                self.logger.debug("Published message")
                    .correlation_id(envelope.correlation_id())
                    .field("bytes", envelope.len())
                    .field("elapsed_ms", timing.elapsed_ms())
                    .log()
                    .await;
                IterationResult::published(envelope.len(), envelope.correlation_id(), started_at, timing)
            }
            Err(error) => {
                self.logger.error(&format!("AMQP publish failed: {}", error))
                    .correlation_id(envelope.correlation_id())
                    .error_info(&error)
                    .log()
                    .await;
                IterationResult::failed(&error, started_at, timing)
            }
        }
    }

    /// Close channel then connection; errors are logged and swallowed
    pub async fn tear_down(&mut self) {
        let Some(handle) = self.handle.take() else {
            self.logger.debug("Teardown: no open connection")
                .field("state", self.state.as_str())
                .log()
                .await;
            if self.state != ProbeState::Uninitialized {
                self.state = ProbeState::Closed;
            }
            return;
        };

        if handle.channel.is_open() {
            if let Err(error) = handle.channel.close().await {
                self.logger.warn("Ignoring channel close failure")
                    .error_info(&error)
                    .field("detail", error.detail())
                    .log()
                    .await;
            }
        }

        if handle.connection.is_open() {
            if let Err(error) = handle.connection.close().await {
                self.logger.warn("Ignoring connection close failure")
                    .error_info(&error)
                    .field("detail", error.detail())
                    .log()
                    .await;
            }
        }

        self.state = ProbeState::Closed;
        self.logger.info("AMQP connection closed").log().await;
    }
}

#[async_trait]
impl Sampler for PublishProbe {
    fn default_parameters() -> ProbeParameters {
        ProbeParameters::default_parameters()
    }

    async fn set_up(&mut self) -> SetupOutcome {
        PublishProbe::set_up(self).await
    }

    async fn run_once(&mut self) -> IterationResult {
        PublishProbe::run_once(self).await
    }

    async fn tear_down(&mut self) {
        PublishProbe::tear_down(self).await
    }
}
