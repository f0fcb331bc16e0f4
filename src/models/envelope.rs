//! Per-publish message envelope and the payload construction policy

use crate::{
    error::{AppError, Result},
    models::ProbeConfig,
    types::DeliveryMode,
};
use uuid::Uuid;

/// Content type used for literal message bodies without an override
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type used for synthetic payloads without an override
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Filler pattern modulus for synthetic payloads
pub const FILLER_MODULUS: usize = 251;

/// Message properties sent with a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageProperties {
    pub correlation_id: String,
    pub content_type: String,
    pub delivery_mode: DeliveryMode,
}

/// A single message, built fresh for each iteration and dropped after publish
#[derive(Debug, Clone)]
pub struct MessageEnvelope {
    pub payload: Vec<u8>,
    pub properties: MessageProperties,
}

impl MessageEnvelope {
    /// Build the envelope for one iteration with a new correlation ID
    pub fn for_iteration(config: &ProbeConfig) -> Result<Self> {
        let payload = build_payload(config)?;
        let content_type = resolve_content_type(config);

        Ok(Self {
            payload,
            properties: MessageProperties {
                correlation_id: Uuid::new_v4().to_string(),
                content_type,
                delivery_mode: DeliveryMode::from_persistent(config.persistent),
            },
        })
    }

    pub fn correlation_id(&self) -> &str {
        &self.properties.correlation_id
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Literal body bytes when configured, otherwise the synthetic filler
pub fn build_payload(config: &ProbeConfig) -> Result<Vec<u8>> {
    if config.has_literal_body() {
        Ok(config.message_body.as_bytes().to_vec())
    } else {
        synthetic_payload(config.message_size_bytes)
    }
}

/// `max(1, size)` bytes where byte `i` is `i mod 251`
pub fn synthetic_payload(size: i32) -> Result<Vec<u8>> {
    filler_payload(size.max(1) as usize)
}

/// Allocation failure is reported, not fatal
fn filler_payload(len: usize) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(len)
        .map_err(|e| AppError::payload(format!("cannot allocate {} byte payload: {}", len, e)))?;
    payload.extend((0..len).map(|i| (i % FILLER_MODULUS) as u8));
    Ok(payload)
}

/// Override when non-empty, else chosen by payload kind
pub fn resolve_content_type(config: &ProbeConfig) -> String {
    match config.content_type.as_deref() {
        Some(content_type) if !content_type.is_empty() => content_type.to_string(),
        _ if config.has_literal_body() => CONTENT_TYPE_JSON.to_string(),
        _ => CONTENT_TYPE_OCTET_STREAM.to_string(),
    }
}
