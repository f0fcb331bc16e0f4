//! Resolved probe configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Typed, immutable snapshot of the probe options for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Broker connection target
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Overrides the URI user when non-blank
    #[serde(default)]
    pub username: String,

    /// Overrides the URI password when non-blank
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Target exchange; empty means the default exchange
    #[serde(default)]
    pub exchange: String,

    /// Routing key for every publish
    #[serde(default = "default_routing_key")]
    pub routing_key: String,

    /// Literal payload; empty selects the synthetic payload
    #[serde(default)]
    pub message_body: String,

    /// Synthetic payload length; values below 1 are clamped when building
    #[serde(default = "default_message_size_bytes")]
    pub message_size_bytes: i32,

    /// Content type override; `None` lets the payload kind decide
    #[serde(default)]
    pub content_type: Option<String>,

    /// Publish with delivery mode 2 instead of 1
    #[serde(default)]
    pub persistent: bool,

    /// Connection establishment timeout; 0 waits indefinitely
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            username: String::new(),
            password: String::new(),
            exchange: String::new(),
            routing_key: default_routing_key(),
            message_body: String::new(),
            message_size_bytes: default_message_size_bytes(),
            content_type: None,
            persistent: false,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ProbeConfig {
    /// Connection timeout, `None` when waiting indefinitely
    pub fn connect_timeout(&self) -> Option<Duration> {
        if self.connect_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.connect_timeout_ms))
        }
    }

    /// Username override, only when non-blank
    pub fn username_override(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    /// Password override, only when non-blank
    pub fn password_override(&self) -> Option<&str> {
        non_blank(&self.password)
    }

    /// Whether a literal message body is configured
    pub fn has_literal_body(&self) -> bool {
        !self.message_body.is_empty()
    }

    /// The URI with any embedded password masked, safe for logs
    pub fn redacted_uri(&self) -> String {
        match url::Url::parse(&self.uri) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("****"));
                }
                parsed.to_string()
            }
            Err(_) => self.uri.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// Default value functions for serde
fn default_uri() -> String {
    crate::defaults::DEFAULT_URI.to_string()
}

fn default_routing_key() -> String {
    crate::defaults::DEFAULT_ROUTING_KEY.to_string()
}

fn default_message_size_bytes() -> i32 {
    crate::defaults::DEFAULT_MESSAGE_SIZE_BYTES
}

fn default_connect_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_CONNECT_TIMEOUT_MS
}
