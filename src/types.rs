//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Connection lifecycle state of a probe instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeState {
    /// Configured, no connection attempted yet
    Uninitialized,
    /// Set-up in progress
    Connecting,
    /// Connection and channel open
    Ready,
    /// Set-up failed; terminal for the run
    Failed,
    /// Torn down
    Closed,
}

impl ProbeState {
    /// Lower-case name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeState::Uninitialized => "uninitialized",
            ProbeState::Connecting => "connecting",
            ProbeState::Ready => "ready",
            ProbeState::Failed => "failed",
            ProbeState::Closed => "closed",
        }
    }
}

/// Wire-level AMQP delivery mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Broker may keep the message in memory only
    NonPersistent,
    /// Broker should write the message to stable storage
    Persistent,
}

impl DeliveryMode {
    /// Map the configured persistence flag to a delivery mode
    pub fn from_persistent(persistent: bool) -> Self {
        if persistent {
            DeliveryMode::Persistent
        } else {
            DeliveryMode::NonPersistent
        }
    }

    /// Numeric value carried in the basic properties (1 or 2)
    pub fn as_u8(&self) -> u8 {
        match self {
            DeliveryMode::NonPersistent => 1,
            DeliveryMode::Persistent => 2,
        }
    }
}

/// How the harness should interpret an iteration's response data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Response data is UTF-8 text (the correlation id)
    Text,
}

/// Tagged outcome of the set-up phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Connection and channel are open
    Ready,
    /// Set-up failed; every later iteration fails fast
    Failed { reason: String },
}

impl SetupOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SetupOutcome::Ready)
    }
}
