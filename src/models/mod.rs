//! Data models for the publish probe

pub mod config;
pub mod envelope;
pub mod result;

// Re-export main model types
pub use config::ProbeConfig;
pub use envelope::{MessageEnvelope, MessageProperties};
pub use result::{IterationResult, SampleTimer, TimingBoundary};
