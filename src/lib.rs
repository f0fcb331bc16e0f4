//! AMQP Publish Probe
//!
//! A load-generation probe that publishes one AMQP 0-9-1 message per
//! iteration and reports the local latency and outcome of each publish to
//! whatever harness drives it.

pub mod broker;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{IterationResult, MessageEnvelope, ProbeConfig};
pub use probe::{PublishProbe, Sampler};
pub use config::{resolve_config, ProbeParameters};
pub use output::{OutputFormatter, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata stamped by build.rs
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, built {}, commit {})",
        PKG_NAME,
        VERSION,
        env!("TARGET_TRIPLE"),
        env!("BUILD_TIME"),
        option_env!("GIT_COMMIT").unwrap_or("unknown"),
    )
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_URI: &str = "amqp://localhost:5672";
    pub const DEFAULT_ROUTING_KEY: &str = "test.key";
    pub const DEFAULT_MESSAGE_SIZE_BYTES: i32 = 256;
    pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
    pub const DEFAULT_ITERATIONS: u32 = 10;
}
