//! Configuration management module

pub mod params;
pub mod env;

// Re-export main functionality
pub use params::{
    ProbeParameters, resolve_config, parse_assignment, display_config_summary, display_parameters,
};
pub use env::EnvManager;

// Re-export from models for convenience
pub use crate::models::ProbeConfig;
