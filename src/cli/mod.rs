//! Command-line interface for the reference harness binary

use crate::{
    config::{parse_assignment, EnvManager, ProbeParameters},
    runner::RunPlan,
};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// AMQP Publish Probe - publish messages to an AMQP 0-9-1 broker and time each publish
#[derive(Parser, Debug, Clone)]
#[command(name = "amqp-probe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Probe option as KEY=VALUE (repeatable), e.g. -p routing_key=orders.created
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", action = ArgAction::Append, value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Number of publish iterations
    #[arg(short = 'n', long, default_value_t = crate::defaults::DEFAULT_ITERATIONS, env = "AMQP_PROBE_ITERATIONS")]
    pub iterations: u32,

    /// Pause between iterations in milliseconds
    #[arg(long, default_value_t = 0)]
    pub interval_ms: u64,

    /// Publish into an in-memory broker instead of connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Emit one JSON object per line
    #[arg(long)]
    pub json: bool,

    /// Print the default parameter table and exit
    #[arg(long)]
    pub show_defaults: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_env: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

fn parse_param(input: &str) -> Result<(String, String), String> {
    parse_assignment(input).map_err(|e| e.detail().to_string())
}

impl Cli {
    /// Parameters from --param flags only
    pub fn cli_params(&self) -> ProbeParameters {
        self.params.iter().cloned().collect()
    }

    /// Defaults, overlaid by AMQP_PROBE_* variables, overlaid by --param flags
    pub fn merged_params(&self, env_params: &ProbeParameters) -> ProbeParameters {
        let mut params = ProbeParameters::default_parameters();
        params.merge(env_params);
        params.merge(&self.cli_params());
        params
    }

    /// Load .env, then merge environment and CLI parameters
    pub fn resolve_params(&self) -> crate::Result<ProbeParameters> {
        EnvManager::load_env_file(self.debug && !self.json)?;
        Ok(self.merged_params(&EnvManager::params_from_env()))
    }

    pub fn run_plan(&self) -> RunPlan {
        RunPlan {
            iterations: self.iterations,
            interval: Duration::from_millis(self.interval_ms),
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["amqp-probe"]);
        assert!(cli.params.is_empty());
        assert!(!cli.dry_run);
        assert!(cli.write_env.is_none());
        assert_eq!(cli.run_plan().interval, Duration::ZERO);
    }

    #[test]
    fn test_repeated_params() {
        let cli = Cli::parse_from([
            "amqp-probe",
            "-p", "routing_key=orders.created",
            "--param", "message_body={\"id\":1}",
            "-n", "3",
            "--interval-ms", "25",
        ]);

        let params = cli.cli_params();
        assert_eq!(params.get("routing_key"), Some("orders.created"));
        assert_eq!(params.get("message_body"), Some("{\"id\":1}"));
        assert_eq!(cli.run_plan(), RunPlan { iterations: 3, interval: Duration::from_millis(25) });
    }

    #[test]
    fn test_malformed_param_rejected() {
        assert!(Cli::try_parse_from(["amqp-probe", "-p", "no-equals-sign"]).is_err());
    }

    #[test]
    fn test_merge_order() {
        let cli = Cli::parse_from(["amqp-probe", "-p", "routing_key=from.cli"]);
        let env = ProbeParameters::new()
            .with("routing_key", "from.env")
            .with("exchange", "env-exchange");

        let merged = cli.merged_params(&env);
        assert_eq!(merged.get("routing_key"), Some("from.cli"));
        assert_eq!(merged.get("exchange"), Some("env-exchange"));
        assert_eq!(merged.get("uri"), Some("amqp://localhost:5672"));
    }

    #[test]
    fn test_json_disables_color() {
        let cli = Cli::parse_from(["amqp-probe", "--json"]);
        assert!(!cli.use_colors());
    }
}
