//! AMQP Publish Probe - reference harness binary
//!
//! Resolves parameters from defaults, environment and flags, drives one
//! probe through a run and prints each iteration's result.

use amqp_publish_probe::{
    broker::{AmqpBrokerClient, BrokerClient, InMemoryBroker},
    cli::Cli,
    config::{display_config_summary, display_parameters, EnvManager},
    error::{AppError, Result},
    logging::Logger,
    runner::ProbeRunner,
    OutputFormatterFactory, PublishProbe, Sampler,
};
use clap::Parser;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.show_defaults {
        println!("{}", display_parameters(&PublishProbe::default_parameters()));
        return Ok(());
    }

    if let Some(path) = &cli.write_env {
        EnvManager::save_example_env_file(path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    if cli.debug && !cli.json {
        println!("{}", amqp_publish_probe::build_info());
        println!("Debug mode enabled");
        println!();
    }

    let params = cli.resolve_params()?;
    let mut logger = Logger::with_flags("amqp-probe".to_string(), cli.verbose, cli.debug, cli.use_colors());
    if cli.json {
        logger = logger.to_stderr();
    }
    logger.start_session().await;

    for key in params.unknown_keys() {
        logger.warn(&format!("Ignoring unknown parameter '{}'", key)).log().await;
    }

    let client: Arc<dyn BrokerClient> = if cli.dry_run {
        Arc::new(InMemoryBroker::new().count_only())
    } else {
        Arc::new(AmqpBrokerClient::new())
    };

    let mut probe = PublishProbe::configure(client, &params, logger.child("probe"));

    if (cli.verbose || cli.debug) && !cli.json {
        println!("Configuration:");
        for line in display_config_summary(probe.config()).lines() {
            println!("  {}", line);
        }
        if cli.dry_run {
            println!("  Mode: dry run (in-memory broker)");
        }
        println!();
    }

    let formatter = OutputFormatterFactory::create_formatter(cli.json, cli.use_colors());
    let runner = ProbeRunner::new(cli.run_plan(), logger.child("runner"));

    let report = runner
        .run(&mut probe, |iteration, result| {
            println!("{}", formatter.format_result(iteration, result));
        })
        .await;

    if cli.verbose || cli.debug || cli.json {
        println!("{}", formatter.format_setup(&report.setup));
    }
    println!("{}", formatter.format_footer(report.completed, report.succeeded));

    if report.completed == 0 || report.any_success() {
        Ok(())
    } else {
        Err(AppError::test_execution("No message was published - check broker connectivity"))
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Parameters are passed as --param KEY=VALUE");
            eprintln!("  - Check your .env file for AMQP_PROBE_* entries");
            eprintln!("  - Run with --show-defaults to list every option");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Broker troubleshooting:");
            eprintln!("  - Verify the broker is reachable at the configured uri");
            eprintln!("  - Check username/password or the credentials in the uri");
            eprintln!("  - Increase connect_timeout_ms for slow networks");
            eprintln!("  - Use --dry-run to check the probe without a broker");
        }
        _ => {}
    }
}
