//! Plain and colored text formatters

use super::OutputFormatter;
use crate::{models::IterationResult, types::SetupOutcome};
use colored::*;

/// Plain text, one line per iteration
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    fn status_word(result: &IterationResult) -> &'static str {
        if result.success { "OK" } else { "FAIL" }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_setup(&self, outcome: &SetupOutcome) -> String {
        match outcome {
            SetupOutcome::Ready => "Set-up: connection ready".to_string(),
            SetupOutcome::Failed { reason } => format!("Set-up: FAILED ({})", reason),
        }
    }

    fn format_result(&self, iteration: u32, result: &IterationResult) -> String {
        format!(
            "#{} {} [{}] {:.3}ms {}",
            iteration,
            Self::status_word(result),
            result.status_code,
            result.timing.elapsed_ms(),
            result.message
        )
    }

    fn format_footer(&self, completed: u32, succeeded: u32) -> String {
        format!("Completed {} iterations, {} published", completed, succeeded)
    }
}

/// ANSI-colored variant of the plain formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct ColoredFormatter;

impl OutputFormatter for ColoredFormatter {
    fn format_setup(&self, outcome: &SetupOutcome) -> String {
        match outcome {
            SetupOutcome::Ready => format!("{} connection ready", "Set-up:".bold()),
            SetupOutcome::Failed { reason } => {
                format!("{} {} ({})", "Set-up:".bold(), "FAILED".red().bold(), reason.red())
            }
        }
    }

    fn format_result(&self, iteration: u32, result: &IterationResult) -> String {
        let status = if result.success {
            "OK".green().bold()
        } else {
            "FAIL".red().bold()
        };
        let message = if result.success {
            result.message.normal()
        } else {
            result.message.yellow()
        };

        format!(
            "{} {} [{}] {} {}",
            format!("#{}", iteration).dimmed(),
            status,
            result.status_code,
            format!("{:.3}ms", result.timing.elapsed_ms()).cyan(),
            message
        )
    }

    fn format_footer(&self, completed: u32, succeeded: u32) -> String {
        let summary = format!("Completed {} iterations, {} published", completed, succeeded);
        if succeeded == completed {
            summary.green().to_string()
        } else {
            summary.yellow().to_string()
        }
    }
}
