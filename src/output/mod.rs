//! Output formatting for per-iteration results
//!
//! Plain, colored and JSON-lines renderings of what the probe reports to
//! the harness. No aggregation happens here.

mod formatter;
mod json;

pub use formatter::{ColoredFormatter, PlainFormatter};
pub use json::{JsonFormatter, ResultLine};

use crate::{models::IterationResult, types::SetupOutcome};

/// Renders probe outcomes for display
pub trait OutputFormatter {
    /// Format the result of set-up
    fn format_setup(&self, outcome: &SetupOutcome) -> String;

    /// Format one iteration
    fn format_result(&self, iteration: u32, result: &IterationResult) -> String;

    /// Format the closing line after teardown
    fn format_footer(&self, completed: u32, succeeded: u32) -> String;
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on JSON mode and color support
    pub fn create_formatter(json: bool, enable_color: bool) -> Box<dyn OutputFormatter> {
        if json {
            Box::new(JsonFormatter)
        } else if enable_color {
            Box::new(ColoredFormatter)
        } else {
            Box::new(PlainFormatter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimingBoundary;
    use chrono::Utc;

    #[test]
    fn test_factory_selects_json() {
        let formatter = OutputFormatterFactory::create_formatter(true, true);
        let result = IterationResult::published(3, "id-1", Utc::now(), TimingBoundary::not_started());
        let line = formatter.format_result(1, &result);
        assert!(line.starts_with('{'));
    }

    #[test]
    fn test_factory_selects_plain() {
        let formatter = OutputFormatterFactory::create_formatter(false, false);
        let result = IterationResult::published(3, "id-1", Utc::now(), TimingBoundary::not_started());
        assert!(formatter.format_result(1, &result).starts_with("#1 OK"));
    }
}
