//! JSON-lines output for machine consumption

use super::OutputFormatter;
use crate::{
    models::IterationResult,
    types::{DataType, SetupOutcome},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Serializable view of one iteration result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLine {
    pub iteration: u32,
    pub label: String,
    pub success: bool,
    pub status_code: String,
    pub message: String,
    pub response: Option<String>,
    pub data_type: DataType,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: f64,
}

impl ResultLine {
    pub fn from_result(iteration: u32, result: &IterationResult) -> Self {
        Self {
            iteration,
            label: result.label.clone(),
            success: result.success,
            status_code: result.status_code.clone(),
            message: result.message.clone(),
            response: result.response_text(),
            data_type: result.data_type,
            started_at: result.started_at,
            elapsed_ms: result.timing.elapsed_ms(),
        }
    }
}

/// One JSON object per line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_setup(&self, outcome: &SetupOutcome) -> String {
        let value = match outcome {
            SetupOutcome::Ready => json!({ "event": "setup", "ready": true }),
            SetupOutcome::Failed { reason } => json!({ "event": "setup", "ready": false, "reason": reason }),
        };
        value.to_string()
    }

    fn format_result(&self, iteration: u32, result: &IterationResult) -> String {
        match serde_json::to_string(&ResultLine::from_result(iteration, result)) {
            Ok(line) => line,
            Err(e) => json!({ "iteration": iteration, "error": e.to_string() }).to_string(),
        }
    }

    fn format_footer(&self, completed: u32, succeeded: u32) -> String {
        json!({ "event": "complete", "iterations": completed, "published": succeeded }).to_string()
    }
}
