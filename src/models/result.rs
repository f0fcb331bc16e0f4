//! Per-iteration result returned to the harness

use crate::{error::AppError, types::DataType};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Label reported for every publish sample
pub const SAMPLE_LABEL: &str = "AMQP Publish";

/// Status code reported for a successful publish
pub const STATUS_OK: &str = "200";

/// Status code reported for any failed iteration
pub const STATUS_FAILED: &str = "500";

/// Monotonic start/end instants of the publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingBoundary {
    pub start: Instant,
    pub end: Instant,
}

impl TimingBoundary {
    /// A zero-length boundary for iterations that never started timing
    pub fn not_started() -> Self {
        let now = Instant::now();
        Self { start: now, end: now }
    }

    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// Running sample timer; `end` is only recorded once
#[derive(Debug)]
pub struct SampleTimer {
    start: Instant,
    end: Option<Instant>,
}

impl SampleTimer {
    pub fn start() -> Self {
        Self { start: Instant::now(), end: None }
    }

    /// Record the end instant if not already recorded
    pub fn stop(&mut self) -> TimingBoundary {
        let end = *self.end.get_or_insert_with(Instant::now);
        TimingBoundary { start: self.start, end }
    }
}

/// Outcome record for one `run_once` call
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub label: String,
    pub success: bool,
    pub status_code: String,
    pub message: String,
    /// Correlation ID bytes on success
    pub response_data: Option<Vec<u8>>,
    pub data_type: DataType,
    /// Wall-clock time the iteration began
    pub started_at: DateTime<Utc>,
    pub timing: TimingBoundary,
}

impl IterationResult {
    /// A successful publish of `payload_len` bytes
    pub fn published(payload_len: usize, correlation_id: &str, started_at: DateTime<Utc>, timing: TimingBoundary) -> Self {
        Self {
            label: SAMPLE_LABEL.to_string(),
            success: true,
            status_code: STATUS_OK.to_string(),
            message: format!("Published {} bytes, correlationId={}", payload_len, correlation_id),
            response_data: Some(correlation_id.as_bytes().to_vec()),
            data_type: DataType::Text,
            started_at,
            timing,
        }
    }

    /// A failed iteration described by `error`
    pub fn failed(error: &AppError, started_at: DateTime<Utc>, timing: TimingBoundary) -> Self {
        Self {
            label: SAMPLE_LABEL.to_string(),
            success: false,
            status_code: STATUS_FAILED.to_string(),
            message: format!("Publish failed: {}: {}", error.kind(), error.detail()),
            response_data: None,
            data_type: DataType::Text,
            started_at,
            timing,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timing.elapsed()
    }

    /// Response data decoded as text, if any
    pub fn response_text(&self) -> Option<String> {
        self.response_data
            .as_ref()
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }
}
