//! Minimal harness driver: set-up, N iterations, teardown

use crate::{
    logging::Logger,
    models::IterationResult,
    probe::Sampler,
    types::SetupOutcome,
};
use std::time::Duration;

/// How many iterations to drive and how long to pause between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub iterations: u32,
    pub interval: Duration,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            iterations: crate::defaults::DEFAULT_ITERATIONS,
            interval: Duration::ZERO,
        }
    }
}

/// What a run produced; results are streamed to the caller, only counts are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub setup: SetupOutcome,
    pub completed: u32,
    pub succeeded: u32,
}

impl RunReport {
    pub fn success_count(&self) -> u32 {
        self.succeeded
    }

    pub fn failure_count(&self) -> u32 {
        self.completed - self.succeeded
    }

    pub fn any_success(&self) -> bool {
        self.succeeded > 0
    }
}

/// Drives one sampler through a complete run
pub struct ProbeRunner {
    plan: RunPlan,
    logger: Logger,
}

impl ProbeRunner {
    pub fn new(plan: RunPlan, logger: Logger) -> Self {
        Self { plan, logger }
    }

    /// Run set-up, every iteration, then teardown; `on_result` sees each result as it lands
    /// and results are not kept afterwards
    pub async fn run<S, F>(&self, sampler: &mut S, mut on_result: F) -> RunReport
    where
        S: Sampler + ?Sized,
        F: FnMut(u32, &IterationResult),
    {
        let setup = sampler.set_up().await;
        if let SetupOutcome::Failed { reason } = &setup {
            self.logger.warn("Set-up failed; iterations will fail fast")
                .field("reason", reason)
                .log()
                .await;
        }

        let mut completed = 0;
        let mut succeeded = 0;
        for iteration in 1..=self.plan.iterations {
            let result = sampler.run_once().await;
            completed += 1;
            if result.success {
                succeeded += 1;
            }
            on_result(iteration, &result);

            if iteration < self.plan.iterations && !self.plan.interval.is_zero() {
                tokio::time::sleep(self.plan.interval).await;
            }
        }

        sampler.tear_down().await;
        self.logger.info("Run complete")
            .field("iterations", completed)
            .field("published", succeeded)
            .log()
            .await;

        RunReport { setup, completed, succeeded }
    }
}
