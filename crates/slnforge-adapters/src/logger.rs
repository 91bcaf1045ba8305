//! Plan logger adapters.

use std::sync::{Arc, Mutex};

use slnforge_core::application::ports::PlanLogger;
use tracing::{debug, info};

/// Target every [`TracingLogger`] event is emitted under.
pub const PLAN_TARGET: &str = "slnforge::plan";

/// Forwards plan progress to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PlanLogger for TracingLogger {
    fn trace(&self, message: &str) {
        debug!(target: PLAN_TARGET, "{message}");
    }

    fn start_step(&self, step: &str) {
        info!(target: PLAN_TARGET, step, "step");
    }

    fn start_project(&self, name: &str) {
        info!(target: PLAN_TARGET, project = name, "creating project");
    }

    fn end_project(&self, name: &str) {
        debug!(target: PLAN_TARGET, project = name, "project done");
    }
}

/// Keeps every line a plan reports, for display after the run and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl PlanLogger for RecordingLogger {
    fn trace(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_logger_uses_default_project_formatting() {
        let logger = RecordingLogger::new();
        let shared = logger.clone();

        logger.start_step("Create solution 'Demo'");
        logger.start_project("Lib");
        logger.trace_alteration("Copy Class1.cs");
        logger.end_project("Lib");

        assert_eq!(
            shared.lines(),
            [
                "Create solution 'Demo'",
                "Creating project Lib",
                "  Copy Class1.cs",
            ]
        );
    }
}
