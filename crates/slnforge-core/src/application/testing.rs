//! Test doubles shared by the application unit tests.

use std::sync::{Arc, Mutex};

use super::plan::TemplatePlan;
use super::ports::{Filesystem, PlanLogger};

/// Logger capturing every traced line.
#[derive(Debug, Default, Clone)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl PlanLogger for Transcript {
    fn trace(&self, message: &str) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push(message.to_owned());
        }
    }
}

pub fn plan_with(fs: impl Filesystem + 'static) -> TemplatePlan {
    TemplatePlan::new("work", Box::new(fs), Box::new(Transcript::default()))
}
