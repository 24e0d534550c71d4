//! The highlight engine and its injected collaborators

use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::scheduler::Scheduler;
use std::rc::Rc;

/// Entry point for every highlight operation
///
/// The engine keeps no record of earlier calls. It holds only the scheduler
/// used for stagger and fade timers, the diagnostics sink, and the default
/// configuration. Rendering targets are passed in per call.
pub struct HighlightEngine {
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) diagnostics: Rc<dyn Diagnostics>,
    pub(crate) config: EngineConfig,
}

impl HighlightEngine {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            diagnostics: Rc::new(TracingDiagnostics),
            config: EngineConfig::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }
}
