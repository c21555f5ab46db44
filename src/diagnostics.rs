//! Run diagnostics routed through the `log` facade
//!
//! The verbose and debug switches only gate what is logged. Timings are
//! always reported.

use std::fmt;
use std::time::Duration;

/// Diagnostic sink handed to each stage of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    verbose: bool,
    debug: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool, debug: bool) -> Self {
        Self { verbose, debug }
    }

    /// No narration, no dumps; timings still go to the logger
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Narration, emitted when verbose
    pub fn info(&self, args: fmt::Arguments<'_>) {
        if self.verbose {
            log::info!("{}", args);
        }
    }

    /// Intermediate quantities, emitted when debugging
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.debug {
            log::debug!("{}", args);
        }
    }

    /// Wall-clock time of a stage
    pub fn timing(&self, label: &str, elapsed: Duration) {
        log::info!("{} [s]: {:.6}", label, elapsed.as_secs_f64());
    }
}
