//! Trace sink for the solver
//!
//! The solver reports every rule evaluation, question dispatch and goal stack
//! transition to an optional [`Logger`]. Logging never influences control flow.

use std::fmt;
use std::sync::Arc;

/// How noteworthy a trace event is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

pub trait Logger {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>);
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        (**self).log(severity, message)
    }
}

/// Forwards solver events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, severity: Severity, message: fmt::Arguments<'_>) {
        match severity {
            Severity::Debug => tracing::debug!(target: "sage::solver", "{}", message),
            Severity::Info => tracing::info!(target: "sage::solver", "{}", message),
            Severity::Warning => tracing::warn!(target: "sage::solver", "{}", message),
        }
    }
}
