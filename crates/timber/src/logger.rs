//! crates/timber/src/logger.rs
//! The per-severity logging API shared by trees and the forest.

use std::error::Error;

use super::caller::Caller;
use super::error::LogError;
use super::format::Arg;
use super::severity::Severity;

/// One log call before it reaches a tree.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    caller: Caller,
    error: Option<&'a (dyn Error + 'static)>,
    message: &'a str,
    args: &'a [Arg<'a>],
}

impl<'a> Record<'a> {
    /// Bundles the parts of a log call.
    pub const fn new(
        caller: Caller,
        error: Option<&'a (dyn Error + 'static)>,
        message: &'a str,
        args: &'a [Arg<'a>],
    ) -> Self {
        Self {
            caller,
            error,
            message,
            args,
        }
    }

    /// Call site of the log call.
    pub const fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Error attached to the call, if any.
    pub const fn error(&self) -> Option<&'a (dyn Error + 'static)> {
        self.error
    }

    /// Message template as passed by the caller.
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Template arguments; empty means the message is used verbatim.
    pub const fn args(&self) -> &'a [Arg<'a>] {
        self.args
    }
}

/// A logging capability: a single [`Tree`](crate::Tree) or the whole
/// [`Forest`](crate::Forest).
///
/// Implementors provide the two dispatch methods; the per-severity helpers
/// capture the call site through `#[track_caller]` and forward to them.
/// Every helper returns `Err` for formatting and tagging mistakes, which are
/// programmer errors and should not be ignored silently.
pub trait Logger: Send + Sync {
    /// Logs `record` at `severity`, mapped through each receiving tree's own
    /// level set.
    fn log_severity(&self, severity: Severity, record: Record<'_>) -> Result<(), LogError>;

    /// Logs `record` at a raw backend `priority`.
    fn log_priority(&self, priority: i32, record: Record<'_>) -> Result<(), LogError>;

    /// Logs a trace message with optional format args.
    #[track_caller]
    fn trace(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Trace, Record::new(Caller::here(), None, message, args))
    }

    /// Logs a trace error and a message with optional format args.
    #[track_caller]
    fn trace_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Trace,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs a debug message with optional format args.
    #[track_caller]
    fn debug(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Debug, Record::new(Caller::here(), None, message, args))
    }

    /// Logs a debug error and a message with optional format args.
    #[track_caller]
    fn debug_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Debug,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs an info message with optional format args.
    #[track_caller]
    fn info(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Info, Record::new(Caller::here(), None, message, args))
    }

    /// Logs an info error and a message with optional format args.
    #[track_caller]
    fn info_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Info,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs a warning message with optional format args.
    #[track_caller]
    fn warn(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Warn, Record::new(Caller::here(), None, message, args))
    }

    /// Logs a warning error and a message with optional format args.
    #[track_caller]
    fn warn_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Warn,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs an error message with optional format args.
    #[track_caller]
    fn error(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Error, Record::new(Caller::here(), None, message, args))
    }

    /// Logs an error value and a message with optional format args.
    #[track_caller]
    fn error_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Error,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs a fatal assertion message with optional format args.
    #[track_caller]
    fn fatal(&self, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_severity(Severity::Fatal, Record::new(Caller::here(), None, message, args))
    }

    /// Logs a fatal assertion error and a message with optional format args.
    #[track_caller]
    fn fatal_with(
        &self,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_severity(
            Severity::Fatal,
            Record::new(Caller::here(), Some(error), message, args),
        )
    }

    /// Logs at `priority` a message with optional format args.
    #[track_caller]
    fn log(&self, priority: i32, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
        self.log_priority(priority, Record::new(Caller::here(), None, message, args))
    }

    /// Logs at `priority` an error and a message with optional format args.
    #[track_caller]
    fn log_with(
        &self,
        priority: i32,
        error: &(dyn Error + 'static),
        message: &str,
        args: &[Arg<'_>],
    ) -> Result<(), LogError> {
        self.log_priority(priority, Record::new(Caller::here(), Some(error), message, args))
    }
}
