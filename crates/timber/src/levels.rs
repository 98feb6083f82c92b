//! crates/timber/src/levels.rs
//! Level sets mapping abstract severities onto backend priority codes.

use super::severity::Severity;

/// Maps each [`Severity`] to the integer priority a backend understands.
///
/// Implementations are pure: every accessor returns the same code for the
/// lifetime of the value. A single level set may be shared by many trees.
pub trait LevelSet: Send + Sync {
    /// Priority code for [`Severity::Trace`].
    fn trace_level(&self) -> i32;
    /// Priority code for [`Severity::Debug`].
    fn debug_level(&self) -> i32;
    /// Priority code for [`Severity::Info`].
    fn info_level(&self) -> i32;
    /// Priority code for [`Severity::Warn`].
    fn warn_level(&self) -> i32;
    /// Priority code for [`Severity::Error`].
    fn error_level(&self) -> i32;
    /// Priority code for [`Severity::Fatal`].
    fn fatal_level(&self) -> i32;

    /// Returns the priority code for `severity`.
    fn priority(&self, severity: Severity) -> i32 {
        match severity {
            Severity::Trace => self.trace_level(),
            Severity::Debug => self.debug_level(),
            Severity::Info => self.info_level(),
            Severity::Warn => self.warn_level(),
            Severity::Error => self.error_level(),
            Severity::Fatal => self.fatal_level(),
        }
    }

    /// Reverse lookup of [`priority`](Self::priority).
    ///
    /// When several severities share a code the most severe one wins, so a
    /// set that folds trace into debug reports `Debug` for that code.
    fn severity_of(&self, priority: i32) -> Option<Severity> {
        Severity::ALL
            .iter()
            .rev()
            .copied()
            .find(|severity| self.priority(*severity) == priority)
    }
}

/// Small consecutive codes, `0` for trace through `5` for fatal.
///
/// Useful for tests and for sinks that only care about relative ordering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsecutiveLevels;

impl LevelSet for ConsecutiveLevels {
    fn trace_level(&self) -> i32 {
        0
    }

    fn debug_level(&self) -> i32 {
        1
    }

    fn info_level(&self) -> i32 {
        2
    }

    fn warn_level(&self) -> i32 {
        3
    }

    fn error_level(&self) -> i32 {
        4
    }

    fn fatal_level(&self) -> i32 {
        5
    }
}

/// Priority constants used by the Android log facility.
pub mod android {
    /// `Log.VERBOSE`.
    pub const VERBOSE: i32 = 2;
    /// `Log.DEBUG`.
    pub const DEBUG: i32 = 3;
    /// `Log.INFO`.
    pub const INFO: i32 = 4;
    /// `Log.WARN`.
    pub const WARN: i32 = 5;
    /// `Log.ERROR`.
    pub const ERROR: i32 = 6;
    /// `Log.ASSERT`.
    pub const ASSERT: i32 = 7;
}

/// Level set matching the Android log facility (`VERBOSE` = 2 .. `ASSERT` = 7).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AndroidLevels;

impl LevelSet for AndroidLevels {
    fn trace_level(&self) -> i32 {
        android::VERBOSE
    }

    fn debug_level(&self) -> i32 {
        android::DEBUG
    }

    fn info_level(&self) -> i32 {
        android::INFO
    }

    fn warn_level(&self) -> i32 {
        android::WARN
    }

    fn error_level(&self) -> i32 {
        android::ERROR
    }

    fn fatal_level(&self) -> i32 {
        android::ASSERT
    }
}
