//! crates/timber/src/macros.rs
//! Macros that log through the global forest using Rust format syntax.
//!
//! The macros format with [`format!`] before dispatch, so printf-style
//! template expansion is never applied to their output. Each expands to a
//! `Result<(), LogError>` and records the expansion site plus
//! `module_path!()` for tag derivation.

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    (@severity $severity:expr, $error:expr, $($arg:tt)+) => {
        $crate::Logger::log_severity(
            $crate::global(),
            $severity,
            $crate::Record::new(
                $crate::Caller::new(
                    ::std::panic::Location::caller(),
                    ::std::option::Option::Some(::std::module_path!()),
                ),
                $error,
                &::std::format!($($arg)+),
                &[],
            ),
        )
    };
    (@priority $priority:expr, $error:expr, $($arg:tt)+) => {
        $crate::Logger::log_priority(
            $crate::global(),
            $priority,
            $crate::Record::new(
                $crate::Caller::new(
                    ::std::panic::Location::caller(),
                    ::std::option::Option::Some(::std::module_path!()),
                ),
                $error,
                &::std::format!($($arg)+),
                &[],
            ),
        )
    };
}

/// Logs a trace message through the global forest.
///
/// # Example
/// ```
/// # fn main() -> Result<(), timber::LogError> {
/// timber::trace!("polling {} sockets", 3)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! trace {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Trace,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Trace, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs a debug message through the global forest.
#[macro_export]
macro_rules! debug {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Debug,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Debug, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs an info message through the global forest.
///
/// # Example
/// ```
/// # fn main() -> Result<(), timber::LogError> {
/// timber::tag("Startup");
/// timber::info!("listening on port {}", 8080)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! info {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Info,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Info, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs a warning through the global forest.
#[macro_export]
macro_rules! warn {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Warn,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Warn, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs an error through the global forest.
///
/// # Example
/// ```
/// # fn main() -> Result<(), timber::LogError> {
/// let failure = std::io::Error::other("connection reset");
/// timber::error!(error: &failure, "upload of {} aborted", "report.csv")?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! error {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Error,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Error, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs a fatal assertion through the global forest. Does not abort.
#[macro_export]
macro_rules! fatal {
    (error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Fatal,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log!(@severity $crate::Severity::Fatal, ::std::option::Option::None, $($arg)+)
    };
}

/// Logs at a raw backend priority through the global forest.
///
/// # Example
/// ```
/// # fn main() -> Result<(), timber::LogError> {
/// timber::log!(timber::android::WARN, "battery at {}%", 5)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! log {
    ($priority:expr, error: $error:expr, $($arg:tt)+) => {
        $crate::__log!(@priority $priority,
            ::std::option::Option::Some($error as &(dyn ::std::error::Error + 'static)), $($arg)+)
    };
    ($priority:expr, $($arg:tt)+) => {
        $crate::__log!(@priority $priority, ::std::option::Option::None, $($arg)+)
    };
}
