//! crates/timber-sink/src/syslog.rs
//! syslog(3) backend.
//!
//! Uses libc `openlog`/`syslog`/`closelog` directly rather than pulling in a
//! dedicated syslog crate. The connection is process-wide; every open
//! [`SyslogGuard`] holds one reference to it and `closelog` runs when the
//! last guard is dropped.

use std::error::Error;
use std::ffi::CString;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, PoisonError};

use thiserror::Error;
use timber::{LevelSet, LogSink, emit_chunked};

/// Largest message body handed to a single `syslog(3)` call.
///
/// Classic BSD syslog transports cap a datagram at 1024 bytes; the body
/// limit leaves room for the header and the `tag: ` prefix.
pub const MAX_SYSLOG_LENGTH: usize = 960;

/// Default ident passed to `openlog(3)`.
pub const DEFAULT_SYSLOG_IDENT: &str = "timber";

/// Syslog facility codes matching the POSIX syslog(3) constants.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum SyslogFacility {
    /// Kernel messages (LOG_KERN).
    Kern = libc::LOG_KERN,
    /// User-level messages (LOG_USER), the default.
    #[default]
    User = libc::LOG_USER,
    /// Mail system (LOG_MAIL).
    Mail = libc::LOG_MAIL,
    /// System daemons (LOG_DAEMON).
    Daemon = libc::LOG_DAEMON,
    /// Security/authorization messages (LOG_AUTH).
    Auth = libc::LOG_AUTH,
    /// Messages generated internally by syslogd (LOG_SYSLOG).
    Syslog = libc::LOG_SYSLOG,
    /// Line printer subsystem (LOG_LPR).
    Lpr = libc::LOG_LPR,
    /// Network news subsystem (LOG_NEWS).
    News = libc::LOG_NEWS,
    /// UUCP subsystem (LOG_UUCP).
    Uucp = libc::LOG_UUCP,
    /// Clock daemon (LOG_CRON).
    Cron = libc::LOG_CRON,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

impl SyslogFacility {
    /// Every facility, in `<syslog.h>` order.
    pub const ALL: [Self; 18] = [
        Self::Kern,
        Self::User,
        Self::Mail,
        Self::Daemon,
        Self::Auth,
        Self::Syslog,
        Self::Lpr,
        Self::News,
        Self::Uucp,
        Self::Cron,
        Self::Local0,
        Self::Local1,
        Self::Local2,
        Self::Local3,
        Self::Local4,
        Self::Local5,
        Self::Local6,
        Self::Local7,
    ];

    /// Parses a case-insensitive facility name such as `daemon` or `LOCAL3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timber_sink::SyslogFacility;
    ///
    /// assert_eq!(SyslogFacility::from_name("daemon"), Some(SyslogFacility::Daemon));
    /// assert_eq!(SyslogFacility::from_name("LOCAL3"), Some(SyslogFacility::Local3));
    /// assert_eq!(SyslogFacility::from_name("unknown"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|facility| facility.as_str().eq_ignore_ascii_case(name))
    }

    /// Lowercase facility name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl fmt::Display for SyslogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known facility.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown syslog facility: {0}")]
pub struct ParseFacilityError(pub String);

impl FromStr for SyslogFacility {
    type Err = ParseFacilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseFacilityError(s.to_owned()))
    }
}

/// Maps severities onto syslog priorities.
///
/// Trace and debug share `LOG_DEBUG`; fatal becomes `LOG_CRIT`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyslogLevels;

impl LevelSet for SyslogLevels {
    fn trace_level(&self) -> i32 {
        libc::LOG_DEBUG
    }

    fn debug_level(&self) -> i32 {
        libc::LOG_DEBUG
    }

    fn info_level(&self) -> i32 {
        libc::LOG_INFO
    }

    fn warn_level(&self) -> i32 {
        libc::LOG_WARNING
    }

    fn error_level(&self) -> i32 {
        libc::LOG_ERR
    }

    fn fatal_level(&self) -> i32 {
        libc::LOG_CRIT
    }
}

/// Facility and ident for the process-wide syslog connection.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SyslogConfig {
    facility: SyslogFacility,
    ident: Option<String>,
}

impl SyslogConfig {
    /// Creates a configuration; `ident` defaults to [`DEFAULT_SYSLOG_IDENT`].
    pub fn new(facility: SyslogFacility, ident: Option<String>) -> Self {
        Self { facility, ident }
    }

    /// Configured facility.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }

    /// Configured ident.
    pub fn ident(&self) -> &str {
        self.ident.as_deref().unwrap_or(DEFAULT_SYSLOG_IDENT)
    }

    /// Opens (or joins) the syslog connection.
    ///
    /// `syslog(3)` keeps the ident pointer for the life of the process, so
    /// the first ident opened wins; later opens only change the facility.
    pub fn open(&self) -> SyslogGuard {
        static IDENT: OnceLock<CString> = OnceLock::new();
        let ident = IDENT.get_or_init(|| {
            CString::new(self.ident()).unwrap_or_else(|_| c"timber".to_owned())
        });

        let mut open = OPEN_GUARDS.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the ident pointer lives in a static for the rest of the
        // process, and OPEN_GUARDS serializes openlog against closelog.
        unsafe {
            libc::openlog(ident.as_ptr(), libc::LOG_PID, self.facility as libc::c_int);
        }
        *open += 1;
        SyslogGuard { _private: () }
    }
}

static OPEN_GUARDS: Mutex<usize> = Mutex::new(0);

/// One reference to the open syslog connection.
///
/// Dropping the last live guard calls `closelog(3)`.
#[derive(Debug)]
pub struct SyslogGuard {
    _private: (),
}

impl Drop for SyslogGuard {
    fn drop(&mut self) {
        let mut open = OPEN_GUARDS.lock().unwrap_or_else(PoisonError::into_inner);
        *open = open.saturating_sub(1);
        if *open == 0 {
            // SAFETY: closelog has no preconditions; the lock orders it after
            // every openlog issued by a guard that is now gone.
            unsafe {
                libc::closelog();
            }
        }
    }
}

/// Sends one record to syslog(3).
///
/// The message is passed as the argument of a `%s` format so `%` in log text
/// is never interpreted. Embedded NUL bytes are rejected as invalid input.
pub fn syslog_message(priority: i32, message: &str) -> io::Result<()> {
    let c_message = CString::new(message)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    // SAFETY: syslog is thread-safe; both pointers are valid C strings for
    // the duration of the call.
    unsafe {
        libc::syslog(priority, c"%s".as_ptr(), c_message.as_ptr());
    }
    Ok(())
}

/// A sink writing `tag: message` records to syslog.
///
/// Priorities are passed through unchanged, so pair this sink with
/// [`SyslogLevels`]. Messages are split at [`MAX_SYSLOG_LENGTH`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use timber::Tree;
/// use timber_sink::{SyslogConfig, SyslogFacility, SyslogLevels, SyslogSink};
///
/// let sink = SyslogSink::open(&SyslogConfig::new(SyslogFacility::Daemon, Some("worker".into())));
/// timber::plant(Arc::new(Tree::new(SyslogLevels, sink)));
/// timber::info("daemon started", &[])?;
/// # Ok::<(), timber::LogError>(())
/// ```
#[derive(Debug)]
pub struct SyslogSink {
    facility: SyslogFacility,
    max_length: usize,
    _guard: SyslogGuard,
}

impl SyslogSink {
    /// Opens the syslog connection described by `config`.
    pub fn open(config: &SyslogConfig) -> Self {
        Self {
            facility: config.facility(),
            max_length: MAX_SYSLOG_LENGTH,
            _guard: config.open(),
        }
    }

    /// Sets the maximum body length of one syslog record.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Facility this sink was opened with.
    pub const fn facility(&self) -> SyslogFacility {
        self.facility
    }
}

impl LogSink for SyslogSink {
    fn emit(
        &self,
        priority: i32,
        tag: &str,
        message: &str,
        _error: Option<&(dyn Error + 'static)>,
    ) -> io::Result<()> {
        let priority = priority | self.facility as i32;
        emit_chunked(message, self.max_length, |part| {
            syslog_message(priority, &format!("{tag}: {part}"))
        })
    }
}
