//! crates/timber-sink/src/writer.rs
//! Logcat-style sink over any [`Write`] target.

use std::error::Error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use timber::{AndroidLevels, LevelSet, LogSink, MAX_LOG_LENGTH, Severity, emit_chunked};

use crate::line_mode::LineMode;

/// Writes each record as `P/Tag: message`, where `P` is the logcat letter
/// of the record's severity.
///
/// Messages at or above the maximum record length are split with
/// [`timber::Chunks`]; every piece becomes its own line carrying the same
/// prefix. All pieces of one message are written under a single lock, so
/// concurrent callers never interleave inside a message.
///
/// The sink resolves letters through its own [`LevelSet`], which should be
/// the same set the owning tree uses. Priorities the set does not know are
/// printed as numbers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use timber::{AndroidLevels, Logger, Tree};
/// use timber_sink::WriterSink;
///
/// let sink = Arc::new(WriterSink::new(Vec::new()));
/// let tree = Tree::from_shared(Arc::new(AndroidLevels), sink.clone());
/// tree.tag("Net").warn("retrying", &[])?;
///
/// assert_eq!(sink.with_writer(|buf| buf.clone()), b"W/Net: retrying\n");
/// # Ok::<(), timber::LogError>(())
/// ```
pub struct WriterSink<W> {
    writer: Mutex<W>,
    levels: Arc<dyn LevelSet>,
    max_length: usize,
    line_mode: LineMode,
    min_severity: Option<Severity>,
}

impl<W> WriterSink<W>
where
    W: Write + Send,
{
    /// Wraps `writer` with Android levels, the default record limit and newline-terminated records.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            levels: Arc::new(AndroidLevels),
            max_length: MAX_LOG_LENGTH,
            line_mode: LineMode::WithNewline,
            min_severity: None,
        }
    }

    /// Uses `levels` to turn priorities back into severity letters.
    #[must_use]
    pub fn with_levels(mut self, levels: Arc<dyn LevelSet>) -> Self {
        self.levels = levels;
        self
    }

    /// Sets the maximum record length in bytes.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Sets the record terminator policy.
    #[must_use]
    pub const fn with_line_mode(mut self, line_mode: LineMode) -> Self {
        self.line_mode = line_mode;
        self
    }

    /// Rejects calls below `severity` in `should_log`.
    #[must_use]
    pub const fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Maximum record length in bytes.
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Record terminator policy.
    pub const fn line_mode(&self) -> LineMode {
        self.line_mode
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the underlying writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.lock())
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn prefix(&self, priority: i32, tag: &str) -> String {
        match self.levels.severity_of(priority) {
            Some(severity) => format!("{}/{tag}: ", severity.letter()),
            None => format!("{priority}/{tag}: "),
        }
    }
}

impl WriterSink<Stderr> {
    /// A sink over standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl WriterSink<Stdout> {
    /// A sink over standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<File> {
    /// A sink appending to the file at `path`, which is created if missing.
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink")
            .field("max_length", &self.max_length)
            .field("line_mode", &self.line_mode)
            .field("min_severity", &self.min_severity)
            .finish_non_exhaustive()
    }
}

impl<W> LogSink for WriterSink<W>
where
    W: Write + Send,
{
    fn should_log(&self, priority: i32, _message: &str, _error: Option<&(dyn Error + 'static)>) -> bool {
        self.min_severity
            .is_none_or(|min| priority >= self.levels.priority(min))
    }

    fn emit(
        &self,
        priority: i32,
        tag: &str,
        message: &str,
        _error: Option<&(dyn Error + 'static)>,
    ) -> io::Result<()> {
        let prefix = self.prefix(priority, tag);
        let newline = self.line_mode.append_newline();
        let mut writer = self.lock();
        emit_chunked(message, self.max_length, |part| {
            writer.write_all(prefix.as_bytes())?;
            writer.write_all(part.as_bytes())?;
            if newline {
                writer.write_all(b"\n")?;
            }
            Ok(())
        })?;
        writer.flush()
    }
}
