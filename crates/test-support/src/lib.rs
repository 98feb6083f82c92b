//! crates/test-support/src/lib.rs
//! Shared sinks and fixtures for the timber workspace tests.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;
use timber::{Caller, ConsecutiveLevels, LevelSet, LogError, LogSink, Tree};

/// One step observed by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observed {
    /// `should_log` was asked about a call.
    ShouldLog {
        /// Priority of the call.
        priority: i32,
        /// Formatted message before normalisation.
        message: String,
        /// Whether an error was attached.
        has_error: bool,
    },
    /// `resolve_tag` was asked for a tag.
    ResolveTag {
        /// The pending one-shot tag, if any.
        explicit: Option<String>,
        /// Source file of the call.
        file: &'static str,
        /// Module path captured by a macro, if any.
        module_path: Option<&'static str>,
    },
    /// `emit` wrote a record.
    Emit(Emitted),
}

/// A record written by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emitted {
    /// Backend priority.
    pub priority: i32,
    /// Resolved tag.
    pub tag: String,
    /// Final message, trace text included.
    pub message: String,
    /// Display text of the attached error, if any.
    pub error: Option<String>,
}

/// A sink that remembers every call it receives.
#[derive(Debug)]
pub struct RecordingSink {
    accept: bool,
    fixed_tag: Option<String>,
    observed: Mutex<Vec<Observed>>,
}

impl RecordingSink {
    /// A sink that accepts every call and derives tags from the call site.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            fixed_tag: None,
            observed: Mutex::new(Vec::new()),
        })
    }

    /// A sink whose `should_log` refuses everything.
    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            accept: false,
            fixed_tag: None,
            observed: Mutex::new(Vec::new()),
        })
    }

    /// A sink that falls back to `tag` instead of deriving one.
    pub fn with_fallback_tag(tag: &str) -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            fixed_tag: Some(tag.to_owned()),
            observed: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Observed>> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every step observed so far, in order.
    pub fn observed(&self) -> Vec<Observed> {
        self.lock().clone()
    }

    /// Only the emitted records, in order.
    pub fn emitted(&self) -> Vec<Emitted> {
        self.lock()
            .iter()
            .filter_map(|step| match step {
                Observed::Emit(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Emitted messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.emitted().into_iter().map(|e| e.message).collect()
    }

    /// Forgets everything observed so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl LogSink for RecordingSink {
    fn should_log(&self, priority: i32, message: &str, error: Option<&(dyn Error + 'static)>) -> bool {
        self.lock().push(Observed::ShouldLog {
            priority,
            message: message.to_owned(),
            has_error: error.is_some(),
        });
        self.accept
    }

    fn resolve_tag(&self, explicit: Option<String>, caller: &Caller) -> Result<String, LogError> {
        self.lock().push(Observed::ResolveTag {
            explicit: explicit.clone(),
            file: caller.location().file(),
            module_path: caller.module_path(),
        });
        match (explicit, &self.fixed_tag) {
            (Some(tag), _) => Ok(tag),
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => caller.tag().ok_or_else(|| LogError::UntaggableCaller {
                file: caller.location().file(),
                line: caller.location().line(),
            }),
        }
    }

    fn emit(
        &self,
        priority: i32,
        tag: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) -> io::Result<()> {
        self.lock().push(Observed::Emit(Emitted {
            priority,
            tag: tag.to_owned(),
            message: message.to_owned(),
            error: error.map(ToString::to_string),
        }));
        Ok(())
    }
}

/// A sink whose `emit` always fails.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    /// Number of `emit` calls made so far.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for FailingSink {
    fn resolve_tag(&self, explicit: Option<String>, _caller: &Caller) -> Result<String, LogError> {
        Ok(explicit.unwrap_or_else(|| "Failing".to_owned()))
    }

    fn emit(&self, _: i32, _: &str, _: &str, _: Option<&(dyn Error + 'static)>) -> io::Result<()> {
        *self.attempts.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is closed"))
    }
}

/// An unplanted tree over `sink` with `levels`.
pub fn tree_with<L>(levels: L, sink: Arc<dyn LogSink>) -> Arc<Tree>
where
    L: LevelSet + 'static,
{
    Arc::new(Tree::from_shared(Arc::new(levels), sink))
}

/// A tree with [`ConsecutiveLevels`] over a fresh [`RecordingSink`].
pub fn recording_tree() -> (Arc<Tree>, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    (tree_with(ConsecutiveLevels, sink.clone()), sink)
}

/// An error with an optional cause, for exercising trace text.
#[derive(Debug)]
pub struct TestError {
    message: &'static str,
    source: Option<Box<TestError>>,
}

impl TestError {
    /// An error without a cause.
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
            source: None,
        }
    }

    /// An error caused by `source`.
    pub fn caused_by(message: &'static str, source: Self) -> Self {
        Self {
            message,
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for TestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// A scratch directory plus a log file path inside it.
pub struct TempLog {
    dir: TempDir,
}

impl TempLog {
    /// Creates a fresh scratch directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Path of the log file; it does not exist until a sink creates it.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("timber.log")
    }

    /// Current content of the log file, empty when it was never written.
    pub fn contents(&self) -> String {
        std::fs::read_to_string(self.path()).unwrap_or_default()
    }
}

/// Serializes tests that touch the process-wide forest.
///
/// Hold the returned guard for the whole test; the forest is emptied on
/// acquisition.
pub fn global_forest_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    timber::uproot_all();
    guard
}
