//! crates/timber-sink/src/tracing_sink.rs
//! Forwards accepted records to the `tracing` ecosystem.

use std::error::Error;
use std::io;
use std::sync::Arc;

use timber::{ConsecutiveLevels, LevelSet, LogSink, Severity};
use tracing::{debug, error, info, trace, warn};

/// Target of every event emitted by [`TracingSink`].
pub const TRACING_TARGET: &str = "timber";

/// A sink that turns each record into a `tracing` event.
///
/// The record's priority is mapped back to a [`Severity`] through the sink's
/// level set (by default [`ConsecutiveLevels`]). Fatal records become
/// `ERROR` events with `fatal = true`; priorities the set does not know
/// become `INFO` events carrying the raw `priority` field. Chunking is left
/// to the subscriber.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use timber::{ConsecutiveLevels, Tree};
/// use timber_sink::TracingSink;
///
/// timber::plant(Arc::new(Tree::new(ConsecutiveLevels, TracingSink::new())));
/// timber::warn("cache miss rate %d%%", &[42_u32.into()])?;
/// # Ok::<(), timber::LogError>(())
/// ```
#[derive(Clone)]
pub struct TracingSink {
    levels: Arc<dyn LevelSet>,
}

impl TracingSink {
    /// A sink that decodes priorities with [`ConsecutiveLevels`].
    pub fn new() -> Self {
        Self::with_levels(Arc::new(ConsecutiveLevels))
    }

    /// A sink that decodes priorities with `levels`.
    pub fn with_levels(levels: Arc<dyn LevelSet>) -> Self {
        Self { levels }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TracingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingSink").finish_non_exhaustive()
    }
}

impl LogSink for TracingSink {
    fn emit(
        &self,
        priority: i32,
        tag: &str,
        message: &str,
        _error: Option<&(dyn Error + 'static)>,
    ) -> io::Result<()> {
        match self.levels.severity_of(priority) {
            Some(Severity::Trace) => trace!(target: TRACING_TARGET, tag, "{message}"),
            Some(Severity::Debug) => debug!(target: TRACING_TARGET, tag, "{message}"),
            Some(Severity::Info) => info!(target: TRACING_TARGET, tag, "{message}"),
            Some(Severity::Warn) => warn!(target: TRACING_TARGET, tag, "{message}"),
            Some(Severity::Error) => error!(target: TRACING_TARGET, tag, "{message}"),
            Some(Severity::Fatal) => error!(target: TRACING_TARGET, tag, fatal = true, "{message}"),
            None => info!(target: TRACING_TARGET, tag, priority, "{message}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use timber::{AndroidLevels, Logger, Tree};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn severity_becomes_event_level() {
        let output = capture(|| {
            let tree = Tree::new(ConsecutiveLevels, TracingSink::new());
            tree.tag("Db").warn("slow query", &[]).unwrap();
            tree.tag("Db").trace("row fetched", &[]).unwrap();
        });
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("TRACE"), "{output}");
        assert!(output.contains("slow query"), "{output}");
        assert!(output.contains("tag=\"Db\""), "{output}");
    }

    #[test]
    fn fatal_is_an_error_event_flagged_fatal() {
        let output = capture(|| {
            let tree = Tree::new(ConsecutiveLevels, TracingSink::new());
            tree.tag("Core").fatal("invariant broken", &[]).unwrap();
        });
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("fatal=true"), "{output}");
    }

    #[test]
    fn unknown_priority_keeps_the_raw_code() {
        let output = capture(|| {
            let tree = Tree::new(ConsecutiveLevels, TracingSink::new());
            tree.tag("Raw").log(99, "odd", &[]).unwrap();
        });
        assert!(output.contains("INFO"), "{output}");
        assert!(output.contains("priority=99"), "{output}");
    }

    #[test]
    fn custom_levels_decode_priorities() {
        let output = capture(|| {
            let sink = TracingSink::with_levels(Arc::new(AndroidLevels));
            let tree = Tree::new(AndroidLevels, sink);
            tree.tag("App").error("boom", &[]).unwrap();
        });
        assert!(output.contains("ERROR"), "{output}");
        assert!(!output.contains("priority="), "{output}");
    }
}
