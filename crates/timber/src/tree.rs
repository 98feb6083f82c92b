//! crates/timber/src/tree.rs
//! A tree binds one level set to one sink and runs the per-call pipeline.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::LogError;
use super::format::format_message;
use super::levels::LevelSet;
use super::logger::{Logger, Record};
use super::severity::Severity;
use super::sink::LogSink;
use super::thread_local;
use super::trace::trace_text;

/// Identity of a [`Tree`] instance, unique for the life of the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeId(u64);

impl TreeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A logging handler: one [`LevelSet`] plus one [`LogSink`].
///
/// Every call goes through the same steps:
///
/// 1. the pending one-shot tag for this tree on the current thread is taken;
/// 2. a non-empty argument list expands the message as a printf template;
/// 3. the sink's [`should_log`](LogSink::should_log) may drop the call;
/// 4. an empty message becomes absent; with no error attached the call is
///    dropped, otherwise the error's trace text is used or appended;
/// 5. the sink resolves the tag and [`emit`](LogSink::emit)s the record.
///
/// The tag is taken in step 1 even when a later step drops the call, so a
/// one-shot tag never outlives the call that follows it. Dropping the tree
/// discards its pending tag on the dropping thread.
///
/// # Examples
///
/// ```
/// use std::error::Error;
/// use std::io;
/// use timber::{AndroidLevels, LogSink, Logger, Tree};
///
/// struct Stdout;
///
/// impl LogSink for Stdout {
///     fn emit(&self, p: i32, tag: &str, msg: &str, _: Option<&(dyn Error + 'static)>) -> io::Result<()> {
///         println!("{p} {tag}: {msg}");
///         Ok(())
///     }
/// }
///
/// let tree = Tree::new(AndroidLevels, Stdout);
/// tree.tag("Upload").info("sent %d bytes", &[512_u32.into()])?;
/// # Ok::<(), timber::LogError>(())
/// ```
pub struct Tree {
    id: TreeId,
    levels: Arc<dyn LevelSet>,
    sink: Arc<dyn LogSink>,
}

impl Tree {
    /// Creates a tree owning `levels` and `sink`.
    pub fn new<L, S>(levels: L, sink: S) -> Self
    where
        L: LevelSet + 'static,
        S: LogSink + 'static,
    {
        Self::from_shared(Arc::new(levels), Arc::new(sink))
    }

    /// Creates a tree over a level set and sink that may be shared with other trees.
    pub fn from_shared(levels: Arc<dyn LevelSet>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            id: TreeId::next(),
            levels,
            sink,
        }
    }

    /// Identity of this tree.
    pub const fn id(&self) -> TreeId {
        self.id
    }

    /// The level set mapping severities to this tree's priorities.
    pub fn levels(&self) -> &dyn LevelSet {
        self.levels.as_ref()
    }

    /// The sink this tree writes through.
    pub fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    /// Sets a one-time tag for the next log call on this tree from the current thread.
    pub fn tag(&self, tag: impl Into<String>) -> &Self {
        thread_local::set(self.id, tag.into());
        self
    }

    /// Reports whether a one-shot tag is waiting on the current thread.
    pub fn has_pending_tag(&self) -> bool {
        thread_local::is_pending(self.id)
    }

    /// Discards the pending one-shot tag of this tree on the current thread.
    pub(crate) fn clear_tag(&self) {
        let _ = thread_local::take(self.id);
    }

    fn dispatch(&self, priority: i32, record: Record<'_>) -> Result<(), LogError> {
        let explicit = thread_local::take(self.id);

        let message: Cow<'_, str> = if record.args().is_empty() {
            Cow::Borrowed(record.message())
        } else {
            Cow::Owned(format_message(record.message(), record.args())?)
        };

        if !self.sink.should_log(priority, &message, record.error()) {
            return Ok(());
        }

        let message = match (message.is_empty(), record.error()) {
            // Nothing to say and nothing to show.
            (true, None) => return Ok(()),
            (true, Some(error)) => Cow::Owned(trace_text(error)),
            (false, Some(error)) => Cow::Owned(format!("{message}\n{}", trace_text(error))),
            (false, None) => message,
        };

        let tag = self.sink.resolve_tag(explicit, record.caller())?;
        self.sink.emit(priority, &tag, &message, record.error())?;
        Ok(())
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        self.clear_tag();
    }
}

impl Logger for Tree {
    fn log_severity(&self, severity: Severity, record: Record<'_>) -> Result<(), LogError> {
        self.dispatch(self.levels.priority(severity), record)
    }

    fn log_priority(&self, priority: i32, record: Record<'_>) -> Result<(), LogError> {
        self.dispatch(priority, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AndroidLevels, Caller, ConsecutiveLevels, FormatError};
    use std::error::Error;
    use std::io;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Emitted {
        priority: i32,
        tag: String,
        message: String,
        had_error: bool,
    }

    #[derive(Default)]
    struct Capture {
        accept: bool,
        untaggable: bool,
        explicit_seen: Mutex<Vec<Option<String>>>,
        emitted: Mutex<Vec<Emitted>>,
    }

    impl Capture {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                accept: true,
                ..Self::default()
            })
        }

        fn emitted(&self) -> Vec<Emitted> {
            self.emitted.lock().expect("lock").clone()
        }
    }

    impl LogSink for Capture {
        fn should_log(&self, _: i32, _: &str, _: Option<&(dyn Error + 'static)>) -> bool {
            self.accept
        }

        fn resolve_tag(
            &self,
            explicit: Option<String>,
            caller: &Caller,
        ) -> Result<String, LogError> {
            self.explicit_seen.lock().expect("lock").push(explicit.clone());
            if self.untaggable {
                return Err(LogError::UntaggableCaller {
                    file: caller.location().file(),
                    line: caller.location().line(),
                });
            }
            Ok(explicit.unwrap_or_else(|| "auto".to_owned()))
        }

        fn emit(
            &self,
            priority: i32,
            tag: &str,
            message: &str,
            error: Option<&(dyn Error + 'static)>,
        ) -> io::Result<()> {
            self.emitted.lock().expect("lock").push(Emitted {
                priority,
                tag: tag.to_owned(),
                message: message.to_owned(),
                had_error: error.is_some(),
            });
            Ok(())
        }
    }

    fn tree_over(sink: &Arc<Capture>) -> Tree {
        Tree::from_shared(Arc::new(AndroidLevels), sink.clone())
    }

    #[test]
    fn each_severity_uses_its_level() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);

        tree.trace("t", &[]).unwrap();
        tree.debug("d", &[]).unwrap();
        tree.info("i", &[]).unwrap();
        tree.warn("w", &[]).unwrap();
        tree.error("e", &[]).unwrap();
        tree.fatal("f", &[]).unwrap();

        let priorities: Vec<i32> = sink.emitted().iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![2, 3, 4, 5, 6, 7]);
        assert!(sink.emitted().iter().all(|e| !e.had_error));
    }

    #[test]
    fn raw_priority_passes_through() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.log(42, "raw", &[]).unwrap();
        assert_eq!(sink.emitted()[0].priority, 42);
    }

    #[test]
    fn args_expand_the_template() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.info("%s=%d", &["retries".into(), 3_i32.into()]).unwrap();
        assert_eq!(sink.emitted()[0].message, "retries=3");
    }

    #[test]
    fn no_args_keeps_percent_literal() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.info("100%", &[]).unwrap();
        assert_eq!(sink.emitted()[0].message, "100%");
    }

    #[test]
    fn format_error_is_returned_and_nothing_is_emitted() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        let err = tree.info("%d", &["x".into()]).unwrap_err();
        assert!(matches!(
            err,
            LogError::Format(FormatError::IncompatibleArgument { .. })
        ));
        assert!(sink.emitted().is_empty());
    }

    #[test]
    fn rejected_call_emits_nothing() {
        let sink = Arc::new(Capture::default());
        let tree = tree_over(&sink);
        tree.info("hidden", &[]).unwrap();
        assert!(sink.emitted().is_empty());
        assert!(sink.explicit_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_message_without_error_is_dropped() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.info("", &[]).unwrap();
        assert!(sink.emitted().is_empty());
    }

    #[test]
    fn empty_message_with_error_uses_trace_text() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        let error = io::Error::other("disk full");
        tree.error_with(&error, "", &[]).unwrap();
        let emitted = sink.emitted();
        assert_eq!(emitted[0].message, "disk full");
        assert!(emitted[0].had_error);
    }

    #[test]
    fn message_and_error_are_joined_by_newline() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        let error = io::Error::other("disk full");
        tree.warn_with(&error, "save failed", &[]).unwrap();
        assert_eq!(sink.emitted()[0].message, "save failed\ndisk full");
    }

    #[test]
    fn explicit_tag_is_used_once() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.tag("Once").info("first", &[]).unwrap();
        tree.info("second", &[]).unwrap();
        let tags: Vec<String> = sink.emitted().into_iter().map(|e| e.tag).collect();
        assert_eq!(tags, vec!["Once", "auto"]);
    }

    #[test]
    fn tag_does_not_leak_past_a_dropped_call() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        tree.tag("Lost");
        tree.info("", &[]).unwrap();
        assert!(!tree.has_pending_tag());
        tree.info("next", &[]).unwrap();
        assert_eq!(sink.emitted()[0].tag, "auto");
    }

    #[test]
    fn shared_sink_serves_two_trees_with_their_own_levels() {
        let sink = Capture::accepting();
        let android = tree_over(&sink);
        let plain = Tree::from_shared(Arc::new(ConsecutiveLevels), sink.clone());
        android.info("a", &[]).unwrap();
        plain.info("b", &[]).unwrap();
        let priorities: Vec<i32> = sink.emitted().iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![4, 2]);
    }

    #[test]
    fn untaggable_call_is_returned_and_nothing_is_emitted() {
        let sink = Arc::new(Capture {
            accept: true,
            untaggable: true,
            ..Capture::default()
        });
        let tree = tree_over(&sink);
        let line = line!() + 1;
        let err = tree.info("nameless", &[]).unwrap_err();
        match err {
            LogError::UntaggableCaller { file, line: at } => {
                assert!(file.ends_with("tree.rs"), "{file}");
                assert_eq!(at, line);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sink.emitted().is_empty());
        assert!(!tree.has_pending_tag());
    }

    #[test]
    fn dropping_a_tree_discards_its_pending_tag() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        let id = tree.id();
        tree.tag("Orphan");
        assert!(thread_local::is_pending(id));
        drop(tree);
        assert!(!thread_local::is_pending(id));
    }

    #[test]
    fn ids_are_unique() {
        let sink = Capture::accepting();
        assert_ne!(tree_over(&sink).id(), tree_over(&sink).id());
    }

    #[test]
    fn debug_shows_id() {
        let sink = Capture::accepting();
        let tree = tree_over(&sink);
        assert!(format!("{tree:?}").contains("Tree"));
        assert_eq!(format!("{}", tree.id()), format!("#{}", tree.id().get()));
    }
}
