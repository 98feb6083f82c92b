//! crates/timber/src/sink.rs
//! The backend capability a [`Tree`](crate::Tree) delegates to.

use std::error::Error;
use std::io;

use super::caller::Caller;
use super::error::LogError;

/// Filters, tags and physically writes log records.
///
/// A sink is consulted once per log call that reaches its tree: first
/// [`should_log`](Self::should_log), then [`resolve_tag`](Self::resolve_tag),
/// then [`emit`](Self::emit). Sinks are shared between threads and must be
/// safe to call concurrently.
///
/// # Examples
///
/// A sink that prints warnings and above to standard error:
///
/// ```
/// use std::error::Error;
/// use std::io::{self, Write};
/// use timber::{AndroidLevels, LevelSet, LogSink};
///
/// struct WarningsOnly;
///
/// impl LogSink for WarningsOnly {
///     fn should_log(&self, priority: i32, _: &str, _: Option<&(dyn Error + 'static)>) -> bool {
///         priority >= AndroidLevels.warn_level()
///     }
///
///     fn emit(
///         &self,
///         _priority: i32,
///         tag: &str,
///         message: &str,
///         _error: Option<&(dyn Error + 'static)>,
///     ) -> io::Result<()> {
///         writeln!(io::stderr().lock(), "{tag}: {message}")
///     }
/// }
/// ```
pub trait LogSink: Send + Sync {
    /// Decides whether a call goes any further. Defaults to accepting everything.
    ///
    /// `message` is the formatted message before empty-message normalisation.
    fn should_log(
        &self,
        priority: i32,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) -> bool {
        let _ = (priority, message, error);
        true
    }

    /// Chooses the tag for an accepted call.
    ///
    /// An explicit one-shot tag is returned unchanged; otherwise the tag is
    /// derived from `caller`. Fails with [`LogError::UntaggableCaller`] when
    /// the call site yields no name.
    fn resolve_tag(&self, explicit: Option<String>, caller: &Caller) -> Result<String, LogError> {
        if let Some(tag) = explicit {
            return Ok(tag);
        }
        caller.tag().ok_or_else(|| LogError::UntaggableCaller {
            file: caller.location().file(),
            line: caller.location().line(),
        })
    }

    /// Writes the record. `message` already carries the error's trace text.
    fn emit(
        &self,
        priority: i32,
        tag: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::Location;

    struct Silent;

    impl LogSink for Silent {
        fn emit(&self, _: i32, _: &str, _: &str, _: Option<&(dyn Error + 'static)>) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_should_log_accepts_everything() {
        assert!(Silent.should_log(0, "", None));
        assert!(Silent.should_log(i32::MAX, "x", Some(&io::Error::other("e"))));
    }

    #[test]
    fn explicit_tag_is_returned_unchanged() {
        let caller = Caller::here();
        let tag = Silent
            .resolve_tag(Some("Custom".to_owned()), &caller)
            .expect("explicit tag");
        assert_eq!(tag, "Custom");
    }

    #[test]
    fn missing_tag_is_derived_from_caller() {
        let caller = Caller::new(Location::caller(), Some("app::billing"));
        let tag = Silent.resolve_tag(None, &caller).expect("derived tag");
        assert_eq!(tag, "billing");
    }
}
