#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `timber` is a small logging facade. Application code logs through one
//! API, either the free functions and macros of this crate or any
//! [`Logger`] value. The calls fan out to every [`Tree`] currently planted
//! in the process-wide [`Forest`]. With nothing planted, logging is a no-op.
//!
//! # Design
//!
//! A [`Tree`] pairs a [`LevelSet`], which maps the six abstract
//! [`Severity`] values onto backend priorities, with a [`LogSink`] that
//! filters, tags and writes records. Trees are shared as `Arc<Tree>`; the
//! forest keeps them in planting order behind a mutex and republishes an
//! immutable snapshot on every change, so dispatch never blocks on
//! registration.
//!
//! Messages may carry printf-style placeholders (`%s`, `%d`, `%x`, ...) that
//! are expanded only when arguments are supplied. The macros use Rust
//! format syntax instead and pass no arguments.
//!
//! # Invariants
//!
//! - A one-shot tag set with [`tag`] applies to the next log call on the same
//!   thread only, and is consumed by that call even when it is filtered out
//!   or fails.
//! - An empty message with no error attached is dropped after filtering.
//! - A failing sink never prevents the remaining trees from receiving a
//!   broadcast call; the failure is reported through `tracing` instead.
//!
//! # Errors
//!
//! Log calls return [`LogError`] for template/argument mismatches and for
//! call sites that yield no tag. [`uproot`] returns [`PlantError`] for a tree
//! that is not planted.
//!
//! # Examples
//!
//! Plant a tree over an in-memory sink and log through the global facade:
//!
//! ```
//! use std::error::Error;
//! use std::io;
//! use std::sync::{Arc, Mutex};
//! use timber::{AndroidLevels, LogSink, Tree};
//!
//! #[derive(Default)]
//! struct Lines(Mutex<Vec<String>>);
//!
//! impl LogSink for Lines {
//!     fn emit(&self, p: i32, tag: &str, msg: &str, _: Option<&(dyn Error + 'static)>) -> io::Result<()> {
//!         self.0.lock().unwrap().push(format!("{p} {tag} {msg}"));
//!         Ok(())
//!     }
//! }
//!
//! let lines = Arc::new(Lines::default());
//! let tree = Arc::new(Tree::from_shared(Arc::new(AndroidLevels), lines.clone()));
//! timber::plant(tree.clone());
//!
//! timber::tag("Sync");
//! timber::info("fetched %d of %d", &[7_u32.into(), 9_u32.into()])?;
//!
//! timber::uproot(&tree)?;
//! let lines = lines.0.lock().unwrap();
//! assert!(lines.iter().any(|line| line == "4 Sync fetched 7 of 9"));
//! # Ok::<(), Box<dyn Error>>(())
//! ```
//!
//! # See also
//!
//! - `timber-sink` for writer, syslog and `tracing` backed sinks.

use std::error::Error;
use std::sync::{Arc, LazyLock};

mod caller;
mod chunk;
mod error;
mod forest;
mod format;
mod levels;
mod logger;
mod macros;
mod severity;
mod sink;
mod thread_local;
mod trace;
mod tree;

pub use caller::{Caller, element_tag};
pub use chunk::{Chunks, MAX_LOG_LENGTH, emit_chunked};
pub use error::{LogError, PlantError};
pub use forest::Forest;
pub use format::{Arg, FormatError, MAX_FIELD_WIDTH, format_message};
pub use levels::{AndroidLevels, ConsecutiveLevels, LevelSet, android};
pub use logger::{Logger, Record};
pub use severity::{ParseSeverityError, Severity};
pub use sink::LogSink;
pub use trace::trace_text;
pub use tree::{Tree, TreeId};

static FOREST: LazyLock<Forest> = LazyLock::new(Forest::new);

/// The process-wide forest behind the free functions and macros.
pub fn global() -> &'static Forest {
    &FOREST
}

/// Adds a tree to the global forest.
pub fn plant(tree: Arc<Tree>) {
    FOREST.plant(tree);
}

/// Adds several trees to the global forest.
pub fn plant_all<I>(trees: I)
where
    I: IntoIterator<Item = Arc<Tree>>,
{
    FOREST.plant_all(trees);
}

/// Removes a planted tree from the global forest.
pub fn uproot(tree: &Tree) -> Result<(), PlantError> {
    FOREST.uproot(tree)
}

/// Removes every tree from the global forest.
pub fn uproot_all() {
    FOREST.uproot_all();
}

/// Copy of the trees planted in the global forest.
pub fn forest() -> Vec<Arc<Tree>> {
    FOREST.forest()
}

/// Number of trees planted in the global forest.
pub fn tree_count() -> usize {
    FOREST.tree_count()
}

/// Sets a one-time tag used by the next log call on this thread.
pub fn tag(tag: &str) -> &'static Forest {
    FOREST.tag(tag)
}

/// The global forest as a single injectable logger.
pub fn as_tree() -> &'static dyn Logger {
    FOREST.as_tree()
}

macro_rules! severity_fns {
    ($($severity:ident => $plain:ident, $with:ident;)*) => {
        $(
            #[doc = concat!("Logs a message at [`Severity::", stringify!($severity), "`] through the global forest.")]
            #[track_caller]
            pub fn $plain(message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
                FOREST.log_severity(
                    Severity::$severity,
                    Record::new(Caller::here(), None, message, args),
                )
            }

            #[doc = concat!("Logs an error and message at [`Severity::", stringify!($severity), "`] through the global forest.")]
            #[track_caller]
            pub fn $with(
                error: &(dyn Error + 'static),
                message: &str,
                args: &[Arg<'_>],
            ) -> Result<(), LogError> {
                FOREST.log_severity(
                    Severity::$severity,
                    Record::new(Caller::here(), Some(error), message, args),
                )
            }
        )*
    };
}

severity_fns! {
    Trace => trace, trace_with;
    Debug => debug, debug_with;
    Info => info, info_with;
    Warn => warn, warn_with;
    Error => error, error_with;
    Fatal => fatal, fatal_with;
}

/// Logs at a raw priority through the global forest.
#[track_caller]
pub fn log(priority: i32, message: &str, args: &[Arg<'_>]) -> Result<(), LogError> {
    FOREST.log_priority(priority, Record::new(Caller::here(), None, message, args))
}

/// Logs an error and message at a raw priority through the global forest.
#[track_caller]
pub fn log_with(
    priority: i32,
    error: &(dyn Error + 'static),
    message: &str,
    args: &[Arg<'_>],
) -> Result<(), LogError> {
    FOREST.log_priority(
        priority,
        Record::new(Caller::here(), Some(error), message, args),
    )
}
