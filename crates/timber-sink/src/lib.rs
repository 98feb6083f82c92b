#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/timber-sink/src/lib.rs
//!
//! # Overview
//!
//! `timber-sink` provides the concrete [`LogSink`](timber::LogSink)
//! backends for `timber` trees, plus a declarative way to describe which
//! trees a process should plant.
//!
//! # Design
//!
//! - [`WriterSink`] renders logcat-style `P/Tag: message` lines into any
//!   [`std::io::Write`] target (standard error, standard output, an
//!   appended file or an in-memory buffer), splitting long messages into
//!   bounded records. A [`LineMode`] controls the record terminator.
//! - `SyslogSink` (Unix, `syslog` feature) routes records to syslog(3)
//!   with priorities from `SyslogLevels`.
//! - [`TracingSink`] re-emits records as `tracing` events so applications
//!   already using a `tracing` subscriber see `timber` output there.
//! - [`ForestConfig`] parses tree specs such as `stderr:2000` or
//!   `syslog:daemon` and plants the resulting trees.
//!
//! # Invariants
//!
//! - No physical record exceeds the sink's maximum length, except that a
//!   single character wider than the limit is never split.
//! - A message shorter than the limit is written as one record even when it
//!   contains newlines.
//! - The pieces of one message are never interleaved with another message
//!   written through the same [`WriterSink`].
//!
//! # Errors
//!
//! Sinks surface [`std::io::Error`] from the underlying writer or from
//! syslog input validation. Configuration parsing and building report
//! [`ConfigError`].
//!
//! # Examples
//!
//! Plant a file tree from a spec and read the result back:
//!
//! ```
//! use timber::{Forest, Logger};
//! use timber_sink::ForestConfig;
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("app.log");
//!
//! let forest = Forest::new();
//! ForestConfig::from_tokens([format!("file:{}", path.display())])?.plant_into(&forest)?;
//! forest.tag("Boot").info("ready in %dms", &[12_u32.into()])?;
//!
//! assert_eq!(std::fs::read_to_string(&path)?, "I/Boot: ready in 12ms\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # See also
//!
//! - `timber` for trees, the forest and the logging facade.

mod config;
mod line_mode;
#[cfg(all(unix, feature = "syslog"))]
#[allow(unsafe_code)]
mod syslog;
mod tracing_sink;
mod writer;

pub use config::{ConfigError, ForestConfig, TREES_ENV, TreeSpec};
pub use line_mode::LineMode;
#[cfg(all(unix, feature = "syslog"))]
pub use syslog::{
    DEFAULT_SYSLOG_IDENT, MAX_SYSLOG_LENGTH, ParseFacilityError, SyslogConfig, SyslogFacility,
    SyslogGuard, SyslogLevels, SyslogSink, syslog_message,
};
pub use tracing_sink::{TRACING_TARGET, TracingSink};
pub use writer::WriterSink;
