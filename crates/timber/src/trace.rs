//! crates/timber/src/trace.rs
//! Rendering of an error and its source chain into log text.

use std::error::Error;
use std::fmt::Write as _;

/// Renders `error` followed by one `Caused by:` line per source.
///
/// Unlike a bare `to_string()`, the whole chain is kept so wrapped I/O and
/// resolver errors stay visible in the log output.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// let error = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
/// assert_eq!(timber::trace_text(&error), "config.toml missing");
/// ```
pub fn trace_text(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, "\nCaused by: {cause}");
        source = cause.source();
    }
    text
}
