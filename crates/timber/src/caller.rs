//! crates/timber/src/caller.rs
//! Call-site identity used to derive a default tag.
//!
//! Instead of walking the stack, every public logging entry point is marked
//! `#[track_caller]`, so the [`Location`] captured at the bottom of the chain
//! is the application's call site. The macros additionally record
//! `module_path!()`, which gives a more precise tag than the file name.

use std::ffi::OsStr;
use std::panic::Location;
use std::path::Path;

/// Where a log call came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    location: &'static Location<'static>,
    module_path: Option<&'static str>,
}

impl Caller {
    /// Captures the location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn here() -> Self {
        Self::new(Location::caller(), None)
    }

    /// Builds a caller from an explicit location and optional module path.
    pub const fn new(location: &'static Location<'static>, module_path: Option<&'static str>) -> Self {
        Self {
            location,
            module_path,
        }
    }

    /// Source location of the call.
    pub const fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Module path of the call, when it was captured by a macro.
    pub const fn module_path(&self) -> Option<&'static str> {
        self.module_path
    }

    /// Derives the default tag for this call site.
    ///
    /// The last segment of the module path wins when present; otherwise the
    /// file stem is used, with `mod.rs`, `lib.rs` and `main.rs` replaced by
    /// the name of the directory that owns them. Returns `None` when neither
    /// yields a non-empty name.
    pub fn tag(&self) -> Option<String> {
        if let Some(path) = self.module_path {
            let tag = element_tag(path);
            if !tag.is_empty() {
                return Some(tag.to_owned());
            }
        }
        file_tag(self.location.file())
    }
}

/// Reduces a qualified name to its short element name.
///
/// Trailing synthetic suffixes are removed first: numbered anonymous markers
/// (`Foo$1$2`) and closure markers (`run::{{closure}}`). The part after the
/// last `.` or `::` is returned.
///
/// # Examples
///
/// ```
/// use timber::element_tag;
///
/// assert_eq!(element_tag("com.example.Uploader$1$2"), "Uploader");
/// assert_eq!(element_tag("app::net::session"), "session");
/// assert_eq!(element_tag("app::worker::run::{{closure}}"), "run");
/// ```
pub fn element_tag(name: &str) -> &str {
    let mut trimmed = name;
    loop {
        if let Some(rest) = trimmed.strip_suffix("::{{closure}}") {
            trimmed = rest;
            continue;
        }
        if let Some(dollar) = trimmed.rfind('$') {
            let digits = &trimmed[dollar + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                trimmed = &trimmed[..dollar];
                continue;
            }
        }
        break;
    }

    let start = [
        trimmed.rfind("::").map(|i| i + 2),
        trimmed.rfind('.').map(|i| i + 1),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0);
    &trimmed[start..]
}

fn file_tag(file: &str) -> Option<String> {
    let path = Path::new(file);
    let stem = path.file_stem().and_then(OsStr::to_str)?;
    if !matches!(stem, "mod" | "lib" | "main") {
        return (!stem.is_empty()).then(|| stem.to_owned());
    }
    path.ancestors()
        .skip(1)
        .filter_map(|dir| dir.file_name().and_then(OsStr::to_str))
        .find(|name| *name != "src" && *name != "bin")
        .map(str::to_owned)
}
