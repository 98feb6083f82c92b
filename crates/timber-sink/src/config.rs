//! crates/timber-sink/src/config.rs
//! Declarative description of the trees a process should plant.
//!
//! A [`TreeSpec`] is parsed from a short token such as `stderr`,
//! `file:/var/log/app.log:2000` or `syslog:daemon:worker`. A
//! [`ForestConfig`] is an ordered list of specs that can be built into trees
//! and planted in one step.

use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use timber::{AndroidLevels, ConsecutiveLevels, Forest, MAX_LOG_LENGTH, Tree};
use tracing::debug;

use crate::tracing_sink::TracingSink;
use crate::writer::WriterSink;

/// Environment variable read by [`ForestConfig::from_env`].
pub const TREES_ENV: &str = "TIMBER_TREES";

/// Failure to parse or build a tree configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The token names no known tree kind.
    #[error("unknown tree kind `{0}`; expected stderr, stdout, file, syslog or tracing")]
    UnknownKind(String),
    /// A `file` spec without a path.
    #[error("file tree requires a path, as in `file:/tmp/app.log`")]
    MissingPath,
    /// The maximum length is not a positive integer.
    #[error("invalid maximum length `{value}`: {source}")]
    InvalidMaxLength {
        /// The offending text.
        value: String,
        /// Why it did not parse.
        #[source]
        source: ParseIntError,
    },
    /// The maximum length is zero.
    #[error("maximum length must be at least 1")]
    ZeroMaxLength,
    /// The spec has more fields than its kind accepts.
    #[error("unexpected trailing field `{0}`")]
    TrailingField(String),
    /// The syslog facility is not recognised.
    #[error("unknown syslog facility `{0}`")]
    UnknownFacility(String),
    /// The spec needs a backend this build does not include.
    #[error("{0} trees are not supported by this build")]
    Unsupported(&'static str),
    /// Opening the log file failed.
    #[error("cannot open log file {path}: {source}")]
    OpenFile {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One tree to plant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum TreeSpec {
    /// Logcat-style lines on standard error.
    Stderr {
        /// Maximum record length in bytes.
        max_length: usize,
    },
    /// Logcat-style lines on standard output.
    Stdout {
        /// Maximum record length in bytes.
        max_length: usize,
    },
    /// Logcat-style lines appended to a file.
    File {
        /// File to append to; created if missing.
        path: PathBuf,
        /// Maximum record length in bytes.
        max_length: usize,
    },
    /// syslog(3) with the given facility name and optional ident.
    Syslog {
        /// Facility name, `user` when empty.
        facility: String,
        /// Ident passed to `openlog(3)`.
        ident: Option<String>,
    },
    /// Events on the current `tracing` subscriber.
    Tracing,
}

fn parse_max(field: Option<&str>) -> Result<usize, ConfigError> {
    let Some(value) = field else {
        return Ok(MAX_LOG_LENGTH);
    };
    let max = value
        .parse::<usize>()
        .map_err(|source| ConfigError::InvalidMaxLength {
            value: value.to_owned(),
            source,
        })?;
    if max == 0 {
        return Err(ConfigError::ZeroMaxLength);
    }
    Ok(max)
}

fn no_more<'a>(mut rest: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    match rest.next() {
        Some(extra) => Err(ConfigError::TrailingField(extra.to_owned())),
        None => Ok(()),
    }
}

impl FromStr for TreeSpec {
    type Err = ConfigError;

    /// Parses `stderr[:max]`, `stdout[:max]`, `file:<path>[:max]`,
    /// `syslog[:facility[:ident]]` or `tracing`.
    ///
    /// For `file`, a trailing all-digit field is taken as the maximum
    /// length; everything between is the path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, rest) = s.split_once(':').map_or((s, None), |(k, r)| (k, Some(r)));
        match kind.to_ascii_lowercase().as_str() {
            "stderr" | "stdout" => {
                let mut fields = rest.into_iter().flat_map(|r| r.split(':'));
                let max_length = parse_max(fields.next())?;
                no_more(fields)?;
                if kind.eq_ignore_ascii_case("stderr") {
                    Ok(Self::Stderr { max_length })
                } else {
                    Ok(Self::Stdout { max_length })
                }
            }
            "file" => {
                let rest = rest.filter(|r| !r.is_empty()).ok_or(ConfigError::MissingPath)?;
                let (path, max_length) = match rest.rsplit_once(':') {
                    Some((path, max))
                        if !path.is_empty() && !max.is_empty() && max.bytes().all(|b| b.is_ascii_digit()) =>
                    {
                        (path, parse_max(Some(max))?)
                    }
                    _ => (rest, MAX_LOG_LENGTH),
                };
                Ok(Self::File {
                    path: PathBuf::from(path),
                    max_length,
                })
            }
            "syslog" => {
                let mut fields = rest.into_iter().flat_map(|r| r.split(':'));
                let facility = fields.next().filter(|f| !f.is_empty()).unwrap_or("user");
                let ident = fields.next().filter(|i| !i.is_empty()).map(str::to_owned);
                no_more(fields)?;
                Ok(Self::Syslog {
                    facility: facility.to_ascii_lowercase(),
                    ident,
                })
            }
            "tracing" => {
                no_more(rest.into_iter())?;
                Ok(Self::Tracing)
            }
            _ => Err(ConfigError::UnknownKind(kind.to_owned())),
        }
    }
}

impl fmt::Display for TreeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stderr { max_length } => write!(f, "stderr:{max_length}"),
            Self::Stdout { max_length } => write!(f, "stdout:{max_length}"),
            Self::File { path, max_length } => write!(f, "file:{}:{max_length}", path.display()),
            Self::Syslog { facility, ident: None } => write!(f, "syslog:{facility}"),
            Self::Syslog {
                facility,
                ident: Some(ident),
            } => write!(f, "syslog:{facility}:{ident}"),
            Self::Tracing => f.write_str("tracing"),
        }
    }
}

impl TreeSpec {
    /// Builds the tree this spec describes.
    pub fn build(&self) -> Result<Arc<Tree>, ConfigError> {
        let tree = match self {
            Self::Stderr { max_length } => {
                Tree::new(AndroidLevels, WriterSink::stderr().with_max_length(*max_length))
            }
            Self::Stdout { max_length } => {
                Tree::new(AndroidLevels, WriterSink::stdout().with_max_length(*max_length))
            }
            Self::File { path, max_length } => {
                let sink = WriterSink::append(path).map_err(|source| ConfigError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
                Tree::new(AndroidLevels, sink.with_max_length(*max_length))
            }
            Self::Syslog { facility, ident } => build_syslog(facility, ident.as_deref())?,
            Self::Tracing => Tree::new(ConsecutiveLevels, TracingSink::new()),
        };
        debug!(target: "timber::config", spec = %self, tree = %tree.id(), "built tree");
        Ok(Arc::new(tree))
    }
}

#[cfg(all(unix, feature = "syslog"))]
fn build_syslog(facility: &str, ident: Option<&str>) -> Result<Tree, ConfigError> {
    use crate::syslog::{SyslogConfig, SyslogFacility, SyslogLevels, SyslogSink};

    let facility = SyslogFacility::from_name(facility)
        .ok_or_else(|| ConfigError::UnknownFacility(facility.to_owned()))?;
    let config = SyslogConfig::new(facility, ident.map(str::to_owned));
    Ok(Tree::new(SyslogLevels, SyslogSink::open(&config)))
}

#[cfg(not(all(unix, feature = "syslog")))]
fn build_syslog(_facility: &str, _ident: Option<&str>) -> Result<Tree, ConfigError> {
    Err(ConfigError::Unsupported("syslog"))
}

/// An ordered list of trees to plant.
///
/// # Examples
///
/// ```
/// use timber::Forest;
/// use timber_sink::{ForestConfig, TreeSpec};
///
/// let config = ForestConfig::from_tokens(["stderr:120", "tracing"])?;
/// assert_eq!(config.trees()[0], TreeSpec::Stderr { max_length: 120 });
///
/// let forest = Forest::new();
/// assert_eq!(config.plant_into(&forest)?, 2);
/// assert_eq!(forest.tree_count(), 2);
/// # Ok::<(), timber_sink::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForestConfig {
    /// Trees in planting order.
    pub trees: Vec<TreeSpec>,
}

impl ForestConfig {
    /// Parses one spec per token.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trees = tokens
            .into_iter()
            .map(|token| token.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trees })
    }

    /// Parses a comma-separated spec list; blank entries are skipped.
    pub fn parse_list(list: &str) -> Result<Self, ConfigError> {
        Self::from_tokens(list.split(',').map(str::trim).filter(|t| !t.is_empty()))
    }

    /// Reads [`TREES_ENV`]; an unset or blank variable yields an empty config.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(TREES_ENV) {
            Ok(list) => Self::parse_list(&list),
            Err(_) => Ok(Self::default()),
        }
    }

    /// The configured specs.
    pub fn trees(&self) -> &[TreeSpec] {
        &self.trees
    }

    /// Reports whether no tree is configured.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Builds every tree, failing on the first spec that cannot be built.
    pub fn build(&self) -> Result<Vec<Arc<Tree>>, ConfigError> {
        self.trees.iter().map(TreeSpec::build).collect()
    }

    /// Builds every tree and plants them into `forest`; returns how many were planted.
    ///
    /// Nothing is planted when any spec fails to build.
    pub fn plant_into(&self, forest: &Forest) -> Result<usize, ConfigError> {
        let trees = self.build()?;
        let count = trees.len();
        forest.plant_all(trees);
        Ok(count)
    }
}
