//! crates/timber-sink/src/line_mode.rs
//! Record terminator policy for writer-backed sinks.

/// Controls whether a [`WriterSink`](crate::WriterSink) ends each record with a newline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineMode {
    /// Terminate every record with `\n`.
    #[default]
    WithNewline,
    /// Write records back to back; useful when the writer frames records itself.
    WithoutNewline,
}

impl LineMode {
    /// Reports whether the mode appends a trailing newline to each record.
    ///
    /// # Examples
    ///
    /// ```
    /// use timber_sink::LineMode;
    ///
    /// assert!(LineMode::WithNewline.append_newline());
    /// assert!(!LineMode::WithoutNewline.append_newline());
    /// ```
    #[must_use]
    pub const fn append_newline(self) -> bool {
        matches!(self, Self::WithNewline)
    }
}

impl From<bool> for LineMode {
    /// `true` selects [`LineMode::WithNewline`], `false` selects [`LineMode::WithoutNewline`].
    fn from(append_newline: bool) -> Self {
        if append_newline {
            Self::WithNewline
        } else {
            Self::WithoutNewline
        }
    }
}
