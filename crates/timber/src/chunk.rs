//! crates/timber/src/chunk.rs
//! Splitting of long messages for transports with a bounded record size.
//!
//! Messages shorter than the limit are written as a single record, newlines
//! included. Longer messages are split at every newline first; each line is
//! then cut into pieces of at most `max` bytes. Cuts never fall inside a
//! UTF-8 sequence, so a piece may come out slightly shorter than `max`.

use std::io;

/// Record limit of the Android log facility, used by the bundled sinks.
pub const MAX_LOG_LENGTH: usize = 4000;

/// Iterator over the physical records a message is split into.
///
/// # Examples
///
/// ```
/// use timber::Chunks;
///
/// let message = format!("head\n{}", "x".repeat(9));
/// let parts: Vec<&str> = Chunks::new(&message, 4).collect();
/// assert_eq!(parts, ["head", "xxxx", "xxxx", "x"]);
/// ```
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    message: &'a str,
    max: usize,
    pos: usize,
    line_end: Option<usize>,
    whole: bool,
}

impl<'a> Chunks<'a> {
    /// Splits `message` into records of at most `max` bytes (minimum 1).
    pub fn new(message: &'a str, max: usize) -> Self {
        let max = max.max(1);
        Self {
            message,
            max,
            pos: 0,
            line_end: None,
            whole: message.len() < max,
        }
    }

    fn next_boundary(&self, from: usize) -> usize {
        from + self.message[from..]
            .chars()
            .next()
            .map_or(0, char::len_utf8)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.whole {
            self.whole = false;
            self.pos = self.message.len() + 1;
            return Some(self.message);
        }

        let len = self.message.len();
        let line_end = match self.line_end {
            Some(end) => end,
            None => {
                if self.pos >= len {
                    return None;
                }
                let end = self.message[self.pos..]
                    .find('\n')
                    .map_or(len, |offset| self.pos + offset);
                self.line_end = Some(end);
                end
            }
        };

        let mut end = line_end.min(self.pos.saturating_add(self.max));
        while end > self.pos && !self.message.is_char_boundary(end) {
            end -= 1;
        }
        if end == self.pos && line_end > self.pos {
            end = self.next_boundary(self.pos);
        }

        let part = &self.message[self.pos..end];
        self.pos = end;
        if self.pos >= line_end {
            self.line_end = None;
            self.pos = line_end + 1;
        }
        Some(part)
    }
}

/// Feeds every record of `message` to `write`, stopping at the first error.
pub fn emit_chunked<F>(message: &str, max: usize, mut write: F) -> io::Result<()>
where
    F: FnMut(&str) -> io::Result<()>,
{
    for part in Chunks::new(message, max) {
        write(part)?;
    }
    Ok(())
}
