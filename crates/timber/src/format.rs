//! crates/timber/src/format.rs
//! printf-style templating for messages logged with an argument list.
//!
//! A template is only expanded when the caller supplies at least one
//! argument, so literal `%` characters in plain messages pass through
//! untouched. Supported conversions are `%s %S %d %x %X %o %f %b %c %n %%`
//! with the `-` and `0` flags, a minimum width, and a `.precision`, both
//! bounded by [`MAX_FIELD_WIDTH`].
//! Arguments beyond those consumed by the template are ignored.

use std::fmt::{self, Write as _};

use thiserror::Error;

/// A single argument substituted into a message template.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    /// Borrowed string.
    Str(&'a str),
    /// Any displayable value; only renders through `%s`/`%S`/`%b`.
    Display(&'a dyn fmt::Display),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Single character.
    Char(char),
}

impl<'a> Arg<'a> {
    /// Wraps any [`fmt::Display`] value.
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Self::Display(value)
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Display(_) => "display",
            Self::Int(_) => "signed integer",
            Self::Uint(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Char(_) => "char",
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Display(d) => f.debug_tuple("Display").field(&d.to_string()).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Char(v) => f.debug_tuple("Char").field(v).finish(),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value.as_str())
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg<'_> {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64);
arg_from!(Uint as u64: u8, u16, u32, u64);
arg_from!(Float as f64: f32, f64);
arg_from!(Bool as bool: bool);
arg_from!(Char as char: char);

impl From<isize> for Arg<'_> {
    fn from(value: isize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for Arg<'_> {
    fn from(value: usize) -> Self {
        Self::Uint(value as u64)
    }
}

/// A template and its arguments do not fit together.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The template references more arguments than were supplied.
    #[error("format specifier '%{conversion}' at byte {offset} has no argument at index {index}")]
    MissingArgument {
        /// Conversion character of the unmatched specifier.
        conversion: char,
        /// Zero-based argument index the specifier asked for.
        index: usize,
        /// Byte offset of the `%` in the template.
        offset: usize,
    },
    /// The template contains a conversion character that is not supported.
    #[error("unknown format conversion '{conversion}' at byte {offset}")]
    UnknownConversion {
        /// Offending conversion character.
        conversion: char,
        /// Byte offset of the `%` in the template.
        offset: usize,
    },
    /// The argument cannot be rendered by the requested conversion.
    #[error("format specifier '%{conversion}' cannot render the {found} argument at index {index}")]
    IncompatibleArgument {
        /// Conversion character of the specifier.
        conversion: char,
        /// Zero-based argument index.
        index: usize,
        /// Kind of argument that was supplied.
        found: &'static str,
    },
    /// The template ends in the middle of a specifier.
    #[error("format template ends inside the specifier starting at byte {offset}")]
    DanglingPercent {
        /// Byte offset of the `%` in the template.
        offset: usize,
    },
    /// A width or precision exceeds [`MAX_FIELD_WIDTH`].
    #[error("field width {value} at byte {offset} exceeds the maximum of {max}", max = MAX_FIELD_WIDTH)]
    FieldTooWide {
        /// Requested width or precision, saturated at `usize::MAX`.
        value: usize,
        /// Byte offset of the `%` in the template.
        offset: usize,
    },
}

/// Largest width or precision a specifier may request.
pub const MAX_FIELD_WIDTH: usize = 4096;

#[derive(Default)]
struct Spec {
    left: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Expands `template` with `args`.
///
/// # Examples
///
/// ```
/// use timber::{Arg, format_message};
///
/// let text = format_message("%s moved %d bytes (%.1f%%)", &[
///     Arg::from("upload"),
///     Arg::from(2048_u32),
///     Arg::from(12.5_f64),
/// ])?;
/// assert_eq!(text, "upload moved 2048 bytes (12.5%)");
/// # Ok::<(), timber::FormatError>(())
/// ```
pub fn format_message(template: &str, args: &[Arg<'_>]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut chars = template.char_indices().peekable();
    let mut next_arg = 0;

    while let Some((offset, ch)) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&(_, flag)) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek().is_some_and(|&(_, c)| c == '.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        if let Some(value) = [spec.width, spec.precision]
            .into_iter()
            .flatten()
            .find(|&value| value > MAX_FIELD_WIDTH)
        {
            return Err(FormatError::FieldTooWide { value, offset });
        }

        let Some((_, conversion)) = chars.next() else {
            return Err(FormatError::DanglingPercent { offset });
        };

        match conversion {
            '%' => out.push_str(&pad("%".to_owned(), &spec, false)),
            'n' => out.push('\n'),
            's' | 'S' | 'd' | 'x' | 'X' | 'o' | 'f' | 'b' | 'c' => {
                let index = next_arg;
                let arg = args.get(index).ok_or(FormatError::MissingArgument {
                    conversion,
                    index,
                    offset,
                })?;
                next_arg += 1;
                let (body, numeric) = render(conversion, arg, &spec).ok_or(
                    FormatError::IncompatibleArgument {
                        conversion,
                        index,
                        found: arg.kind(),
                    },
                )?;
                out.push_str(&pad(body, &spec, numeric));
            }
            other => {
                return Err(FormatError::UnknownConversion {
                    conversion: other,
                    offset,
                });
            }
        }
    }

    Ok(out)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|&(_, c)| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    value
}

/// Renders one argument; the flag reports whether zero padding applies.
fn render(conversion: char, arg: &Arg<'_>, spec: &Spec) -> Option<(String, bool)> {
    let rendered = match (conversion, arg) {
        ('s' | 'S', _) => {
            let mut text = plain(arg);
            if let Some(limit) = spec.precision {
                text = text.chars().take(limit).collect();
            }
            if conversion == 'S' {
                text = text.to_uppercase();
            }
            return Some((text, false));
        }
        ('b', Arg::Bool(v)) => return Some((v.to_string(), false)),
        ('b', _) => return Some(("true".to_owned(), false)),
        ('c', Arg::Char(c)) => return Some((c.to_string(), false)),
        ('c', Arg::Int(v)) => {
            let c = u32::try_from(*v).ok().and_then(char::from_u32)?;
            return Some((c.to_string(), false));
        }
        ('c', Arg::Uint(v)) => {
            let c = u32::try_from(*v).ok().and_then(char::from_u32)?;
            return Some((c.to_string(), false));
        }
        ('d', Arg::Int(v)) => v.to_string(),
        ('d', Arg::Uint(v)) => v.to_string(),
        ('x', Arg::Int(v)) => format!("{v:x}"),
        ('x', Arg::Uint(v)) => format!("{v:x}"),
        ('X', Arg::Int(v)) => format!("{v:X}"),
        ('X', Arg::Uint(v)) => format!("{v:X}"),
        ('o', Arg::Int(v)) => format!("{v:o}"),
        ('o', Arg::Uint(v)) => format!("{v:o}"),
        ('f', Arg::Float(v)) => format!("{:.*}", spec.precision.unwrap_or(6), v),
        _ => return None,
    };
    Some((rendered, true))
}

fn plain(arg: &Arg<'_>) -> String {
    match arg {
        Arg::Str(s) => (*s).to_owned(),
        Arg::Display(d) => d.to_string(),
        Arg::Int(v) => v.to_string(),
        Arg::Uint(v) => v.to_string(),
        Arg::Float(v) => v.to_string(),
        Arg::Bool(v) => v.to_string(),
        Arg::Char(v) => v.to_string(),
    }
}

fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else {
        return body;
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let fill = width - len;
    let mut out = String::with_capacity(body.len() + fill);
    if spec.left {
        out.push_str(&body);
        out.extend(std::iter::repeat_n(' ', fill));
    } else if spec.zero && numeric {
        let (sign, digits) = match body.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", body.as_str()),
        };
        let _ = write!(out, "{sign}{}{digits}", "0".repeat(fill));
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.push_str(&body);
    }
    out
}
