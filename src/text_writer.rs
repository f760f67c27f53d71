//! TDF text writer.
//!
//! [`TextWriter`] pretty-prints a value tree: one key or element per line, nested
//! containers indented one level, every number carrying the suffix letter of its kind so
//! the text reader restores the exact kind.
//!
//! ```rust
//! use serde_tdf::{tdf, text_writer, TextOptions};
//!
//! let value = tdf!({ "stats": { "hp": (10u16) }, "tags": [] });
//! let text = text_writer::write_string(&value, &TextOptions::new()).unwrap();
//! assert_eq!(text, "stats: {\n\thp: 10S\n}\ntags: [ ]");
//! ```
//!
//! | Kind    | Suffix | Example   |
//! |---------|--------|-----------|
//! | Byte    | `B`    | `3B`      |
//! | SByte   | `b`    | `-3b`     |
//! | Char    | `c`    | `65c`     |
//! | Short   | `s`    | `-300s`   |
//! | UShort  | `S`    | `300S`    |
//! | Int     |        | `7`       |
//! | UInt    | `I`    | `7I`      |
//! | Long    | `l`    | `7l`      |
//! | ULong   | `L`    | `7L`      |
//! | Float   |        | `2.5`     |
//! | Double  | `d`    | `2.5d`    |
//! | Decimal | `m`    | `1.25m`   |

use base64::Engine;
use std::io;

use crate::token::ValueWrite;
use crate::{Error, Result, TextOptions, Value};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Frame {
    Object,
    Array,
    /// Root object written without braces.
    BareRoot,
}

/// The TDF text pretty printer.
///
/// Created via [`TextWriter::new`]; call [`TextWriter::finish`] to check that every
/// container was closed and to get the sink back.
pub struct TextWriter<W> {
    out: W,
    options: TextOptions,
    frames: Vec<Frame>,
    depth: usize,
    started: bool,
    /// A key was written and its value is still due on the same line.
    after_key: bool,
    /// The innermost container has been opened but nothing written into it yet.
    opened: bool,
}

impl<W: io::Write> TextWriter<W> {
    pub fn new(out: W, options: TextOptions) -> Self {
        TextWriter {
            out,
            options,
            frames: Vec::new(),
            depth: 0,
            started: false,
            after_key: false,
            opened: false,
        }
    }

    /// Checks that the document is complete and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnbalancedContainer`] if a container is still open or a key is
    /// still waiting for its value.
    pub fn finish(mut self) -> Result<W> {
        if !self.frames.is_empty() {
            return Err(Error::UnbalancedContainer(format!(
                "{} container(s) still open",
                self.frames.len()
            )));
        }
        if self.after_key {
            return Err(Error::UnbalancedContainer("key without value".to_string()));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn begin_line(&mut self) -> Result<()> {
        if self.started {
            self.out.write_all(self.options.newline.as_bytes())?;
            for _ in 0..self.depth {
                self.out.write_all(self.options.indent.as_bytes())?;
            }
        }
        self.started = true;
        Ok(())
    }

    /// Positions the output for a key, an element or an opening bracket.
    fn begin_token(&mut self) -> Result<()> {
        self.opened = false;
        if self.after_key {
            self.after_key = false;
            Ok(())
        } else {
            self.begin_line()
        }
    }

    fn check_value_slot(&self) -> Result<()> {
        match self.frames.last() {
            Some(Frame::Object | Frame::BareRoot) if !self.after_key => Err(
                Error::UnbalancedContainer("object entry written without a key".to_string()),
            ),
            _ if self.frames.is_empty() && self.started && !self.after_key => Err(
                Error::UnbalancedContainer("more than one root value".to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn open(&mut self, frame: Frame, bracket: &str) -> Result<()> {
        self.check_value_slot()?;
        self.begin_token()?;
        self.write_str(bracket)?;
        self.frames.push(frame);
        self.depth += 1;
        self.opened = true;
        Ok(())
    }

    fn close(&mut self, frame: Frame, bracket: &str) -> Result<()> {
        if self.after_key {
            return Err(Error::UnbalancedContainer("key without value".to_string()));
        }
        match self.frames.pop() {
            Some(Frame::BareRoot) if frame == Frame::Object => return Ok(()),
            Some(top) if top == frame => {}
            Some(top) => {
                self.frames.push(top);
                return Err(Error::UnbalancedContainer(format!(
                    "'{bracket}' does not close the open container"
                )));
            }
            None => {
                return Err(Error::UnbalancedContainer(format!(
                    "'{bracket}' without a matching opening bracket"
                )))
            }
        }
        self.depth -= 1;
        if self.opened {
            self.opened = false;
            self.write_str(" ")?;
            self.write_str(bracket)
        } else {
            self.begin_line()?;
            self.write_str(bracket)
        }
    }
}

impl<W: io::Write> ValueWrite for TextWriter<W> {
    fn begin_object(&mut self) -> Result<()> {
        if self.frames.is_empty() && !self.started && !self.options.braced_root {
            self.frames.push(Frame::BareRoot);
            return Ok(());
        }
        self.open(Frame::Object, "{")
    }

    fn end_object(&mut self) -> Result<()> {
        self.close(Frame::Object, "}")
    }

    fn write_key(&mut self, key: &str) -> Result<()> {
        if !matches!(self.frames.last(), Some(Frame::Object | Frame::BareRoot)) {
            return Err(Error::UnbalancedContainer(format!(
                "key '{key}' written outside an object"
            )));
        }
        if self.after_key {
            return Err(Error::UnbalancedContainer(format!(
                "key '{key}' written where a value was due"
            )));
        }
        if key.is_empty() {
            return Err(Error::custom("object keys must not be empty"));
        }
        self.begin_token()?;
        let text = if key_needs_quotes(key) {
            quote(key)
        } else {
            key.to_string()
        };
        self.write_str(&text)?;
        self.write_str(": ")?;
        self.after_key = true;
        Ok(())
    }

    fn begin_array(&mut self) -> Result<()> {
        self.open(Frame::Array, "[")
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(Frame::Array, "]")
    }

    fn write_scalar(&mut self, value: &Value) -> Result<()> {
        if matches!(value, Value::Object(_) | Value::Array(_)) {
            return Err(Error::custom("containers must be written with begin/end calls"));
        }
        self.check_value_slot()?;
        self.begin_token()?;
        let text = literal(value);
        self.write_str(&text)
    }
}

/// Formats a non-container value as a text literal.
///
/// ```rust
/// use serde_tdf::{text_writer::literal, Value};
///
/// assert_eq!(literal(&Value::Byte(3)), "3B");
/// assert_eq!(literal(&Value::Float(1.0)), "1.0");
/// assert_eq!(literal(&Value::Double(f64::NAN)), ".nand");
/// assert_eq!(literal(&Value::from("it's")), r"'it\'s'");
/// ```
#[must_use]
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => quote(s),
        Value::Byte(n) => format!("{n}B"),
        Value::SByte(n) => format!("{n}b"),
        Value::Char(c) => format!("{}c", u32::from(*c)),
        Value::Short(n) => format!("{n}s"),
        Value::UShort(n) => format!("{n}S"),
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => format!("{n}I"),
        Value::Long(n) => format!("{n}l"),
        Value::ULong(n) => format!("{n}L"),
        Value::Float(f) => float_literal(f64::from(*f), f.to_string()),
        Value::Double(f) => float_literal(*f, f.to_string()) + "d",
        Value::Decimal(d) => format!("{d}m"),
        Value::Binary(bytes) => {
            format!("*{}*", base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        Value::Object(_) => "{ }".to_string(),
        Value::Array(_) => "[ ]".to_string(),
    }
}

fn float_literal(value: f64, mut text: String) -> String {
    if value.is_nan() {
        ".nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { ".inf" } else { "-.inf" }.to_string()
    } else {
        if !text.contains('.') {
            text.push_str(".0");
        }
        text
    }
}

/// Single-quotes a string, escaping the characters the reader unescapes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{000B}' => out.push_str("\\v"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[inline]
fn key_needs_quotes(key: &str) -> bool {
    key.starts_with(char::is_whitespace)
        || key.ends_with(char::is_whitespace)
        || key.starts_with("//")
        || key.chars().any(|c| {
            matches!(
                c,
                '\'' | '\\' | '\r' | '\n' | '\t' | '\u{000B}' | ',' | ':' | '{' | '}' | '[' | ']' | '#'
            )
        })
}

/// Writes a value as a complete text document into `writer`.
///
/// # Errors
///
/// Returns an error if writing to the sink fails or an object key is empty.
pub fn write_to<W: io::Write>(writer: W, value: &Value, options: &TextOptions) -> Result<W> {
    let mut text = TextWriter::new(writer, options.clone());
    text.write_value(value)?;
    text.finish()
}

/// Writes a value as a complete text document into a `String`.
///
/// # Errors
///
/// Returns an error if an object key is empty.
pub fn write_string(value: &Value, options: &TextOptions) -> Result<String> {
    let bytes = write_to(Vec::with_capacity(256), value, options)?;
    String::from_utf8(bytes).map_err(Error::custom)
}

/// Formats a value with braces on the root and everything on one line, as `Display` does.
///
/// Unlike the document writer this never fails: an empty key is shown as `''`.
pub(crate) fn write_inline(value: &Value, f: &mut impl std::fmt::Write) -> std::fmt::Result {
    match value {
        Value::Object(map) if map.is_empty() => f.write_str("{ }"),
        Value::Object(map) => {
            f.write_char('{')?;
            for (key, child) in map {
                f.write_char(' ')?;
                if key.is_empty() || key_needs_quotes(key) {
                    f.write_str(&quote(key))?;
                } else {
                    f.write_str(key)?;
                }
                f.write_str(": ")?;
                write_inline(child, f)?;
            }
            f.write_str(" }")
        }
        Value::Array(items) if items.is_empty() => f.write_str("[ ]"),
        Value::Array(items) => {
            f.write_char('[')?;
            for child in items {
                f.write_char(' ')?;
                write_inline(child, f)?;
            }
            f.write_str(" ]")
        }
        scalar => f.write_str(&literal(scalar)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tdf, text_reader, TdfMap};

    fn pretty(value: &Value) -> String {
        write_string(value, &TextOptions::new()).unwrap()
    }

    #[test]
    fn test_bare_root_object() {
        let value = tdf!({ "health": (3u8), "name": "Slime" });
        assert_eq!(pretty(&value), "health: 3B\nname: 'Slime'");
    }

    #[test]
    fn test_braced_root_object() {
        let value = tdf!({ "a": 1 });
        let options = TextOptions::new().with_braced_root(true);
        assert_eq!(write_string(&value, &options).unwrap(), "{\n\ta: 1\n}");
    }

    #[test]
    fn test_nested_indentation() {
        let value = tdf!({ "outer": { "inner": [1, 2] } });
        assert_eq!(
            pretty(&value),
            "outer: {\n\tinner: [\n\t\t1\n\t\t2\n\t]\n}"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(pretty(&tdf!([])), "[ ]");
        assert_eq!(pretty(&tdf!({ "o": {} })), "o: { }");
        assert_eq!(pretty(&Value::Object(TdfMap::new())), "");
    }

    #[test]
    fn test_custom_newline_and_indent() {
        let value = tdf!([[1]]);
        let options = TextOptions::new().with_newline("\r\n").with_indent("  ");
        assert_eq!(
            write_string(&value, &options).unwrap(),
            "[\r\n  [\r\n    1\r\n  ]\r\n]"
        );
    }

    #[test]
    fn test_suffix_literals() {
        assert_eq!(literal(&Value::SByte(-3)), "-3b");
        assert_eq!(literal(&Value::Char('A')), "65c");
        assert_eq!(literal(&Value::Short(-300)), "-300s");
        assert_eq!(literal(&Value::UShort(300)), "300S");
        assert_eq!(literal(&Value::Int(7)), "7");
        assert_eq!(literal(&Value::UInt(7)), "7I");
        assert_eq!(literal(&Value::Long(7)), "7l");
        assert_eq!(literal(&Value::ULong(7)), "7L");
        assert_eq!(literal(&Value::Double(2.0)), "2.0d");
        assert_eq!(literal(&Value::Float(f32::NEG_INFINITY)), "-.inf");
    }

    #[test]
    fn test_binary_literal() {
        assert_eq!(literal(&Value::Binary(b"hi".to_vec())), "*aGk=*");
        assert_eq!(literal(&Value::Binary(Vec::new())), "**");
    }

    #[test]
    fn test_key_quoting() {
        let value = tdf!({ "a b": 1, "x:y": 2, " pad": 3 });
        assert_eq!(pretty(&value), "a b: 1\n'x:y': 2\n' pad': 3");
        assert_eq!(text_reader::parse(&pretty(&value)).unwrap(), value);
    }

    #[test]
    fn test_empty_key_rejected() {
        let value = tdf!({ "": 1 });
        assert!(write_string(&value, &TextOptions::new()).is_err());
    }

    #[test]
    fn test_misuse_is_rejected() {
        let mut writer = TextWriter::new(Vec::new(), TextOptions::new());
        writer.begin_array().unwrap();
        assert!(writer.write_key("a").is_err());
        assert!(writer.end_object().is_err());
        writer.end_array().unwrap();
        assert!(writer.finish().is_ok());

        let mut writer = TextWriter::new(Vec::new(), TextOptions::new());
        writer.begin_array().unwrap();
        assert!(matches!(
            writer.finish(),
            Err(Error::UnbalancedContainer(_))
        ));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let value = tdf!({
            "b": (3u8),
            "c": ('x'),
            "f": (0.1f32),
            "d": (0.1f64),
            "s": "multi\nline 'quoted'",
            "bin": (Value::Binary(vec![0, 255, 7])),
            "nested": { "list": [null, true, (-5i64)] },
            "empty": []
        });
        let text = pretty(&value);
        assert_eq!(text_reader::parse(&text).unwrap(), value);
    }

    #[test]
    fn test_inline_form_quotes_empty_and_awkward_keys() {
        let mut map = TdfMap::new();
        map.insert(String::new(), Value::Int(1));
        map.insert("a:b".to_string(), tdf!([(2u8), "x"]));
        map.insert("plain".to_string(), tdf!({}));
        assert_eq!(
            Value::Object(map).to_string(),
            "{ '': 1 'a:b': [ 2B 'x' ] plain: { } }"
        );
        assert!(write_string(&tdf!({ "": 1 }), &TextOptions::new()).is_err());
    }
}
