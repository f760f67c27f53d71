//! TDF text reader.
//!
//! [`TextReader`] is a pull tokenizer over the human-editable grammar. It produces one
//! [`Token`] per call and builds value trees through the shared [`TokenRead`] helpers.
//!
//! ## Grammar
//!
//! ```text
//! object   := '{' (key value)* '}'
//! array    := '[' value* ']'
//! key      := token ':'
//! value    := object | array | 'null' | 'true' | 'false'
//!           | quotedString | binaryLiteral | number | bareString
//! comment  := ('#' | '//') anyCharsToLineEnd
//! ```
//!
//! Whitespace, `:` and `,` are insignificant outside quotes. A key with no value before
//! the next key or closing bracket reads as `null`:
//!
//! ```rust
//! use serde_tdf::{text_reader, Value};
//!
//! let value = text_reader::parse("{ a: }").unwrap();
//! assert_eq!(value.as_object().unwrap().get("a"), Some(&Value::Null));
//! ```
//!
//! ## Numbers
//!
//! Unsuffixed literals are typed by shape: with a `.` they are 32-bit floats (64-bit
//! if out of range); otherwise 32-bit, then 64-bit signed, then 64-bit unsigned
//! integers. A trailing type suffix selects the kind exactly:
//!
//! ```rust
//! use serde_tdf::{text_reader, Value};
//!
//! assert_eq!(text_reader::parse("3B").unwrap(), Value::Byte(3));
//! assert_eq!(text_reader::parse("3").unwrap(), Value::Int(3));
//! assert_eq!(text_reader::parse("2.5").unwrap(), Value::Float(2.5));
//! assert_eq!(text_reader::parse("2.5d").unwrap(), Value::Double(2.5));
//! ```

use base64::Engine;
use rust_decimal::Decimal;
use std::io;
use std::str::FromStr;

use crate::token::{Token, TokenRead};
use crate::{Error, Result, TdfMap, Value};

/// Prefix marking a quoted literal as binary.
pub const BINARY_PREFIX: &str = "bin::";

/// The TDF text tokenizer.
///
/// Created via [`TextReader::new`] over a fully buffered input.
pub struct TextReader<'de> {
    input: &'de str,
    position: usize,
    line: usize,
    column: usize,
    /// Token that triggered a synthetic `null`, returned verbatim on the next call.
    pending: Option<Token>,
    /// The last emitted token was an object key.
    after_key: bool,
}

impl<'de> TextReader<'de> {
    pub fn new(input: &'de str) -> Self {
        TextReader {
            input,
            position: 0,
            line: 1,
            column: 1,
            pending: None,
            after_key: false,
        }
    }

    /// Current line and column, 1-based.
    #[must_use]
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.next_char() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skips whitespace, `:`, `,` and comments.
    fn skip_insignificant(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                ':' | ',' => {
                    self.next_char();
                }
                '#' => self.skip_line(),
                '/' if self.peek_second() == Some('/') => self.skip_line(),
                c if c.is_whitespace() => {
                    self.next_char();
                }
                _ => break,
            }
        }
    }

    /// Consumes a `:` following the current token, if there is one.
    fn key_follows(&mut self) -> bool {
        let saved = (self.position, self.line, self.column);
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
        if self.peek_char() == Some(':') {
            self.next_char();
            true
        } else {
            (self.position, self.line, self.column) = saved;
            false
        }
    }

    fn lex_quoted(&mut self) -> Result<String> {
        let (line, col) = self.location();
        self.next_char(); // consume opening quote
        let mut result = String::new();

        while let Some(ch) = self.next_char() {
            match ch {
                '\'' => return Ok(result),
                '\\' => match self.next_char() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('v') => result.push('\u{000B}'),
                    Some('\'') => result.push('\''),
                    Some('\\') => result.push('\\'),
                    Some(other) => {
                        // Unknown escape - preserve literally
                        result.push('\\');
                        result.push(other);
                    }
                    None => break,
                },
                other => result.push(other),
            }
        }
        Err(Error::syntax(line, col, "unterminated string"))
    }

    fn lex_bare(&mut self) -> &'de str {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if matches!(ch, '\r' | '\n' | ',' | ':' | '{' | '}' | '[' | ']' | '#') {
                break;
            }
            self.next_char();
        }
        self.input[start..self.position].trim()
    }

    fn key_token(&self, key: String, line: usize, col: usize) -> Result<Token> {
        if key.is_empty() {
            return Err(Error::EmptyKey { line, col });
        }
        Ok(Token::ObjectKey(key))
    }

    /// Produces the next raw token, without the lenient-grammar rewrite.
    fn lex(&mut self) -> Result<Option<Token>> {
        self.skip_insignificant();
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };
        let (line, col) = self.location();

        let token = match ch {
            '{' => {
                self.next_char();
                Token::ObjectStart
            }
            '}' => {
                self.next_char();
                Token::ObjectEnd
            }
            '[' => {
                self.next_char();
                Token::ArrayStart
            }
            ']' => {
                self.next_char();
                Token::ArrayEnd
            }
            '\'' => {
                let text = self.lex_quoted()?;
                if self.key_follows() {
                    self.key_token(text, line, col)?
                } else {
                    Token::Scalar(quoted_value(text))
                }
            }
            _ => {
                let text = self.lex_bare();
                if self.key_follows() {
                    self.key_token(text.to_string(), line, col)?
                } else {
                    Token::Scalar(classify_bare(text))
                }
            }
        };
        Ok(Some(token))
    }

    /// Reads a whole document.
    ///
    /// A document is either a single value, or the bare entries of a root object written
    /// without braces. An empty document is an empty object.
    pub fn read_document(&mut self) -> Result<Value> {
        let value = match self.next_token()? {
            None => return Ok(Value::Object(TdfMap::new())),
            Some(Token::ObjectKey(first)) => {
                let mut map = TdfMap::new();
                let value = self.read_value()?;
                map.insert(first, value);
                while let Some(token) = self.next_token()? {
                    match token {
                        Token::ObjectKey(key) => {
                            let value = self.read_value()?;
                            map.insert(key, value);
                        }
                        other => {
                            return Err(self.error_here(&format!(
                                "expected object key, found {}",
                                other.describe()
                            )))
                        }
                    }
                }
                return Ok(Value::Object(map));
            }
            Some(token) => self.read_value_from(token)?,
        };

        match self.next_token()? {
            None => Ok(value),
            Some(extra) => Err(self.error_here(&format!(
                "unexpected {} after the document value",
                extra.describe()
            ))),
        }
    }
}

impl TokenRead for TextReader<'_> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.pending.take() {
            self.after_key = matches!(token, Token::ObjectKey(_));
            return Ok(Some(token));
        }

        let token = self.lex()?;
        if self.after_key {
            self.after_key = false;
            match token {
                Some(Token::ObjectKey(_) | Token::ObjectEnd | Token::ArrayEnd) => {
                    tracing::trace!(line = self.line, "key without value, reading as null");
                    self.pending = token;
                    return Ok(Some(Token::Scalar(Value::Null)));
                }
                None => {
                    tracing::trace!(line = self.line, "key at end of input, reading as null");
                    return Ok(Some(Token::Scalar(Value::Null)));
                }
                _ => {}
            }
        }
        self.after_key = matches!(token, Some(Token::ObjectKey(_)));
        Ok(token)
    }

    fn error_here(&self, msg: &str) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    fn eof_here(&self, expected: &str) -> Error {
        Error::unexpected_eof(self.line, self.column, expected)
    }
}

fn quoted_value(text: String) -> Value {
    if let Some(payload) = text.strip_prefix(BINARY_PREFIX) {
        if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(payload) {
            return Value::Binary(bytes);
        }
    }
    Value::String(text)
}

/// Classifies an unquoted token.
fn classify_bare(text: &str) -> Value {
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        Value::Null
    } else if text.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if text.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if let Some(number) = parse_number(text) {
        number
    } else if let Some(bytes) = parse_star_binary(text) {
        Value::Binary(bytes)
    } else {
        Value::String(text.to_string())
    }
}

fn parse_star_binary(text: &str) -> Option<Vec<u8>> {
    let payload = text.strip_prefix('*')?.strip_suffix('*')?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()
}

/// Parses a numeric literal, honouring a trailing type suffix.
pub(crate) fn parse_number(text: &str) -> Option<Value> {
    let last = text.chars().last()?;
    if last.is_ascii_alphabetic() {
        let body = &text[..text.len() - 1];
        if let Some(value) = parse_suffixed(body, last) {
            return Some(value);
        }
    }
    parse_unsuffixed(text)
}

fn parse_suffixed(body: &str, suffix: char) -> Option<Value> {
    if !looks_numeric(body) {
        return None;
    }
    let value = match suffix {
        'B' => Value::Byte(body.parse().ok()?),
        'b' => Value::SByte(body.parse().ok()?),
        'c' => Value::Char(char::from_u32(body.parse().ok()?)?),
        's' => Value::Short(body.parse().ok()?),
        'S' => Value::UShort(body.parse().ok()?),
        'I' => Value::UInt(body.parse().ok()?),
        'l' => Value::Long(body.parse().ok()?),
        'L' => Value::ULong(body.parse().ok()?),
        'd' => Value::Double(parse_float(body)?),
        'm' => Value::Decimal(Decimal::from_str(body).ok()?),
        _ => return None,
    };
    Some(value)
}

fn parse_unsuffixed(text: &str) -> Option<Value> {
    if !looks_numeric(text) {
        return None;
    }
    if text.contains('.') {
        let single: Option<f32> = parse_float(text);
        match single {
            Some(f) if f.is_finite() || is_non_finite_literal(text) => Some(Value::Float(f)),
            _ => parse_float(text).map(Value::Double),
        }
    } else if let Ok(i) = text.parse::<i32>() {
        Some(Value::Int(i))
    } else if let Ok(i) = text.parse::<i64>() {
        Some(Value::Long(i))
    } else {
        text.parse::<u64>().ok().map(Value::ULong)
    }
}

/// Digits, sign, point and exponent only; or one of the non-finite float literals.
fn looks_numeric(text: &str) -> bool {
    is_non_finite_literal(text)
        || (!text.is_empty()
            && text.bytes().any(|b| b.is_ascii_digit())
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')))
}

fn is_non_finite_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['-', '+']);
    unsigned.eq_ignore_ascii_case(".nan") || unsigned.eq_ignore_ascii_case(".inf")
}

fn parse_float<F>(text: &str) -> Option<F>
where
    F: FromStr + From<f32> + std::ops::Neg<Output = F>,
{
    if is_non_finite_literal(text) {
        let negative = text.starts_with('-');
        let unsigned = text.trim_start_matches(['-', '+']);
        let value = if unsigned.eq_ignore_ascii_case(".nan") {
            F::from(f32::NAN)
        } else {
            F::from(f32::INFINITY)
        };
        return Some(if negative { -value } else { value });
    }
    text.parse().ok()
}

/// Parses a whole document from a string.
///
/// # Errors
///
/// Returns a parse error if the text violates the grammar.
pub fn parse(input: &str) -> Result<Value> {
    TextReader::new(input).read_document()
}

/// Parses a whole document from an I/O stream, buffering it fully first.
///
/// # Errors
///
/// Returns an error if reading fails, the bytes are not UTF-8, or the text violates the grammar.
pub fn parse_reader<R: io::Read>(mut reader: R) -> Result<Value> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut reader = TextReader::new(input);
        let mut out = Vec::new();
        while let Some(token) = reader.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_key_without_value_emits_null_then_buffered_token() {
        assert_eq!(
            tokens("{ a: }"),
            vec![
                Token::ObjectStart,
                Token::ObjectKey("a".into()),
                Token::Scalar(Value::Null),
                Token::ObjectEnd,
            ]
        );
    }

    #[test]
    fn test_consecutive_keys() {
        assert_eq!(
            tokens("{ a: b: 2 }"),
            vec![
                Token::ObjectStart,
                Token::ObjectKey("a".into()),
                Token::Scalar(Value::Null),
                Token::ObjectKey("b".into()),
                Token::Scalar(Value::Int(2)),
                Token::ObjectEnd,
            ]
        );
    }

    #[test]
    fn test_key_at_end_of_input() {
        assert_eq!(
            tokens("a:"),
            vec![Token::ObjectKey("a".into()), Token::Scalar(Value::Null)]
        );
    }

    #[test]
    fn test_comments_and_separators() {
        let input = "# header\n[ 1, 2 # two\n// whole line\n, 3 ]";
        assert_eq!(
            tokens(input),
            vec![
                Token::ArrayStart,
                Token::Scalar(Value::Int(1)),
                Token::Scalar(Value::Int(2)),
                Token::Scalar(Value::Int(3)),
                Token::ArrayEnd,
            ]
        );
    }

    #[test]
    fn test_quoted_escapes() {
        let value = parse(r"'a\nb\tc\'d\\e\vf\rg'").unwrap();
        assert_eq!(value, Value::from("a\nb\tc'd\\e\u{000B}f\rg"));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(parse("'abc"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_binary_literals() {
        assert_eq!(parse("'bin::aGk='").unwrap(), Value::Binary(b"hi".to_vec()));
        assert_eq!(parse("*aGk=*").unwrap(), Value::Binary(b"hi".to_vec()));
        // Not valid base64: stays a string
        assert_eq!(parse("'bin::!!'").unwrap(), Value::from("bin::!!"));
    }

    #[test]
    fn test_bare_classification() {
        assert_eq!(parse("NULL").unwrap(), Value::Null);
        assert_eq!(parse("True").unwrap(), Value::Bool(true));
        assert_eq!(parse("fAlSe").unwrap(), Value::Bool(false));
        assert_eq!(parse("hello world").unwrap(), Value::from("hello world"));
        assert_eq!(parse("1.2.3").unwrap(), Value::from("1.2.3"));
        assert_eq!(parse("Bob").unwrap(), Value::from("Bob"));
        assert_eq!(parse("nand").unwrap(), Value::from("nand"));
    }

    #[test]
    fn test_unsuffixed_integer_widths() {
        assert_eq!(parse("-7").unwrap(), Value::Int(-7));
        assert_eq!(parse("3000000000").unwrap(), Value::Long(3_000_000_000));
        assert_eq!(
            parse("18446744073709551615").unwrap(),
            Value::ULong(u64::MAX)
        );
        assert_eq!(
            parse("18446744073709551616").unwrap(),
            Value::from("18446744073709551616")
        );
    }

    #[test]
    fn test_float_widths() {
        assert_eq!(parse("0.5").unwrap(), Value::Float(0.5));
        assert_eq!(parse("1.0e300").unwrap(), Value::Double(1.0e300));
        assert!(matches!(parse(".nan").unwrap(), Value::Float(f) if f.is_nan()));
        assert_eq!(parse("-.inf").unwrap(), Value::Float(f32::NEG_INFINITY));
        assert_eq!(parse(".infd").unwrap(), Value::Double(f64::INFINITY));
    }

    #[test]
    fn test_exponent_without_point_is_a_bare_string() {
        assert_eq!(parse("1e5").unwrap(), Value::from("1e5"));
        assert_eq!(
            parse("{ id: 1e5 }").unwrap(),
            tdf!({ "id": "1e5" })
        );
        assert_eq!(parse("1.5e2").unwrap(), Value::Float(150.0));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(parse("-3b").unwrap(), Value::SByte(-3));
        assert_eq!(parse("65c").unwrap(), Value::Char('A'));
        assert_eq!(parse("-300s").unwrap(), Value::Short(-300));
        assert_eq!(parse("300S").unwrap(), Value::UShort(300));
        assert_eq!(parse("7I").unwrap(), Value::UInt(7));
        assert_eq!(parse("7l").unwrap(), Value::Long(7));
        assert_eq!(parse("7L").unwrap(), Value::ULong(7));
        assert_eq!(
            parse("1.25m").unwrap(),
            Value::Decimal(Decimal::new(125, 2))
        );
        // Out of range for the suffix: falls through to a bare string
        assert_eq!(parse("300B").unwrap(), Value::from("300B"));
    }

    #[test]
    fn test_quoted_key() {
        let value = parse("{ 'a b': 1 }").unwrap();
        assert_eq!(value.as_object().unwrap().get("a b"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_empty_key_is_an_error() {
        assert!(matches!(parse("{ '': 1 }"), Err(Error::EmptyKey { .. })));
    }

    #[test]
    fn test_braceless_root() {
        let value = parse("health: 3B\nname: 'Slime'").unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.get("health"), Some(&Value::Byte(3)));
        assert_eq!(map.get("name"), Some(&Value::from("Slime")));
    }

    #[test]
    fn test_trailing_content_is_an_error() {
        assert!(parse("[ 1 ] 2").is_err());
        assert!(parse("{ } }").is_err());
    }

    #[test]
    fn test_error_location() {
        match parse("{\n  a: 1\n  2\n}") {
            Err(Error::Syntax { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
