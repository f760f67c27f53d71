//! Token model shared by the text and binary codecs.
//!
//! Both readers are pull tokenizers: every call to [`TokenRead::next_token`] yields one
//! [`Token`] or `None` at end of stream. The tree-building operations
//! ([`TokenRead::read_value`], [`TokenRead::read_object`], [`TokenRead::read_array`])
//! are written once here against that contract, so both grammars build identical
//! [`Value`] trees.
//!
//! Writers go the other way: [`ValueWrite`] exposes the six emission primitives and
//! derives [`ValueWrite::write_value`] from them.

use crate::{Error, Result, TdfMap, Value};

/// One lexical unit of either grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    ObjectStart,
    ObjectEnd,
    ObjectKey(String),
    ArrayStart,
    ArrayEnd,
    /// Any non-container value, including `Null` and `Binary`.
    Scalar(Value),
}

impl Token {
    /// Short description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Token::ObjectStart => "'{'".to_string(),
            Token::ObjectEnd => "'}'".to_string(),
            Token::ObjectKey(key) => format!("key '{key}'"),
            Token::ArrayStart => "'['".to_string(),
            Token::ArrayEnd => "']'".to_string(),
            Token::Scalar(value) => format!("{} value", value.kind()),
        }
    }
}

/// A pull-based source of [`Token`]s with tree-building helpers on top.
///
/// Every tree-building method is fatal-by-default: the first structural violation
/// aborts the whole call and discards anything built so far.
pub trait TokenRead {
    /// Returns the next token, or `None` at end of stream.
    fn next_token(&mut self) -> Result<Option<Token>>;

    /// Builds a parse error located at the reader's current position.
    fn error_here(&self, msg: &str) -> Error;

    /// Builds an end-of-stream error located at the reader's current position.
    fn eof_here(&self, expected: &str) -> Error;

    /// Reads one complete value.
    fn read_value(&mut self) -> Result<Value> {
        match self.next_token()? {
            Some(token) => self.read_value_from(token),
            None => Err(self.eof_here("a value")),
        }
    }

    /// Completes the value that `token` starts.
    fn read_value_from(&mut self, token: Token) -> Result<Value> {
        build_value(self, token, 0)
    }

    /// Reads an object, starting at its opening bracket.
    fn read_object(&mut self) -> Result<TdfMap> {
        match self.next_token()? {
            Some(Token::ObjectStart) => self.read_object_body(),
            Some(other) => Err(self.error_here(&format!(
                "expected '{{', found {}",
                other.describe()
            ))),
            None => Err(self.eof_here("'{'")),
        }
    }

    /// Reads object entries up to and including the closing bracket.
    ///
    /// Every token before the real `ObjectEnd` must be an `ObjectKey`, each followed by
    /// exactly one value.
    fn read_object_body(&mut self) -> Result<TdfMap> {
        build_object(self, 1)
    }

    /// Reads an array, starting at its opening bracket.
    fn read_array(&mut self) -> Result<Vec<Value>> {
        match self.next_token()? {
            Some(Token::ArrayStart) => self.read_array_body(),
            Some(other) => Err(self.error_here(&format!(
                "expected '[', found {}",
                other.describe()
            ))),
            None => Err(self.eof_here("'['")),
        }
    }

    /// Reads array elements up to and including the closing bracket.
    fn read_array_body(&mut self) -> Result<Vec<Value>> {
        build_array(self, 1)
    }

    /// Non-failing variant of [`TokenRead::read_object`].
    ///
    /// Returns `None` instead of an error; the reader position after a failure is
    /// unspecified.
    fn try_read_object(&mut self) -> Option<TdfMap> {
        match self.read_object() {
            Ok(map) => Some(map),
            Err(err) => {
                tracing::debug!(error = %err, "try_read_object failed");
                None
            }
        }
    }
}

/// Deepest container nesting the tree builders accept.
///
/// Deeper input fails with the reader's own error kind (`Syntax` for text, `Corrupt`
/// for binary) instead of exhausting the stack.
pub const MAX_DEPTH: usize = 128;

/// `depth` is the number of containers already open around `token`.
fn build_value<R: TokenRead + ?Sized>(reader: &mut R, token: Token, depth: usize) -> Result<Value> {
    match token {
        Token::ObjectStart => build_object(reader, enter(reader, depth)?).map(Value::Object),
        Token::ArrayStart => build_array(reader, enter(reader, depth)?).map(Value::Array),
        Token::Scalar(value) => Ok(value),
        other => Err(reader.error_here(&format!(
            "unexpected {} where a value was required",
            other.describe()
        ))),
    }
}

fn enter<R: TokenRead + ?Sized>(reader: &R, depth: usize) -> Result<usize> {
    if depth >= MAX_DEPTH {
        return Err(reader.error_here(&format!(
            "containers nested deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(depth + 1)
}

fn build_object<R: TokenRead + ?Sized>(reader: &mut R, depth: usize) -> Result<TdfMap> {
    let mut map = TdfMap::new();
    loop {
        match reader.next_token()? {
            Some(Token::ObjectEnd) => return Ok(map),
            Some(Token::ObjectKey(key)) => {
                let value = match reader.next_token()? {
                    Some(token) => build_value(reader, token, depth)?,
                    None => return Err(reader.eof_here("a value")),
                };
                map.insert(key, value);
            }
            Some(other) => {
                return Err(reader.error_here(&format!(
                    "expected object key, found {}",
                    other.describe()
                )))
            }
            None => return Err(reader.eof_here("'}'")),
        }
    }
}

fn build_array<R: TokenRead + ?Sized>(reader: &mut R, depth: usize) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    loop {
        match reader.next_token()? {
            Some(Token::ArrayEnd) => return Ok(items),
            Some(token) => items.push(build_value(reader, token, depth)?),
            None => return Err(reader.eof_here("']'")),
        }
    }
}

/// A sink for value trees, expressed as the six emission primitives of both grammars.
pub trait ValueWrite {
    fn begin_object(&mut self) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn write_key(&mut self, key: &str) -> Result<()>;
    fn begin_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;

    /// Writes any non-container value.
    fn write_scalar(&mut self, value: &Value) -> Result<()>;

    /// Writes a complete value tree, top-down.
    fn write_value(&mut self, value: &Value) -> Result<()> {
        write_tree(self, value)
    }
}

/// Depth-first emission of `value` through `writer`'s primitives.
pub(crate) fn write_tree<W: ValueWrite + ?Sized>(writer: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            writer.begin_object()?;
            for (key, child) in map {
                writer.write_key(key)?;
                writer.write_value(child)?;
            }
            writer.end_object()
        }
        Value::Array(items) => {
            writer.begin_array()?;
            for child in items {
                writer.write_value(child)?;
            }
            writer.end_array()
        }
        scalar => writer.write_scalar(scalar),
    }
}
