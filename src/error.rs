//! Error types for TDF reading, writing and object mapping.
//!
//! A single [`Error`] enum covers every layer of the crate so that callers can
//! propagate failures with `?` regardless of which codec or mapper produced them.
//!
//! ## Error Categories
//!
//! - **Parse errors**: the text reader met a token it cannot accept at that position
//!   ([`Error::Syntax`], [`Error::EmptyKey`], [`Error::UnexpectedEof`])
//! - **Corruption errors**: the binary reader found framing that does not fit the stream
//!   ([`Error::Corrupt`])
//! - **Type-resolution errors**: a polymorphism tag names a module or type the resolver
//!   does not know ([`Error::UnknownModule`], [`Error::UnknownType`])
//! - **Structural errors**: the mapper has no type to build for an array or untagged object
//!   ([`Error::MissingImpliedType`], [`Error::NotConstructible`])
//!
//! Schema drift (a key with no matching member) is not an error; it is routed to the
//! mapper's unused-value reporter instead.
//!
//! ## Examples
//!
//! ```rust
//! use serde_tdf::{text_reader, Error};
//!
//! let result = text_reader::parse("{ a: 1, 2 }");
//! assert!(matches!(result, Err(Error::Syntax { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while reading, writing or mapping TDF data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Text grammar violation
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// An object key was present but empty
    #[error("Empty object key at line {line}, column {col}")]
    EmptyKey { line: usize, col: usize },

    /// Unexpected end of input inside a container
    #[error("Unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// Binary framing does not fit the stream
    #[error("Corrupt binary data at offset {offset}: {msg}")]
    Corrupt { offset: u64, msg: String },

    /// Container end without a matching start, or a writer finished with open containers
    #[error("Unbalanced container: {0}")]
    UnbalancedContainer(String),

    /// Polymorphism tag names an unregistered module
    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    /// Polymorphism tag names an unregistered type
    #[error("Unknown type '{name}' in module '{module}'")]
    UnknownType { module: String, name: String },

    /// An array or untagged object was decoded without an implied type
    #[error("No implied type available to decode {0}")]
    MissingImpliedType(&'static str),

    /// The target type cannot be instantiated from this kind of value
    #[error("Type '{0}' cannot be constructed here")]
    NotConstructible(String),

    /// A decoded value does not fit the member it is assigned to
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::Error;
    ///
    /// let err = Error::syntax(10, 5, "expected object key");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    /// Creates a corruption error for the binary reader.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::Error;
    ///
    /// let err = Error::corrupt(12, "length exceeds remaining bytes");
    /// assert!(err.to_string().contains("offset 12"));
    /// ```
    pub fn corrupt(offset: u64, msg: &str) -> Self {
        Error::Corrupt {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the errors that abort a decode because a type could not be resolved.
    #[must_use]
    pub fn is_type_resolution(&self) -> bool {
        matches!(self, Error::UnknownModule(_) | Error::UnknownType { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_resolution_classification() {
        assert!(Error::UnknownModule("game".into()).is_type_resolution());
        assert!(Error::UnknownType {
            module: "game".into(),
            name: "game::Slime".into()
        }
        .is_type_resolution());
        assert!(!Error::MissingImpliedType("array").is_type_resolution());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("disk gone")));
    }
}
