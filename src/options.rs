//! Configuration options for the TDF text writer.
//!
//! ## Examples
//!
//! ```rust
//! use serde_tdf::{tdf, text_writer, TextOptions};
//!
//! let value = tdf!({ "health": (3u8), "name": "Slime" });
//!
//! let options = TextOptions::new().with_newline("\n").with_indent("\t");
//! let text = text_writer::write_string(&value, &options).unwrap();
//! assert_eq!(text, "health: 3B\nname: 'Slime'");
//! ```

/// Configuration options for TDF text output.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::TextOptions;
///
/// // Default: "\n" newlines, tab indentation, braceless root object
/// let options = TextOptions::new();
/// assert_eq!(options.newline, "\n");
/// assert_eq!(options.indent, "\t");
///
/// // Windows line endings, two-space indentation
/// let options = TextOptions::new().with_newline("\r\n").with_indent("  ");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub newline: String,
    pub indent: String,
    /// Write a root object inside `{ }` instead of as bare top-level entries.
    pub braced_root: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            newline: "\n".to_string(),
            indent: "\t".to_string(),
            braced_root: false,
        }
    }
}

impl TextOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the string written between lines.
    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// Sets the string written once per nesting level at the start of a line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::TextOptions;
    ///
    /// let options = TextOptions::new().with_indent("    ");
    /// assert_eq!(options.indent.len(), 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Chooses whether a root object keeps its braces.
    #[must_use]
    pub fn with_braced_root(mut self, braced_root: bool) -> Self {
        self.braced_root = braced_root;
        self
    }
}
