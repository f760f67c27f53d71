//! # serde_tdf
//!
//! A typed, self-describing data format with two wire encodings and a reflective object
//! mapper.
//!
//! ## What is TDF?
//!
//! TDF documents are trees of [`Value`]s: objects with ordered string keys, arrays, and
//! scalars that keep their exact numeric kind. A `u8` stays a `Byte`, a `u64` a `ULong`,
//! a `Decimal` a `Decimal`. The same tree can be stored two ways:
//!
//! - **Text**: human-editable, with brace/bracket containers, `#` and `//` comments,
//!   quoted or bare strings, and numeric type suffixes (`3B`, `7L`, `2.5d`, `9.99m`).
//! - **Binary**: one tag byte per token, little-endian payloads, and a byte length on
//!   every container so readers can skip whole subtrees with one seek.
//!
//! ## Key Features
//!
//! - **Kind-exact numerics**: eleven numeric kinds plus `Decimal` survive both encodings
//! - **Lenient text reader**: `{ a: }` reads as `a -> null`; the root braces are optional
//! - **Skippable binary framing**: container lengths are backpatched as containers close
//! - **Serde compatible**: any `T: Serialize`/`Deserialize` converts to and from a [`Value`]
//! - **Polymorphic object mapping**: [`Mapper`] tags records whose runtime type differs
//!   from the static type at their position, and resolves the tag back on decode
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_tdf::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Monster {
//!     health: u8,
//!     name: String,
//! }
//!
//! let slime = Monster { health: 3, name: "Slime".to_string() };
//!
//! let text = to_string(&slime).unwrap();
//! assert_eq!(text, "health: 3B\nname: 'Slime'");
//!
//! let back: Monster = from_str(&text).unwrap();
//! assert_eq!(slime, back);
//! ```
//!
//! ### Binary Encoding
//!
//! ```rust
//! use serde_tdf::{from_slice, to_vec};
//!
//! let scores = vec![10u16, 20, 30];
//! let bytes = to_vec(&scores).unwrap();
//! let back: Vec<u16> = from_slice(&bytes).unwrap();
//! assert_eq!(scores, back);
//! ```
//!
//! ### Dynamic Values with the tdf! Macro
//!
//! ```rust
//! use serde_tdf::{tdf, Value};
//!
//! let data = tdf!({
//!     "name": "Slime",
//!     "health": (3u8),
//!     "tags": ["blue", "small"]
//! });
//!
//! if let Value::Object(obj) = data {
//!     assert_eq!(obj.get("health"), Some(&Value::Byte(3)));
//! }
//! ```
//!
//! ### Polymorphic Object Mapping
//!
//! ```rust
//! use serde_tdf::{reflect_record, Mapper, Reflect, TypeRegistry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Slime { health: u8 }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct KingSlime { health: u8, crown: String }
//!
//! #[derive(Default)]
//! struct Cave { boss: Option<Box<dyn Reflect>> }
//!
//! reflect_record!(Slime in "game" { health: u8 });
//! reflect_record!(KingSlime in "game" { health: u8, crown: String });
//! reflect_record!(Cave in "game" { boss: Option<Box<dyn Reflect>> as Slime });
//!
//! let mapper = Mapper::new()
//!     .with_type_resolver(TypeRegistry::new().with::<Slime>().with::<KingSlime>());
//!
//! let cave = Cave {
//!     boss: Some(Box::new(KingSlime { health: 30, crown: "gold".to_string() })),
//! };
//! let value = mapper.encode_as(&cave).unwrap();
//! let back: Cave = mapper.decode_as(&value).unwrap();
//! assert!(back.boss.unwrap().is::<KingSlime>());
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Binary lengths are validated against the remaining stream before use
//! - Proper error propagation with `Result` types
//! - No panics in public API (except for logic errors that indicate bugs)
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - serde types to text and back
//! - **`dynamic_values.rs`** - building and inspecting [`Value`] trees
//! - **`binary_framing.rs`** - the binary encoding and skipping containers
//! - **`polymorphic_mapper.rs`** - the object mapper with a type registry
//!
//! Run any example with: `cargo run --example <name>`

#[macro_use]
mod macros;

pub mod binary_reader;
pub mod binary_writer;
pub mod de;
pub mod error;
pub mod map;
pub mod mapper;
pub mod options;
pub mod reflect;
pub mod registry;
pub mod ser;
pub mod tag;
pub mod text_reader;
pub mod text_writer;
pub mod token;
pub mod value;

pub use binary_reader::BinaryReader;
pub use binary_writer::BinaryWriter;
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use map::{TdfMap, TYPE_TAG_PREFIX};
pub use mapper::{DeclaredMembers, LogUnused, Mapper, MemberEnumerator, UnusedValueReporter};
pub use options::TextOptions;
pub use reflect::{FromReflect, Member, Reflect, ReflectRef, TypeInfo, TypeKind, Typed};
pub use registry::{TypeRegistry, TypeResolver};
pub use ser::{to_value, ValueSerializer};
pub use tag::Tag;
pub use text_reader::TextReader;
pub use text_writer::TextWriter;
pub use token::{Token, TokenRead, ValueWrite, MAX_DEPTH};
pub use value::{Value, ValueKind};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to TDF text with the default options.
///
/// The root object is written braceless, one `key: value` entry per line.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "x: 1\ny: 2");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized (e.g., non-string map keys).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &TextOptions::default())
}

/// Serialize any `T: Serialize` to TDF text with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{to_string_with_options, TextOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let options = TextOptions::new().with_braced_root(true).with_indent("  ");
/// let text = to_string_with_options(&Point { x: 1, y: 2 }, &options).unwrap();
/// assert_eq!(text, "{\n  x: 1\n  y: 2\n}");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &TextOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    text_writer::write_string(&to_value(value)?, options)
}

/// Serialize any `T: Serialize` to a writer as TDF text.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1, 2]).unwrap();
/// assert_eq!(buffer, b"[\n\t1\n\t2\n]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    text_writer::write_to(writer, &to_value(value)?, &TextOptions::default())?;
    Ok(())
}

/// Deserialize an instance of type `T` from TDF text.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x: 1  # comment\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TDF text or cannot be deserialized to type
/// `T`. Parse errors include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(text_reader::parse(s)?)
}

/// Deserialize an instance of type `T` from an I/O stream of TDF text.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"{ x: 1, y: 2 }")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid TDF text,
/// or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_value(text_reader::parse_reader(reader)?)
}

/// Serialize any `T: Serialize` to a TDF binary document.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or a payload exceeds its
/// length field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    binary_writer::encode(&to_value(value)?)
}

/// Deserialize an instance of type `T` from a TDF binary document.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::from_slice;
///
/// // Int tag, then 7 as a little-endian i32
/// let n: i32 = from_slice(&[135, 7, 0, 0, 0]).unwrap();
/// assert_eq!(n, 7);
/// ```
///
/// # Errors
///
/// Returns [`Error::Corrupt`] if the framing does not fit the bytes, or an error if the
/// data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(binary_reader::decode(bytes)?)
}
