//! Dynamic value representation for TDF data.
//!
//! This module provides the [`Value`] enum, the in-memory tree shared by the text codec,
//! the binary codec and the object mapper. Every value has exactly one kind, fixed at
//! construction; reading it "as" another kind goes through the coercion accessors.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, string, eleven numeric kinds, binary, object, array
//! - [`ValueKind`]: the payload-free discriminant of a [`Value`]
//!
//! ## Strict vs. coercing access
//!
//! ```rust
//! use serde_tdf::Value;
//!
//! let value = Value::from(300i32);
//!
//! // Strict: borrow only when the kind matches
//! assert_eq!(value.as_str(), None);
//!
//! // Coercing: always answers, converting numerics and parsing strings
//! assert_eq!(value.to_i64(), 300);
//! assert_eq!(value.to_u8(), 44); // narrowing keeps the low bits
//! assert_eq!(Value::from("17").to_i32(), 17);
//! assert_eq!(Value::from("nope").to_i32(), 0);
//! assert_eq!(Value::Null.to_f64(), 0.0);
//! ```

use base64::Engine;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TdfMap;

/// A dynamically-typed representation of any TDF value.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{Value, ValueKind};
///
/// let health = Value::Byte(3);
/// assert_eq!(health.kind(), ValueKind::Byte);
/// assert!(health.is_number());
/// assert_eq!(health.to_i32(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    String(String),
    Byte(u8),
    SByte(i8),
    Char(char),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Binary(Vec<u8>),
    Object(TdfMap),
    Array(Vec<Value>),
}

/// The kind of a [`Value`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    String,
    Byte,
    SByte,
    Char,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    Binary,
    Object,
    Array,
}

impl ValueKind {
    /// Returns `true` for the eleven numeric kinds (including the character code).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Byte
                | ValueKind::SByte
                | ValueKind::Char
                | ValueKind::Short
                | ValueKind::UShort
                | ValueKind::Int
                | ValueKind::UInt
                | ValueKind::Long
                | ValueKind::ULong
                | ValueKind::Float
                | ValueKind::Double
                | ValueKind::Decimal
        )
    }

    /// Get the kind name as a string (for error messages).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::Byte => "byte",
            ValueKind::SByte => "sbyte",
            ValueKind::Char => "char",
            ValueKind::Short => "short",
            ValueKind::UShort => "ushort",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Long => "long",
            ValueKind::ULong => "ulong",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Decimal => "decimal",
            ValueKind::Binary => "binary",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Intermediate numeric form used by the coercion accessors.
enum Numeric {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Numeric {
    fn parse(text: &str) -> Option<Numeric> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i128>() {
            Some(Numeric::Int(i))
        } else if let Ok(d) = Decimal::from_str(text) {
            Some(Numeric::Decimal(d))
        } else {
            text.parse::<f64>().ok().map(Numeric::Float)
        }
    }
}

macro_rules! int_coercion {
    ($(#[$doc:meta])* $name:ident => $t:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name(&self) -> $t {
            match self.numeric() {
                Some(Numeric::Int(i)) => i as $t,
                Some(Numeric::Float(f)) => f as $t,
                Some(Numeric::Decimal(d)) => d.trunc().to_i128().map_or(0, |i| i as $t),
                None => 0,
            }
        }
    };
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Byte(_) => ValueKind::Byte,
            Value::SByte(_) => ValueKind::SByte,
            Value::Char(_) => ValueKind::Char,
            Value::Short(_) => ValueKind::Short,
            Value::UShort(_) => ValueKind::UShort,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Long(_) => ValueKind::Long,
            Value::ULong(_) => ValueKind::ULong,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Binary(_) => ValueKind::Binary,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
        }
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is any of the numeric kinds.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        self.kind().is_numeric()
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is a binary payload.
    #[inline]
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is an object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::from(42).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is binary, returns a reference to its bytes. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is an object, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&TdfMap> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Byte(v) => Some(Numeric::Int(i128::from(*v))),
            Value::SByte(v) => Some(Numeric::Int(i128::from(*v))),
            Value::Char(c) => Some(Numeric::Int(i128::from(u32::from(*c)))),
            Value::Short(v) => Some(Numeric::Int(i128::from(*v))),
            Value::UShort(v) => Some(Numeric::Int(i128::from(*v))),
            Value::Int(v) => Some(Numeric::Int(i128::from(*v))),
            Value::UInt(v) => Some(Numeric::Int(i128::from(*v))),
            Value::Long(v) => Some(Numeric::Int(i128::from(*v))),
            Value::ULong(v) => Some(Numeric::Int(i128::from(*v))),
            Value::Float(v) => Some(Numeric::Float(f64::from(*v))),
            Value::Double(v) => Some(Numeric::Float(*v)),
            Value::Decimal(d) => Some(Numeric::Decimal(*d)),
            Value::String(s) => Numeric::parse(s),
            _ => None,
        }
    }

    int_coercion!(
        /// Reads the value as a `u8`, converting numerics and parsing strings.
        to_u8 => u8
    );
    int_coercion!(
        /// Reads the value as an `i8`, converting numerics and parsing strings.
        to_i8 => i8
    );
    int_coercion!(
        /// Reads the value as an `i16`, converting numerics and parsing strings.
        to_i16 => i16
    );
    int_coercion!(
        /// Reads the value as a `u16`, converting numerics and parsing strings.
        to_u16 => u16
    );
    int_coercion!(
        /// Reads the value as an `i32`, converting numerics and parsing strings.
        to_i32 => i32
    );
    int_coercion!(
        /// Reads the value as a `u32`, converting numerics and parsing strings.
        to_u32 => u32
    );
    int_coercion!(
        /// Reads the value as an `i64`, converting numerics and parsing strings.
        to_i64 => i64
    );
    int_coercion!(
        /// Reads the value as a `u64`, converting numerics and parsing strings.
        to_u64 => u64
    );

    /// Reads the value as an `f64`, converting numerics and parsing strings.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self.numeric() {
            Some(Numeric::Int(i)) => i as f64,
            Some(Numeric::Float(f)) => f,
            Some(Numeric::Decimal(d)) => d.to_f64().unwrap_or_default(),
            None => 0.0,
        }
    }

    /// Reads the value as an `f32`, converting numerics and parsing strings.
    #[must_use]
    pub fn to_f32(&self) -> f32 {
        match self {
            Value::Float(f) => *f,
            _ => self.to_f64() as f32,
        }
    }

    /// Reads the value as a [`Decimal`], converting numerics and parsing strings.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        match self.numeric() {
            Some(Numeric::Int(i)) => Decimal::from_i128(i).unwrap_or_default(),
            Some(Numeric::Float(f)) => Decimal::from_f64(f).unwrap_or_default(),
            Some(Numeric::Decimal(d)) => d,
            None => Decimal::ZERO,
        }
    }

    /// Reads the value as a character code.
    ///
    /// A single-character string yields that character; numerics are read as a code point.
    /// Anything that is not a valid code point yields `'\0'`.
    #[must_use]
    pub fn to_char(&self) -> char {
        match self {
            Value::Char(c) => *c,
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => char::from_u32(self.to_u32()).unwrap_or('\0'),
                }
            }
            _ => char::from_u32(self.to_u32()).unwrap_or('\0'),
        }
    }

    /// Reads the value as a boolean.
    ///
    /// Numerics are `true` when non-zero; strings parse `true`/`false` case-insensitively.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => match self.numeric() {
                Some(Numeric::Int(i)) => i != 0,
                Some(Numeric::Float(f)) => f != 0.0,
                Some(Numeric::Decimal(d)) => !d.is_zero(),
                None => false,
            },
        }
    }

    /// Reads the value as text.
    ///
    /// Strings are returned as-is and numerics in their plain decimal form. Every other
    /// kind yields the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Byte(v) => v.to_string(),
            Value::SByte(v) => v.to_string(),
            Value::Char(c) => c.to_string(),
            Value::Short(v) => v.to_string(),
            Value::UShort(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::ULong(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(d) => d.to_string(),
            _ => String::new(),
        }
    }

    /// Reads the value as raw bytes; strings are decoded as base64 when possible.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Binary(b) => b.clone(),
            Value::String(s) => base64::engine::general_purpose::STANDARD
                .decode(s.trim())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::text_writer::write_inline(self, f)
    }
}

/// Newtype name that marks a decimal's text so [`ValueSerializer`](crate::ser::ValueSerializer)
/// can rebuild a `Decimal`. Other serializers see a plain string.
pub(crate) const DECIMAL_TOKEN: &str = "$serde_tdf::private::Decimal";

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Byte(v) => serializer.serialize_u8(*v),
            Value::SByte(v) => serializer.serialize_i8(*v),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Short(v) => serializer.serialize_i16(*v),
            Value::UShort(v) => serializer.serialize_u16(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::UInt(v) => serializer.serialize_u32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::ULong(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Decimal(d) => serializer.serialize_newtype_struct(DECIMAL_TOKEN, &d.to_string()),
            Value::Binary(b) => serializer.serialize_bytes(b),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid TDF value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i8<E>(self, value: i8) -> Result<Value, E> {
                Ok(Value::SByte(value))
            }

            fn visit_i16<E>(self, value: i16) -> Result<Value, E> {
                Ok(Value::Short(value))
            }

            fn visit_i32<E>(self, value: i32) -> Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Long(value))
            }

            fn visit_u8<E>(self, value: u8) -> Result<Value, E> {
                Ok(Value::Byte(value))
            }

            fn visit_u16<E>(self, value: u16) -> Result<Value, E> {
                Ok(Value::UShort(value))
            }

            fn visit_u32<E>(self, value: u32) -> Result<Value, E> {
                Ok(Value::UInt(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
                Ok(Value::ULong(value))
            }

            fn visit_f32<E>(self, value: f32) -> Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Double(value))
            }

            fn visit_char<E>(self, value: char) -> Result<Value, E> {
                Ok(Value::Char(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = TdfMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        if value.is_number() {
            Ok(value.to_i64())
        } else {
            Err(crate::Error::type_mismatch("integer", value.kind().name()))
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        if value.is_number() {
            Ok(value.to_f64())
        } else {
            Err(crate::Error::type_mismatch("number", value.kind().name()))
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("bool", other.kind().name())),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("string", other.kind().name())),
        }
    }
}

macro_rules! from_payload {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

from_payload! {
    bool => Bool,
    String => String,
    u8 => Byte,
    i8 => SByte,
    char => Char,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    Vec<Value> => Array,
    TdfMap => Object,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
