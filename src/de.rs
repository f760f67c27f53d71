//! Serde deserialization from the TDF value tree.
//!
//! [`ValueDeserializer`] drives any `Deserialize` type from an owned [`Value`]. Numeric
//! kinds are offered to the visitor at their own width; serde's primitive visitors
//! then range-check them into the target type, so a field declared `u16` accepts a text
//! literal that was inferred as `Int`.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_tdf::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Monster { health: u8, name: String }
//!
//! let slime: Monster = from_str("health: 3B\nname: 'Slime'").unwrap();
//! assert_eq!(slime, Monster { health: 3, name: "Slime".into() });
//! ```

use crate::{Error, Result, TdfMap, Value};
use serde::de::{self, DeserializeOwned, IntoDeserializer};

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

/// Numeric targets accept decimals through the coercion accessors, and strings that
/// parse as the target type (object keys arrive as strings).
macro_rules! deserialize_number {
    ($($method:ident => $visit:ident($t:ty, $accessor:ident)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match &self.value {
                    Value::Decimal(_) => visitor.$visit(self.value.$accessor()),
                    Value::String(s) => match s.trim().parse::<$t>() {
                        Ok(n) => visitor.$visit(n),
                        Err(_) => self.deserialize_any(visitor),
                    },
                    _ => self.deserialize_any(visitor),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::String(s) => visitor.visit_string(s),
            Value::Byte(n) => visitor.visit_u8(n),
            Value::SByte(n) => visitor.visit_i8(n),
            Value::Char(c) => visitor.visit_char(c),
            Value::Short(n) => visitor.visit_i16(n),
            Value::UShort(n) => visitor.visit_u16(n),
            Value::Int(n) => visitor.visit_i32(n),
            Value::UInt(n) => visitor.visit_u32(n),
            Value::Long(n) => visitor.visit_i64(n),
            Value::ULong(n) => visitor.visit_u64(n),
            Value::Float(f) => visitor.visit_f32(f),
            Value::Double(f) => visitor.visit_f64(f),
            Value::Decimal(d) => visitor.visit_string(d.to_string()),
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8(i8, to_i8),
        deserialize_i16 => visit_i16(i16, to_i16),
        deserialize_i32 => visit_i32(i32, to_i32),
        deserialize_i64 => visit_i64(i64, to_i64),
        deserialize_u8 => visit_u8(u8, to_u8),
        deserialize_u16 => visit_u16(u16, to_u16),
        deserialize_u32 => visit_u32(u32, to_u32),
        deserialize_u64 => visit_u64(u64, to_u64),
        deserialize_f32 => visit_f32(f32, to_f32),
        deserialize_f64 => visit_f64(f64, to_f64),
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &self.value {
            Value::String(s) if s.eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => visitor.visit_bool(false),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(_) => visitor.visit_byte_buf(self.value.to_bytes()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) => {
                let mut entries = obj.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    _ => Err(Error::custom(
                        "expected an object with exactly one entry for an enum variant",
                    )),
                }
            }
            other => Err(Error::type_mismatch("enum", other.kind().name())),
        }
    }

    serde::forward_to_deserialize_any! {
        i128 u128 char str string unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: TdfMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(Error::type_mismatch("unit variant", other.kind().name())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            other => Err(Error::type_mismatch("tuple variant", other.kind().name())),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
            other => Err(Error::type_mismatch("struct variant", other.kind().name())),
        }
    }
}

/// Converts a [`Value`] into any `Deserialize` type.
///
/// # Errors
///
/// Returns an error if the value's shape does not fit `T`.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{from_value, Value};
///
/// let n: u16 = from_value(Value::Int(300)).unwrap();
/// assert_eq!(n, 300);
/// assert!(from_value::<u8>(Value::Int(300)).is_err());
/// ```
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}
