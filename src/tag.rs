//! Tag bytes of the TDF binary grammar.
//!
//! Every binary token starts with one tag byte. Tags `0..=5` are structural, tags from
//! `128` up carry a payload whose layout is fixed by the tag.

use crate::ValueKind;

/// One tag byte of the binary grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    ObjectStart = 1,
    ObjectEnd = 2,
    ObjectKey = 3,
    ArrayStart = 4,
    ArrayEnd = 5,
    Bool = 128,
    String = 129,
    Byte = 130,
    SByte = 131,
    Char = 132,
    Short = 133,
    UShort = 134,
    Int = 135,
    UInt = 136,
    Long = 137,
    ULong = 138,
    Float = 139,
    Double = 140,
    Decimal = 141,
    Binary = 255,
}

impl Tag {
    /// Parses a tag byte, returning `None` for unassigned values.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Tag::Null,
            1 => Tag::ObjectStart,
            2 => Tag::ObjectEnd,
            3 => Tag::ObjectKey,
            4 => Tag::ArrayStart,
            5 => Tag::ArrayEnd,
            128 => Tag::Bool,
            129 => Tag::String,
            130 => Tag::Byte,
            131 => Tag::SByte,
            132 => Tag::Char,
            133 => Tag::Short,
            134 => Tag::UShort,
            135 => Tag::Int,
            136 => Tag::UInt,
            137 => Tag::Long,
            138 => Tag::ULong,
            139 => Tag::Float,
            140 => Tag::Double,
            141 => Tag::Decimal,
            255 => Tag::Binary,
            _ => return None,
        })
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// The tag announcing a non-container value of `kind`.
    #[must_use]
    pub const fn for_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Null => Tag::Null,
            ValueKind::Bool => Tag::Bool,
            ValueKind::String => Tag::String,
            ValueKind::Byte => Tag::Byte,
            ValueKind::SByte => Tag::SByte,
            ValueKind::Char => Tag::Char,
            ValueKind::Short => Tag::Short,
            ValueKind::UShort => Tag::UShort,
            ValueKind::Int => Tag::Int,
            ValueKind::UInt => Tag::UInt,
            ValueKind::Long => Tag::Long,
            ValueKind::ULong => Tag::ULong,
            ValueKind::Float => Tag::Float,
            ValueKind::Double => Tag::Double,
            ValueKind::Decimal => Tag::Decimal,
            ValueKind::Binary => Tag::Binary,
            ValueKind::Object => Tag::ObjectStart,
            ValueKind::Array => Tag::ArrayStart,
        }
    }

    /// Returns `true` for `ObjectStart` and `ArrayStart`, which carry a length field.
    #[inline]
    #[must_use]
    pub const fn is_container_start(self) -> bool {
        matches!(self, Tag::ObjectStart | Tag::ArrayStart)
    }

    /// Size of the payload for fixed-width tags, `None` for length-prefixed ones.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::Null | Tag::ObjectEnd | Tag::ArrayEnd => Some(0),
            Tag::Bool | Tag::Byte | Tag::SByte => Some(1),
            Tag::Short | Tag::UShort => Some(2),
            Tag::Char | Tag::Int | Tag::UInt | Tag::Float => Some(4),
            Tag::Long | Tag::ULong | Tag::Double => Some(8),
            Tag::Decimal => Some(16),
            Tag::ObjectStart | Tag::ArrayStart => Some(4),
            Tag::ObjectKey | Tag::String | Tag::Binary => None,
        }
    }

    /// Get the tag name as a string (for error messages).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::ObjectStart => "object-start",
            Tag::ObjectEnd => "object-end",
            Tag::ObjectKey => "object-key",
            Tag::ArrayStart => "array-start",
            Tag::ArrayEnd => "array-end",
            Tag::Bool => "bool",
            Tag::String => "string",
            Tag::Byte => "byte",
            Tag::SByte => "sbyte",
            Tag::Char => "char",
            Tag::Short => "short",
            Tag::UShort => "ushort",
            Tag::Int => "int",
            Tag::UInt => "uint",
            Tag::Long => "long",
            Tag::ULong => "ulong",
            Tag::Float => "float",
            Tag::Double => "double",
            Tag::Decimal => "decimal",
            Tag::Binary => "binary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_byte_round_trips_or_is_unassigned() {
        for b in 0..=u8::MAX {
            if let Some(tag) = Tag::from_byte(b) {
                assert_eq!(tag.raw(), b);
            }
        }
        assert_eq!(Tag::from_byte(6), None);
        assert_eq!(Tag::from_byte(142), None);
    }

    #[test]
    fn test_numeric_tags_follow_kind_order() {
        let kinds = [
            ValueKind::Byte,
            ValueKind::SByte,
            ValueKind::Char,
            ValueKind::Short,
            ValueKind::UShort,
            ValueKind::Int,
            ValueKind::UInt,
            ValueKind::Long,
            ValueKind::ULong,
            ValueKind::Float,
            ValueKind::Double,
            ValueKind::Decimal,
        ];
        for (offset, kind) in kinds.into_iter().enumerate() {
            assert_eq!(usize::from(Tag::for_kind(kind).raw()), 130 + offset);
        }
    }
}
