//! TDF binary reader.
//!
//! [`BinaryReader`] mirrors [`BinaryWriter`](crate::binary_writer::BinaryWriter): it
//! yields one [`Token`] per tag and builds value trees through the shared
//! [`TokenRead`] helpers. Every length read from the stream is checked against the
//! bytes that remain, so a damaged document fails with [`Error::Corrupt`] instead of
//! over-allocating or reading past the end.
//!
//! Containers can be stepped over without decoding them:
//!
//! ```rust
//! use std::io::Cursor;
//! use serde_tdf::{binary_reader::BinaryReader, binary_writer, tdf, TokenRead, Value};
//!
//! let bytes = binary_writer::encode(&tdf!([{ "big": [1, 2, 3] }, 7])).unwrap();
//! let mut reader = BinaryReader::new(Cursor::new(bytes)).unwrap();
//!
//! reader.next_token().unwrap(); // '['
//! reader.skip_value().unwrap(); // the whole object
//! assert_eq!(reader.read_value().unwrap(), Value::Int(7));
//! ```

use rust_decimal::Decimal;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::tag::Tag;
use crate::token::{Token, TokenRead};
use crate::{Error, Result, Value};

/// The TDF binary tokenizer.
pub struct BinaryReader<R: Read + Seek> {
    input: R,
    /// Absolute stream offset of the next unread byte.
    offset: u64,
    /// Absolute stream offset of the end of the stream.
    end: u64,
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Creates a reader starting at the stream's current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be measured.
    pub fn new(mut input: R) -> Result<Self> {
        let offset = input.stream_position()?;
        let end = input.seek(SeekFrom::End(0))?;
        input.seek(SeekFrom::Start(offset))?;
        Ok(BinaryReader { input, offset, end })
    }

    /// Absolute offset of the next unread byte.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes left before the end of the stream.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.offset)
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    fn ensure(&self, needed: u64, what: &str) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::corrupt(
                self.offset,
                &format!(
                    "{what} needs {needed} bytes but only {} remain",
                    self.remaining()
                ),
            ));
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        self.ensure(N as u64, what)?;
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        self.offset += N as u64;
        Ok(buf)
    }

    fn read_vec(&mut self, len: u64, what: &str) -> Result<Vec<u8>> {
        self.ensure(len, what)?;
        let len = usize::try_from(len).map_err(|_| Error::corrupt(self.offset, "length overflow"))?;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        self.offset += len as u64;
        Ok(buf)
    }

    fn skip_bytes(&mut self, len: u64, what: &str) -> Result<()> {
        self.ensure(len, what)?;
        let delta = i64::try_from(len).map_err(|_| Error::corrupt(self.offset, "length overflow"))?;
        self.input.seek(SeekFrom::Current(delta))?;
        self.offset += len;
        Ok(())
    }

    fn read_varint(&mut self) -> Result<u64> {
        let start = self.offset;
        let mut result = 0u64;
        for shift in (0..64).step_by(7) {
            let [byte] = self.read_array::<1>("length prefix")?;
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::corrupt(start, "length prefix longer than 10 bytes"))
    }

    fn read_text(&mut self, what: &str) -> Result<String> {
        let start = self.offset;
        let len = self.read_varint()?;
        let bytes = self.read_vec(len, what)?;
        String::from_utf8(bytes).map_err(|_| Error::corrupt(start, &format!("{what} is not UTF-8")))
    }

    fn read_binary_len(&mut self) -> Result<u64> {
        let start = self.offset;
        let len = i32::from_le_bytes(self.read_array("binary length")?);
        u64::try_from(len)
            .map_err(|_| Error::corrupt(start, &format!("negative binary length {len}")))
    }

    /// Reads the next tag byte, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] for an unassigned tag byte.
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let at = self.offset;
        let [byte] = self.read_array::<1>("tag")?;
        Tag::from_byte(byte)
            .map(Some)
            .ok_or_else(|| Error::corrupt(at, &format!("unknown tag byte {byte}")))
    }

    /// Reads the length field that follows a container start tag.
    ///
    /// Seeking forward by the returned amount lands on the container's end tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] if the contents and end tag would not fit in the stream.
    pub fn read_container_length(&mut self) -> Result<u32> {
        let length = u32::from_le_bytes(self.read_array("container length")?);
        self.ensure(u64::from(length) + 1, "container")?;
        Ok(length)
    }

    fn read_payload(&mut self, tag: Tag) -> Result<Value> {
        let at = self.offset;
        let value = match tag {
            Tag::Null => Value::Null,
            Tag::Bool => {
                let [b] = self.read_array::<1>("bool")?;
                Value::Bool(b != 0)
            }
            Tag::String => Value::String(self.read_text("string")?),
            Tag::Byte => Value::Byte(u8::from_le_bytes(self.read_array("byte")?)),
            Tag::SByte => Value::SByte(i8::from_le_bytes(self.read_array("sbyte")?)),
            Tag::Char => {
                let code = u32::from_le_bytes(self.read_array("char")?);
                Value::Char(char::from_u32(code).ok_or_else(|| {
                    Error::corrupt(at, &format!("invalid character code {code:#x}"))
                })?)
            }
            Tag::Short => Value::Short(i16::from_le_bytes(self.read_array("short")?)),
            Tag::UShort => Value::UShort(u16::from_le_bytes(self.read_array("ushort")?)),
            Tag::Int => Value::Int(i32::from_le_bytes(self.read_array("int")?)),
            Tag::UInt => Value::UInt(u32::from_le_bytes(self.read_array("uint")?)),
            Tag::Long => Value::Long(i64::from_le_bytes(self.read_array("long")?)),
            Tag::ULong => Value::ULong(u64::from_le_bytes(self.read_array("ulong")?)),
            Tag::Float => Value::Float(f32::from_le_bytes(self.read_array("float")?)),
            Tag::Double => Value::Double(f64::from_le_bytes(self.read_array("double")?)),
            Tag::Decimal => Value::Decimal(Decimal::deserialize(self.read_array("decimal")?)),
            Tag::Binary => {
                let len = self.read_binary_len()?;
                Value::Binary(self.read_vec(len, "binary payload")?)
            }
            structural => {
                return Err(Error::corrupt(
                    at,
                    &format!("{} tag carries no scalar payload", structural.name()),
                ))
            }
        };
        Ok(value)
    }

    /// Steps over one complete value without building it.
    ///
    /// Containers are skipped by seeking over their recorded length, then consuming the
    /// end tag. When positioned on an object key, the key and its value are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] if the framing does not fit the stream or a container
    /// length does not land on the matching end tag.
    pub fn skip_value(&mut self) -> Result<()> {
        let at = self.offset;
        let tag = self
            .read_tag()?
            .ok_or_else(|| self.eof_here("a value to skip"))?;
        match tag {
            Tag::ObjectStart | Tag::ArrayStart => {
                let length = self.read_container_length()?;
                tracing::trace!(offset = at, length, "skipping container");
                self.skip_bytes(u64::from(length), "container")?;
                let end_at = self.offset;
                let expected = if tag == Tag::ObjectStart {
                    Tag::ObjectEnd
                } else {
                    Tag::ArrayEnd
                };
                match self.read_tag()? {
                    Some(end) if end == expected => Ok(()),
                    _ => Err(Error::corrupt(
                        end_at,
                        &format!("{} length does not land on its end tag", tag.name()),
                    )),
                }
            }
            Tag::ObjectKey => {
                let len = self.read_varint()?;
                self.skip_bytes(len, "object key")?;
                self.skip_value()
            }
            Tag::String => {
                let len = self.read_varint()?;
                self.skip_bytes(len, "string")
            }
            Tag::Binary => {
                let len = self.read_binary_len()?;
                self.skip_bytes(len, "binary payload")
            }
            Tag::ObjectEnd | Tag::ArrayEnd => Err(Error::corrupt(
                at,
                &format!("{} where a value was expected", tag.name()),
            )),
            fixed => {
                let width = fixed.fixed_width().unwrap_or(0);
                self.skip_bytes(width as u64, fixed.name())
            }
        }
    }

    /// Reads exactly one value and requires the stream to end after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] for malformed framing or trailing bytes.
    pub fn read_document(&mut self) -> Result<Value> {
        let value = self.read_value()?;
        if self.remaining() > 0 {
            return Err(Error::corrupt(
                self.offset,
                &format!("{} trailing bytes after the document", self.remaining()),
            ));
        }
        Ok(value)
    }
}

impl<R: Read + Seek> TokenRead for BinaryReader<R> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(tag) = self.read_tag()? else {
            return Ok(None);
        };
        let token = match tag {
            Tag::ObjectStart => {
                self.read_container_length()?;
                Token::ObjectStart
            }
            Tag::ArrayStart => {
                self.read_container_length()?;
                Token::ArrayStart
            }
            Tag::ObjectEnd => Token::ObjectEnd,
            Tag::ArrayEnd => Token::ArrayEnd,
            Tag::ObjectKey => Token::ObjectKey(self.read_text("object key")?),
            scalar => Token::Scalar(self.read_payload(scalar)?),
        };
        Ok(Some(token))
    }

    fn error_here(&self, msg: &str) -> Error {
        Error::corrupt(self.offset, msg)
    }

    fn eof_here(&self, expected: &str) -> Error {
        Error::corrupt(
            self.offset,
            &format!("unexpected end of stream, expected {expected}"),
        )
    }
}

/// Decodes a complete binary document.
///
/// # Errors
///
/// Returns [`Error::Corrupt`] if the bytes are not a well-formed document.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    BinaryReader::new(Cursor::new(bytes))?.read_document()
}
