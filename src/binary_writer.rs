//! TDF binary writer.
//!
//! Every token is one [`Tag`] byte followed by its payload, little-endian throughout:
//!
//! | Tag                          | Payload                                   |
//! |------------------------------|-------------------------------------------|
//! | `ObjectStart`, `ArrayStart`  | `u32` byte length of the contents         |
//! | `ObjectKey`, `String`        | LEB128 byte length, then UTF-8 bytes      |
//! | `Binary`                     | `i32` byte length, then raw bytes         |
//! | `Char`                       | `u32` code point                          |
//! | `Decimal`                    | 16-byte packed decimal                    |
//! | other numerics, `Bool`       | fixed-width native representation         |
//!
//! Container lengths are not known up front. The writer reserves four zero bytes after
//! each start tag and backpatches them when the container closes, just before the end
//! tag is written, so that seeking forward by the length from the end of the length
//! field lands exactly on the end tag.

use std::io::{Cursor, Seek, SeekFrom, Write};

use crate::tag::Tag;
use crate::token::{write_tree, ValueWrite};
use crate::{Error, Result, Value};

/// The TDF binary writer.
///
/// Needs a seekable sink for the length backpatching.
pub struct BinaryWriter<W: Write + Seek> {
    out: W,
    /// Start tag and length-field position of every open container, innermost last.
    open: Vec<(Tag, u64)>,
}

impl<W: Write + Seek> BinaryWriter<W> {
    pub fn new(out: W) -> Self {
        BinaryWriter {
            out,
            open: Vec::new(),
        }
    }

    /// Number of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Checks that every container was closed and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnbalancedContainer`] if a container is still open.
    pub fn finish(mut self) -> Result<W> {
        if let Some((tag, _)) = self.open.last() {
            return Err(Error::UnbalancedContainer(format!(
                "{} still open at end of stream",
                tag.name()
            )));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.out.write_all(&[tag.raw()])?;
        Ok(())
    }

    fn write_varint(&mut self, mut n: u64) -> Result<()> {
        let mut buf = [0u8; 10];
        let mut i = 0;
        loop {
            let byte = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                buf[i] = byte;
                i += 1;
                break;
            }
            buf[i] = byte | 0x80;
            i += 1;
        }
        self.out.write_all(&buf[..i])?;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.write_varint(text.len() as u64)?;
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn begin_container(&mut self, tag: Tag) -> Result<()> {
        self.write_tag(tag)?;
        let position = self.out.stream_position()?;
        self.out.write_all(&[0; 4])?;
        self.open.push((tag, position));
        Ok(())
    }

    fn end_container(&mut self, start: Tag, end: Tag) -> Result<()> {
        let position = match self.open.last() {
            Some(&(tag, position)) if tag == start => position,
            Some(&(tag, _)) => {
                return Err(Error::UnbalancedContainer(format!(
                    "{} does not close the open {}",
                    end.name(),
                    tag.name()
                )))
            }
            None => {
                return Err(Error::UnbalancedContainer(format!(
                    "{} without a matching {}",
                    end.name(),
                    start.name()
                )))
            }
        };
        self.open.pop();

        let current = self.out.stream_position()?;
        let length = u32::try_from(current - position - 4).map_err(|_| {
            Error::custom(format!("{} contents exceed 4 GiB", start.name()))
        })?;
        tracing::trace!(position, length, "backpatching container length");
        self.out.seek(SeekFrom::Start(position))?;
        self.out.write_all(&length.to_le_bytes())?;
        self.out.seek(SeekFrom::Start(current))?;
        self.write_tag(end)
    }
}

impl<W: Write + Seek> ValueWrite for BinaryWriter<W> {
    fn begin_object(&mut self) -> Result<()> {
        self.begin_container(Tag::ObjectStart)
    }

    fn end_object(&mut self) -> Result<()> {
        self.end_container(Tag::ObjectStart, Tag::ObjectEnd)
    }

    fn write_key(&mut self, key: &str) -> Result<()> {
        self.write_tag(Tag::ObjectKey)?;
        self.write_text(key)
    }

    fn begin_array(&mut self) -> Result<()> {
        self.begin_container(Tag::ArrayStart)
    }

    fn end_array(&mut self) -> Result<()> {
        self.end_container(Tag::ArrayStart, Tag::ArrayEnd)
    }

    fn write_scalar(&mut self, value: &Value) -> Result<()> {
        let tag = Tag::for_kind(value.kind());
        match value {
            Value::Object(_) | Value::Array(_) => {
                return Err(Error::custom(
                    "containers must be written with begin/end calls",
                ))
            }
            Value::String(s) => {
                self.write_tag(tag)?;
                return self.write_text(s);
            }
            Value::Binary(bytes) => {
                let length = i32::try_from(bytes.len())
                    .map_err(|_| Error::custom("binary payload exceeds 2 GiB"))?;
                self.write_tag(tag)?;
                self.out.write_all(&length.to_le_bytes())?;
                self.out.write_all(bytes)?;
                return Ok(());
            }
            _ => {}
        }

        self.write_tag(tag)?;
        match value {
            Value::Bool(b) => self.out.write_all(&[u8::from(*b)])?,
            Value::Byte(n) => self.out.write_all(&[*n])?,
            Value::SByte(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::Char(c) => self.out.write_all(&u32::from(*c).to_le_bytes())?,
            Value::Short(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::UShort(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::Int(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::UInt(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::Long(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::ULong(n) => self.out.write_all(&n.to_le_bytes())?,
            Value::Float(f) => self.out.write_all(&f.to_le_bytes())?,
            Value::Double(f) => self.out.write_all(&f.to_le_bytes())?,
            Value::Decimal(d) => self.out.write_all(&d.serialize())?,
            _ => {}
        }
        Ok(())
    }

    /// Writes a complete value tree.
    ///
    /// On failure every container opened by this call is dropped from the position
    /// stack, so the enclosing containers can still be closed consistently.
    fn write_value(&mut self, value: &Value) -> Result<()> {
        let depth = self.open.len();
        let result = write_tree(self, value);
        if result.is_err() {
            self.open.truncate(depth);
        }
        result
    }
}

/// Encodes a value as a complete binary document.
///
/// # Errors
///
/// Returns an error if a payload is too large for its length field.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(Cursor::new(Vec::with_capacity(128)));
    writer.write_value(value)?;
    Ok(writer.finish()?.into_inner())
}
