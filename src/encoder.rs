//! Sequential writer for tag/value and tag/array entries.
//!
//! The encoder writes straight into a caller-owned byte slice. Every entry starts with a tag
//! write ([`Encoder::tag`] or [`Encoder::array`]), which emits the header byte, the tag, and for
//! arrays the element count. It is then followed by one element write (`append_*`) for scalars,
//! or exactly `count` element writes for arrays. The `tag + value` shorthands like
//! [`Encoder::int32`] do both at once.
//!
//! The encoder doesn't check that the element writes match the declared type or count; a mismatch
//! produces a document that decodes to something else.
//!
//! ```
//! # use bflat::{Encoder, Type};
//! # fn main() -> bflat::Result<()> {
//! let mut buf = [0u8; 64];
//! let mut enc = Encoder::new(&mut buf);
//! enc.int32("foo", 1)?;
//! enc.array(Type::Double, "pts", 2)?
//!     .append_double(0.5)?
//!     .append_double(1.5)?;
//! assert_eq!(&enc.as_bytes()[..8], &[0x2B, b'f', b'o', b'o', 0x01, 0x00, 0x00, 0x00]);
//! # Ok(())
//! # }
//! ```
//!
//! # Length prefixes
//!
//! Tags and strings are prefixed by their UTF-8 byte length, but a text source only knows its
//! character count up front. The encoder writes a prefix sized from the character count,
//! transcodes, and then patches the prefix once the real byte count is known. See
//! [`LengthPatch`].

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::fixed;
use crate::marker::{Marker, Type, MAX_INLINE_TAG};
use crate::text::Text;
use crate::varint;

/// What to do with a length prefix that was written from an estimate, once the real length is
/// known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LengthPatch {
    /// The estimate was right.
    Keep,
    /// The prefix is wrong but the right one is the same width: overwrite it in place.
    Rewrite,
    /// The right prefix is a different width, so the text has to move. Write the new prefix and
    /// transcode again after it.
    Reserialize,
}

impl LengthPatch {
    pub(crate) fn plan(estimated: usize, actual: usize) -> LengthPatch {
        if estimated == actual {
            LengthPatch::Keep
        } else if varint::unsigned_len(estimated as u64) == varint::unsigned_len(actual as u64) {
            LengthPatch::Rewrite
        } else {
            LengthPatch::Reserialize
        }
    }
}

/// Writes entries into a caller-owned buffer.
#[derive(Debug)]
pub struct Encoder<'a> {
    cursor: Cursor<&'a mut [u8]>,
}

impl<'a> Encoder<'a> {
    /// Start writing at the beginning of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    /// Start writing at byte `start` of `buf`. A start past the end is clamped to the end, so
    /// the first write fails with [`Error::BufferTooSmall`].
    pub fn with_start(buf: &'a mut [u8], start: usize) -> Self {
        let start = start.min(buf.len());
        Self {
            cursor: Cursor::with_start(buf, start),
        }
    }

    /// Encoded size of a tag header (header byte, length prefix if any, tag bytes) for a tag of
    /// `tag_len` UTF-8 bytes.
    pub fn tag_size(tag_len: usize) -> usize {
        if tag_len <= MAX_INLINE_TAG {
            1 + tag_len
        } else {
            1 + varint::unsigned_len(tag_len as u64) + tag_len
        }
    }

    /// Encoded size of an array header with `count` elements.
    pub fn array_size(tag_len: usize, count: usize) -> usize {
        Self::tag_size(tag_len) + varint::unsigned_len(count as u64)
    }

    /// Encoded size of one string or binary element of `len` bytes.
    pub fn string_size(len: usize) -> usize {
        varint::unsigned_len(len as u64) + len
    }

    /// Absolute position of the next byte to be written.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Bytes written since the start position.
    pub fn len(&self) -> usize {
        self.cursor.position() - self.cursor.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Room left in the buffer.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Go back to the start position. Anything written so far will be overwritten.
    pub fn rewind(&mut self) -> &mut Self {
        self.cursor.rewind();
        self
    }

    /// The bytes written since the start position.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cursor.get_ref()[self.cursor.start()..self.cursor.position()]
    }

    pub fn into_inner(self) -> &'a mut [u8] {
        self.cursor.into_inner()
    }

    /// Start a scalar entry. Follow it with one element write.
    pub fn tag<S: Text + ?Sized>(&mut self, ty: Type, tag: &S) -> Result<&mut Self> {
        self.header(Marker::new(ty, false, 0), tag)?;
        Ok(self)
    }

    /// Start a scalar entry whose tag is already UTF-8.
    pub fn tag_bytes(&mut self, ty: Type, tag: &[u8]) -> Result<&mut Self> {
        self.header_bytes(Marker::new(ty, false, 0), tag)?;
        Ok(self)
    }

    /// Start an array entry. Follow it with exactly `count` element writes.
    pub fn array<S: Text + ?Sized>(&mut self, ty: Type, tag: &S, count: usize) -> Result<&mut Self> {
        self.header(Marker::new(ty, true, 0), tag)?;
        varint::write_unsigned(&mut self.cursor, count as u64)?;
        Ok(self)
    }

    /// Start an array entry whose tag is already UTF-8.
    pub fn array_bytes(&mut self, ty: Type, tag: &[u8], count: usize) -> Result<&mut Self> {
        self.header_bytes(Marker::new(ty, true, 0), tag)?;
        varint::write_unsigned(&mut self.cursor, count as u64)?;
        Ok(self)
    }

    fn header<S: Text + ?Sized>(&mut self, marker: Marker, tag: &S) -> Result<()> {
        let chars = tag.char_count();
        if chars == 0 {
            return Err(Error::EmptyTag);
        }
        let code = marker.into_u8();
        let start = self.cursor.position();
        self.cursor.write_u8(code, "tag")?;
        if chars > MAX_INLINE_TAG {
            return self.prefixed(tag, chars);
        }

        let len = tag.transcode(&mut self.cursor)?;
        if len <= MAX_INLINE_TAG {
            self.cursor.patch_u8(start, code | len as u8, "tag")?;
        } else {
            // Fewer than 8 characters is at most 28 bytes, so a one-byte prefix always fits
            self.cursor.shift_right(start + 1, len, 1, "tag")?;
            self.cursor.patch_u8(start + 1, len as u8, "tag")?;
        }
        Ok(())
    }

    fn header_bytes(&mut self, marker: Marker, tag: &[u8]) -> Result<()> {
        if tag.is_empty() {
            return Err(Error::EmptyTag);
        }
        let code = marker.into_u8();
        if tag.len() <= MAX_INLINE_TAG {
            self.cursor.write_u8(code | tag.len() as u8, "tag")?;
        } else {
            self.cursor.write_u8(code, "tag")?;
            varint::write_unsigned(&mut self.cursor, tag.len() as u64)?;
        }
        self.cursor.write_bytes(tag, "tag")
    }

    /// Write a length-prefixed text, guessing the prefix from `chars` and patching it afterwards.
    fn prefixed<S: Text + ?Sized>(&mut self, text: &S, chars: usize) -> Result<()> {
        let prefix = self.cursor.position();
        varint::write_unsigned(&mut self.cursor, chars as u64)?;
        let len = text.transcode(&mut self.cursor)?;
        match LengthPatch::plan(chars, len) {
            LengthPatch::Keep => (),
            LengthPatch::Rewrite => {
                let end = self.cursor.position();
                self.cursor.set_position(prefix);
                varint::write_unsigned(&mut self.cursor, len as u64)?;
                self.cursor.set_position(end);
            }
            LengthPatch::Reserialize => {
                self.cursor.set_position(prefix);
                varint::write_unsigned(&mut self.cursor, len as u64)?;
                text.transcode(&mut self.cursor)?;
            }
        }
        Ok(())
    }

    pub fn append_string<S: Text + ?Sized>(&mut self, value: &S) -> Result<&mut Self> {
        self.prefixed(value, value.char_count())?;
        Ok(self)
    }

    /// Append a string element that is already UTF-8. The bytes are copied without validation.
    pub fn append_string_bytes(&mut self, value: &[u8]) -> Result<&mut Self> {
        varint::write_unsigned(&mut self.cursor, value.len() as u64)?;
        self.cursor.write_bytes(value, "string")?;
        Ok(self)
    }

    pub fn append_binary(&mut self, value: &[u8]) -> Result<&mut Self> {
        varint::write_unsigned(&mut self.cursor, value.len() as u64)?;
        self.cursor.write_bytes(value, "binary")?;
        Ok(self)
    }

    pub fn append_int8(&mut self, value: i8) -> Result<&mut Self> {
        fixed::encode_i8(&mut self.cursor, value)?;
        Ok(self)
    }

    pub fn append_int16(&mut self, value: i16) -> Result<&mut Self> {
        fixed::encode_i16(&mut self.cursor, value)?;
        Ok(self)
    }

    pub fn append_int32(&mut self, value: i32) -> Result<&mut Self> {
        fixed::encode_i32(&mut self.cursor, value)?;
        Ok(self)
    }

    pub fn append_int64(&mut self, value: i64) -> Result<&mut Self> {
        fixed::encode_i64(&mut self.cursor, value)?;
        Ok(self)
    }

    pub fn append_double(&mut self, value: f64) -> Result<&mut Self> {
        fixed::encode_f64(&mut self.cursor, value)?;
        Ok(self)
    }

    /// Append a datetime element. The format only fixes the width; what the 64 bits count is up to
    /// the application.
    pub fn append_datetime(&mut self, value: i64) -> Result<&mut Self> {
        fixed::encode_i64(&mut self.cursor, value)?;
        Ok(self)
    }

    pub fn append_varint(&mut self, value: i64) -> Result<&mut Self> {
        varint::write_signed(&mut self.cursor, value)?;
        Ok(self)
    }

    /// Write a complete Null entry.
    pub fn null<S: Text + ?Sized>(&mut self, tag: &S) -> Result<&mut Self> {
        self.tag(Type::Null, tag)
    }

    pub fn string<S, V>(&mut self, tag: &S, value: &V) -> Result<&mut Self>
    where
        S: Text + ?Sized,
        V: Text + ?Sized,
    {
        self.tag(Type::String, tag)?.append_string(value)
    }

    pub fn binary<S: Text + ?Sized>(&mut self, tag: &S, value: &[u8]) -> Result<&mut Self> {
        self.tag(Type::Binary, tag)?.append_binary(value)
    }

    pub fn int8<S: Text + ?Sized>(&mut self, tag: &S, value: i8) -> Result<&mut Self> {
        self.tag(Type::Int8, tag)?.append_int8(value)
    }

    pub fn int16<S: Text + ?Sized>(&mut self, tag: &S, value: i16) -> Result<&mut Self> {
        self.tag(Type::Int16, tag)?.append_int16(value)
    }

    pub fn int32<S: Text + ?Sized>(&mut self, tag: &S, value: i32) -> Result<&mut Self> {
        self.tag(Type::Int32, tag)?.append_int32(value)
    }

    pub fn int64<S: Text + ?Sized>(&mut self, tag: &S, value: i64) -> Result<&mut Self> {
        self.tag(Type::Int64, tag)?.append_int64(value)
    }

    pub fn double<S: Text + ?Sized>(&mut self, tag: &S, value: f64) -> Result<&mut Self> {
        self.tag(Type::Double, tag)?.append_double(value)
    }

    pub fn datetime<S: Text + ?Sized>(&mut self, tag: &S, value: i64) -> Result<&mut Self> {
        self.tag(Type::Datetime, tag)?.append_datetime(value)
    }

    pub fn varint<S: Text + ?Sized>(&mut self, tag: &S, value: i64) -> Result<&mut Self> {
        self.tag(Type::Varint, tag)?.append_varint(value)
    }
}
