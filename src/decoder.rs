//! Forward-only decoding of entries into [`ValueView`]s.
//!
//! The decoder walks a buffer one entry at a time. It reads the header, records where the tag
//! and payload are, and skips over the payload; nothing is copied. A decoder is also an
//! [`Iterator`] over `Result<ValueView>`, which stops after the first error, the same as running
//! off the end of the data.
//!
//! Iterating hands out a fresh view each step unless one has been given back with
//! [`Decoder::recycle`]. [`Decoder::next_into`] fills a caller-held view instead, reusing its
//! scratch space, so a tight loop over many entries doesn't allocate once the scratch has grown.
//!
//! ```
//! # use bflat::{Decoder, Type};
//! # fn main() -> bflat::Result<()> {
//! let data = [0x2B, b'f', b'o', b'o', 0x01, 0x00, 0x00, 0x00];
//! let mut decoder = Decoder::new();
//! decoder.parse(&data);
//! for view in &mut decoder {
//!     let view = view?;
//!     assert_eq!(view.tag()?, "foo");
//!     assert_eq!(view.value_type(), Type::Int32);
//!     assert_eq!(view.int32()?, 1);
//! }
//! # Ok(())
//! # }
//! ```

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::marker::{Marker, Type};
use crate::varint;
use crate::view::{Slot, ValueView};

/// Decodes entries one at a time from a borrowed buffer.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
    spare: Option<ValueView<'a>>,
    errored: bool,
}

impl<'a> Default for Decoder<'a> {
    fn default() -> Self {
        Self {
            cursor: Cursor::new(&[][..]),
            spare: None,
            errored: false,
        }
    }
}

impl<'a> Decoder<'a> {
    /// A decoder with nothing to decode yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode all of `data`.
    pub fn parse(&mut self, data: &'a [u8]) -> &mut Self {
        self.cursor = Cursor::new(data);
        self.errored = false;
        self
    }

    /// Decode `length` bytes of `data`, starting at `offset`. Offsets reported by views and
    /// errors are still relative to the start of `data`.
    pub fn parse_range(&mut self, data: &'a [u8], offset: usize, length: usize) -> Result<&mut Self> {
        let end = offset
            .checked_add(length)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| Error::format("range extends past the buffer", data.len()))?;
        self.cursor = Cursor::with_start(&data[..end], offset);
        self.errored = false;
        Ok(self)
    }

    /// Go back to the first entry.
    pub fn reset(&mut self) -> &mut Self {
        self.cursor.rewind();
        self.errored = false;
        self
    }

    /// Position of the next entry's header byte.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// True if there's another entry to decode. False after an error.
    pub fn has_next(&self) -> bool {
        !self.errored && self.cursor.remaining() > 0
    }

    /// Give a view back, so the next step of iteration can reuse it.
    pub fn recycle(&mut self, view: ValueView<'a>) {
        self.spare = Some(view);
    }

    /// Decode the next entry into `view`. Returns `Ok(false)` at the end of the data.
    pub fn next_into(&mut self, view: &mut ValueView<'a>) -> Result<bool> {
        if !self.has_next() {
            return Ok(false);
        }
        match self.parse_entry(view) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.errored = true;
                Err(e)
            }
        }
    }

    fn parse_entry(&mut self, view: &mut ValueView<'a>) -> Result<()> {
        let marker = Marker::from_u8(self.cursor.read_u8("missing header byte")?);

        let tag_len = if marker.tag_len != 0 {
            usize::from(marker.tag_len)
        } else {
            let len_pos = self.cursor.position();
            match varint::read_unsigned(&mut self.cursor)? {
                0 => return Err(Error::format("zero length tag", len_pos)),
                len => usize::try_from(len)
                    .map_err(|_| Error::format("tag length too large", len_pos))?,
            }
        };
        let tag_offset = self.cursor.position();
        self.cursor.skip(tag_len, "tag runs past the end of the data")?;

        let count = if marker.is_array {
            let count_pos = self.cursor.position();
            usize::try_from(varint::read_unsigned(&mut self.cursor)?)
                .map_err(|_| Error::format("array count too large", count_pos))?
        } else {
            1
        };

        let data_offset = self.cursor.position();
        let ty = marker
            .value_type()
            .ok_or_else(|| Error::format("unknown value type", data_offset))?;
        view.begin(
            *self.cursor.get_ref(),
            ty,
            marker.is_array,
            count,
            (tag_offset, tag_len),
            data_offset,
        );

        match ty {
            Type::Null => (),
            Type::String | Type::Binary => {
                for index in 0..count {
                    let len_pos = self.cursor.position();
                    let len = usize::try_from(varint::read_unsigned(&mut self.cursor)?)
                        .map_err(|_| Error::format("element length too large", len_pos))?;
                    let offset = self.cursor.position();
                    self.cursor.skip(len, "element runs past the end of the data")?;
                    view.record(index, Slot::Span { offset, len });
                }
            }
            Type::Varint => {
                for index in 0..count {
                    view.record(index, Slot::Varint(varint::read_signed(&mut self.cursor)?));
                }
            }
            Type::Int8
            | Type::Int16
            | Type::Int32
            | Type::Int64
            | Type::Double
            | Type::Datetime => {
                let width = ty.width().unwrap_or(8);
                let len = count
                    .checked_mul(width)
                    .ok_or_else(|| Error::format("array count too large", data_offset))?;
                self.cursor.skip(len, "fixed-width data runs past the end of the data")?;
            }
        }
        Ok(())
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<ValueView<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let mut view = self.spare.take().unwrap_or_default();
        let result = self.parse_entry(&mut view);
        if let Err(e) = result {
            self.errored = true;
            self.spare = Some(view);
            return Some(Err(e));
        }
        Some(Ok(view))
    }
}
