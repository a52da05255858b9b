//! Read-only views of decoded entries.
//!
//! A [`ValueView`] doesn't copy anything out of the buffer it was decoded from. Fixed-width
//! elements are read on demand at `data offset + index × width`. String, Binary, and Varint
//! elements have variable sizes, so the decoder records each one's location (or value, for
//! varints) as it walks past them. The first element is stored in the view itself; the rest go in
//! a scratch vector that keeps its capacity when the view is recycled.
//!
//! The typed accessors (`int32`, `double`, `string`, ...) don't check the view's type. Calling
//! one on the wrong type returns garbage or a format error, never a panic. [`ValueView::long`] is
//! the checked way to read any integer type.

use std::fmt;

use crate::error::{Error, Result};
use crate::fixed;
use crate::marker::Type;
use crate::value::Value;

/// Most elements a Null array may have before [`ValueView::to_value`] refuses to build it. Null
/// elements take no space on the wire, so the count alone says nothing about the input size.
pub const MAX_NULL_ELEMENTS: usize = 1 << 20;

/// Where a variable-sized element lives, or its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Span {
        offset: usize,
        len: usize,
    },
    Varint(i64),
}

/// One decoded entry, borrowing from the decoded buffer.
#[derive(Clone, Debug)]
pub struct ValueView<'a> {
    data: &'a [u8],
    ty: Type,
    is_array: bool,
    count: usize,
    tag_offset: usize,
    tag_len: usize,
    data_offset: usize,
    first: Slot,
    rest: Vec<Slot>,
}

impl<'a> Default for ValueView<'a> {
    fn default() -> Self {
        Self {
            data: &[],
            ty: Type::Null,
            is_array: false,
            count: 0,
            tag_offset: 0,
            tag_len: 0,
            data_offset: 0,
            first: Slot::Empty,
            rest: Vec::new(),
        }
    }
}

impl<'a> ValueView<'a> {
    /// Point the view at a new entry. Element slots are cleared; the scratch capacity is kept and
    /// grown to fit `count - 1` slots, as far as the remaining input could possibly hold them.
    pub(crate) fn begin(
        &mut self,
        data: &'a [u8],
        ty: Type,
        is_array: bool,
        count: usize,
        tag: (usize, usize),
        data_offset: usize,
    ) {
        self.data = data;
        self.ty = ty;
        self.is_array = is_array;
        self.count = count;
        self.tag_offset = tag.0;
        self.tag_len = tag.1;
        self.data_offset = data_offset;
        self.first = Slot::Empty;
        self.rest.clear();
        if matches!(ty, Type::String | Type::Binary | Type::Varint) && count > 1 {
            // Every such element is at least one byte
            let possible = data.len().saturating_sub(data_offset);
            self.rest.reserve((count - 1).min(possible));
        }
    }

    /// Record element `index`. Slots must be recorded in order.
    pub(crate) fn record(&mut self, index: usize, slot: Slot) {
        if index == 0 {
            self.first = slot;
        } else {
            self.rest.push(slot);
        }
    }

    #[cfg(test)]
    pub(crate) fn scratch_ptr(&self) -> *const Slot {
        self.rest.as_ptr()
    }

    fn slot(&self, index: usize) -> Result<Slot> {
        if index == 0 {
            return Ok(self.first);
        }
        self.rest
            .get(index - 1)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                count: self.count,
            })
    }

    fn fixed_offset(&self, index: usize, width: usize) -> usize {
        self.data_offset.saturating_add(index.saturating_mul(width))
    }

    /// The buffer this view points into.
    pub fn buffer(&self) -> &'a [u8] {
        self.data
    }

    pub fn value_type(&self) -> Type {
        self.ty
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_null(&self) -> bool {
        self.ty == Type::Null
    }

    /// Number of elements: 1 for scalars, the declared count for arrays.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Offset of the first payload byte.
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// Offset and length of the tag bytes.
    pub fn raw_tag(&self) -> (usize, usize) {
        (self.tag_offset, self.tag_len)
    }

    pub fn tag_bytes(&self) -> &'a [u8] {
        &self.data[self.tag_offset..self.tag_offset + self.tag_len]
    }

    pub fn tag(&self) -> Result<&'a str> {
        std::str::from_utf8(self.tag_bytes()).map_err(|e| Error::Utf8 {
            position: self.tag_offset + e.valid_up_to(),
        })
    }

    pub fn int8(&self) -> Result<i8> {
        self.int8_at(0)
    }

    pub fn int8_at(&self, index: usize) -> Result<i8> {
        fixed::decode_i8(self.data, self.fixed_offset(index, 1))
    }

    pub fn int16(&self) -> Result<i16> {
        self.int16_at(0)
    }

    pub fn int16_at(&self, index: usize) -> Result<i16> {
        fixed::decode_i16(self.data, self.fixed_offset(index, 2))
    }

    pub fn int32(&self) -> Result<i32> {
        self.int32_at(0)
    }

    pub fn int32_at(&self, index: usize) -> Result<i32> {
        fixed::decode_i32(self.data, self.fixed_offset(index, 4))
    }

    pub fn int64(&self) -> Result<i64> {
        self.int64_at(0)
    }

    pub fn int64_at(&self, index: usize) -> Result<i64> {
        fixed::decode_i64(self.data, self.fixed_offset(index, 8))
    }

    pub fn datetime(&self) -> Result<i64> {
        self.datetime_at(0)
    }

    pub fn datetime_at(&self, index: usize) -> Result<i64> {
        fixed::decode_i64(self.data, self.fixed_offset(index, 8))
    }

    pub fn double(&self) -> Result<f64> {
        self.double_at(0)
    }

    pub fn double_at(&self, index: usize) -> Result<f64> {
        fixed::decode_f64(self.data, self.fixed_offset(index, 8))
    }

    pub fn varint(&self) -> Result<i64> {
        self.varint_at(0)
    }

    pub fn varint_at(&self, index: usize) -> Result<i64> {
        match self.slot(index)? {
            Slot::Varint(v) => Ok(v),
            _ => Ok(0),
        }
    }

    /// Offset and length of a String or Binary element.
    pub fn raw_value(&self) -> Result<(usize, usize)> {
        self.raw_value_at(0)
    }

    pub fn raw_value_at(&self, index: usize) -> Result<(usize, usize)> {
        match self.slot(index)? {
            Slot::Span { offset, len } => Ok((offset, len)),
            _ => Ok((self.data_offset, 0)),
        }
    }

    /// Bytes of a String or Binary element.
    pub fn bytes(&self) -> Result<&'a [u8]> {
        self.bytes_at(0)
    }

    pub fn bytes_at(&self, index: usize) -> Result<&'a [u8]> {
        self.span_at(index).map(|(_, bytes)| bytes)
    }

    pub fn string(&self) -> Result<&'a str> {
        self.string_at(0)
    }

    pub fn string_at(&self, index: usize) -> Result<&'a str> {
        let (offset, bytes) = self.span_at(index)?;
        std::str::from_utf8(bytes).map_err(|e| Error::Utf8 {
            position: offset + e.valid_up_to(),
        })
    }

    fn span_at(&self, index: usize) -> Result<(usize, &'a [u8])> {
        let (offset, len) = self.raw_value_at(index)?;
        let data: &'a [u8] = self.data;
        let bytes = offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| Error::format("element outside of buffer", offset))?;
        Ok((offset, bytes))
    }

    /// Read any integer type as an `i64`.
    pub fn long(&self) -> Result<i64> {
        self.long_at(0)
    }

    pub fn long_at(&self, index: usize) -> Result<i64> {
        match self.ty {
            Type::Int8 => self.int8_at(index).map(i64::from),
            Type::Int16 => self.int16_at(index).map(i64::from),
            Type::Int32 => self.int32_at(index).map(i64::from),
            Type::Int64 => self.int64_at(index),
            Type::Datetime => self.datetime_at(index),
            Type::Varint => self.varint_at(index),
            Type::Null => Err(Error::Conversion("value is null")),
            Type::String | Type::Binary | Type::Double => {
                Err(Error::Conversion("cannot convert to integer"))
            }
        }
    }

    /// Copy one element out into an owned [`Value`].
    pub fn element(&self, index: usize) -> Result<Value> {
        Ok(match self.ty {
            Type::Null => Value::Null,
            Type::String => Value::String(self.string_at(index)?.to_owned()),
            Type::Binary => Value::Binary(self.bytes_at(index)?.to_vec()),
            Type::Double => Value::Double(self.double_at(index)?),
            _ => Value::Int(self.long_at(index)?),
        })
    }

    /// Copy the entry out into an owned [`Value`]. Arrays become [`Value::Array`], even when they
    /// hold a single element.
    pub fn to_value(&self) -> Result<Value> {
        if !self.is_array {
            return self.element(0);
        }
        if self.ty == Type::Null {
            if self.count > MAX_NULL_ELEMENTS {
                return Err(Error::ValueLimit);
            }
            return Ok(Value::Array(vec![Value::Null; self.count]));
        }
        (0..self.count)
            .map(|index| self.element(index))
            .collect::<Result<Vec<Value>>>()
            .map(Value::Array)
    }

    fn fmt_element(&self, f: &mut fmt::Formatter, index: usize) -> fmt::Result {
        match self.ty {
            Type::Null => f.write_str("null"),
            Type::String | Type::Binary => {
                let bytes = self.bytes_at(index).map_err(|_| fmt::Error)?;
                write!(f, "\"{}\"", String::from_utf8_lossy(bytes))
            }
            Type::Double => write!(f, "{}", self.double_at(index).map_err(|_| fmt::Error)?),
            _ => write!(f, "{}", self.long_at(index).map_err(|_| fmt::Error)?),
        }
    }
}

impl<'a> fmt::Display for ValueView<'a> {
    /// `tag=value` for scalars, `tag=[v1, v2]` for arrays. Strings and binary are quoted, and a
    /// Null array is written as `tag=[null; count]`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=", String::from_utf8_lossy(self.tag_bytes()))?;
        if !self.is_array {
            return self.fmt_element(f, 0);
        }
        // Null elements take no space on the wire, so the count alone can be enormous
        if self.ty == Type::Null && self.count > 0 {
            return write!(f, "[null; {}]", self.count);
        }
        f.write_str("[")?;
        for index in 0..self.count {
            if index > 0 {
                f.write_str(", ")?;
            }
            self.fmt_element(f, index)?;
        }
        f.write_str("]")
    }
}
