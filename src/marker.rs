//! The header byte that starts every entry.
//!
//! ```text
//!   7   6  5  4  3   2  1  0
//! +---+-------------+--------+
//! | A |    type     | taglen |
//! +---+-------------+--------+
//! ```
//!
//! `A` marks an array entry. `taglen` holds the tag's byte length when it is 1 to 7; a zero means
//! the length follows as an unsigned varint.

use std::fmt;

pub const ARRAY_FLAG: u8 = 0x80;
pub const TYPE_MASK: u8 = 0x78;
pub const LENGTH_MASK: u8 = 0x07;

/// Longest tag that fits in the header byte.
pub const MAX_INLINE_TAG: usize = LENGTH_MASK as usize;

/// Element types. The discriminant is the type code as it sits in the header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Type {
    Null = 0x00,
    String = 0x08,
    Binary = 0x10,
    Int8 = 0x18,
    Int16 = 0x20,
    Int32 = 0x28,
    Int64 = 0x30,
    Double = 0x38,
    Datetime = 0x40,
    Varint = 0x48,
}

impl Type {
    /// Look up the type from the type bits of a header byte. Other bits are ignored.
    pub fn from_u8(byte: u8) -> Option<Type> {
        Some(match byte & TYPE_MASK {
            0x00 => Type::Null,
            0x08 => Type::String,
            0x10 => Type::Binary,
            0x18 => Type::Int8,
            0x20 => Type::Int16,
            0x28 => Type::Int32,
            0x30 => Type::Int64,
            0x38 => Type::Double,
            0x40 => Type::Datetime,
            0x48 => Type::Varint,
            _ => return None,
        })
    }

    pub fn into_u8(self) -> u8 {
        self as u8
    }

    /// Byte width of each element, for the fixed-width types.
    pub fn width(self) -> Option<usize> {
        match self {
            Type::Int8 => Some(1),
            Type::Int16 => Some(2),
            Type::Int32 => Some(4),
            Type::Int64 | Type::Double | Type::Datetime => Some(8),
            Type::Null | Type::String | Type::Binary | Type::Varint => None,
        }
    }

    /// True for every type the generic integer accessor will read.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Type::Int8 | Type::Int16 | Type::Int32 | Type::Int64 | Type::Datetime | Type::Varint
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::String => "string",
            Type::Binary => "binary",
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::Double => "double",
            Type::Datetime => "datetime",
            Type::Varint => "varint",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unpacked header byte. The type bits are kept raw so that an unknown type can be reported
/// once the rest of the header has been read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub code: u8,
    pub is_array: bool,
    pub tag_len: u8,
}

impl Marker {
    pub fn new(ty: Type, is_array: bool, tag_len: u8) -> Marker {
        Marker {
            code: ty.into_u8(),
            is_array,
            tag_len: tag_len & LENGTH_MASK,
        }
    }

    pub fn from_u8(byte: u8) -> Marker {
        Marker {
            code: byte & TYPE_MASK,
            is_array: byte & ARRAY_FLAG != 0,
            tag_len: byte & LENGTH_MASK,
        }
    }

    pub fn into_u8(self) -> u8 {
        let array = if self.is_array { ARRAY_FLAG } else { 0 };
        array | self.code | self.tag_len
    }

    pub fn value_type(&self) -> Option<Type> {
        Type::from_u8(self.code)
    }
}
