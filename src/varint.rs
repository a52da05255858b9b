//! LEB128 variable-length integers.
//!
//! Unsigned values are written 7 bits at a time, low group first, with the high bit of each byte
//! set when another byte follows. Signed values use the same grouping but stop as soon as the
//! remaining value is pure sign extension of the last group's bit 6, so every value is written in
//! its minimal form. Both forms take at most [`MAX_LEN`] bytes for 64-bit values.

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Longest encoding of a 64-bit value.
pub const MAX_LEN: usize = 10;

/// Number of bytes [`write_unsigned`] will use for `value`.
pub fn unsigned_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Number of bytes [`write_signed`] will use for `value`.
pub fn signed_len(value: i64) -> usize {
    // One extra bit is needed to hold the sign
    let bits = if value < 0 {
        65 - value.leading_ones() as usize
    } else {
        65 - value.leading_zeros() as usize
    };
    (bits + 6) / 7
}

/// Write `value` as unsigned LEB128 and return the number of bytes written.
pub fn write_unsigned<T>(cursor: &mut Cursor<T>, mut value: u64) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    let start = cursor.position();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            cursor.write_u8(byte, "unsigned leb128")?;
            break;
        }
        cursor.write_u8(byte | 0x80, "unsigned leb128")?;
    }
    Ok(cursor.position() - start)
}

/// Write `value` as signed LEB128 and return the number of bytes written.
pub fn write_signed<T>(cursor: &mut Cursor<T>, mut value: i64) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    let start = cursor.position();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let sign_clear = byte & 0x40 == 0;
        if (value == 0 && sign_clear) || (value == -1 && !sign_clear) {
            cursor.write_u8(byte, "signed leb128")?;
            break;
        }
        cursor.write_u8(byte | 0x80, "signed leb128")?;
    }
    Ok(cursor.position() - start)
}

/// Read an unsigned LEB128 value.
pub fn read_unsigned<T: AsRef<[u8]>>(cursor: &mut Cursor<T>) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = cursor.read_u8("invalid unsigned leb128 value")?;
        if shift >= 64 {
            return Err(Error::format(
                "unsigned leb128 value longer than 64 bits",
                cursor.position() - 1,
            ));
        }
        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
}

/// Read a signed LEB128 value, sign-extending from bit 6 of the final byte.
pub fn read_signed<T: AsRef<[u8]>>(cursor: &mut Cursor<T>) -> Result<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let byte = cursor.read_u8("invalid signed leb128 value")?;
        if shift >= 64 {
            return Err(Error::format(
                "signed leb128 value longer than 64 bits",
                cursor.position() - 1,
            ));
        }
        result |= i64::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 64 && (byte & 0x40) != 0 {
                result |= -1i64 << shift;
            }
            return Ok(result);
        }
    }
}
