//! Little-endian fixed-width integers and doubles.
//!
//! Writes go through a [`Cursor`] and advance it by the width of the value. Reads are random
//! access: they take a byte position and leave no state behind, which is what the value view needs
//! to pull individual array elements out of the buffer.

use byteorder::{ByteOrder, LittleEndian};

use crate::cursor::Cursor;
use crate::error::{Error, Result};

pub fn encode_i8<T>(cursor: &mut Cursor<T>, value: i8) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    cursor.write_u8(value as u8, "int8")?;
    Ok(1)
}

pub fn encode_i16<T>(cursor: &mut Cursor<T>, value: i16) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    LittleEndian::write_i16(cursor.reserve(2, "int16")?, value);
    Ok(2)
}

pub fn encode_i32<T>(cursor: &mut Cursor<T>, value: i32) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    LittleEndian::write_i32(cursor.reserve(4, "int32")?, value);
    Ok(4)
}

pub fn encode_i64<T>(cursor: &mut Cursor<T>, value: i64) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    LittleEndian::write_i64(cursor.reserve(8, "int64")?, value);
    Ok(8)
}

/// Doubles are written as the little-endian bytes of their IEEE-754 bit pattern.
pub fn encode_f64<T>(cursor: &mut Cursor<T>, value: f64) -> Result<usize>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    LittleEndian::write_u64(cursor.reserve(8, "double")?, value.to_bits());
    Ok(8)
}

fn window<'a>(src: &'a [u8], position: usize, width: usize, what: &'static str) -> Result<&'a [u8]> {
    position
        .checked_add(width)
        .and_then(|end| src.get(position..end))
        .ok_or_else(|| Error::format(what, position))
}

pub fn decode_i8(src: &[u8], position: usize) -> Result<i8> {
    Ok(window(src, position, 1, "invalid int8 value")?[0] as i8)
}

pub fn decode_i16(src: &[u8], position: usize) -> Result<i16> {
    Ok(LittleEndian::read_i16(window(src, position, 2, "invalid int16 value")?))
}

pub fn decode_i32(src: &[u8], position: usize) -> Result<i32> {
    Ok(LittleEndian::read_i32(window(src, position, 4, "invalid int32 value")?))
}

pub fn decode_i64(src: &[u8], position: usize) -> Result<i64> {
    Ok(LittleEndian::read_i64(window(src, position, 8, "invalid int64 value")?))
}

pub fn decode_f64(src: &[u8], position: usize) -> Result<f64> {
    let bits = LittleEndian::read_u64(window(src, position, 8, "invalid double value")?);
    Ok(f64::from_bits(bits))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn layout() {
        let mut buf = [0u8; 23];
        let mut cursor = Cursor::new(&mut buf[..]);
        assert_eq!(encode_i8(&mut cursor, -2).unwrap(), 1);
        assert_eq!(encode_i16(&mut cursor, 0x0102).unwrap(), 2);
        assert_eq!(encode_i32(&mut cursor, 0x01020304).unwrap(), 4);
        assert_eq!(encode_i64(&mut cursor, -1).unwrap(), 8);
        assert_eq!(encode_f64(&mut cursor, 1.0).unwrap(), 8);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(
            buf,
            [
                0xFE, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
                0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F
            ]
        );
        assert_eq!(decode_i8(&buf, 0).unwrap(), -2);
        assert_eq!(decode_i16(&buf, 1).unwrap(), 0x0102);
        assert_eq!(decode_i32(&buf, 3).unwrap(), 0x01020304);
        assert_eq!(decode_i64(&buf, 7).unwrap(), -1);
        assert_eq!(decode_f64(&buf, 15).unwrap(), 1.0);
    }

    #[test]
    fn random_values() {
        let mut rng = StdRng::seed_from_u64(0xF1_7ED);
        let mut buf = [0u8; 8];
        for _ in 0..500 {
            let value: i64 = rng.gen();
            let mut cursor = Cursor::new(&mut buf[..]);
            encode_i64(&mut cursor, value).unwrap();
            assert_eq!(decode_i64(&buf, 0).unwrap(), value);

            let value = f64::from_bits(rng.gen());
            let mut cursor = Cursor::new(&mut buf[..]);
            encode_f64(&mut cursor, value).unwrap();
            assert_eq!(decode_f64(&buf, 0).unwrap().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn out_of_range() {
        let buf = [0u8; 7];
        assert_eq!(
            decode_i64(&buf, 0).unwrap_err(),
            Error::format("invalid int64 value", 0)
        );
        assert!(decode_i32(&buf, 4).is_err());
        assert!(decode_i8(&buf, 7).is_err());
        assert!(decode_i16(&buf, usize::MAX).is_err());
        let mut out = [0u8; 3];
        let mut cursor = Cursor::new(&mut out[..]);
        assert_eq!(
            encode_i32(&mut cursor, 5).unwrap_err(),
            Error::too_small("int32", 0)
        );
    }
}
