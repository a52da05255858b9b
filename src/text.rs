//! Text sources the encoder can write as UTF-8.
//!
//! A tag or string is length-prefixed by its UTF-8 byte count, which isn't known until the text
//! has been transcoded. Each source therefore offers a cheap character count for the encoder to
//! guess the prefix width from, and a transcoder that reports the real byte count afterwards.

use std::char::REPLACEMENT_CHARACTER;

use crate::cursor::Cursor;
use crate::error::Result;

/// Something the encoder can write out as UTF-8.
pub trait Text {
    /// Number of characters, as the source counts them. Never more than the UTF-8 byte count.
    fn char_count(&self) -> usize;

    /// Write the text as UTF-8 at the cursor, advance past it, and return the byte count.
    fn transcode<T>(&self, cursor: &mut Cursor<T>) -> Result<usize>
    where
        T: AsRef<[u8]> + AsMut<[u8]>;
}

impl Text for str {
    fn char_count(&self) -> usize {
        bytecount::num_chars(self.as_bytes())
    }

    fn transcode<T>(&self, cursor: &mut Cursor<T>) -> Result<usize>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        cursor.write_bytes(self.as_bytes(), "text")?;
        Ok(self.len())
    }
}

impl Text for String {
    fn char_count(&self) -> usize {
        self.as_str().char_count()
    }

    fn transcode<T>(&self, cursor: &mut Cursor<T>) -> Result<usize>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.as_str().transcode(cursor)
    }
}

/// UTF-16 text, counted in code units.
///
/// Unpaired surrogates can't be written as UTF-8 and come out as U+FFFD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Utf16<'a>(pub &'a [u16]);

impl<'a> Utf16<'a> {
    /// Transcode through the standard library's surrogate pair decoder.
    fn transcode_pairs<T>(&self, cursor: &mut Cursor<T>, start: usize) -> Result<usize>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        cursor.set_position(start);
        let mut buf = [0u8; 4];
        for ch in char::decode_utf16(self.0.iter().copied()) {
            let ch = ch.unwrap_or(REPLACEMENT_CHARACTER);
            cursor.write_bytes(ch.encode_utf8(&mut buf).as_bytes(), "text")?;
        }
        Ok(cursor.position() - start)
    }
}

impl<'a> Text for Utf16<'a> {
    fn char_count(&self) -> usize {
        self.0.len()
    }

    fn transcode<T>(&self, cursor: &mut Cursor<T>) -> Result<usize>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        let start = cursor.position();
        let units = self.0;

        // Leading ASCII goes across in one copy
        let ascii = units.iter().take_while(|&&unit| unit < 0x80).count();
        let dst = cursor.reserve(ascii, "text")?;
        for (byte, &unit) in dst.iter_mut().zip(units) {
            *byte = unit as u8;
        }

        for &unit in &units[ascii..] {
            match unit {
                0x0000..=0x007F => cursor.write_u8(unit as u8, "text")?,
                0x0080..=0x07FF => {
                    let dst = cursor.reserve(2, "text")?;
                    dst[0] = 0xC0 | (unit >> 6) as u8;
                    dst[1] = 0x80 | (unit & 0x3F) as u8;
                }
                0xD800..=0xDFFF => return self.transcode_pairs(cursor, start),
                _ => {
                    let dst = cursor.reserve(3, "text")?;
                    dst[0] = 0xE0 | (unit >> 12) as u8;
                    dst[1] = 0x80 | ((unit >> 6) & 0x3F) as u8;
                    dst[2] = 0x80 | (unit & 0x3F) as u8;
                }
            }
        }
        Ok(cursor.position() - start)
    }
}
