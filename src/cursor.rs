//! A byte buffer with a movable read/write position.
//!
//! Every codec in this crate reads and writes through a [`Cursor`], and advances it by exactly the
//! number of bytes consumed or produced. Running off the end of the buffer is always an error:
//! [`Error::Format`] when reading, [`Error::BufferTooSmall`] when writing.

use crate::error::{Error, Result};

/// A byte sequence with a current position and a remembered start position.
#[derive(Clone, Debug)]
pub struct Cursor<T> {
    bytes: T,
    position: usize,
    start: usize,
}

impl<T> Cursor<T> {
    /// Wrap a byte sequence, starting at position 0.
    pub fn new(bytes: T) -> Self {
        Self::with_start(bytes, 0)
    }

    /// Wrap a byte sequence, starting at `start`. [`rewind`](Self::rewind) returns here.
    pub fn with_start(bytes: T, start: usize) -> Self {
        Self {
            bytes,
            position: start,
            start,
        }
    }

    /// Current read/write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the read/write position. Bounds are checked on the next access, not here.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// The position this cursor was created at.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Reset the position back to the start.
    pub fn rewind(&mut self) -> &mut Self {
        self.position = self.start;
        self
    }

    pub fn get_ref(&self) -> &T {
        &self.bytes
    }

    pub fn into_inner(self) -> T {
        self.bytes
    }
}

impl<T: AsRef<[u8]>> Cursor<T> {
    /// Total length of the underlying bytes.
    pub fn len(&self) -> usize {
        self.bytes.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position)
    }

    /// Look at the byte under the cursor without moving.
    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.as_ref().get(self.position).copied()
    }

    /// Read one byte. `what` names the field being read, for the error message.
    pub fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        let byte = self
            .peek_u8()
            .ok_or_else(|| Error::format(what, self.position))?;
        self.position += 1;
        Ok(byte)
    }

    /// Advance past `len` bytes, failing if fewer than that remain.
    pub fn skip(&mut self, len: usize, what: &'static str) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::format(what, self.position));
        }
        self.position += len;
        Ok(())
    }
}

impl<'a> Cursor<&'a [u8]> {
    /// Borrow the next `len` bytes straight out of the underlying slice and advance past them.
    pub fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let start = self.position;
        self.skip(len, what)?;
        let bytes: &'a [u8] = self.bytes;
        Ok(&bytes[start..self.position])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Cursor<T> {
    /// Claim the next `len` bytes for writing and advance past them.
    pub fn reserve(&mut self, len: usize, step: &'static str) -> Result<&mut [u8]> {
        let start = self.position;
        if len > self.remaining() {
            return Err(Error::too_small(step, start));
        }
        self.position += len;
        Ok(&mut self.bytes.as_mut()[start..start + len])
    }

    pub fn write_u8(&mut self, byte: u8, step: &'static str) -> Result<()> {
        self.reserve(1, step)?[0] = byte;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8], step: &'static str) -> Result<()> {
        self.reserve(bytes.len(), step)?.copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrite an already-written byte without moving the cursor.
    pub fn patch_u8(&mut self, at: usize, byte: u8, step: &'static str) -> Result<()> {
        let slot = self
            .bytes
            .as_mut()
            .get_mut(at)
            .ok_or_else(|| Error::too_small(step, at))?;
        *slot = byte;
        Ok(())
    }

    /// Shift the `len` bytes starting at `from` right by `by` bytes, opening a gap for a late
    /// prefix. The cursor advances by `by`.
    pub fn shift_right(
        &mut self,
        from: usize,
        len: usize,
        by: usize,
        step: &'static str,
    ) -> Result<()> {
        if by > self.remaining() {
            return Err(Error::too_small(step, self.position));
        }
        self.bytes.as_mut().copy_within(from..from + len, from + by);
        self.position += by;
        Ok(())
    }
}
