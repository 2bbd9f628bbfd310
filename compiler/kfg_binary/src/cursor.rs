//! Absolute-offset cursor over one immutable binary buffer.
//!
//! The cursor owns nothing but its position: the buffer is borrowed for the
//! lifetime of a decode session and shared with every other reader of the
//! same unit. Callers that reposition the cursor for a nested read save
//! [`offset()`](Cursor::offset) first and restore it with
//! [`set_offset()`](Cursor::set_offset) afterwards.
//!
//! # Fallibility
//!
//! Every read has a `try_*` form returning [`BinaryError`]. The plain forms
//! panic with the error message: the stream is trusted, so an out-of-range
//! read is an internal compiler fault rather than a user error.

use crate::{BinaryError, Tag, TokenPosition, MAGIC_PROGRAM_FILE};

/// Reader over a binary unit, positioned at an absolute byte offset.
///
/// The cursor is [`Clone`], so a nested reader can work on a copy instead of
/// saving and restoring the position.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
    /// Smallest real position read with `record = true`.
    min_position: TokenPosition,
    /// Largest real position read with `record = true`.
    max_position: TokenPosition,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            min_position: TokenPosition::NO_SOURCE,
            max_position: TokenPosition::NO_SOURCE,
        }
    }

    /// The underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Current absolute offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move to an absolute offset.
    ///
    /// Seeking is unchecked; the next read reports an out-of-range offset.
    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Whether the cursor has consumed the whole buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.buf.len()
    }

    fn check(&self, needed: usize) -> Result<(), BinaryError> {
        match self.offset.checked_add(needed) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(BinaryError::OutOfBounds {
                offset: self.offset,
                needed,
                len: self.buf.len(),
            }),
        }
    }

    // Fallible reads

    /// Read one byte.
    #[inline]
    pub fn try_read_byte(&mut self) -> Result<u8, BinaryError> {
        self.check(1)?;
        let byte = self.buf[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    /// Read `len` raw bytes, borrowing them from the buffer.
    pub fn try_read_bytes(&mut self, len: usize) -> Result<&'a [u8], BinaryError> {
        self.check(len)?;
        let bytes = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// Read a fixed-width big-endian `u32`.
    pub fn try_read_u32(&mut self) -> Result<u32, BinaryError> {
        let bytes = self.try_read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a prefix-coded variable-length unsigned integer.
    ///
    /// | First byte   | Width   | Value bits |
    /// |--------------|---------|------------|
    /// | `0xxxxxxx`   | 1 byte  | 7          |
    /// | `10xxxxxx`   | 2 bytes | 14         |
    /// | `11xxxxxx`   | 4 bytes | 30         |
    pub fn try_read_uint(&mut self) -> Result<u32, BinaryError> {
        self.check(1)?;
        let byte0 = self.buf[self.offset];
        if byte0 & 0x80 == 0 {
            self.offset += 1;
            Ok(u32::from(byte0))
        } else if byte0 & 0xC0 == 0x80 {
            let bytes = self.try_read_bytes(2)?;
            Ok((u32::from(bytes[0] & !0x80) << 8) | u32::from(bytes[1]))
        } else {
            let bytes = self.try_read_bytes(4)?;
            Ok((u32::from(bytes[0] & !0xC0) << 24)
                | (u32::from(bytes[1]) << 16)
                | (u32::from(bytes[2]) << 8)
                | u32::from(bytes[3]))
        }
    }

    /// Read a list length (a `UInt`).
    #[inline]
    pub fn try_read_list_length(&mut self) -> Result<usize, BinaryError> {
        self.try_read_uint().map(|len| len as usize)
    }

    /// Read a tag byte, splitting off the inline payload of specialized tags.
    #[inline]
    pub fn try_read_tag(&mut self) -> Result<(Tag, u8), BinaryError> {
        self.try_read_byte().map(Tag::decode)
    }

    /// Read a source position.
    ///
    /// With `record`, real positions widen the recorded position range
    /// returned by [`recorded_range`](Self::recorded_range).
    pub fn try_read_position(&mut self, record: bool) -> Result<TokenPosition, BinaryError> {
        let position = TokenPosition::from_encoded(self.try_read_uint()?);
        if record {
            self.record_position(position);
        }
        Ok(position)
    }

    /// Advance past `len` bytes without reading them.
    pub fn try_skip(&mut self, len: usize) -> Result<(), BinaryError> {
        self.check(len)?;
        self.offset += len;
        Ok(())
    }

    /// Step back `len` bytes (e.g. to un-read a tag before delegating).
    pub fn try_rewind(&mut self, len: usize) -> Result<(), BinaryError> {
        match self.offset.checked_sub(len) {
            Some(offset) => {
                self.offset = offset;
                Ok(())
            }
            None => Err(BinaryError::OutOfBounds {
                offset: self.offset,
                needed: len,
                len: self.buf.len(),
            }),
        }
    }

    /// Read and validate the program-file magic at offset 0.
    ///
    /// Leaves the cursor at the start of the string pool.
    pub fn try_read_magic(&mut self) -> Result<(), BinaryError> {
        self.offset = 0;
        let found = self.try_read_u32()?;
        if found == MAGIC_PROGRAM_FILE {
            Ok(())
        } else {
            Err(BinaryError::BadMagic { found })
        }
    }

    // Fatal reads

    /// Read a `UInt`. Panics on a malformed stream.
    #[inline]
    pub fn read_uint(&mut self) -> u32 {
        self.try_read_uint().unwrap_or_else(|e| fatal(&e))
    }

    /// Read a list length. Panics on a malformed stream.
    #[inline]
    pub fn read_list_length(&mut self) -> usize {
        self.try_read_list_length().unwrap_or_else(|e| fatal(&e))
    }

    /// Read a tag and its payload. Panics on a malformed stream.
    #[inline]
    pub fn read_tag(&mut self) -> (Tag, u8) {
        self.try_read_tag().unwrap_or_else(|e| fatal(&e))
    }

    /// Read a source position. Panics on a malformed stream.
    #[inline]
    pub fn read_position(&mut self, record: bool) -> TokenPosition {
        self.try_read_position(record).unwrap_or_else(|e| fatal(&e))
    }

    /// Skip `len` bytes. Panics if that leaves the buffer.
    #[inline]
    pub fn skip(&mut self, len: usize) {
        self.try_skip(len).unwrap_or_else(|e| fatal(&e));
    }

    // Position recording

    fn record_position(&mut self, position: TokenPosition) {
        if !position.is_real() {
            return;
        }
        if !self.min_position.is_real() || position < self.min_position {
            self.min_position = position;
        }
        if position > self.max_position {
            self.max_position = position;
        }
    }

    /// The `(min, max)` range of positions read with `record = true`, if any.
    pub fn recorded_range(&self) -> Option<(TokenPosition, TokenPosition)> {
        if self.min_position.is_real() {
            Some((self.min_position, self.max_position))
        } else {
            None
        }
    }
}

#[cold]
#[inline(never)]
fn fatal(error: &BinaryError) -> ! {
    panic!("malformed binary stream: {error}")
}

#[cfg(test)]
mod tests;
