//! Producer side of the binary format.
//!
//! Front-ends and tools emit units through [`BinaryWriter`]; the decoder's
//! tests use it to build streams without hand-assembling bytes.

use crate::{
    BinaryError, Tag, TokenPosition, MAGIC_PROGRAM_FILE, MAX_UINT, SPECIALIZED_PAYLOAD_MASK,
};

/// Append-only encoder for a binary unit.
#[derive(Clone, Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    /// Start a unit: magic header followed by the string pool.
    ///
    /// The node stream begins at [`offset()`](Self::offset) afterwards.
    pub fn with_strings<S: AsRef<str>>(strings: &[S]) -> Result<Self, BinaryError> {
        let mut writer = Self::default();
        writer.buf.extend_from_slice(&MAGIC_PROGRAM_FILE.to_be_bytes());
        writer.write_length(strings.len())?;
        for s in strings {
            let bytes = s.as_ref().as_bytes();
            writer.write_length(bytes.len())?;
            writer.buf.extend_from_slice(bytes);
        }
        Ok(writer)
    }

    /// Offset the next write lands at.
    #[inline]
    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    /// Write a single raw byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Write a variable-length unsigned integer.
    pub fn write_uint(&mut self, value: u32) -> Result<(), BinaryError> {
        if value < 0x80 {
            self.buf.push(to_byte(value));
        } else if value < 0x4000 {
            self.buf.push(to_byte(value >> 8) | 0x80);
            self.buf.push(to_byte(value));
        } else if value <= MAX_UINT {
            self.buf.push(to_byte(value >> 24) | 0xC0);
            self.buf.push(to_byte(value >> 16));
            self.buf.push(to_byte(value >> 8));
            self.buf.push(to_byte(value));
        } else {
            return Err(BinaryError::UnencodableUInt { value });
        }
        Ok(())
    }

    /// Write a list length or byte count.
    pub fn write_length(&mut self, len: usize) -> Result<(), BinaryError> {
        let value = u32::try_from(len).map_err(|_| BinaryError::UnencodableUInt { value: u32::MAX })?;
        self.write_uint(value)
    }

    /// Write a plain tag byte.
    pub fn write_tag(&mut self, tag: Tag) {
        self.buf.push(tag.byte());
    }

    /// Write a specialized tag with an inline payload (0..=7).
    pub fn write_specialized_tag(&mut self, tag: Tag, payload: u8) {
        debug_assert!(tag.is_specialized(), "{tag} carries no payload");
        debug_assert!(
            payload <= SPECIALIZED_PAYLOAD_MASK,
            "payload {payload} does not fit in a specialized tag"
        );
        self.buf.push(tag.byte() | (payload & SPECIALIZED_PAYLOAD_MASK));
    }

    /// Write a source position.
    pub fn write_position(&mut self, position: TokenPosition) -> Result<(), BinaryError> {
        self.write_uint(position.encoded())
    }

    /// Finish the unit and return its bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Low 8 bits of a value.
#[inline]
fn to_byte(value: u32) -> u8 {
    value.to_be_bytes()[3]
}
