//! Errors raised while reading or writing the binary format.

use thiserror::Error;

/// A read or write that the binary format cannot satisfy.
///
/// Readers treat these as fatal: the stream is produced by a cooperating
/// front-end, so hitting one means a format mismatch or a decoder bug.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// A read would run past the end of the buffer.
    #[error("read of {needed} byte(s) at offset {offset} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// The buffer does not start with the program-file magic.
    #[error("bad magic number 0x{found:08X} (expected 0x90ABCDEF)")]
    BadMagic { found: u32 },

    /// A string index at or beyond the pool size.
    #[error("string index {index} out of range (string table has {size} entries)")]
    StringIndexOutOfRange { index: usize, size: usize },

    /// A value too large for the 30-bit variable-length encoding.
    #[error("value {value} (0x{value:X}) does not fit in a variable-length UInt")]
    UnencodableUInt { value: u32 },
}
