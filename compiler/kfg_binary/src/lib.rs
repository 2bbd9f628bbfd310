//! Binary kernel format layer.
//!
//! This crate reads the compact, tag-prefixed binary IR produced by the
//! front-end. It has no knowledge of flow graphs or constants; it only knows
//! how bytes map to tags, integers, positions and strings.
//!
//! # Layout of a unit
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────┬──────────────┐
//! │ magic (4B) │ string pool: UInt n, n × (UInt, raw) │ node stream  │
//! └────────────┴──────────────────────────────────────┴──────────────┘
//! ```
//!
//! # Pieces
//!
//! - [`Cursor`]: absolute-offset reader over one immutable buffer
//! - [`Tag`]: node discriminant, with inline payloads for specialized tags
//! - [`StringTableIndex`]: lazily-extended map from string index to offset
//! - [`BinaryWriter`]: producer side of the format (front-ends, tests, tools)
//!
//! The input is trusted: every reader has a `try_*` form returning
//! [`BinaryError`] and a plain form that treats the error as a fatal fault.

mod cursor;
mod error;
mod position;
mod string_table;
mod tag;
mod writer;

pub use cursor::Cursor;
pub use error::BinaryError;
pub use position::TokenPosition;
pub use string_table::StringTableIndex;
pub use tag::{
    Tag, SPECIALIZED_INT_LITERAL_BIAS, SPECIALIZED_PAYLOAD_MASK, SPECIALIZED_TAG_HIGH_BIT,
    SPECIALIZED_TAG_MASK,
};
pub use writer::BinaryWriter;

/// Magic number at offset 0 of every program file.
pub const MAGIC_PROGRAM_FILE: u32 = 0x90AB_CDEF;

/// Offset of the string pool: immediately after the 4-byte magic.
pub const STRING_TABLE_OFFSET: usize = 4;

/// Largest value a `UInt` can carry (30 bits).
pub const MAX_UINT: u32 = 0x3FFF_FFFF;
