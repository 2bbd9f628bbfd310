//! Lazily-built index from string ordinal to byte offset.
//!
//! The string pool is a length-prefixed sequence of length-prefixed entries.
//! Decoding all of it up front is wasted work when a function body touches a
//! handful of strings, so the index is extended on demand:
//!
//! - The first query reads the pool length and records entry 0's offset.
//! - A query for an already-recorded entry is a plain array lookup.
//! - A query beyond the recorded prefix resumes scanning from the last
//!   recorded entry and stops at the requested one.
//!
//! Total scanning over a session is therefore linear in the highest index
//! ever requested, regardless of query order.

use crate::{BinaryError, Cursor, STRING_TABLE_OFFSET};

/// Session-local string-table offset index.
///
/// Not shared across tasks; each decode session builds its own.
#[derive(Clone, Debug, Default)]
pub struct StringTableIndex {
    /// Start offset of every entry recorded so far (`offsets.len()` entries).
    offsets: Vec<usize>,
    /// Number of entries in the pool, once the header has been read.
    size: Option<usize>,
    /// Entries whose length prefix has been decoded and skipped.
    scanned: usize,
}

impl StringTableIndex {
    /// Create an empty index. Nothing is read until the first query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the pool, if the header has been read.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    /// Number of entries whose offset is known.
    pub fn entries_read(&self) -> usize {
        self.offsets.len()
    }

    /// Number of entries skipped over while extending the index.
    ///
    /// Never exceeds the pool size: each entry is scanned at most once.
    pub fn entries_scanned(&self) -> usize {
        self.scanned
    }

    /// Byte offset of entry `index` (pointing at its length prefix).
    ///
    /// The cursor is restored to its original offset before returning.
    pub fn offset_of(&mut self, cursor: &mut Cursor<'_>, index: usize) -> Result<usize, BinaryError> {
        if let Some(&offset) = self.offsets.get(index) {
            return Ok(offset);
        }

        let saved = cursor.offset();
        let result = self.extend_to(cursor, index);
        cursor.set_offset(saved);
        result
    }

    fn extend_to(&mut self, cursor: &mut Cursor<'_>, index: usize) -> Result<usize, BinaryError> {
        let size = match self.size {
            Some(size) => size,
            None => {
                cursor.set_offset(STRING_TABLE_OFFSET);
                let size = cursor.try_read_list_length()?;
                // Every entry takes at least one byte, so a header claiming
                // more entries than there are bytes left is not trusted.
                let remaining = cursor.buffer().len().saturating_sub(cursor.offset());
                self.offsets.reserve_exact(size.min(remaining));
                self.size = Some(size);
                if size > 0 {
                    self.offsets.push(cursor.offset());
                }
                size
            }
        };

        if index >= size {
            return Err(BinaryError::StringIndexOutOfRange { index, size });
        }

        // Resume from the last recorded entry.
        let Some(&last) = self.offsets.last() else {
            return Err(BinaryError::StringIndexOutOfRange { index, size });
        };
        cursor.set_offset(last);
        while self.offsets.len() <= index {
            let len = cursor.try_read_list_length()?;
            cursor.try_skip(len)?;
            self.scanned += 1;
            self.offsets.push(cursor.offset());
        }

        tracing::trace!(
            index,
            entries_read = self.offsets.len(),
            size,
            "extended string table index"
        );
        Ok(self.offsets[index])
    }

    /// Raw bytes of entry `index`.
    ///
    /// The cursor is restored to its original offset before returning.
    pub fn bytes_at<'a>(
        &mut self,
        cursor: &mut Cursor<'a>,
        index: usize,
    ) -> Result<&'a [u8], BinaryError> {
        let offset = self.offset_of(cursor, index)?;
        let saved = cursor.offset();
        cursor.set_offset(offset);
        let result = cursor
            .try_read_list_length()
            .and_then(|len| cursor.try_read_bytes(len));
        cursor.set_offset(saved);
        result
    }
}
