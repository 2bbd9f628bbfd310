//! Session-local read state: one cursor and one string-table index.

use kfg_binary::{Cursor, StringTableIndex, Tag, TokenPosition, STRING_TABLE_OFFSET};

use crate::DecodeFault;

/// Read state for decoding function bodies from one unit.
///
/// A session is owned by a single compiler task and never shared. The
/// string-table index it builds is kept for the session's lifetime, so
/// repeated lookups of the same strings are array reads.
#[derive(Clone, Debug)]
pub struct DecodeSession<'a> {
    cursor: Cursor<'a>,
    strings: StringTableIndex,
}

impl<'a> DecodeSession<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            strings: StringTableIndex::new(),
        }
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn strings(&self) -> &StringTableIndex {
        &self.strings
    }

    // Cursor pass-throughs

    #[inline]
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        self.cursor.set_offset(offset);
    }

    #[inline]
    pub fn read_tag(&mut self) -> Result<(Tag, u8), DecodeFault> {
        Ok(self.cursor.try_read_tag()?)
    }

    #[inline]
    pub fn read_uint(&mut self) -> Result<u32, DecodeFault> {
        Ok(self.cursor.try_read_uint()?)
    }

    #[inline]
    pub fn read_position(&mut self, record: bool) -> Result<TokenPosition, DecodeFault> {
        Ok(self.cursor.try_read_position(record)?)
    }

    // Strings

    /// Byte offset of string `index` in the pool.
    pub fn string_table_offset(&mut self, index: usize) -> Result<usize, DecodeFault> {
        Ok(self.strings.offset_of(&mut self.cursor, index)?)
    }

    /// Raw bytes of string `index`. The cursor is left where it was.
    pub fn string_bytes(&mut self, index: usize) -> Result<&'a [u8], DecodeFault> {
        Ok(self.strings.bytes_at(&mut self.cursor, index)?)
    }

    /// String `index` as UTF-8 text. The cursor is left where it was.
    pub fn string(&mut self, index: usize) -> Result<&'a str, DecodeFault> {
        let bytes = self.string_bytes(index)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeFault::InvalidUtf8 { index })
    }

    /// Number of entries in the string pool. The cursor is left where it was.
    pub fn string_count(&mut self) -> Result<usize, DecodeFault> {
        if let Some(size) = self.strings.size() {
            return Ok(size);
        }
        let saved = self.cursor.offset();
        self.cursor.set_offset(STRING_TABLE_OFFSET);
        let size = self.cursor.try_read_list_length();
        self.cursor.set_offset(saved);
        Ok(size?)
    }

    /// Offset of the first node after the string pool.
    pub fn node_stream_start(&mut self) -> Result<usize, DecodeFault> {
        let count = self.string_count()?;
        let saved = self.cursor.offset();
        let end = self.end_of_pool(count);
        self.cursor.set_offset(saved);
        end
    }

    fn end_of_pool(&mut self, count: usize) -> Result<usize, DecodeFault> {
        match count.checked_sub(1) {
            None => {
                self.cursor.set_offset(STRING_TABLE_OFFSET);
                self.cursor.try_read_list_length()?;
            }
            Some(last) => {
                let offset = self.strings.offset_of(&mut self.cursor, last)?;
                self.cursor.set_offset(offset);
                let len = self.cursor.try_read_list_length()?;
                self.cursor.try_skip(len)?;
            }
        }
        Ok(self.cursor.offset())
    }
}
