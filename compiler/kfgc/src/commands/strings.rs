//! The `strings` command: dump a unit's string pool.

use kfg_flow::{DecodeFault, DecodeSession, SharedUnit};

use super::load_unit;

/// One string-pool entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringEntry {
    pub index: usize,
    /// Offset of the entry's length prefix.
    pub offset: usize,
    pub text: String,
}

/// Read every entry of the unit's string pool.
///
/// Entries that are not UTF-8 are rendered lossily.
pub fn string_table(unit: &SharedUnit) -> Result<Vec<StringEntry>, DecodeFault> {
    let mut session = DecodeSession::new(unit.bytes());
    let count = session.string_count()?;
    (0..count)
        .map(|index| {
            let offset = session.string_table_offset(index)?;
            let bytes = session.string_bytes(index)?;
            Ok(StringEntry {
                index,
                offset,
                text: String::from_utf8_lossy(bytes).into_owned(),
            })
        })
        .collect()
}

/// Print the string pool of the unit at `path`.
pub fn dump_strings(path: &str) {
    let unit = load_unit(path);
    match string_table(&unit) {
        Ok(entries) => {
            for entry in entries {
                println!("{:>5} @{:<6} {:?}", entry.index, entry.offset, entry.text);
            }
        }
        Err(fault) => {
            eprintln!("error: malformed string pool in '{path}': {fault}");
            std::process::exit(1);
        }
    }
}
