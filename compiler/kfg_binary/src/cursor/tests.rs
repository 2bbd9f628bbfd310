use pretty_assertions::assert_eq;

use super::*;
use crate::BinaryWriter;

#[test]
fn reads_one_byte_uint() {
    let mut cursor = Cursor::new(&[0x2A]);
    assert_eq!(cursor.read_uint(), 42);
    assert_eq!(cursor.offset(), 1);
    assert!(cursor.is_at_end());
}

#[test]
fn reads_two_byte_uint() {
    let mut cursor = Cursor::new(&[0x81, 0x00]);
    assert_eq!(cursor.read_uint(), 256);
    assert_eq!(cursor.offset(), 2);
}

#[test]
fn reads_four_byte_uint() {
    let mut cursor = Cursor::new(&[0xC0, 0x01, 0x00, 0x00]);
    assert_eq!(cursor.read_uint(), 0x1_0000);
    assert_eq!(cursor.offset(), 4);
}

#[test]
fn truncated_uint_is_out_of_bounds() {
    let mut cursor = Cursor::new(&[0xC0, 0x01]);
    assert_eq!(
        cursor.try_read_uint(),
        Err(BinaryError::OutOfBounds {
            offset: 0,
            needed: 4,
            len: 2
        })
    );
    // A failed read does not move the cursor.
    assert_eq!(cursor.offset(), 0);
}

#[test]
#[should_panic(expected = "malformed binary stream")]
fn fatal_read_panics() {
    let mut cursor = Cursor::new(&[]);
    cursor.read_tag();
}

#[test]
fn tag_read_advances_one_byte() {
    let mut cursor = Cursor::new(&[0x93, 0x2A]);
    assert_eq!(cursor.read_tag(), (Tag::SpecialIntLiteral, 3));
    assert_eq!(cursor.offset(), 1);
}

#[test]
fn seek_and_rewind() {
    let mut cursor = Cursor::new(&[1, 2, 3, 4]);
    cursor.set_offset(3);
    assert_eq!(cursor.try_read_byte(), Ok(4));
    cursor.try_rewind(1).unwrap();
    assert_eq!(cursor.offset(), 3);
    assert!(cursor.try_rewind(10).is_err());
    assert_eq!(cursor.offset(), 3);
}

#[test]
fn seeking_past_end_fails_on_next_read() {
    let mut cursor = Cursor::new(&[1]);
    cursor.set_offset(5);
    assert!(matches!(
        cursor.try_read_byte(),
        Err(BinaryError::OutOfBounds { offset: 5, .. })
    ));
}

#[test]
fn skip_checks_bounds() {
    let mut cursor = Cursor::new(&[0; 3]);
    cursor.skip(2);
    assert_eq!(cursor.offset(), 2);
    assert!(cursor.try_skip(2).is_err());
    assert_eq!(cursor.offset(), 2);
}

#[test]
fn position_decoding() {
    let mut cursor = Cursor::new(&[0x00, 0x0B]);
    assert_eq!(cursor.read_position(false), TokenPosition::NO_SOURCE);
    assert_eq!(cursor.read_position(false), TokenPosition::new(10));
    assert_eq!(cursor.recorded_range(), None);
}

#[test]
fn recorded_positions_widen_range() {
    let mut cursor = Cursor::new(&[0x15, 0x00, 0x06, 0x64]);
    cursor.read_position(true);
    cursor.read_position(true);
    cursor.read_position(true);
    assert_eq!(
        cursor.recorded_range(),
        Some((TokenPosition::new(5), TokenPosition::new(20)))
    );
    // Unrecorded reads leave the range alone.
    cursor.read_position(false);
    assert_eq!(
        cursor.recorded_range(),
        Some((TokenPosition::new(5), TokenPosition::new(20)))
    );
}

#[test]
fn magic_validation() {
    let bytes = BinaryWriter::with_strings::<&str>(&[]).unwrap().finish();
    let mut cursor = Cursor::new(&bytes);
    assert_eq!(cursor.try_read_magic(), Ok(()));
    assert_eq!(cursor.offset(), 4);

    let mut bad = Cursor::new(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(
        bad.try_read_magic(),
        Err(BinaryError::BadMagic { found: 0xDEAD_BEEF })
    );
}

#[test]
fn read_bytes_borrows_buffer() {
    let buf = [3, b'a', b'b', b'c'];
    let mut cursor = Cursor::new(&buf);
    let len = cursor.read_list_length();
    assert_eq!(cursor.try_read_bytes(len), Ok(&b"abc"[..]));
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn uint_written_is_uint_read(value in 0u32..=crate::MAX_UINT) {
            let mut writer = BinaryWriter::default();
            writer.write_uint(value).unwrap();
            let bytes = writer.finish();
            let mut cursor = Cursor::new(&bytes);
            prop_assert_eq!(cursor.try_read_uint(), Ok(value));
            prop_assert!(cursor.is_at_end());
        }
    }
}
