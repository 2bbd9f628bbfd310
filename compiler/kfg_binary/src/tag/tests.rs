use super::*;

#[test]
fn plain_tags_have_zero_payload() {
    assert_eq!(Tag::decode(41), (Tag::TrueLiteral, 0));
    assert_eq!(Tag::decode(40), (Tag::DoubleLiteral, 0));
    assert_eq!(Tag::decode(47), (Tag::Rethrow, 0));
}

#[test]
fn specialized_tag_splits_payload() {
    // 144 | 5 => SpecialIntLiteral with payload 5.
    assert_eq!(Tag::decode(0x95), (Tag::SpecialIntLiteral, 5));
    assert_eq!(Tag::decode(0x80), (Tag::SpecializedVariableGet, 0));
    assert_eq!(Tag::decode(0x8F), (Tag::SpecializedVariableSet, 7));
}

#[test]
fn unknown_bytes_are_preserved() {
    assert_eq!(Tag::decode(54), (Tag::Unknown(54), 0));
    assert_eq!(Tag::decode(200), (Tag::Unknown(200), 0));
    assert_eq!(Tag::decode(0x9A), (Tag::Unknown(0x98), 2));
}

#[test]
fn byte_round_trips_for_known_tags() {
    for byte in 0..=u8::MAX {
        let tag = Tag::from_byte(byte);
        assert_eq!(tag.byte(), byte, "tag {tag}");
    }
}

#[test]
fn specialized_classification() {
    assert!(Tag::SpecialIntLiteral.is_specialized());
    assert!(Tag::SpecializedVariableGet.is_specialized());
    assert!(!Tag::PositiveIntLiteral.is_specialized());
}

#[test]
fn display_names() {
    assert_eq!(Tag::Rethrow.to_string(), "Rethrow");
    assert_eq!(Tag::Unknown(3).to_string(), "<unknown tag 3>");
}
