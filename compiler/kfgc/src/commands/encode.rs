//! The `encode-demo` command: write a small unit to try the decoder on.

use kfg_binary::{BinaryError, BinaryWriter, Tag, TokenPosition};

const DEMO_STRINGS: [&str; 3] = ["main", "3.14", "hello"];

/// Encode the demo unit; returns its bytes and the offset of each node.
///
/// The unit holds one node of each supported literal kind, the same double
/// literal at two offsets, and a rethrow (decode it with `--catch=<n>`).
pub fn demo_unit() -> Result<(Vec<u8>, Vec<usize>), BinaryError> {
    let mut writer = BinaryWriter::with_strings(&DEMO_STRINGS)?;
    let mut offsets = Vec::new();

    offsets.push(writer.offset());
    writer.write_tag(Tag::TrueLiteral);

    offsets.push(writer.offset());
    writer.write_tag(Tag::PositiveIntLiteral);
    writer.write_uint(42)?;

    offsets.push(writer.offset());
    writer.write_tag(Tag::NegativeIntLiteral);
    writer.write_uint(1000)?;

    offsets.push(writer.offset());
    writer.write_specialized_tag(Tag::SpecialIntLiteral, 5);

    for _ in 0..2 {
        offsets.push(writer.offset());
        writer.write_tag(Tag::DoubleLiteral);
        writer.write_uint(1)?;
    }

    offsets.push(writer.offset());
    writer.write_tag(Tag::StringLiteral);
    writer.write_uint(2)?;

    offsets.push(writer.offset());
    writer.write_tag(Tag::NullLiteral);

    offsets.push(writer.offset());
    writer.write_tag(Tag::Rethrow);
    writer.write_position(TokenPosition::new(17))?;

    Ok((writer.finish(), offsets))
}

/// Write the demo unit to `path` and print its node offsets.
pub fn encode_demo(path: &str) {
    let (bytes, offsets) = match demo_unit() {
        Ok(unit) => unit,
        Err(error) => {
            eprintln!("error: cannot encode demo unit: {error}");
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(path, &bytes) {
        eprintln!("error writing '{path}': {e}");
        std::process::exit(1);
    }
    println!("wrote {} bytes to '{path}'", bytes.len());
    let offsets: Vec<String> = offsets.iter().map(ToString::to_string).collect();
    println!("node offsets: {}", offsets.join(" "));
}
