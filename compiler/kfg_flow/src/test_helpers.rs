//! Shared test utilities: encoding small units and wrapping them in
//! function contexts. Only compiled in test builds.

use kfg_binary::{BinaryWriter, Tag, TokenPosition};

use crate::{CompilationUnit, FunctionKind, ParsedFunction, SharedUnit};

/// One encodable node.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Node {
    True,
    False,
    Null,
    This,
    Invalid,
    PositiveInt(u32),
    NegativeInt(u32),
    /// Raw specialized payload (value + 3).
    SmallInt(u8),
    /// String-pool index of the literal text.
    Double(u32),
    /// String-pool index of the literal text.
    Str(u32),
    Rethrow(TokenPosition),
    /// A bare tag byte.
    Raw(u8),
}

fn write_node(writer: &mut BinaryWriter, node: Node) {
    match node {
        Node::True => writer.write_tag(Tag::TrueLiteral),
        Node::False => writer.write_tag(Tag::FalseLiteral),
        Node::Null => writer.write_tag(Tag::NullLiteral),
        Node::This => writer.write_tag(Tag::ThisExpression),
        Node::Invalid => writer.write_tag(Tag::InvalidExpression),
        Node::PositiveInt(value) => {
            writer.write_tag(Tag::PositiveIntLiteral);
            writer.write_uint(value).unwrap();
        }
        Node::NegativeInt(value) => {
            writer.write_tag(Tag::NegativeIntLiteral);
            writer.write_uint(value).unwrap();
        }
        Node::SmallInt(payload) => writer.write_specialized_tag(Tag::SpecialIntLiteral, payload),
        Node::Double(index) => {
            writer.write_tag(Tag::DoubleLiteral);
            writer.write_uint(index).unwrap();
        }
        Node::Str(index) => {
            writer.write_tag(Tag::StringLiteral);
            writer.write_uint(index).unwrap();
        }
        Node::Rethrow(position) => {
            writer.write_tag(Tag::Rethrow);
            writer.write_position(position).unwrap();
        }
        Node::Raw(byte) => writer.write_byte(byte),
    }
}

/// Encode a unit and return it with the offset of each node.
pub(crate) fn unit(strings: &[&str], nodes: &[Node]) -> (SharedUnit, Vec<usize>) {
    let mut writer = BinaryWriter::with_strings(strings).unwrap();
    let mut offsets = Vec::with_capacity(nodes.len());
    for &node in nodes {
        offsets.push(writer.offset());
        write_node(&mut writer, node);
    }
    let unit = CompilationUnit::new("test.dill", writer.finish()).unwrap();
    (unit, offsets)
}

/// A regular function in `unit`.
pub(crate) fn function(unit: &SharedUnit) -> ParsedFunction {
    ParsedFunction::new("f", FunctionKind::Regular, unit.clone())
}

/// A function of a specific kind in `unit`.
pub(crate) fn function_of_kind(unit: &SharedUnit, kind: FunctionKind) -> ParsedFunction {
    ParsedFunction::new("g", kind, unit.clone())
}
