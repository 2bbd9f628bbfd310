//! Node tags of the binary format.
//!
//! Every node in the stream starts with one tag byte. Bytes with the high bit
//! set are *specialized* tags: the upper five bits select the tag and the low
//! three bits carry a small inline payload (a variable slot, or a biased
//! small integer).
//!
//! | Byte           | Meaning                                  |
//! |----------------|------------------------------------------|
//! | `0x00..=0x7F`  | Plain tag, payload 0                     |
//! | `0x80..=0xFF`  | `byte & 0xF8` is the tag, `byte & 0x07` is the payload |

use std::fmt;

/// High bit marking a specialized tag byte.
pub const SPECIALIZED_TAG_HIGH_BIT: u8 = 0x80;

/// Mask selecting the tag part of a specialized tag byte.
pub const SPECIALIZED_TAG_MASK: u8 = 0xF8;

/// Mask selecting the inline payload of a specialized tag byte.
pub const SPECIALIZED_PAYLOAD_MASK: u8 = 0x07;

/// Bias subtracted from a [`Tag::SpecialIntLiteral`] payload (covers -3..=4).
pub const SPECIALIZED_INT_LITERAL_BIAS: i64 = 3;

macro_rules! define_tags {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)*) => {
        /// Discriminant of a node in the binary stream.
        ///
        /// The enumeration covers the whole expression tag set of the format.
        /// Bytes that name no known tag decode as [`Tag::Unknown`] rather than
        /// failing, so the dispatcher can report them with their offset.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Tag {
            $($(#[$doc])* $name,)*
            /// A byte that names no tag in this format version.
            Unknown(u8),
        }

        impl Tag {
            /// Map a (masked) tag byte to its tag.
            pub const fn from_byte(byte: u8) -> Tag {
                match byte {
                    $($value => Tag::$name,)*
                    other => Tag::Unknown(other),
                }
            }

            /// The tag byte (without payload bits).
            pub const fn byte(self) -> u8 {
                match self {
                    $(Tag::$name => $value,)*
                    Tag::Unknown(byte) => byte,
                }
            }
        }
    };
}

define_tags! {
    DirectPropertyGet = 15,
    DirectPropertySet = 16,
    DirectMethodInvocation = 17,
    ConstStaticInvocation = 18,
    /// Deliberately erroneous construct (e.g. a malformed annotation).
    InvalidExpression = 19,
    VariableGet = 20,
    VariableSet = 21,
    PropertyGet = 22,
    PropertySet = 23,
    SuperPropertyGet = 24,
    SuperPropertySet = 25,
    StaticGet = 26,
    StaticSet = 27,
    MethodInvocation = 28,
    SuperMethodInvocation = 29,
    StaticInvocation = 30,
    ConstructorInvocation = 31,
    ConstConstructorInvocation = 32,
    Not = 33,
    LogicalExpression = 34,
    ConditionalExpression = 35,
    StringConcatenation = 36,
    IsExpression = 37,
    AsExpression = 38,
    /// `UInt` string index; decodes to a symbol.
    StringLiteral = 39,
    /// `UInt` string index of the decimal text.
    DoubleLiteral = 40,
    TrueLiteral = 41,
    FalseLiteral = 42,
    NullLiteral = 43,
    SymbolLiteral = 44,
    TypeLiteral = 45,
    ThisExpression = 46,
    /// Source position, then nothing.
    Rethrow = 47,
    Throw = 48,
    ListLiteral = 49,
    MapLiteral = 50,
    AwaitExpression = 51,
    FunctionExpression = 52,
    Let = 53,
    PositiveIntLiteral = 55,
    NegativeIntLiteral = 56,
    BigIntLiteral = 57,
    ConstListLiteral = 58,
    ConstMapLiteral = 59,
    SpecializedVariableGet = 128,
    SpecializedVariableSet = 136,
    /// Payload minus [`SPECIALIZED_INT_LITERAL_BIAS`] is the value.
    SpecialIntLiteral = 144,
}

impl Tag {
    /// Split a raw tag byte into its tag and inline payload.
    #[inline]
    pub const fn decode(byte: u8) -> (Tag, u8) {
        if byte & SPECIALIZED_TAG_HIGH_BIT != 0 {
            (
                Tag::from_byte(byte & SPECIALIZED_TAG_MASK),
                byte & SPECIALIZED_PAYLOAD_MASK,
            )
        } else {
            (Tag::from_byte(byte), 0)
        }
    }

    /// Whether this tag carries an inline payload in its low bits.
    #[inline]
    pub const fn is_specialized(self) -> bool {
        self.byte() & SPECIALIZED_TAG_HIGH_BIT != 0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Unknown(byte) => write!(f, "<unknown tag {byte}>"),
            known => write!(f, "{known:?}"),
        }
    }
}

#[cfg(test)]
mod tests;
