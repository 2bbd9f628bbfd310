//! Source positions carried in the node stream.

use std::fmt;

/// A token position in the source text.
///
/// Encoded in the stream as `position + 1`, so that `0` can stand for
/// [`TokenPosition::NO_SOURCE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TokenPosition(i32);

impl TokenPosition {
    /// No source position is associated with the node.
    pub const NO_SOURCE: TokenPosition = TokenPosition(-1);

    /// Create a position from a raw source offset.
    #[inline]
    pub const fn new(value: i32) -> Self {
        TokenPosition(value)
    }

    /// Decode the stream form (`position + 1`).
    #[inline]
    pub fn from_encoded(encoded: u32) -> Self {
        // Encoded values are at most 30 bits, so the subtraction cannot wrap.
        #[expect(
            clippy::cast_possible_wrap,
            reason = "UInt values are bounded by MAX_UINT (30 bits)"
        )]
        let value = encoded as i32;
        TokenPosition(value - 1)
    }

    /// The stream form of this position.
    #[inline]
    pub fn encoded(self) -> u32 {
        // NO_SOURCE (-1) encodes as 0; every other value is non-negative.
        self.0.wrapping_add(1).unsigned_abs()
    }

    /// Raw value (`-1` for no source).
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Whether this refers to an actual location in source.
    #[inline]
    pub const fn is_real(self) -> bool {
        self.0 >= 0
    }
}

impl Default for TokenPosition {
    fn default() -> Self {
        TokenPosition::NO_SOURCE
    }
}

impl fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_real() {
            write!(f, "@{}", self.0)
        } else {
            f.write_str("@none")
        }
    }
}
