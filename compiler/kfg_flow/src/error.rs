//! Faults raised while decoding a node.

use kfg_binary::{BinaryError, Tag};
use thiserror::Error;

/// A decode that cannot produce a fragment or value.
///
/// Every variant is fatal for the current decode call: the stream is trusted,
/// so a fault means an incomplete decoder, a producer/consumer format
/// mismatch, or a caller passing the wrong scope context. Nothing here is
/// retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeFault {
    /// The underlying byte stream could not be read.
    #[error(transparent)]
    Read(#[from] BinaryError),

    /// A tag outside the subset this decoder supports.
    #[error("unsupported tag {tag} at offset {offset}")]
    UnsupportedTag { tag: Tag, offset: usize },

    /// The constant evaluator was pointed at a non-constant node.
    #[error("tag {tag} at offset {offset} is not a constant expression")]
    NotConstant { tag: Tag, offset: usize },

    /// A double literal whose text does not parse.
    #[error("string {index} is not a valid double literal: {text:?}")]
    MalformedDouble { index: usize, text: String },

    /// A string-table entry that is not UTF-8.
    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    /// `this` in a function whose scope has no receiver.
    #[error("`this` used in a function without a receiver variable")]
    MissingReceiver,

    /// `rethrow` outside of any catch block.
    #[error("rethrow outside of a catch block")]
    NoCatchBlock,
}
