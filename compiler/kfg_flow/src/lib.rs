//! Streaming flow-graph construction from the binary kernel format.
//!
//! Given a compilation unit's bytes and an offset, the
//! [`StreamingFlowGraphBuilder`] reads one node and produces a composable
//! [`Fragment`] of IR instructions. Nodes that are always constant are handed
//! to the [`ConstantEvaluator`], which memoizes results per unit in an
//! offset-keyed [`ConstantCache`] shared by every compiler task working on
//! that unit.
//!
//! # Sharing model
//!
//! ```text
//!   task A (mutator)              task B (background)
//!   ┌──────────────────┐          ┌──────────────────┐
//!   │ DecodeSession    │          │ DecodeSession    │   session-local:
//!   │  Cursor          │          │  Cursor          │   cursor + string index
//!   │  StringTableIndex│          │  StringTableIndex│
//!   └────────┬─────────┘          └────────┬─────────┘
//!            │ read/write                  │ read only
//!            └──────────► SharedUnit ◄─────┘
//!                          bytes (immutable)
//!                          ConstantCache (copy-on-write snapshots)
//! ```
//!
//! Ambient state (current thread, current isolate) is replaced by explicit
//! context: [`CompilerTask`] says who is compiling, [`ParsedFunction`] says
//! what, and a [`Canonicalize`] implementation deduplicates values.

mod builder;
mod constant_eval;
mod error;
mod fragment;
mod scope;
mod session;
mod task;
mod unit;
mod value;

pub use builder::StreamingFlowGraphBuilder;
pub use constant_eval::ConstantEvaluator;
pub use error::DecodeFault;
pub use fragment::{Fragment, Instr};
pub use scope::{CatchBlock, FunctionKind, LocalVariable, ParsedFunction, ScopeBuildingResult};
pub use session::DecodeSession;
pub use task::{CompilerStats, CompilerTask, TaskKind};
pub use unit::{CompilationUnit, ConstantCache, ConstantsMap, SharedUnit};
pub use value::{CanonicalTable, Canonicalize, ConstValue, Instance};

#[cfg(test)]
mod test_helpers;
