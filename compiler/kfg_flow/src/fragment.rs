//! Composable flow-graph fragments.
//!
//! A [`Fragment`] is a straight-line run of [`Instr`]s with one flow-in
//! point (its first instruction) and one flow-out point (its last). Appending
//! fragment `B` to fragment `A` wires `A`'s flow-out to `B`'s flow-in; the
//! result flows in at `A`'s entry and out at `B`'s exit.
//!
//! A fragment that ends in a control transfer (rethrow) is *closed*: it has
//! no flow-out, and anything appended to it is unreachable and dropped.

use std::fmt;
use std::ops::{Add, AddAssign};

use kfg_binary::TokenPosition;
use smallvec::SmallVec;

use crate::{Instance, LocalVariable};

/// A single IR operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// Push a constant object.
    Constant(Instance),
    /// Push an integer constant.
    IntConstant(i64),
    /// Push the value of a local variable.
    LoadLocal(LocalVariable),
    /// Pass the top of stack as the next call argument.
    PushArgument,
    /// Debugger single-step safepoint.
    DebugStepCheck(TokenPosition),
    /// Rethrow the pushed exception and stack trace. Ends control flow.
    RethrowException {
        position: TokenPosition,
        catch_try_index: i32,
    },
    /// Raise a `NoSuchMethodError` at runtime.
    ThrowNoSuchMethodError,
}

impl Instr {
    /// Whether control never falls through this instruction.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Instr::RethrowException { .. })
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Constant(value) => write!(f, "Constant({value})"),
            Instr::IntConstant(value) => write!(f, "IntConstant({value})"),
            Instr::LoadLocal(var) => write!(f, "LoadLocal({var})"),
            Instr::PushArgument => f.write_str("PushArgument"),
            Instr::DebugStepCheck(position) => write!(f, "DebugStepCheck({position})"),
            Instr::RethrowException {
                position,
                catch_try_index,
            } => write!(f, "ReThrow(try_index: {catch_try_index}) {position}"),
            Instr::ThrowNoSuchMethodError => f.write_str("ThrowNoSuchMethodError"),
        }
    }
}

/// Entry/exit run of instructions for one syntactic construct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    instrs: SmallVec<[Instr; 4]>,
    closed: bool,
}

impl Fragment {
    /// An empty, open fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment of one instruction. Closed if the instruction is terminal.
    pub fn single(instr: Instr) -> Self {
        let closed = instr.is_terminal();
        let mut instrs = SmallVec::new();
        instrs.push(instr);
        Self { instrs, closed }
    }

    // Instruction constructors

    pub fn constant(value: Instance) -> Self {
        Self::single(Instr::Constant(value))
    }

    pub fn int_constant(value: i64) -> Self {
        Self::single(Instr::IntConstant(value))
    }

    pub fn load_local(variable: &LocalVariable) -> Self {
        Self::single(Instr::LoadLocal(variable.clone()))
    }

    pub fn push_argument() -> Self {
        Self::single(Instr::PushArgument)
    }

    pub fn debug_step_check(position: TokenPosition) -> Self {
        Self::single(Instr::DebugStepCheck(position))
    }

    pub fn rethrow_exception(position: TokenPosition, catch_try_index: i32) -> Self {
        Self::single(Instr::RethrowException {
            position,
            catch_try_index,
        })
    }

    pub fn throw_no_such_method_error() -> Self {
        Self::single(Instr::ThrowNoSuchMethodError)
    }

    // Shape

    /// The instructions in flow order.
    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Whether more instructions can be appended (it has a flow-out).
    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Flow-in point.
    pub fn entry(&self) -> Option<&Instr> {
        self.instrs.first()
    }

    /// Flow-out point; `None` when empty or closed.
    pub fn exit(&self) -> Option<&Instr> {
        if self.closed {
            None
        } else {
            self.instrs.last()
        }
    }

    /// The instruction control flows to after the one at `index`.
    pub fn successor(&self, index: usize) -> Option<&Instr> {
        self.instrs.get(index + 1)
    }

    /// Mark the fragment as having no flow-out.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Append `other` after this fragment's flow-out.
    ///
    /// Appending to a closed fragment drops `other` (it is unreachable).
    pub fn append(&mut self, other: Fragment) {
        if self.closed {
            return;
        }
        self.instrs.extend(other.instrs);
        self.closed = other.closed;
    }
}

impl AddAssign for Fragment {
    fn add_assign(&mut self, other: Fragment) {
        self.append(other);
    }
}

impl Add for Fragment {
    type Output = Fragment;

    fn add(mut self, other: Fragment) -> Fragment {
        self.append(other);
        self
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instrs.iter().enumerate() {
            writeln!(f, "  {i:>3}: {instr}")?;
        }
        if self.closed {
            f.write_str("  (closed)\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
