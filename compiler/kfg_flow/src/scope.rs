//! Scope-resolution results and function metadata consumed by the builder.
//!
//! These are produced by scope building, which runs before flow-graph
//! construction; the builder only reads them.

use std::fmt;

use crate::SharedUnit;

/// A resolved local variable slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalVariable {
    name: Box<str>,
    index: u32,
}

impl LocalVariable {
    pub fn new(name: impl Into<Box<str>>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for LocalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

/// The catch block enclosing the node being built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchBlock {
    pub exception_var: LocalVariable,
    pub stack_trace_var: LocalVariable,
    /// Index of the try block whose handler this is; unwinding uses it to
    /// find the next outer handler on rethrow.
    pub catch_try_index: i32,
}

/// Variables resolved for one function body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeBuildingResult {
    /// The implicit receiver, for instance members and constructors.
    pub this_variable: Option<LocalVariable>,
}

impl ScopeBuildingResult {
    /// Scope of a function with a receiver.
    pub fn with_this(this_variable: LocalVariable) -> Self {
        Self {
            this_variable: Some(this_variable),
        }
    }
}

/// What kind of function a body belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Regular,
    Closure,
    Getter,
    Setter,
    Constructor,
    ImplicitGetter,
    ImplicitSetter,
    /// Lazy initializer of a static final field. Runs exactly once.
    ImplicitStaticFinalGetter,
}

impl FunctionKind {
    /// Whether bodies of this kind are evaluated exactly once.
    ///
    /// Constants inside them are never cached: evaluating them is the point,
    /// and a cached value would never be looked up again.
    #[inline]
    pub fn evaluates_once(self) -> bool {
        matches!(self, FunctionKind::ImplicitStaticFinalGetter)
    }
}

/// The function whose body is being decoded.
#[derive(Clone, Debug)]
pub struct ParsedFunction {
    name: Box<str>,
    kind: FunctionKind,
    unit: SharedUnit,
}

impl ParsedFunction {
    pub fn new(name: impl Into<Box<str>>, kind: FunctionKind, unit: SharedUnit) -> Self {
        Self {
            name: name.into(),
            kind,
            unit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// The compilation unit the function is declared in.
    pub fn unit(&self) -> &SharedUnit {
        &self.unit
    }
}
