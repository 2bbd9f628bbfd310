//! Tag-dispatching fragment builder.
//!
//! [`StreamingFlowGraphBuilder::build_at`] seeks to a node, reads its tag and
//! hands off to a per-tag builder. Every tag of the format appears in the
//! dispatch `match`; the ones this decoder does not build yet are explicit
//! [`DecodeFault::UnsupportedTag`] arms, so reaching one is a loud fault and
//! never a silently empty fragment.

use kfg_binary::{Tag, SPECIALIZED_INT_LITERAL_BIAS};

use crate::{
    Canonicalize, CatchBlock, CompilerTask, ConstValue, ConstantEvaluator, DecodeFault,
    DecodeSession, Fragment, Instance, ParsedFunction, ScopeBuildingResult,
};

/// Builds flow-graph fragments for one function body, reading nodes directly
/// from the unit's bytes.
///
/// One builder is one decode session: it owns the cursor and string-table
/// index and must not be shared across tasks. Constants it evaluates go
/// through the unit's shared cache.
pub struct StreamingFlowGraphBuilder<'c> {
    session: DecodeSession<'c>,
    function: &'c ParsedFunction,
    scopes: &'c ScopeBuildingResult,
    /// Innermost enclosing catch block, while building a handler body.
    catch_block: Option<&'c CatchBlock>,
    canon: &'c dyn Canonicalize,
    constant_evaluator: ConstantEvaluator<'c>,
    task: CompilerTask,
}

impl<'c> StreamingFlowGraphBuilder<'c> {
    pub fn new(
        function: &'c ParsedFunction,
        scopes: &'c ScopeBuildingResult,
        canon: &'c dyn Canonicalize,
        task: CompilerTask,
    ) -> Self {
        Self {
            session: DecodeSession::new(function.unit().bytes()),
            function,
            scopes,
            catch_block: None,
            canon,
            constant_evaluator: ConstantEvaluator::new(function, canon),
            task,
        }
    }

    pub fn function(&self) -> &'c ParsedFunction {
        self.function
    }

    pub fn session(&self) -> &DecodeSession<'c> {
        &self.session
    }

    pub fn task(&self) -> &CompilerTask {
        &self.task
    }

    /// End the session, returning the task (and its statistics).
    pub fn into_task(self) -> CompilerTask {
        self.task
    }

    /// Enter or leave a catch block; returns the previous one to restore.
    pub fn set_catch_block(&mut self, catch_block: Option<&'c CatchBlock>) -> Option<&'c CatchBlock> {
        std::mem::replace(&mut self.catch_block, catch_block)
    }

    /// Build the node at `offset`, leaving the cursor at the node's end.
    ///
    /// # Panics
    ///
    /// Panics on any [`DecodeFault`]: an unsupported tag or malformed stream
    /// is an internal compiler fault.
    pub fn build_at(&mut self, offset: usize) -> Fragment {
        self.try_build_at(offset)
            .unwrap_or_else(|fault| panic!("internal compiler fault: {fault}"))
    }

    /// Build the node at `offset`, leaving the cursor at the node's end.
    pub fn try_build_at(&mut self, offset: usize) -> Result<Fragment, DecodeFault> {
        self.session.set_offset(offset);

        let (tag, payload) = self.session.read_tag()?;
        tracing::trace!(offset, %tag, payload, "building node");
        self.task.count(|stats| stats.nodes_built += 1);

        match tag {
            Tag::InvalidExpression => Ok(Self::build_invalid_expression()),
            Tag::ThisExpression => self.build_this_expression(),
            Tag::Rethrow => self.build_rethrow(),
            Tag::StringLiteral => self.build_string_literal(),
            Tag::SpecialIntLiteral => Ok(Self::build_specialized_int_literal(payload)),
            Tag::NegativeIntLiteral => self.build_int_literal(true),
            Tag::PositiveIntLiteral => self.build_int_literal(false),
            Tag::DoubleLiteral => self.build_double_literal(),
            Tag::TrueLiteral => Ok(self.build_bool_literal(true)),
            Tag::FalseLiteral => Ok(self.build_bool_literal(false)),
            Tag::NullLiteral => Ok(self.build_null_literal()),

            Tag::VariableGet
            | Tag::SpecializedVariableGet
            | Tag::VariableSet
            | Tag::SpecializedVariableSet
            | Tag::PropertyGet
            | Tag::PropertySet
            | Tag::SuperPropertyGet
            | Tag::SuperPropertySet
            | Tag::DirectPropertyGet
            | Tag::DirectPropertySet
            | Tag::StaticGet
            | Tag::StaticSet
            | Tag::MethodInvocation
            | Tag::SuperMethodInvocation
            | Tag::DirectMethodInvocation
            | Tag::StaticInvocation
            | Tag::ConstStaticInvocation
            | Tag::ConstructorInvocation
            | Tag::ConstConstructorInvocation
            | Tag::Not
            | Tag::LogicalExpression
            | Tag::ConditionalExpression
            | Tag::StringConcatenation
            | Tag::IsExpression
            | Tag::AsExpression
            | Tag::SymbolLiteral
            | Tag::TypeLiteral
            | Tag::Throw
            | Tag::ListLiteral
            | Tag::ConstListLiteral
            | Tag::MapLiteral
            | Tag::ConstMapLiteral
            | Tag::AwaitExpression
            | Tag::FunctionExpression
            | Tag::Let
            | Tag::BigIntLiteral
            | Tag::Unknown(_) => Err(DecodeFault::UnsupportedTag { tag, offset }),
        }
    }

    // Strings

    /// String `index` as a fresh (non-canonical) string value.
    pub fn string(&mut self, index: usize) -> Result<Instance, DecodeFault> {
        let text = self.session.string(index)?;
        Ok(Instance::new(ConstValue::String(text.into())))
    }

    /// String `index` as an interned symbol.
    pub fn symbol(&mut self, index: usize) -> Result<Instance, DecodeFault> {
        let text = self.session.string(index)?;
        Ok(self.canon.symbol(text))
    }

    // Per-tag builders

    /// The front-end reports ordinary errors itself and only emits invalid
    /// expressions in special cases (e.g. an invalid annotation). They must
    /// fail when executed.
    fn build_invalid_expression() -> Fragment {
        Fragment::throw_no_such_method_error()
    }

    fn build_this_expression(&self) -> Result<Fragment, DecodeFault> {
        let this = self
            .scopes
            .this_variable
            .as_ref()
            .ok_or(DecodeFault::MissingReceiver)?;
        Ok(Fragment::load_local(this))
    }

    fn build_rethrow(&mut self) -> Result<Fragment, DecodeFault> {
        let position = self.session.read_position(true)?;
        let catch_block = self.catch_block.ok_or(DecodeFault::NoCatchBlock)?;

        let mut instructions = Fragment::debug_step_check(position);
        instructions += Fragment::load_local(&catch_block.exception_var);
        instructions += Fragment::push_argument();
        instructions += Fragment::load_local(&catch_block.stack_trace_var);
        instructions += Fragment::push_argument();
        instructions += Fragment::rethrow_exception(position, catch_block.catch_try_index);
        Ok(instructions)
    }

    fn build_string_literal(&mut self) -> Result<Fragment, DecodeFault> {
        let index = self.session.read_uint()? as usize;
        Ok(Fragment::constant(self.symbol(index)?))
    }

    fn build_specialized_int_literal(payload: u8) -> Fragment {
        Fragment::int_constant(i64::from(payload) - SPECIALIZED_INT_LITERAL_BIAS)
    }

    fn build_int_literal(&mut self, is_negative: bool) -> Result<Fragment, DecodeFault> {
        let magnitude = i64::from(self.session.read_uint()?);
        let value = if is_negative { -magnitude } else { magnitude };
        Ok(Fragment::int_constant(value))
    }

    fn build_double_literal(&mut self) -> Result<Fragment, DecodeFault> {
        // The evaluator dispatches on the tag itself.
        self.session.cursor_mut().try_rewind(1)?;
        let value = self
            .constant_evaluator
            .try_evaluate(&mut self.session, &mut self.task)?;
        Ok(Fragment::constant(value))
    }

    fn build_bool_literal(&self, value: bool) -> Fragment {
        Fragment::constant(self.canon.boolean(value))
    }

    fn build_null_literal(&self) -> Fragment {
        Fragment::constant(self.canon.null())
    }
}
