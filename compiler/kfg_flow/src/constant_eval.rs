//! Constant evaluation with a per-unit, offset-keyed cache.
//!
//! Syntactically identical constants are identified by the byte offset of
//! their node in the unit. The first evaluation at an offset stores the
//! canonical value in the unit's [`ConstantCache`]; later compilations of
//! any function in the same unit, on any task, find it there.
//!
//! # Caching policy
//!
//! | Situation                              | Read cache | Write cache |
//! |----------------------------------------|------------|-------------|
//! | No function context                    | no         | no          |
//! | One-shot initializer body              | no         | no          |
//! | Background task                        | yes        | no          |
//! | Mutator task                           | yes        | yes         |

use kfg_binary::Tag;

use crate::{Canonicalize, CompilerTask, ConstValue, DecodeFault, DecodeSession, Instance};
use crate::{ConstantCache, ParsedFunction};

/// Evaluates constant-valued nodes at the session cursor.
pub struct ConstantEvaluator<'c> {
    function: Option<&'c ParsedFunction>,
    canon: &'c dyn Canonicalize,
}

impl<'c> ConstantEvaluator<'c> {
    /// An evaluator for constants inside `function`'s body.
    pub fn new(function: &'c ParsedFunction, canon: &'c dyn Canonicalize) -> Self {
        Self {
            function: Some(function),
            canon,
        }
    }

    /// An evaluator with no function context. It never touches a cache.
    pub fn detached(canon: &'c dyn Canonicalize) -> Self {
        Self {
            function: None,
            canon,
        }
    }

    /// The cache this evaluator may consult, if any.
    fn cache(&self) -> Option<(&'c ParsedFunction, &'c ConstantCache)> {
        let function = self.function?;
        if function.kind().evaluates_once() {
            // Initializer bodies run once; their constants are never reused.
            return None;
        }
        Some((function, function.unit().constants()))
    }

    /// Evaluate the constant node at the cursor, leaving the cursor after it.
    ///
    /// The returned handle is independent of the cache's stored copy.
    pub fn try_evaluate(
        &self,
        session: &mut DecodeSession<'_>,
        task: &mut CompilerTask,
    ) -> Result<Instance, DecodeFault> {
        let offset = session.offset();

        if let Some(cached) = self.cached_constant(offset, task) {
            skip_constant(session)?;
            return Ok(cached);
        }

        let (tag, _payload) = session.read_tag()?;
        let value = match tag {
            Tag::DoubleLiteral => self.evaluate_double_literal(session)?,
            other => return Err(DecodeFault::NotConstant { tag: other, offset }),
        };

        Ok(self.cache_constant_value(offset, value, task))
    }

    /// Evaluate the constant node at the cursor.
    ///
    /// # Panics
    ///
    /// Panics on any [`DecodeFault`]; the stream is trusted.
    pub fn evaluate(&self, session: &mut DecodeSession<'_>, task: &mut CompilerTask) -> Instance {
        self.try_evaluate(session, task)
            .unwrap_or_else(|fault| panic!("internal compiler fault: {fault}"))
    }

    fn evaluate_double_literal(
        &self,
        session: &mut DecodeSession<'_>,
    ) -> Result<Instance, DecodeFault> {
        let index = session.read_uint()? as usize;
        let text = session.string(index)?;
        let value: f64 = text.parse().map_err(|_| DecodeFault::MalformedDouble {
            index,
            text: text.to_owned(),
        })?;
        Ok(self.canon.canonicalize(ConstValue::double(value)))
    }

    fn cached_constant(&self, offset: usize, task: &mut CompilerTask) -> Option<Instance> {
        let (_, cache) = self.cache()?;
        // The mutator may replace the table while a background task reads;
        // `get` works on a snapshot, so either table is consistent.
        let hit = cache.get(offset);
        if hit.is_some() {
            tracing::debug!(offset, "constant cache hit");
            task.count(|stats| stats.const_cache_hits += 1);
        } else {
            task.count(|stats| stats.const_cache_misses += 1);
        }
        hit
    }

    fn cache_constant_value(
        &self,
        offset: usize,
        value: Instance,
        task: &mut CompilerTask,
    ) -> Instance {
        let Some((function, cache)) = self.cache() else {
            return value;
        };
        if !task.is_mutator() {
            tracing::trace!(offset, "background task; constant not cached");
            return value;
        }
        tracing::debug!(offset, %value, "caching constant");
        task.count(|stats| stats.const_cache_inserts += 1);
        cache.insert(task, function, offset, &value)
    }
}

/// Advance past a constant node without evaluating it.
fn skip_constant(session: &mut DecodeSession<'_>) -> Result<(), DecodeFault> {
    let offset = session.offset();
    let (tag, _payload) = session.read_tag()?;
    match tag {
        Tag::DoubleLiteral => {
            session.read_uint()?;
            Ok(())
        }
        other => Err(DecodeFault::NotConstant { tag: other, offset }),
    }
}
