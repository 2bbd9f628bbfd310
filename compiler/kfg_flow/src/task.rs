//! Identity and statistics of the compiler task running a decode.

use std::fmt;

/// Which actor is compiling.
///
/// Exactly one mutator exists per isolate; it alone may write to a unit's
/// constant cache. Background compilers only read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Mutator,
    Background,
}

/// Counters gathered while compiling, when statistics are enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompilerStats {
    pub const_cache_hits: u64,
    pub const_cache_misses: u64,
    pub const_cache_inserts: u64,
    pub nodes_built: u64,
}

impl CompilerStats {
    /// Fold another task's counters into these.
    pub fn merge(&mut self, other: &CompilerStats) {
        self.const_cache_hits += other.const_cache_hits;
        self.const_cache_misses += other.const_cache_misses;
        self.const_cache_inserts += other.const_cache_inserts;
        self.nodes_built += other.nodes_built;
    }
}

impl fmt::Display for CompilerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes built:          {}", self.nodes_built)?;
        writeln!(f, "const cache hits:     {}", self.const_cache_hits)?;
        writeln!(f, "const cache misses:   {}", self.const_cache_misses)?;
        write!(f, "const cache inserts:  {}", self.const_cache_inserts)
    }
}

/// Session-local handle for one compiler task.
///
/// Passed explicitly wherever the decoder needs to know who is running it.
#[derive(Clone, Debug)]
pub struct CompilerTask {
    kind: TaskKind,
    stats: Option<CompilerStats>,
}

impl CompilerTask {
    /// The mutator task, allowed to populate constant caches.
    pub fn mutator() -> Self {
        Self {
            kind: TaskKind::Mutator,
            stats: None,
        }
    }

    /// A background compiler task (cache readers only).
    pub fn background() -> Self {
        Self {
            kind: TaskKind::Background,
            stats: None,
        }
    }

    /// Enable statistics gathering.
    #[must_use]
    pub fn with_stats(mut self) -> Self {
        self.stats = Some(CompilerStats::default());
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    #[inline]
    pub fn is_mutator(&self) -> bool {
        self.kind == TaskKind::Mutator
    }

    /// Gathered statistics, if enabled.
    pub fn stats(&self) -> Option<&CompilerStats> {
        self.stats.as_ref()
    }

    /// Bump a counter if statistics are enabled.
    #[inline]
    pub(crate) fn count(&mut self, bump: impl FnOnce(&mut CompilerStats)) {
        if let Some(stats) = &mut self.stats {
            bump(stats);
        }
    }
}
