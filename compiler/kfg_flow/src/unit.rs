//! Compilation units and their persistent constant caches.
//!
//! A [`CompilationUnit`] owns the immutable bytes of one binary unit and the
//! [`ConstantCache`] that outlives every decode session over those bytes.
//!
//! # Cache concurrency
//!
//! The cache slot holds an `Arc` snapshot of the offset→value table:
//!
//! - **Readers** (any task) clone the snapshot under a short read lock and
//!   look up without holding it. They see either the old or a newer table,
//!   never a torn one.
//! - **The writer** (the mutator task only) inserts in place under the write
//!   lock only when no reader holds the current table and the table has room,
//!   so the lock covers one hash insert. Otherwise it copies the table with no
//!   lock held and takes the write lock just to store the new `Arc`. No reader
//!   waits for a copy.
//! - Inserts are insert-new-or-get: a value already present for an offset is
//!   returned unchanged, never overwritten.

// Arc is the implementation of SharedUnit and of cache snapshots.
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedUnit and cache snapshots"
)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use kfg_binary::Cursor;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{CompilerTask, DecodeFault, Instance, ParsedFunction};

/// Offset-keyed table of evaluated constants.
pub type ConstantsMap = FxHashMap<usize, Instance>;

/// Per-unit constant cache, keyed by the byte offset of the constant node.
#[derive(Default)]
pub struct ConstantCache {
    slot: RwLock<Option<Arc<ConstantsMap>>>,
    /// Number of times the table storage was created or replaced wholesale
    /// (copied because a reader held it, or grown).
    generation: AtomicU64,
}

impl ConstantCache {
    /// Capacity of a freshly created table.
    pub const INITIAL_CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the table has been created yet.
    pub fn exists(&self) -> bool {
        self.slot.read().is_some()
    }

    /// A consistent snapshot of the whole table, if it exists.
    pub fn snapshot(&self) -> Option<Arc<ConstantsMap>> {
        self.slot.read().clone()
    }

    /// Look up the value cached for `offset`.
    ///
    /// Returns a fresh handle; the caller never aliases the table's copy.
    pub fn get(&self, offset: usize) -> Option<Instance> {
        let snapshot = self.snapshot()?;
        snapshot.get(&offset).cloned()
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.get(offset).is_some()
    }

    /// Number of cached constants.
    pub fn len(&self) -> usize {
        self.snapshot().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Times the table storage has been created or replaced.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Insert `value` for `offset` unless a value is already present.
    ///
    /// Returns the value now cached for `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `task` is not the mutator, or if `function` is evaluated
    /// only once (its constants must not be cached). Both are caller bugs.
    pub fn insert(
        &self,
        task: &CompilerTask,
        function: &ParsedFunction,
        offset: usize,
        value: &Instance,
    ) -> Instance {
        assert!(
            task.is_mutator(),
            "constant cache written from a {:?} task (offset {offset})",
            task.kind()
        );
        assert!(
            !function.kind().evaluates_once(),
            "constant cached for one-shot initializer `{}` (offset {offset})",
            function.name()
        );

        {
            let mut slot = self.slot.write();
            if let Some(table) = slot.as_mut() {
                if let Some(existing) = table.get(&offset) {
                    return existing.clone();
                }
                // Unshared and below capacity: no allocation under the lock.
                if let Some(map) = Arc::get_mut(table).filter(|map| map.len() < map.capacity()) {
                    map.insert(offset, value.clone());
                    return value.clone();
                }
            }
        }

        // The mutator is the only writer, so the slot cannot change between
        // this snapshot and the store below.
        let mut table = match self.snapshot() {
            Some(current) => {
                let capacity = current.len().saturating_mul(2).max(Self::INITIAL_CAPACITY);
                let mut copy = ConstantsMap::with_capacity_and_hasher(capacity, Default::default());
                copy.extend(current.iter().map(|(&offset, value)| (offset, value.clone())));
                copy
            }
            None => {
                tracing::debug!(
                    capacity = Self::INITIAL_CAPACITY,
                    "creating constant cache table"
                );
                ConstantsMap::with_capacity_and_hasher(Self::INITIAL_CAPACITY, Default::default())
            }
        };
        table.insert(offset, value.clone());

        let table = Arc::new(table);
        self.generation.fetch_add(1, Ordering::Relaxed);
        let previous = self.slot.write().replace(table);
        // Freed (if this was its last holder) after the lock is released.
        drop(previous);
        value.clone()
    }
}

impl fmt::Debug for ConstantCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantCache")
            .field("len", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}

/// One binary unit: its bytes plus the state that outlives decode sessions.
pub struct CompilationUnit {
    name: Box<str>,
    bytes: Box<[u8]>,
    constants: ConstantCache,
}

impl CompilationUnit {
    /// Load a unit, validating the program-file magic.
    pub fn new(name: impl Into<Box<str>>, bytes: Vec<u8>) -> Result<SharedUnit, DecodeFault> {
        Cursor::new(&bytes).try_read_magic()?;
        Ok(SharedUnit(Arc::new(CompilationUnit {
            name: name.into(),
            bytes: bytes.into_boxed_slice(),
            constants: ConstantCache::new(),
        })))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit's immutable bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The unit's persistent constant cache.
    pub fn constants(&self) -> &ConstantCache {
        &self.constants
    }
}

impl fmt::Debug for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationUnit")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("constants", &self.constants)
            .finish()
    }
}

/// Shared handle to a [`CompilationUnit`].
///
/// Cloned into every [`ParsedFunction`] of the unit and across compiler
/// tasks; the cache it carries is therefore visible to all of them.
#[derive(Clone, Debug)]
pub struct SharedUnit(Arc<CompilationUnit>);

impl SharedUnit {
    /// Whether both handles refer to the same unit.
    pub fn ptr_eq(a: &SharedUnit, b: &SharedUnit) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl std::ops::Deref for SharedUnit {
    type Target = CompilationUnit;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
