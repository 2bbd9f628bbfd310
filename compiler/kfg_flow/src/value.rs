//! Constant values and their canonical instances.
//!
//! [`ConstValue`] is the structural form of a compile-time value.
//! [`Instance`] is a shared, immutable handle to one; cloning it is O(1) and
//! yields a new handle to the same storage. A [`Canonicalize`] service maps
//! structurally-equal values to a single shared instance, so canonical
//! instances can be compared by identity with [`Instance::ptr_eq`].

// Arc is the representation of Instance - all sharing goes through the newtype.
#![expect(clippy::disallowed_types, reason = "Arc is the implementation of Instance")]

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Structural constant value.
///
/// Doubles are stored as their bit pattern so the type can be `Eq + Hash`;
/// `0.0` and `-0.0` (and distinct NaN payloads) are therefore distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    /// IEEE-754 bits of a double.
    Double(u64),
    /// A plain string (not interned).
    String(Box<str>),
    /// An interned identifier-like string.
    Symbol(Box<str>),
}

impl ConstValue {
    /// Wrap an `f64`.
    #[inline]
    pub fn double(value: f64) -> Self {
        ConstValue::Double(value.to_bits())
    }

    /// The `f64` of a [`ConstValue::Double`].
    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ConstValue::Double(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Int(i) => write!(f, "{i}"),
            ConstValue::Double(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Symbol(s) => write!(f, "#{s}"),
        }
    }
}

/// Shared handle to an immutable constant.
///
/// Equality is structural; use [`ptr_eq`](Instance::ptr_eq) for identity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Instance(Arc<ConstValue>);

impl Instance {
    /// Allocate a fresh, non-canonical instance.
    pub fn new(value: ConstValue) -> Self {
        Instance(Arc::new(value))
    }

    /// The structural value.
    #[inline]
    pub fn value(&self) -> &ConstValue {
        &self.0
    }

    /// Whether both handles refer to the same storage.
    #[inline]
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({:?})", self.0)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

/// Canonicalization service: deduplicates structurally-equal values.
///
/// Shared by every compiler task, so implementations must be thread-safe.
pub trait Canonicalize: Send + Sync {
    /// Return the canonical instance structurally equal to `value`.
    fn canonicalize(&self, value: ConstValue) -> Instance;

    /// The canonical `null`.
    fn null(&self) -> Instance {
        self.canonicalize(ConstValue::Null)
    }

    /// The canonical `true` or `false`.
    fn boolean(&self, value: bool) -> Instance {
        self.canonicalize(ConstValue::Bool(value))
    }

    /// The interned symbol for `text`.
    fn symbol(&self, text: &str) -> Instance {
        self.canonicalize(ConstValue::Symbol(text.into()))
    }
}

/// Default canonical-instance table.
///
/// `null`, `true` and `false` are pre-interned. Lookups take a read lock;
/// a miss re-checks under the write lock before inserting, so two tasks
/// canonicalizing the same value concurrently agree on one instance.
pub struct CanonicalTable {
    instances: RwLock<FxHashMap<ConstValue, Instance>>,
}

#[expect(clippy::len_without_is_empty, reason = "the sentinels are always present")]
impl CanonicalTable {
    /// Number of values interned at construction (`null`, `true`, `false`).
    pub const SENTINELS: usize = 3;

    /// Create a table with the sentinel values pre-interned.
    pub fn new() -> Self {
        let mut instances = FxHashMap::default();
        for value in [ConstValue::Null, ConstValue::Bool(true), ConstValue::Bool(false)] {
            instances.insert(value.clone(), Instance::new(value));
        }
        Self {
            instances: RwLock::new(instances),
        }
    }

    /// Number of canonical instances.
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    /// Whether nothing beyond the sentinels has been interned.
    pub fn has_only_sentinels(&self) -> bool {
        self.len() == Self::SENTINELS
    }
}

impl Default for CanonicalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CanonicalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalTable")
            .field("len", &self.len())
            .finish()
    }
}

impl Canonicalize for CanonicalTable {
    fn canonicalize(&self, value: ConstValue) -> Instance {
        // Fast path: already canonical
        if let Some(instance) = self.instances.read().get(&value) {
            return instance.clone();
        }

        // Slow path: double-check under the write lock
        let mut guard = self.instances.write();
        guard
            .entry(value)
            .or_insert_with_key(|value| Instance::new(value.clone()))
            .clone()
    }
}
