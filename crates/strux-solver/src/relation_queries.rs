//! Relation query entrypoints and the pairwise relation cache.
//!
//! Resolver code calls [`query_relation`] (or the `is_*` shorthands) instead
//! of driving a [`RelationChecker`] directly.

use crate::diagnostics::ComparisonInfo;
use crate::recursion::RecursionProfile;
use crate::relation::RelationChecker;
use crate::store::TypeStore;
use crate::types::TypeId;
use rustc_hash::FxHashMap;
use strux_common::limits::RELATION_CACHE_CAPACITY;

/// Relation categories supported by the query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Structural identity.
    Identical,
    /// Strict structural subtyping.
    Subtype,
    /// Assignment compatibility: subtyping plus literal widening and optional-member leniency.
    Assignable,
}

impl RelationKind {
    #[inline]
    pub fn is_lenient(self) -> bool {
        matches!(self, RelationKind::Assignable)
    }
}

/// Policy knobs for relation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationPolicy {
    /// Depth limit for structural recursion.
    pub profile: RecursionProfile,
    /// Grow the native stack on deep structural recursion.
    pub grow_stack: bool,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            profile: RecursionProfile::SubtypeCheck,
            grow_stack: true,
        }
    }
}

// =============================================================================
// RelationCache
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntry {
    /// The pair is being compared further up the stack, or held under an
    /// assumption that is still open; assumed related.
    InProgress,
    Final(bool),
}

/// Memoized `(source, target, kind)` results for one compilation unit.
#[derive(Debug)]
pub struct RelationCache {
    entries: FxHashMap<(TypeId, TypeId, RelationKind), CacheEntry>,
}

impl Default for RelationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationCache {
    pub fn new() -> Self {
        let mut entries = FxHashMap::default();
        entries.reserve(RELATION_CACHE_CAPACITY);
        RelationCache { entries }
    }

    #[inline]
    pub fn get(&self, source: TypeId, target: TypeId, kind: RelationKind) -> Option<CacheEntry> {
        self.entries.get(&(source, target, kind)).copied()
    }

    #[inline]
    pub fn insert(&mut self, source: TypeId, target: TypeId, kind: RelationKind, entry: CacheEntry) {
        self.entries.insert((source, target, kind), entry);
    }

    #[inline]
    pub fn remove(&mut self, source: TypeId, target: TypeId, kind: RelationKind) {
        self.entries.remove(&(source, target, kind));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Result of a relation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationResult {
    pub kind: RelationKind,
    pub related: bool,
    /// The structural walk hit its depth limit and assumed success somewhere.
    pub depth_exceeded: bool,
}

impl RelationResult {
    #[inline]
    pub fn is_related(self) -> bool {
        self.related
    }
}

pub fn query_relation(
    store: &TypeStore,
    cache: &mut RelationCache,
    source: TypeId,
    target: TypeId,
    kind: RelationKind,
    policy: RelationPolicy,
    info: Option<&mut ComparisonInfo>,
) -> RelationResult {
    let mut checker = RelationChecker::with_policy(store, cache, policy);
    let related = match info {
        Some(info) => checker.relate_explained(source, target, kind, info),
        None => checker.relate(source, target, kind),
    };
    RelationResult {
        kind,
        related,
        depth_exceeded: checker.depth_exceeded(),
    }
}

pub fn is_identical(store: &TypeStore, cache: &mut RelationCache, a: TypeId, b: TypeId) -> bool {
    RelationChecker::new(store, cache).is_identical(a, b)
}

pub fn is_subtype_of(store: &TypeStore, cache: &mut RelationCache, source: TypeId, target: TypeId) -> bool {
    RelationChecker::new(store, cache).is_subtype(source, target)
}

pub fn is_assignable_to(store: &TypeStore, cache: &mut RelationCache, source: TypeId, target: TypeId) -> bool {
    RelationChecker::new(store, cache).is_assignable(source, target)
}
