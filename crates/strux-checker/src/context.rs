//! Checker context: the per-unit state shared by every resolver module.
//!
//! `Checker` borrows the binder's declaration graph and owns everything the
//! resolver computes for one compilation unit: the type store, per-symbol
//! links, node associations, caches, the scratch pool and diagnostics. The
//! other modules of this crate extend it with `impl Checker` blocks.

use crate::deferred::DeferredCheck;
use crate::provisional::ProvisionalState;
use rustc_hash::{FxHashMap, FxHashSet};
use strux_binder::{Binder, DeclId, Meaning, NodeIndex, SymbolId};
use strux_common::Diagnostic;
use strux_solver::{
    ApparentTypes, CommonTypeHost, DepthCounter, RecursionProfile, RelationCache, RelationPolicy,
    ScratchPool, SignatureId, TypeData, TypeId, TypeStore,
};
use tracing::debug;

// =============================================================================
// Options
// =============================================================================

/// What a provisional probe undoes when it ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProvisionalPolicy {
    /// Symbols resolved during the probe are invalidated and node associations
    /// written during it are rolled back.
    #[default]
    Snapshot,
    /// Only symbols are invalidated; node associations from the probe stay.
    BestEffort,
}

#[derive(Clone, Debug)]
pub struct CheckerOptions {
    /// File name stamped on every diagnostic.
    pub file_name: String,
    pub provisional_policy: ProvisionalPolicy,
    /// Depth limits for relation checks.
    pub relation_profile: RecursionProfile,
    /// Grow the stack on deep relation recursion.
    pub grow_stack: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            file_name: "input.ts".to_string(),
            provisional_policy: ProvisionalPolicy::Snapshot,
            relation_profile: RecursionProfile::SubtypeCheck,
            grow_stack: true,
        }
    }
}

impl CheckerOptions {
    pub fn relation_policy(&self) -> RelationPolicy {
        RelationPolicy {
            profile: self.relation_profile,
            grow_stack: self.grow_stack,
        }
    }
}

// =============================================================================
// Symbol links
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
}

/// What the resolver has computed for one symbol.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolLinks {
    pub state: ResolutionState,
    /// Type meaning (interfaces, classes, enums, type parameters).
    pub declared_type: Option<TypeId>,
    /// Value meaning (variables, functions, class constructors, enum containers).
    pub value_type: Option<TypeId>,
    /// Target of an alias symbol.
    pub alias_target: Option<SymbolId>,
}

/// Everything `check_unit` hands back to the driver.
#[derive(Clone, Debug, Default)]
pub struct UnitReport {
    pub diagnostics: Vec<Diagnostic>,
    pub symbols_resolved: usize,
    pub specializations: usize,
    /// Deepest nesting of overload resolutions seen.
    pub scratch_high_water: usize,
}

// =============================================================================
// Checker
// =============================================================================

pub struct Checker<'a> {
    pub(crate) binder: &'a Binder,
    pub(crate) types: TypeStore,
    pub(crate) options: CheckerOptions,
    pub(crate) links: FxHashMap<SymbolId, SymbolLinks>,
    pub(crate) node_types: FxHashMap<NodeIndex, TypeId>,
    pub(crate) node_symbols: FxHashMap<NodeIndex, SymbolId>,
    /// Signatures of non-expression declarations, built once.
    pub(crate) decl_signatures: FxHashMap<DeclId, SignatureId>,
    /// Contextual signature of a function expression while it is being typed.
    pub(crate) function_contexts: FxHashMap<DeclId, SignatureId>,
    pub(crate) contextual_types: Vec<Option<TypeId>>,
    pub(crate) provisional: ProvisionalState,
    pub(crate) relation_cache: RelationCache,
    pub(crate) scratch: ScratchPool,
    pub(crate) deferred: Vec<DeferredCheck>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// `(start, code)` of every reported diagnostic.
    pub(crate) emitted: FxHashSet<(u32, u32)>,
    pub(crate) diagnostic_count: u32,
    /// Symbols already reported as recursive bases.
    pub(crate) recursive_bases: FxHashSet<SymbolId>,
    /// Type-reference nodes whose constraint check has been queued.
    pub(crate) constraint_sites: FxHashSet<NodeIndex>,
    pub(crate) expr_depth: DepthCounter,
}

impl<'a> Checker<'a> {
    pub fn new(binder: &'a Binder) -> Self {
        Self::with_options(binder, CheckerOptions::default())
    }

    pub fn with_options(binder: &'a Binder, options: CheckerOptions) -> Self {
        let mut checker = Checker {
            binder,
            types: TypeStore::new(),
            options,
            links: FxHashMap::default(),
            node_types: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            decl_signatures: FxHashMap::default(),
            function_contexts: FxHashMap::default(),
            contextual_types: Vec::new(),
            provisional: ProvisionalState::default(),
            relation_cache: RelationCache::new(),
            scratch: ScratchPool::new(),
            deferred: Vec::new(),
            diagnostics: Vec::new(),
            emitted: FxHashSet::default(),
            diagnostic_count: 0,
            recursive_bases: FxHashSet::default(),
            constraint_sites: FxHashSet::default(),
            expr_depth: DepthCounter::with_profile(RecursionProfile::ExpressionCheck),
        };
        checker.install_apparent_types();
        checker
    }

    /// Register the global `Object`, `Function`, `Number`, `String`, `Boolean`
    /// and `Array` interfaces, when declared, as apparent types.
    fn install_apparent_types(&mut self) {
        let apparent = ApparentTypes {
            object: self.global_type("Object"),
            function: self.global_type("Function"),
            number: self.global_type("Number"),
            string: self.global_type("String"),
            boolean: self.global_type("Boolean"),
            array: self
                .global_type("Array")
                .filter(|&t| matches!(self.types.lookup(t), TypeData::Generic(_))),
        };
        debug!(?apparent, "apparent types installed");
        self.types.set_apparent_types(apparent);
    }

    fn global_type(&mut self, name: &str) -> Option<TypeId> {
        let symbol = self.binder.lookup_global(name, Meaning::Type)?;
        let ty = self.type_of_symbol(symbol);
        (!self.types.is_error(ty)).then_some(ty)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn binder(&self) -> &'a Binder {
        self.binder
    }

    #[inline]
    pub fn types(&self) -> &TypeStore {
        &self.types
    }

    #[inline]
    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn symbol_links(&self, symbol: SymbolId) -> SymbolLinks {
        self.links.get(&symbol).copied().unwrap_or_default()
    }

    pub fn resolution_state(&self, symbol: SymbolId) -> ResolutionState {
        self.symbol_links(symbol).state
    }

    pub(crate) fn links_mut(&mut self, symbol: SymbolId) -> &mut SymbolLinks {
        self.links.entry(symbol).or_default()
    }

    /// Type recorded for a syntax node, if any.
    pub fn node_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    /// Symbol recorded for a syntax node, if any.
    pub fn node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    pub fn scratch_pool(&self) -> &ScratchPool {
        &self.scratch
    }

    pub fn relation_cache_len(&self) -> usize {
        self.relation_cache.len()
    }

    /// Forget every cached relation result.
    pub fn clear_relation_cache(&mut self) {
        self.relation_cache.clear();
    }

    /// The innermost contextual type, if one is active.
    pub fn contextual_type(&self) -> Option<TypeId> {
        self.contextual_types.last().copied().flatten()
    }

    /// Run `f` with `contextual` as the active contextual type.
    pub fn with_contextual_type<R>(&mut self, contextual: Option<TypeId>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.contextual_types.push(contextual);
        let result = f(self);
        self.contextual_types.pop();
        result
    }
}

impl CommonTypeHost for Checker<'_> {
    fn store(&self) -> &TypeStore {
        &self.types
    }

    fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        self.subtype(source, target, None)
    }
}
