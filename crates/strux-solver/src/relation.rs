//! Identity, subtype and assignability.
//!
//! One routine relates two types under a [`RelationKind`]; assignability is
//! subtyping with the lenient rules switched on. Structural comparisons go
//! through the [`RelationCache`], which records a pair as `InProgress`
//! (assumed related) before descending so recursive types terminate.
//! A pair that holds only while an enclosing pair is still assumed stays
//! `InProgress` until the outermost comparison settles: success finalizes
//! it, failure evicts it.
//!
//! Failure reasons are only built when a detail sink is attached
//! ([`RelationChecker::relate_explained`]); the plain boolean path never
//! allocates a [`RelationFailure`].

use crate::diagnostics::{ComparisonInfo, RelationFailure};
use crate::instantiate::signature_to_any;
use crate::recursion::DepthCounter;
use crate::relation_queries::{CacheEntry, RelationCache, RelationKind, RelationPolicy};
use crate::store::TypeStore;
use crate::types::{
    IntrinsicKind, ParamInfo, Signature, SignatureId, SignatureKind, TypeData, TypeId, Visibility,
};
use strux_common::limits::{STACK_GROW_SIZE, STACK_RED_ZONE};
use tracing::{debug, trace};

const SIGNATURE_KINDS: [SignatureKind; 3] =
    [SignatureKind::Call, SignatureKind::Construct, SignatureKind::Index];

pub struct RelationChecker<'a> {
    store: &'a TypeStore,
    cache: &'a mut RelationCache,
    depth: DepthCounter,
    policy: RelationPolicy,
    explain: bool,
    last_failure: Option<RelationFailure>,
    depth_exceeded: bool,
    /// Structural comparisons currently on the stack.
    open_frames: u32,
    /// Related pairs whose result rests on an open frame.
    pending: Vec<(TypeId, TypeId, RelationKind)>,
}

impl<'a> RelationChecker<'a> {
    pub fn new(store: &'a TypeStore, cache: &'a mut RelationCache) -> Self {
        Self::with_policy(store, cache, RelationPolicy::default())
    }

    pub fn with_policy(store: &'a TypeStore, cache: &'a mut RelationCache, policy: RelationPolicy) -> Self {
        RelationChecker {
            store,
            cache,
            depth: DepthCounter::with_profile(policy.profile),
            policy,
            explain: false,
            last_failure: None,
            depth_exceeded: false,
            open_frames: 0,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn store(&self) -> &'a TypeStore {
        self.store
    }

    /// Whether any comparison so far hit the depth limit and was assumed to hold.
    #[inline]
    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    pub fn is_identical(&mut self, a: TypeId, b: TypeId) -> bool {
        self.relate(a, b, RelationKind::Identical)
    }

    pub fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        self.relate(source, target, RelationKind::Subtype)
    }

    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        self.relate(source, target, RelationKind::Assignable)
    }

    /// Relate and record the first divergence into `info` on failure.
    pub fn relate_explained(
        &mut self,
        source: TypeId,
        target: TypeId,
        kind: RelationKind,
        info: &mut ComparisonInfo,
    ) -> bool {
        let previous = std::mem::replace(&mut self.explain, true);
        self.last_failure = None;
        let related = self.relate(source, target, kind);
        if !related {
            info.failure = Some(
                self.last_failure
                    .take()
                    .unwrap_or(RelationFailure::TypeMismatch { source, target }),
            );
        }
        self.explain = previous;
        related
    }

    // =========================================================================
    // Failure recording
    // =========================================================================

    #[inline]
    fn fail(&mut self, reason: impl FnOnce() -> RelationFailure) -> bool {
        if self.explain {
            self.last_failure = Some(reason());
        }
        false
    }

    /// Record a failure that wraps whatever the inner comparison reported.
    #[inline]
    fn fail_nested(&mut self, reason: impl FnOnce(Option<Box<RelationFailure>>) -> RelationFailure) -> bool {
        if self.explain {
            let nested = self.last_failure.take().map(Box::new);
            self.last_failure = Some(reason(nested));
        }
        false
    }

    #[inline]
    fn mismatch(&mut self, source: TypeId, target: TypeId) -> bool {
        self.fail(|| RelationFailure::TypeMismatch { source, target })
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn relate(&mut self, source: TypeId, target: TypeId, kind: RelationKind) -> bool {
        let store = self.store;
        let source = store.unalias(source);
        let target = store.unalias(target);
        if source == target {
            return true;
        }
        let source_data = store.lookup(source);
        let target_data = store.lookup(target);
        if matches!(source_data, TypeData::Error(_)) || matches!(target_data, TypeData::Error(_)) {
            return true;
        }
        if kind == RelationKind::Identical {
            return self.identical_inner(source, target, source_data, target_data);
        }
        if source == TypeId::ANY || target == TypeId::ANY {
            return true;
        }
        if store.is_recursive_base(source) || store.is_recursive_base(target) {
            return true;
        }
        self.relate_inner(source, target, source_data, target_data, kind)
    }

    fn relate_inner(
        &mut self,
        source: TypeId,
        target: TypeId,
        source_data: TypeData,
        target_data: TypeData,
        kind: RelationKind,
    ) -> bool {
        let store = self.store;
        let lenient = kind.is_lenient();

        // null / undefined / void lattice
        if target == TypeId::VOID {
            return (source == TypeId::UNDEFINED && lenient) || self.mismatch(source, target);
        }
        match source {
            TypeId::UNDEFINED => return true,
            TypeId::NULL => return target != TypeId::UNDEFINED || self.mismatch(source, target),
            TypeId::VOID => return self.mismatch(source, target),
            _ => {}
        }
        if target == TypeId::NULL || target == TypeId::UNDEFINED {
            return self.mismatch(source, target);
        }

        match (source_data, target_data) {
            (TypeData::StringLiteral(_), TypeData::StringLiteral(_)) => {
                return self.mismatch(source, target);
            }
            (TypeData::StringLiteral(_), TypeData::Intrinsic(IntrinsicKind::String)) => {
                return lenient || self.mismatch(source, target);
            }
            (TypeData::Enum(_), TypeData::Intrinsic(IntrinsicKind::Number))
            | (TypeData::Intrinsic(IntrinsicKind::Number), TypeData::Enum(_)) => return true,
            (TypeData::Array(source_elem), TypeData::Array(target_elem)) => {
                return self.relate(source_elem, target_elem, kind)
                    || self.fail_nested(|_| RelationFailure::TypeMismatch { source, target });
            }
            _ => {}
        }

        // Primitive-like targets only accept what was handled above.
        if matches!(
            target_data,
            TypeData::Intrinsic(_) | TypeData::StringLiteral(_) | TypeData::Enum(_) | TypeData::TypeParameter(_)
        ) {
            return self.mismatch(source, target);
        }

        if let TypeData::TypeParameter(_) = source_data {
            let constraint = store
                .constraint_of(source)
                .filter(|&c| c != source)
                .unwrap_or(TypeId::EMPTY_OBJECT);
            return self.relate(constraint, target, kind)
                || self.fail_nested(|_| RelationFailure::TypeMismatch { source, target });
        }

        // Primitives, literals, enums and arrays compare through their apparent interfaces.
        let apparent_source = match source_data {
            TypeData::Intrinsic(_) | TypeData::StringLiteral(_) | TypeData::Enum(_) | TypeData::Array(_) => {
                store.apparent_type(source)
            }
            _ => source,
        };
        let apparent_target = match target_data {
            TypeData::Array(_) => {
                let apparent = store.apparent_type(target);
                if apparent == TypeId::EMPTY_OBJECT {
                    return self.mismatch(source, target);
                }
                apparent
            }
            _ => target,
        };
        if apparent_source == apparent_target {
            return true;
        }
        if !store.is_object_like(apparent_source) || !store.is_object_like(apparent_target) {
            return self.mismatch(source, target);
        }
        if store.has_base(apparent_source, apparent_target) {
            return true;
        }
        self.structural(apparent_source, apparent_target, kind)
    }

    // =========================================================================
    // Structural comparison
    // =========================================================================

    fn structural(&mut self, source: TypeId, target: TypeId, kind: RelationKind) -> bool {
        match self.cache.get(source, target, kind) {
            Some(CacheEntry::InProgress) | Some(CacheEntry::Final(true)) => return true,
            Some(CacheEntry::Final(false)) if !self.explain => return false,
            _ => {}
        }
        if !self.depth.enter() {
            debug!(source = source.0, target = target.0, "relation depth exceeded, assuming related");
            self.depth_exceeded = true;
            return true;
        }
        let mark = self.pending.len();
        self.cache.insert(source, target, kind, CacheEntry::InProgress);
        self.open_frames += 1;
        let related = if self.policy.grow_stack {
            stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                self.structural_inner(source, target, kind)
            })
        } else {
            self.structural_inner(source, target, kind)
        };
        self.open_frames -= 1;
        self.depth.leave();
        self.settle(source, target, kind, related, mark);
        trace!(source = source.0, target = target.0, ?kind, related, "structural relation");
        related
    }

    /// Record the outcome of a structural frame.
    ///
    /// A failure is final whatever the open assumptions, and evicts every
    /// pair proven inside the frame. A success under an open frame stays
    /// pending; the outermost success finalizes all pending pairs.
    fn settle(&mut self, source: TypeId, target: TypeId, kind: RelationKind, related: bool, mark: usize) {
        if !related {
            for (s, t, k) in self.pending.drain(mark..) {
                self.cache.remove(s, t, k);
            }
            self.cache.insert(source, target, kind, CacheEntry::Final(false));
        } else if self.open_frames > 0 {
            self.pending.push((source, target, kind));
        } else {
            for (s, t, k) in self.pending.drain(..) {
                self.cache.insert(s, t, k, CacheEntry::Final(true));
            }
            self.cache.insert(source, target, kind, CacheEntry::Final(true));
        }
    }

    fn structural_inner(&mut self, source: TypeId, target: TypeId, kind: RelationKind) -> bool {
        if kind == RelationKind::Identical {
            return self.members_identical(source, target)
                && SIGNATURE_KINDS
                    .iter()
                    .all(|&sig_kind| self.signature_group_identical(source, target, sig_kind));
        }
        self.members_related(source, target, kind)
            && SIGNATURE_KINDS
                .iter()
                .all(|&sig_kind| self.signature_group_related(source, target, sig_kind, kind))
    }

    fn members_related(&mut self, source: TypeId, target: TypeId, kind: RelationKind) -> bool {
        let store = self.store;
        for target_prop in store.properties_of(target) {
            let property = target_prop.name;
            let Some(source_prop) = store.find_apparent_property(source, property) else {
                if target_prop.optional {
                    continue;
                }
                return self.fail(|| RelationFailure::MissingProperty {
                    property,
                    source,
                    target,
                });
            };
            if source_prop.visibility != target_prop.visibility {
                let (private_in, public_in) = if source_prop.visibility == Visibility::Private {
                    (source, target)
                } else {
                    (target, source)
                };
                return self.fail(|| RelationFailure::PrivatePublicMismatch {
                    property,
                    private_in,
                    public_in,
                });
            }
            if source_prop.visibility == Visibility::Private
                && source_prop.declaration != target_prop.declaration
            {
                return self.fail(|| RelationFailure::PrivateDeclarationMismatch {
                    property,
                    source,
                    target,
                });
            }
            if source_prop.optional && !target_prop.optional && !kind.is_lenient() {
                return self.fail(|| RelationFailure::OptionalPropertyRequired {
                    property,
                    source,
                    target,
                });
            }
            if !self.relate(source_prop.type_id, target_prop.type_id, kind) {
                let (source_type, target_type) = (source_prop.type_id, target_prop.type_id);
                return self.fail_nested(|nested| RelationFailure::PropertyTypeMismatch {
                    property,
                    source: source_type,
                    target: target_type,
                    nested,
                });
            }
        }
        true
    }

    fn signature_group_related(
        &mut self,
        source: TypeId,
        target: TypeId,
        sig_kind: SignatureKind,
        kind: RelationKind,
    ) -> bool {
        let store = self.store;
        let target_sigs = store.signatures_of(target, sig_kind);
        if target_sigs.is_empty() {
            return true;
        }
        let source_sigs = store.signatures_of(source, sig_kind);
        if source_sigs.is_empty() {
            return self.fail(|| RelationFailure::MissingSignature {
                kind: sig_kind,
                source,
                target,
            });
        }
        for target_sig in target_sigs {
            let matched = source_sigs
                .iter()
                .any(|&source_sig| self.signature_related(source_sig, target_sig, kind));
            if !matched {
                return self.fail_nested(|nested| RelationFailure::SignatureMismatch {
                    kind: sig_kind,
                    source,
                    target,
                    nested,
                });
            }
        }
        true
    }

    fn signature_related(&mut self, source: SignatureId, target: SignatureId, kind: RelationKind) -> bool {
        if source == target {
            return true;
        }
        let store = self.store;
        let source = signature_to_any(store, source);
        let target = signature_to_any(store, target);
        let source_sig = store.signature(source);
        let target_sig = store.signature(target);

        if source_sig.non_optional_param_count > target_sig.params.len() && !target_sig.has_varargs() {
            let max = target_sig.params.len();
            return self.fail(|| RelationFailure::TooManyParameters { max });
        }

        let count = if source_sig.has_varargs() || target_sig.has_varargs() {
            source_sig.params.len().max(target_sig.params.len())
        } else {
            source_sig.params.len().min(target_sig.params.len())
        };
        for index in 0..count {
            let (Some(source_param), Some(target_param)) = (
                param_type_at(store, &source_sig, index),
                param_type_at(store, &target_sig, index),
            ) else {
                continue;
            };
            // Parameters are bivariant.
            if !self.relate(source_param, target_param, kind) && !self.relate(target_param, source_param, kind) {
                let source_name = param_at(&source_sig, index).map(|p| p.name).unwrap_or_default();
                let target_name = param_at(&target_sig, index).map(|p| p.name).unwrap_or_default();
                return self.fail_nested(|nested| RelationFailure::ParameterTypeMismatch {
                    source_param: source_name,
                    target_param: target_name,
                    source,
                    target,
                    nested,
                });
            }
        }

        if target_sig.return_type == TypeId::VOID {
            return true;
        }
        self.relate(source_sig.return_type, target_sig.return_type, kind)
            || self.fail_nested(|nested| RelationFailure::ReturnTypeMismatch {
                source,
                target,
                nested,
            })
    }

    // =========================================================================
    // Identity
    // =========================================================================

    fn identical_inner(
        &mut self,
        source: TypeId,
        target: TypeId,
        source_data: TypeData,
        target_data: TypeData,
    ) -> bool {
        if let (TypeData::Array(a), TypeData::Array(b)) = (source_data, target_data) {
            return self.relate(a, b, RelationKind::Identical)
                || self.fail_nested(|_| RelationFailure::TypeMismatch { source, target });
        }
        let store = self.store;
        if store.is_object_like(source) && store.is_object_like(target) {
            return self.structural(source, target, RelationKind::Identical);
        }
        // Intrinsics, literals, enums and type parameters are interned: distinct handles differ.
        self.mismatch(source, target)
    }

    fn members_identical(&mut self, source: TypeId, target: TypeId) -> bool {
        let store = self.store;
        let source_props = store.properties_of(source);
        let target_props = store.properties_of(target);
        if source_props.len() != target_props.len() {
            if let Some(missing) = target_props
                .iter()
                .find(|t| !source_props.iter().any(|s| s.name == t.name))
            {
                let property = missing.name;
                return self.fail(|| RelationFailure::MissingProperty {
                    property,
                    source,
                    target,
                });
            }
            return self.mismatch(source, target);
        }
        for target_prop in &target_props {
            let property = target_prop.name;
            let Some(source_prop) = source_props.iter().find(|s| s.name == property) else {
                return self.fail(|| RelationFailure::MissingProperty {
                    property,
                    source,
                    target,
                });
            };
            if source_prop.optional != target_prop.optional {
                return self.fail(|| RelationFailure::OptionalPropertyRequired {
                    property,
                    source,
                    target,
                });
            }
            if source_prop.visibility != target_prop.visibility {
                let (private_in, public_in) = if source_prop.visibility == Visibility::Private {
                    (source, target)
                } else {
                    (target, source)
                };
                return self.fail(|| RelationFailure::PrivatePublicMismatch {
                    property,
                    private_in,
                    public_in,
                });
            }
            if !self.relate(source_prop.type_id, target_prop.type_id, RelationKind::Identical) {
                let (source_type, target_type) = (source_prop.type_id, target_prop.type_id);
                return self.fail_nested(|nested| RelationFailure::PropertyTypeMismatch {
                    property,
                    source: source_type,
                    target: target_type,
                    nested,
                });
            }
        }
        true
    }

    fn signature_group_identical(&mut self, source: TypeId, target: TypeId, sig_kind: SignatureKind) -> bool {
        let store = self.store;
        let source_sigs = store.signatures_of(source, sig_kind);
        let target_sigs = store.signatures_of(target, sig_kind);
        if source_sigs.len() != target_sigs.len() {
            return self.fail(|| RelationFailure::MissingSignature {
                kind: sig_kind,
                source,
                target,
            });
        }
        for &target_sig in &target_sigs {
            let matched = source_sigs
                .iter()
                .any(|&source_sig| self.signatures_identical(source_sig, target_sig));
            if !matched {
                return self.fail_nested(|nested| RelationFailure::SignatureMismatch {
                    kind: sig_kind,
                    source,
                    target,
                    nested,
                });
            }
        }
        true
    }

    fn signatures_identical(&mut self, source: SignatureId, target: SignatureId) -> bool {
        if source == target {
            return true;
        }
        let store = self.store;
        let (raw_source, raw_target) = (store.signature(source), store.signature(target));
        if raw_source.type_params.len() != raw_target.type_params.len() {
            return self.fail(|| RelationFailure::SignatureShapeMismatch { source, target });
        }
        let (declared_source, declared_target) = (source, target);
        let source = signature_to_any(store, source);
        let target = signature_to_any(store, target);
        let source_sig = store.signature(source);
        let target_sig = store.signature(target);
        if source_sig.params.len() != target_sig.params.len()
            || source_sig.non_optional_param_count != target_sig.non_optional_param_count
            || source_sig.has_varargs() != target_sig.has_varargs()
        {
            return self.fail(|| RelationFailure::SignatureShapeMismatch {
                source: declared_source,
                target: declared_target,
            });
        }
        for (index, (sp, tp)) in source_sig.params.iter().zip(target_sig.params.iter()).enumerate() {
            if !self.relate(sp.type_id, tp.type_id, RelationKind::Identical) {
                let (source_param, target_param) = (sp.name, tp.name);
                trace!(index, "parameter not identical");
                return self.fail_nested(|nested| RelationFailure::ParameterTypeMismatch {
                    source_param,
                    target_param,
                    source,
                    target,
                    nested,
                });
            }
        }
        self.relate(source_sig.return_type, target_sig.return_type, RelationKind::Identical)
            || self.fail_nested(|nested| RelationFailure::ReturnTypeMismatch {
                source,
                target,
                nested,
            })
    }
}

fn param_at(sig: &Signature, index: usize) -> Option<&ParamInfo> {
    match sig.params.get(index) {
        Some(param) => Some(param),
        None if sig.has_varargs() => sig.params.last(),
        None => None,
    }
}

/// Type an argument at `index` binds to; the rest parameter contributes its element type.
pub fn param_type_at(store: &TypeStore, sig: &Signature, index: usize) -> Option<TypeId> {
    let param = param_at(sig, index)?;
    if param.rest {
        return Some(store.array_element(param.type_id).unwrap_or(TypeId::ANY));
    }
    Some(param.type_id)
}

#[cfg(test)]
#[path = "../tests/relation_unit_tests.rs"]
mod tests;
