//! Generic specialization.
//!
//! - [`TypeSubstitution`]: type parameter → argument map
//! - [`instantiate_type`] / [`instantiate_signature`]: apply a substitution
//! - [`specialize`]: intern `root<args>`; members are rewritten lazily by
//!   [`materialize`] the first time the specialization's shape is queried,
//!   which is what lets `interface List<T> { next: List<T> }` terminate
//! - [`specialize_to_any`] / [`signature_to_any`]: erase type parameters
//! - [`check_constraints`] / [`specialize_checked`]: constraint verification

use crate::relation::RelationChecker;
use crate::relation_queries::RelationCache;
use crate::store::TypeStore;
use crate::types::{
    ObjectShape, ParamInfo, ShapeFlags, Signature, SignatureFlags, SignatureId, SpecializationId,
    TypeData, TypeId,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use strux_common::limits::MAX_INSTANTIATION_DEPTH;
use tracing::{debug, trace};

// =============================================================================
// TypeSubstitution
// =============================================================================

/// Maps type parameters (by handle) to the types that replace them.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `params` with `args`; parameters without an argument map to `any`.
    pub fn from_args(params: &[TypeId], args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        for (i, &param) in params.iter().enumerate() {
            subst.insert(param, args.get(i).copied().unwrap_or(TypeId::ANY));
        }
        subst
    }

    /// Every parameter in `params` maps to `any`.
    pub fn to_any(params: &[TypeId]) -> Self {
        Self::from_args(params, &[])
    }

    pub fn insert(&mut self, param: TypeId, replacement: TypeId) {
        self.map.insert(param, replacement);
    }

    #[inline]
    pub fn get(&self, param: TypeId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the substitution changes any parameter in `params`.
    fn touches(&self, params: &[TypeId]) -> bool {
        params
            .iter()
            .any(|p| self.get(*p).is_some_and(|replacement| replacement != *p))
    }
}

// =============================================================================
// Instantiation
// =============================================================================

pub fn instantiate_type(store: &TypeStore, type_id: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return type_id;
    }
    Instantiator { store, subst, depth: 0 }.instantiate(type_id)
}

pub fn instantiate_signature(store: &TypeStore, signature: SignatureId, subst: &TypeSubstitution) -> SignatureId {
    if subst.is_empty() {
        return signature;
    }
    Instantiator { store, subst, depth: 0 }.instantiate_signature(signature)
}

struct Instantiator<'a> {
    store: &'a TypeStore,
    subst: &'a TypeSubstitution,
    depth: u32,
}

impl Instantiator<'_> {
    fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            debug!(type_id = type_id.0, "instantiation depth exceeded");
            return type_id;
        }
        self.depth += 1;
        let result = self.instantiate_inner(type_id);
        self.depth -= 1;
        result
    }

    fn instantiate_inner(&mut self, type_id: TypeId) -> TypeId {
        let store = self.store;
        match store.lookup(type_id) {
            TypeData::TypeParameter(_) => self.subst.get(type_id).unwrap_or(type_id),
            TypeData::Array(element) => {
                let new_element = self.instantiate(element);
                if new_element == element {
                    type_id
                } else {
                    store.array(new_element)
                }
            }
            TypeData::Alias(target) => {
                let new_target = self.instantiate(target);
                if new_target == target {
                    type_id
                } else {
                    new_target
                }
            }
            // A bare reference to a generic root inside its own body stands for
            // the root applied to its own parameters.
            TypeData::Generic(shape) => {
                let params = store.shape(shape).type_params.clone();
                if !self.subst.touches(&params) {
                    return type_id;
                }
                let args: Vec<TypeId> = params.iter().map(|&p| self.instantiate(p)).collect();
                specialize(store, type_id, &args)
            }
            TypeData::Specialized(spec) => {
                let Some(key) = store.specialization(spec) else {
                    return type_id;
                };
                let args: Vec<TypeId> = key.args.iter().map(|&a| self.instantiate(a)).collect();
                if args.as_slice() == key.args.as_slice() {
                    type_id
                } else {
                    specialize(store, key.root, &args)
                }
            }
            TypeData::Object(shape_id) | TypeData::Function(shape_id) => {
                let shape = store.shape(shape_id);
                if !shape.flags.contains(ShapeFlags::ANONYMOUS) {
                    return type_id;
                }
                let new_shape = self.instantiate_shape(&shape);
                if new_shape == *shape {
                    return type_id;
                }
                let new_id = store.alloc_shape(new_shape);
                match store.lookup(type_id) {
                    TypeData::Function(_) => store.intern(TypeData::Function(new_id)),
                    _ => store.intern(TypeData::Object(new_id)),
                }
            }
            _ => type_id,
        }
    }

    fn instantiate_shape(&mut self, shape: &ObjectShape) -> ObjectShape {
        let mut out = shape.clone();
        out.type_params.retain(|p| self.subst.get(*p).is_none());
        for member in &mut out.members {
            member.type_id = self.instantiate(member.type_id);
        }
        for sig in out
            .call_signatures
            .iter_mut()
            .chain(out.construct_signatures.iter_mut())
            .chain(out.index_signatures.iter_mut())
        {
            *sig = self.instantiate_signature(*sig);
        }
        for base in &mut out.base_types {
            *base = self.instantiate(*base);
        }
        out
    }

    fn instantiate_signature(&mut self, signature: SignatureId) -> SignatureId {
        let sig = self.store.signature(signature);
        let params: Vec<ParamInfo> = sig
            .params
            .iter()
            .map(|p| ParamInfo {
                type_id: self.instantiate(p.type_id),
                ..p.clone()
            })
            .collect();
        let return_type = self.instantiate(sig.return_type);
        let type_params: SmallVec<[TypeId; 2]> = sig
            .type_params
            .iter()
            .copied()
            .filter(|p| self.subst.get(*p).is_none())
            .collect();
        if params == sig.params && return_type == sig.return_type && type_params == sig.type_params {
            return signature;
        }
        let mut new_sig = Signature::new(type_params, params, return_type, sig.declaration);
        new_sig.flags |= sig.flags & SignatureFlags::DEFINITION;
        self.store.add_signature(new_sig)
    }
}

// =============================================================================
// Specialization
// =============================================================================

/// Apply a generic root to `args`. Missing arguments become `any`, surplus
/// arguments are ignored, and a non-generic `root` is returned unchanged.
pub fn specialize(store: &TypeStore, root: TypeId, args: &[TypeId]) -> TypeId {
    let root = store.unalias(root);
    let TypeData::Generic(shape) = store.lookup(root) else {
        return root;
    };
    let params = store.shape(shape).type_params.clone();
    let args: SmallVec<[TypeId; 4]> = (0..params.len())
        .map(|i| args.get(i).copied().unwrap_or(TypeId::ANY))
        .collect();
    if args.as_slice() == params.as_slice() {
        return root;
    }
    store.intern_specialization(root, args)
}

/// Bind every type parameter of `type_id` to `any`. Never fails.
pub fn specialize_to_any(store: &TypeStore, type_id: TypeId) -> TypeId {
    let type_id = store.unalias(type_id);
    match store.lookup(type_id) {
        TypeData::Generic(shape) => {
            let count = store.shape(shape).type_params.len();
            specialize(store, type_id, &vec![TypeId::ANY; count])
        }
        TypeData::TypeParameter(_) => TypeId::ANY,
        TypeData::Object(shape_id) | TypeData::Function(shape_id) => {
            let shape = store.shape(shape_id);
            let generic_sigs = shape
                .call_signatures
                .iter()
                .chain(shape.construct_signatures.iter())
                .any(|&s| store.signature(s).is_generic());
            if !generic_sigs {
                return type_id;
            }
            let mut new_shape = (*shape).clone();
            for sig in new_shape
                .call_signatures
                .iter_mut()
                .chain(new_shape.construct_signatures.iter_mut())
            {
                *sig = signature_to_any(store, *sig);
            }
            let new_id = store.alloc_shape(new_shape);
            match store.lookup(type_id) {
                TypeData::Function(_) => store.intern(TypeData::Function(new_id)),
                _ => store.intern(TypeData::Object(new_id)),
            }
        }
        _ => type_id,
    }
}

/// Erase a signature's own type parameters to `any`. The erased signature is
/// built once per generic signature.
pub fn signature_to_any(store: &TypeStore, signature: SignatureId) -> SignatureId {
    let sig = store.signature(signature);
    if !sig.is_generic() {
        return signature;
    }
    if let Some(erased) = store.cached_erased_signature(signature) {
        return erased;
    }
    let erased = instantiate_signature(store, signature, &TypeSubstitution::to_any(&sig.type_params));
    store.cache_erased_signature(signature, erased);
    erased
}

/// Instantiate a generic signature with explicit or inferred type arguments.
pub fn instantiate_generic_signature(store: &TypeStore, signature: SignatureId, args: &[TypeId]) -> SignatureId {
    let sig = store.signature(signature);
    if !sig.is_generic() {
        return signature;
    }
    instantiate_signature(store, signature, &TypeSubstitution::from_args(&sig.type_params, args))
}

/// Build (and cache) the shape of a specialization from its root's shape.
///
/// While the root's own shape is still being filled in, a transient shape is
/// returned and nothing is cached.
pub(crate) fn materialize(store: &TypeStore, spec: SpecializationId) -> Option<Arc<ObjectShape>> {
    if let Some(shape) = store.cached_specialized_shape(spec) {
        return Some(store.shape(shape));
    }
    let key = store.specialization(spec)?;
    let TypeData::Generic(root_shape_id) = store.lookup(key.root) else {
        return None;
    };
    let root_shape = store.shape(root_shape_id);
    let subst = TypeSubstitution::from_args(&root_shape.type_params, &key.args);
    let mut shape = Instantiator {
        store,
        subst: &subst,
        depth: 0,
    }
    .instantiate_shape(&root_shape);
    shape.type_params.clear();
    if root_shape.is_pending() {
        trace!(specialization = spec.0, "root pending, transient shape");
        return Some(Arc::new(shape));
    }
    let id = store.alloc_shape(shape);
    store.cache_specialized_shape(spec, id);
    trace!(specialization = spec.0, shape = id.0, "materialized");
    Some(store.shape(id))
}

// =============================================================================
// Constraints
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub index: usize,
    pub type_param: TypeId,
    pub argument: TypeId,
    /// The constraint after substituting the other parameters.
    pub constraint: TypeId,
}

/// Verify each argument against its parameter's constraint with assignability.
/// Constraints may mention the parameters themselves; they are substituted first.
pub fn check_constraints(
    store: &TypeStore,
    cache: &mut RelationCache,
    params: &[TypeId],
    args: &[TypeId],
) -> Vec<ConstraintViolation> {
    let subst = TypeSubstitution::from_args(params, args);
    let mut violations = Vec::new();
    for (index, &type_param) in params.iter().enumerate() {
        let Some(constraint) = store.constraint_of(type_param) else {
            continue;
        };
        let constraint = instantiate_type(store, constraint, &subst);
        let argument = args.get(index).copied().unwrap_or(TypeId::ANY);
        if !RelationChecker::new(store, cache).is_assignable(argument, constraint) {
            debug!(index, argument = argument.0, constraint = constraint.0, "constraint violated");
            violations.push(ConstraintViolation {
                index,
                type_param,
                argument,
                constraint,
            });
        }
    }
    violations
}

/// [`specialize`] plus constraint verification. The specialization is produced
/// even when constraints are violated.
pub fn specialize_checked(
    store: &TypeStore,
    cache: &mut RelationCache,
    root: TypeId,
    args: &[TypeId],
) -> (TypeId, Vec<ConstraintViolation>) {
    let root = store.unalias(root);
    let params = match store.lookup(root) {
        TypeData::Generic(shape) => store.shape(shape).type_params.clone(),
        _ => return (root, Vec::new()),
    };
    let violations = check_constraints(store, cache, &params, args);
    (specialize(store, root, args), violations)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
