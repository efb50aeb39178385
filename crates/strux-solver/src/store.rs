//! Arena and interner for every type of one compilation unit.
//!
//! The store is used through `&self`: the resolver holds it while it also
//! needs to allocate (late-filled shapes, lazily materialized
//! specializations), so its tables live behind `RefCell`s. No borrow is held
//! across a call back into the store.

use crate::instantiate;
use crate::types::{
    DiagnosticId, IntrinsicKind, ObjectShape, PropertyInfo, ShapeFlags, ShapeId, Signature,
    SignatureId, SignatureKind, SpecializationId, StructuralView, TypeData, TypeId, TypeParamId,
    TypeParamInfo,
};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use strux_binder::SymbolId;
use strux_common::Atom;
use strux_common::limits::MAX_BASE_CHAIN_DEPTH;
use tracing::trace;

/// A generic root applied to an ordered argument list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecializationKey {
    pub root: TypeId,
    pub args: SmallVec<[TypeId; 4]>,
}

/// Global interfaces that stand in for primitives, arrays and callables when
/// they are compared against object types or have members looked up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApparentTypes {
    pub object: Option<TypeId>,
    pub function: Option<TypeId>,
    pub number: Option<TypeId>,
    pub string: Option<TypeId>,
    pub boolean: Option<TypeId>,
    /// Generic root of the global `Array<T>` interface.
    pub array: Option<TypeId>,
}

pub struct TypeStore {
    types: RefCell<IndexSet<TypeData, FxBuildHasher>>,
    shapes: RefCell<Vec<Arc<ObjectShape>>>,
    signatures: RefCell<Vec<Arc<Signature>>>,
    type_params: RefCell<Vec<TypeParamInfo>>,
    /// The specialization cache: interning a key yields its `SpecializationId`.
    specializations: RefCell<IndexSet<SpecializationKey, FxBuildHasher>>,
    specialized_shapes: RefCell<FxHashMap<SpecializationId, ShapeId>>,
    /// Generic signatures with their type parameters erased to `any`.
    erased_signatures: RefCell<FxHashMap<SignatureId, SignatureId>>,
    recursive_bases: RefCell<FxHashSet<TypeId>>,
    apparent: Cell<ApparentTypes>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeStore {
    pub fn new() -> Self {
        let store = TypeStore {
            types: RefCell::new(IndexSet::with_hasher(FxBuildHasher)),
            shapes: RefCell::new(Vec::new()),
            signatures: RefCell::new(Vec::new()),
            type_params: RefCell::new(Vec::new()),
            specializations: RefCell::new(IndexSet::with_hasher(FxBuildHasher)),
            specialized_shapes: RefCell::new(FxHashMap::default()),
            erased_signatures: RefCell::new(FxHashMap::default()),
            recursive_bases: RefCell::new(FxHashSet::default()),
            apparent: Cell::new(ApparentTypes::default()),
        };
        for kind in [
            IntrinsicKind::Any,
            IntrinsicKind::Number,
            IntrinsicKind::String,
            IntrinsicKind::Boolean,
            IntrinsicKind::Void,
            IntrinsicKind::Null,
            IntrinsicKind::Undefined,
        ] {
            store.intern(TypeData::Intrinsic(kind));
        }
        let error = store.intern(TypeData::Error(None));
        debug_assert_eq!(error, TypeId::ERROR);
        let empty = store.object_type(ObjectShape::anonymous());
        debug_assert_eq!(empty, TypeId::EMPTY_OBJECT);
        store
    }

    // =========================================================================
    // Interning
    // =========================================================================

    pub fn intern(&self, data: TypeData) -> TypeId {
        let (index, _) = self.types.borrow_mut().insert_full(data);
        TypeId(index as u32)
    }

    /// Data behind a handle. Unknown handles read as the error type.
    pub fn lookup(&self, id: TypeId) -> TypeData {
        self.types
            .borrow()
            .get_index(id.0 as usize)
            .copied()
            .unwrap_or(TypeData::Error(None))
    }

    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn string_literal(&self, value: Atom) -> TypeId {
        self.intern(TypeData::StringLiteral(value))
    }

    pub fn alias(&self, target: TypeId) -> TypeId {
        self.intern(TypeData::Alias(target))
    }

    pub fn enum_type(&self, symbol: SymbolId) -> TypeId {
        self.intern(TypeData::Enum(symbol))
    }

    pub fn error_type(&self, diagnostic: Option<DiagnosticId>) -> TypeId {
        self.intern(TypeData::Error(diagnostic))
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Allocate a fresh type parameter. Type parameters are never shared.
    pub fn type_parameter(&self, info: TypeParamInfo) -> TypeId {
        let id = {
            let mut params = self.type_params.borrow_mut();
            params.push(info);
            TypeParamId(params.len() as u32 - 1)
        };
        self.intern(TypeData::TypeParameter(id))
    }

    pub fn type_param_info(&self, type_id: TypeId) -> Option<TypeParamInfo> {
        match self.lookup(type_id) {
            TypeData::TypeParameter(id) => self.type_params.borrow().get(id.0 as usize).cloned(),
            _ => None,
        }
    }

    pub fn constraint_of(&self, type_id: TypeId) -> Option<TypeId> {
        self.type_param_info(type_id).and_then(|info| info.constraint)
    }

    pub fn set_constraint(&self, type_param: TypeId, constraint: TypeId) {
        if let TypeData::TypeParameter(id) = self.lookup(type_param)
            && let Some(info) = self.type_params.borrow_mut().get_mut(id.0 as usize)
        {
            info.constraint = Some(constraint);
        }
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    pub fn alloc_shape(&self, shape: ObjectShape) -> ShapeId {
        let mut shapes = self.shapes.borrow_mut();
        shapes.push(Arc::new(shape));
        ShapeId(shapes.len() as u32 - 1)
    }

    /// Allocate an empty shape to be filled in later with [`set_shape`](Self::set_shape).
    pub fn alloc_pending_shape(&self, name: Atom, symbol: Option<SymbolId>, flags: ShapeFlags) -> ShapeId {
        let mut shape = ObjectShape::named(name, symbol);
        shape.flags = flags | ShapeFlags::PENDING;
        self.alloc_shape(shape)
    }

    pub fn set_shape(&self, id: ShapeId, mut shape: ObjectShape) {
        shape.flags.remove(ShapeFlags::PENDING);
        if let Some(slot) = self.shapes.borrow_mut().get_mut(id.0 as usize) {
            *slot = Arc::new(shape);
        }
        trace!(shape = id.0, "shape filled");
    }

    /// Record the type parameters of a pending shape before its members are walked,
    /// so self-references inside the body can be specialized.
    pub fn set_type_params(&self, id: ShapeId, params: Vec<TypeId>) {
        if let Some(slot) = self.shapes.borrow_mut().get_mut(id.0 as usize) {
            Arc::make_mut(slot).type_params = params;
        }
    }

    pub fn shape(&self, id: ShapeId) -> Arc<ObjectShape> {
        self.shapes
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::new(ObjectShape::anonymous()))
    }

    pub fn object_type(&self, shape: ObjectShape) -> TypeId {
        let id = self.alloc_shape(shape);
        self.intern(TypeData::Object(id))
    }

    pub fn function_type(&self, shape: ObjectShape) -> TypeId {
        let id = self.alloc_shape(shape);
        self.intern(TypeData::Function(id))
    }

    /// Anonymous function type with a single call signature.
    pub fn function_of(&self, signature: SignatureId) -> TypeId {
        let mut shape = ObjectShape::anonymous();
        shape.call_signatures.push(signature);
        self.function_type(shape)
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    pub fn add_signature(&self, signature: Signature) -> SignatureId {
        let mut signatures = self.signatures.borrow_mut();
        signatures.push(Arc::new(signature));
        SignatureId(signatures.len() as u32 - 1)
    }

    pub fn signature(&self, id: SignatureId) -> Arc<Signature> {
        self.signatures
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| {
                Arc::new(Signature::new(SmallVec::new(), Vec::new(), TypeId::ERROR, None))
            })
    }

    // =========================================================================
    // Specializations
    // =========================================================================

    /// Intern `root<args>`. Identical keys always produce the identical handle.
    pub fn intern_specialization(&self, root: TypeId, args: SmallVec<[TypeId; 4]>) -> TypeId {
        let (index, inserted) = self
            .specializations
            .borrow_mut()
            .insert_full(SpecializationKey { root, args });
        if inserted {
            trace!(root = root.0, specialization = index, "new specialization");
        }
        self.intern(TypeData::Specialized(SpecializationId(index as u32)))
    }

    pub fn specialization(&self, id: SpecializationId) -> Option<SpecializationKey> {
        self.specializations.borrow().get_index(id.0 as usize).cloned()
    }

    /// Root and arguments of a specialized type.
    pub fn specialization_of(&self, type_id: TypeId) -> Option<SpecializationKey> {
        match self.lookup(self.unalias(type_id)) {
            TypeData::Specialized(id) => self.specialization(id),
            _ => None,
        }
    }

    pub(crate) fn cached_specialized_shape(&self, id: SpecializationId) -> Option<ShapeId> {
        self.specialized_shapes.borrow().get(&id).copied()
    }

    pub(crate) fn cache_specialized_shape(&self, id: SpecializationId, shape: ShapeId) {
        self.specialized_shapes.borrow_mut().insert(id, shape);
    }

    pub(crate) fn cached_erased_signature(&self, id: SignatureId) -> Option<SignatureId> {
        self.erased_signatures.borrow().get(&id).copied()
    }

    pub(crate) fn cache_erased_signature(&self, id: SignatureId, erased: SignatureId) {
        self.erased_signatures.borrow_mut().insert(id, erased);
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.borrow().len()
    }

    pub fn specialization_count(&self) -> usize {
        self.specializations.borrow().len()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Follow `Alias` links to the underlying type.
    pub fn unalias(&self, mut id: TypeId) -> TypeId {
        for _ in 0..MAX_BASE_CHAIN_DEPTH {
            match self.lookup(id) {
                TypeData::Alias(target) => id = target,
                _ => return id,
            }
        }
        id
    }

    #[inline]
    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), TypeData::Error(_))
    }

    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(self.unalias(id)) {
            TypeData::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_type_parameter(&self, id: TypeId) -> bool {
        matches!(self.lookup(id), TypeData::TypeParameter(_))
    }

    /// Shape of an object-like type; specializations are materialized on first use.
    pub fn shape_of(&self, id: TypeId) -> Option<Arc<ObjectShape>> {
        let data = self.lookup(self.unalias(id));
        if let Some(shape) = data.direct_shape() {
            return Some(self.shape(shape));
        }
        match data {
            TypeData::Specialized(spec) => instantiate::materialize(self, spec),
            _ => None,
        }
    }

    /// Whether relations and member lookup treat `id` structurally.
    pub fn is_object_like(&self, id: TypeId) -> bool {
        let data = self.lookup(self.unalias(id));
        data.direct_shape().is_some() || matches!(data, TypeData::Specialized(_))
    }

    pub fn mark_recursive_base(&self, id: TypeId) {
        self.recursive_bases.borrow_mut().insert(id);
    }

    pub fn is_recursive_base(&self, id: TypeId) -> bool {
        self.recursive_bases.borrow().contains(&id)
    }

    // =========================================================================
    // Apparent types
    // =========================================================================

    pub fn set_apparent_types(&self, apparent: ApparentTypes) {
        self.apparent.set(apparent);
    }

    pub fn apparent_types(&self) -> ApparentTypes {
        self.apparent.get()
    }

    /// The object-like type whose members a value of type `id` exposes.
    pub fn apparent_type(&self, id: TypeId) -> TypeId {
        let id = self.unalias(id);
        let apparent = self.apparent.get();
        match self.lookup(id) {
            TypeData::Intrinsic(IntrinsicKind::Number) | TypeData::Enum(_) => {
                apparent.number.unwrap_or(TypeId::EMPTY_OBJECT)
            }
            TypeData::Intrinsic(IntrinsicKind::String) | TypeData::StringLiteral(_) => {
                apparent.string.unwrap_or(TypeId::EMPTY_OBJECT)
            }
            TypeData::Intrinsic(IntrinsicKind::Boolean) => {
                apparent.boolean.unwrap_or(TypeId::EMPTY_OBJECT)
            }
            TypeData::Array(element) => match apparent.array {
                Some(root) => instantiate::specialize(self, root, &[element]),
                None => TypeId::EMPTY_OBJECT,
            },
            TypeData::TypeParameter(_) => match self.constraint_of(id) {
                Some(constraint) if constraint != id => self.apparent_type(constraint),
                _ => TypeId::EMPTY_OBJECT,
            },
            _ => id,
        }
    }

    // =========================================================================
    // Structural queries over base chains
    // =========================================================================

    /// Own and inherited members; own members shadow inherited ones.
    pub fn properties_of(&self, id: TypeId) -> Vec<PropertyInfo> {
        let mut out: Vec<PropertyInfo> = Vec::new();
        let mut seen_names: FxHashSet<Atom> = FxHashSet::default();
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        self.collect_properties(id, &mut out, &mut seen_names, &mut visited, 0);
        out
    }

    fn collect_properties(
        &self,
        id: TypeId,
        out: &mut Vec<PropertyInfo>,
        seen_names: &mut FxHashSet<Atom>,
        visited: &mut FxHashSet<TypeId>,
        depth: u32,
    ) {
        if depth > MAX_BASE_CHAIN_DEPTH || !visited.insert(id) {
            return;
        }
        let Some(shape) = self.shape_of(id) else {
            return;
        };
        for member in shape.members() {
            if seen_names.insert(member.name) {
                out.push(member.clone());
            }
        }
        for &base in &shape.base_types {
            self.collect_properties(base, out, seen_names, visited, depth + 1);
        }
    }

    pub fn find_property(&self, id: TypeId, name: Atom) -> Option<PropertyInfo> {
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        self.find_property_in(id, name, &mut visited, 0)
    }

    fn find_property_in(
        &self,
        id: TypeId,
        name: Atom,
        visited: &mut FxHashSet<TypeId>,
        depth: u32,
    ) -> Option<PropertyInfo> {
        if depth > MAX_BASE_CHAIN_DEPTH || !visited.insert(id) {
            return None;
        }
        let shape = self.shape_of(id)?;
        if let Some(member) = shape.find_member(name) {
            return Some(member.clone());
        }
        shape
            .base_types
            .iter()
            .find_map(|&base| self.find_property_in(base, name, visited, depth + 1))
    }

    /// Member lookup with the global `Function` and `Object` interfaces as fallbacks.
    pub fn find_apparent_property(&self, id: TypeId, name: Atom) -> Option<PropertyInfo> {
        let target = self.apparent_type(id);
        if let Some(found) = self.find_property(target, name) {
            return Some(found);
        }
        let apparent = self.apparent.get();
        let callable = self
            .shape_of(target)
            .is_some_and(|s| s.has_call_or_construct_signatures());
        if callable
            && let Some(function) = apparent.function
            && function != target
            && let Some(found) = self.find_property(function, name)
        {
            return Some(found);
        }
        match apparent.object {
            Some(object) if object != target => self.find_property(object, name),
            _ => None,
        }
    }

    /// Own signatures of `kind`, or the first base's when none are declared.
    pub fn signatures_of(&self, id: TypeId, kind: SignatureKind) -> Vec<SignatureId> {
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        self.signatures_in(id, kind, &mut visited, 0)
    }

    fn signatures_in(
        &self,
        id: TypeId,
        kind: SignatureKind,
        visited: &mut FxHashSet<TypeId>,
        depth: u32,
    ) -> Vec<SignatureId> {
        if depth > MAX_BASE_CHAIN_DEPTH || !visited.insert(id) {
            return Vec::new();
        }
        let Some(shape) = self.shape_of(id) else {
            return Vec::new();
        };
        let own = shape.signatures(kind);
        if !own.is_empty() {
            return own.to_vec();
        }
        for &base in &shape.base_types {
            let inherited = self.signatures_in(base, kind, visited, depth + 1);
            if !inherited.is_empty() {
                return inherited;
            }
        }
        Vec::new()
    }

    /// Whether `target` appears in the base-type chain of `source`.
    pub fn has_base(&self, source: TypeId, target: TypeId) -> bool {
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        let mut stack = vec![(source, 0u32)];
        while let Some((current, depth)) = stack.pop() {
            if depth > MAX_BASE_CHAIN_DEPTH || !visited.insert(current) {
                continue;
            }
            let Some(shape) = self.shape_of(current) else {
                continue;
            };
            for &base in &shape.base_types {
                if base == target {
                    return true;
                }
                stack.push((base, depth + 1));
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;
