use super::*;
use strux_common::Interner;

fn object_with(store: &TypeStore, members: Vec<PropertyInfo>, bases: Vec<TypeId>) -> TypeId {
    let mut shape = ObjectShape::anonymous();
    shape.members = members;
    shape.base_types = bases;
    store.object_type(shape)
}

#[test]
fn test_intrinsics_have_fixed_handles() {
    let store = TypeStore::new();
    assert_eq!(store.lookup(TypeId::ANY), TypeData::Intrinsic(IntrinsicKind::Any));
    assert_eq!(store.lookup(TypeId::NUMBER), TypeData::Intrinsic(IntrinsicKind::Number));
    assert_eq!(store.lookup(TypeId::UNDEFINED), TypeData::Intrinsic(IntrinsicKind::Undefined));
    assert_eq!(store.lookup(TypeId::ERROR), TypeData::Error(None));
    assert!(store.shape_of(TypeId::EMPTY_OBJECT).is_some_and(|s| s.members.is_empty()));
}

#[test]
fn test_unknown_handle_reads_as_error() {
    let store = TypeStore::new();
    assert!(store.is_error(TypeId(10_000)));
}

#[test]
fn test_arrays_and_literals_are_interned() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let a = interner.intern("a");
    assert_eq!(store.array(TypeId::NUMBER), store.array(TypeId::NUMBER));
    assert_ne!(store.array(TypeId::NUMBER), store.array(TypeId::STRING));
    assert_eq!(store.string_literal(a), store.string_literal(a));
    assert_eq!(store.array_element(store.array(TypeId::STRING)), Some(TypeId::STRING));
}

#[test]
fn test_anonymous_shapes_get_distinct_handles() {
    let store = TypeStore::new();
    let a = store.object_type(ObjectShape::anonymous());
    let b = store.object_type(ObjectShape::anonymous());
    assert_ne!(a, b);
}

#[test]
fn test_unalias_follows_chain() {
    let store = TypeStore::new();
    let inner = store.alias(TypeId::NUMBER);
    let outer = store.alias(inner);
    assert_eq!(store.unalias(outer), TypeId::NUMBER);
}

#[test]
fn test_properties_of_includes_bases_with_shadowing() {
    let mut interner = Interner::new();
    let (x, y) = (interner.intern("x"), interner.intern("y"));
    let store = TypeStore::new();
    let base = object_with(
        &store,
        vec![PropertyInfo::new(x, TypeId::STRING), PropertyInfo::new(y, TypeId::NUMBER)],
        vec![],
    );
    let derived = object_with(&store, vec![PropertyInfo::new(x, TypeId::NUMBER)], vec![base]);

    let props = store.properties_of(derived);
    assert_eq!(props.len(), 2);
    assert_eq!(props[0].name, x);
    assert_eq!(props[0].type_id, TypeId::NUMBER);
    assert_eq!(store.find_property(derived, y).map(|p| p.type_id), Some(TypeId::NUMBER));
    assert!(store.has_base(derived, base));
    assert!(!store.has_base(base, derived));
}

#[test]
fn test_signatures_inherited_from_first_base() {
    let store = TypeStore::new();
    let sig = store.add_signature(Signature::new(SmallVec::new(), Vec::new(), TypeId::NUMBER, None));
    let base = store.function_of(sig);
    let derived = object_with(&store, vec![], vec![base]);
    assert_eq!(store.signatures_of(derived, SignatureKind::Call), vec![sig]);
    assert!(store.signatures_of(derived, SignatureKind::Construct).is_empty());
}

#[test]
fn test_base_cycle_does_not_hang() {
    let mut interner = Interner::new();
    let name = interner.intern("A");
    let store = TypeStore::new();
    let id = store.alloc_pending_shape(name, None, ShapeFlags::empty());
    let a = store.intern(TypeData::Object(id));
    let mut shape = ObjectShape::named(name, None);
    shape.base_types.push(a);
    store.set_shape(id, shape);
    assert!(store.properties_of(a).is_empty());
    assert!(store.has_base(a, a));
}

#[test]
fn test_pending_shape_and_type_params() {
    let mut interner = Interner::new();
    let (name, t) = (interner.intern("Box"), interner.intern("T"));
    let store = TypeStore::new();
    let id = store.alloc_pending_shape(name, None, ShapeFlags::empty());
    assert!(store.shape(id).is_pending());
    let param = store.type_parameter(TypeParamInfo {
        name: t,
        constraint: None,
        declaration: None,
    });
    store.set_type_params(id, vec![param]);
    assert!(store.shape(id).is_pending());
    assert_eq!(store.shape(id).type_params, vec![param]);

    let mut filled = ObjectShape::named(name, None);
    filled.type_params = vec![param];
    store.set_shape(id, filled);
    assert!(!store.shape(id).is_pending());
}

#[test]
fn test_constraint_is_set_lazily() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let param = store.type_parameter(TypeParamInfo {
        name: interner.intern("T"),
        constraint: None,
        declaration: None,
    });
    assert_eq!(store.constraint_of(param), None);
    store.set_constraint(param, TypeId::STRING);
    assert_eq!(store.constraint_of(param), Some(TypeId::STRING));
    assert!(store.is_type_parameter(param));
}

#[test]
fn test_apparent_type_without_globals_is_empty_object() {
    let store = TypeStore::new();
    assert_eq!(store.apparent_type(TypeId::NUMBER), TypeId::EMPTY_OBJECT);
    let obj = store.object_type(ObjectShape::anonymous());
    assert_eq!(store.apparent_type(obj), obj);
}

#[test]
fn test_apparent_type_uses_registered_globals() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let to_fixed = interner.intern("toFixed");
    let number_iface = object_with(&store, vec![PropertyInfo::new(to_fixed, TypeId::STRING)], vec![]);
    store.set_apparent_types(ApparentTypes {
        number: Some(number_iface),
        ..ApparentTypes::default()
    });
    assert_eq!(store.apparent_type(TypeId::NUMBER), number_iface);
    assert!(store.find_apparent_property(TypeId::NUMBER, to_fixed).is_some());
}

#[test]
fn test_find_apparent_property_falls_back_to_function_then_object() {
    let mut interner = Interner::new();
    let (apply, to_string) = (interner.intern("apply"), interner.intern("toString"));
    let store = TypeStore::new();
    let object = object_with(&store, vec![PropertyInfo::new(to_string, TypeId::STRING)], vec![]);
    let function = object_with(&store, vec![PropertyInfo::new(apply, TypeId::ANY)], vec![]);
    store.set_apparent_types(ApparentTypes {
        object: Some(object),
        function: Some(function),
        ..ApparentTypes::default()
    });
    let sig = store.add_signature(Signature::new(SmallVec::new(), Vec::new(), TypeId::VOID, None));
    let callable = store.function_of(sig);
    let plain = store.object_type(ObjectShape::anonymous());

    assert!(store.find_apparent_property(callable, apply).is_some());
    assert!(store.find_apparent_property(callable, to_string).is_some());
    assert!(store.find_apparent_property(plain, apply).is_none());
    assert!(store.find_apparent_property(plain, to_string).is_some());
}

#[test]
fn test_recursive_base_marker() {
    let store = TypeStore::new();
    let obj = store.object_type(ObjectShape::anonymous());
    assert!(!store.is_recursive_base(obj));
    store.mark_recursive_base(obj);
    assert!(store.is_recursive_base(obj));
}
