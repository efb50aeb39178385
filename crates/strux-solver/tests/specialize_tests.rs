//! Generic specialization through the public API.

use strux_common::Interner;
use strux_solver::{
    ObjectShape, PropertyInfo, RelationCache, ShapeFlags, TypeData, TypeId, TypeParamInfo,
    TypeStore, TypeSubstitution, instantiate_type, is_assignable_to, is_identical, is_subtype_of,
    specialize, specialize_checked, specialize_to_any,
};

/// `interface <name><T> { <member>: ... }` with member types built from the root and `T`.
fn declare_generic(
    store: &TypeStore,
    interner: &mut Interner,
    name: &str,
    members: &[(&str, &dyn Fn(TypeId, TypeId) -> TypeId)],
) -> (TypeId, TypeId) {
    let atom = interner.intern(name);
    let t_name = interner.intern("T");
    let t = store.type_parameter(TypeParamInfo {
        name: t_name,
        constraint: None,
        declaration: None,
    });
    let shape_id = store.alloc_pending_shape(atom, None, ShapeFlags::empty());
    let root = store.intern(TypeData::Generic(shape_id));
    store.set_type_params(shape_id, vec![t]);
    let mut shape = ObjectShape::named(atom, None);
    shape.type_params = vec![t];
    for (member, build) in members {
        let member_atom = interner.intern(member);
        shape.members.push(PropertyInfo::new(member_atom, build(root, t)));
    }
    store.set_shape(shape_id, shape);
    (root, t)
}

#[test]
fn test_same_arguments_same_handle() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = declare_generic(&store, &mut interner, "Box", &[("value", &|_: TypeId, t: TypeId| t)]);
    let first = specialize(&store, root, &[TypeId::NUMBER]);
    let second = specialize(&store, root, &[TypeId::NUMBER]);
    assert_eq!(first, second);
    assert!(matches!(store.lookup(first), TypeData::Specialized(_)));
}

#[test]
fn test_nested_specializations_are_stable() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = declare_generic(&store, &mut interner, "Box", &[("value", &|_: TypeId, t: TypeId| t)]);
    let inner = specialize(&store, root, &[TypeId::STRING]);
    let outer = specialize(&store, root, &[inner]);
    assert_eq!(outer, specialize(&store, root, &[specialize(&store, root, &[TypeId::STRING])]));
}

#[test]
fn test_specializations_relate_structurally() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let mut cache = RelationCache::new();
    let (root, _) = declare_generic(&store, &mut interner, "Box", &[("value", &|_: TypeId, t: TypeId| t)]);
    let of_number = specialize(&store, root, &[TypeId::NUMBER]);
    let of_string = specialize(&store, root, &[TypeId::STRING]);
    let of_any = specialize_to_any(&store, root);

    assert!(!is_assignable_to(&store, &mut cache, of_number, of_string));
    assert!(is_assignable_to(&store, &mut cache, of_number, of_any));
    assert!(is_subtype_of(&store, &mut cache, of_string, of_any));

    let value = interner.intern("value");
    let mut plain = ObjectShape::anonymous();
    plain.members.push(PropertyInfo::new(value, TypeId::NUMBER));
    let plain = store.object_type(plain);
    assert!(is_identical(&store, &mut cache, of_number, plain));
}

#[test]
fn test_recursive_generic_relations_terminate() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let mut cache = RelationCache::new();
    // interface List<T> { next: List<T>; value: T }
    let (root, _) = declare_generic(
        &store,
        &mut interner,
        "List",
        &[("next", &|root: TypeId, _: TypeId| root), ("value", &|_: TypeId, t: TypeId| t)],
    );
    let numbers = specialize(&store, root, &[TypeId::NUMBER]);
    let strings = specialize(&store, root, &[TypeId::STRING]);
    let anys = specialize(&store, root, &[TypeId::ANY]);
    assert!(!is_subtype_of(&store, &mut cache, numbers, strings));
    assert!(is_subtype_of(&store, &mut cache, numbers, anys));
    assert!(is_identical(&store, &mut cache, numbers, numbers));
}

#[test]
fn test_instantiate_rewrites_bare_root_reference() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, t) = declare_generic(&store, &mut interner, "Box", &[("value", &|_: TypeId, t: TypeId| t)]);
    let subst = TypeSubstitution::from_args(&[t], &[TypeId::BOOLEAN]);
    let arr_of_root = store.array(root);
    let rewritten = instantiate_type(&store, arr_of_root, &subst);
    assert_eq!(rewritten, store.array(specialize(&store, root, &[TypeId::BOOLEAN])));
}

#[test]
fn test_constraint_violation_keeps_argument() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let mut cache = RelationCache::new();
    let (root, t) = declare_generic(&store, &mut interner, "Box", &[("value", &|_: TypeId, t: TypeId| t)]);
    let len = interner.intern("length");
    let mut has_length = ObjectShape::anonymous();
    has_length.members.push(PropertyInfo::new(len, TypeId::NUMBER));
    let has_length = store.object_type(has_length);
    store.set_constraint(t, has_length);

    let mut arg = ObjectShape::anonymous();
    arg.members.push(PropertyInfo::new(len, TypeId::NUMBER));
    let arg = store.object_type(arg);
    let (ok, violations) = specialize_checked(&store, &mut cache, root, &[arg]);
    assert!(violations.is_empty());
    assert_eq!(ok, specialize(&store, root, &[arg]));

    let (bad, violations) = specialize_checked(&store, &mut cache, root, &[TypeId::BOOLEAN]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].index, 0);
    assert_eq!(bad, specialize(&store, root, &[TypeId::BOOLEAN]));
}
