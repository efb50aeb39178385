use super::*;
use crate::types::{PropertyInfo, TypeParamInfo};
use strux_common::Interner;

fn type_param(store: &TypeStore, interner: &mut Interner, name: &str) -> TypeId {
    store.type_parameter(TypeParamInfo {
        name: interner.intern(name),
        constraint: None,
        declaration: None,
    })
}

/// `interface Name<T> { <member>: <member type built from T> }`
fn generic_root(
    store: &TypeStore,
    interner: &mut Interner,
    name: &str,
    member: &str,
    member_type: impl FnOnce(TypeId, TypeId) -> TypeId,
) -> (TypeId, TypeId) {
    let atom = interner.intern(name);
    let t = type_param(store, interner, "T");
    let shape_id = store.alloc_pending_shape(atom, None, ShapeFlags::empty());
    let root = store.intern(TypeData::Generic(shape_id));
    store.set_type_params(shape_id, vec![t]);
    let mut shape = ObjectShape::named(atom, None);
    shape.type_params = vec![t];
    let member_atom = interner.intern(member);
    shape.members.push(PropertyInfo::new(member_atom, member_type(root, t)));
    store.set_shape(shape_id, shape);
    (root, t)
}

#[test]
fn test_substitution_from_args_pads_with_any() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let u = type_param(&store, &mut interner, "U");
    let subst = TypeSubstitution::from_args(&[t, u], &[TypeId::NUMBER]);
    assert_eq!(subst.get(t), Some(TypeId::NUMBER));
    assert_eq!(subst.get(u), Some(TypeId::ANY));
    assert_eq!(subst.len(), 2);
}

#[test]
fn test_instantiate_array_of_param() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let subst = TypeSubstitution::from_args(&[t], &[TypeId::STRING]);
    let arr = store.array(t);
    assert_eq!(instantiate_type(&store, arr, &subst), store.array(TypeId::STRING));
    assert_eq!(instantiate_type(&store, TypeId::NUMBER, &subst), TypeId::NUMBER);
}

#[test]
fn test_specialize_is_cached() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = generic_root(&store, &mut interner, "Box", "value", |_, t| t);
    let a = specialize(&store, root, &[TypeId::NUMBER]);
    let b = specialize(&store, root, &[TypeId::NUMBER]);
    assert_eq!(a, b);
    assert_ne!(a, specialize(&store, root, &[TypeId::STRING]));
    assert_eq!(store.specialization_count(), 2);
}

#[test]
fn test_specialize_with_own_params_returns_root() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, t) = generic_root(&store, &mut interner, "Box", "value", |_, t| t);
    assert_eq!(specialize(&store, root, &[t]), root);
}

#[test]
fn test_specialize_non_generic_passes_through() {
    let store = TypeStore::new();
    assert_eq!(specialize(&store, TypeId::NUMBER, &[TypeId::STRING]), TypeId::NUMBER);
}

#[test]
fn test_specialize_pads_and_truncates_arguments() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = generic_root(&store, &mut interner, "Box", "value", |_, t| t);
    let padded = specialize(&store, root, &[]);
    assert_eq!(padded, specialize(&store, root, &[TypeId::ANY]));
    let truncated = specialize(&store, root, &[TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(truncated, specialize(&store, root, &[TypeId::NUMBER]));
}

#[test]
fn test_materialized_members_are_substituted() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = generic_root(&store, &mut interner, "Box", "value", |_, t| store.array(t));
    let spec = specialize(&store, root, &[TypeId::NUMBER]);
    let value = interner.intern("value");
    let prop = store.find_property(spec, value).map(|p| p.type_id);
    assert_eq!(prop, Some(store.array(TypeId::NUMBER)));
}

#[test]
fn test_recursive_generic_terminates() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    // interface List<T> { next: List<T> }
    let (root, _) = generic_root(&store, &mut interner, "List", "next", |root, _| root);
    let spec = specialize(&store, root, &[TypeId::STRING]);
    let next = interner.intern("next");
    let next_type = store.find_property(spec, next).map(|p| p.type_id);
    assert_eq!(next_type, Some(spec));
}

#[test]
fn test_specialize_to_any_erases_params() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, _) = generic_root(&store, &mut interner, "Box", "value", |_, t| t);
    let erased = specialize_to_any(&store, root);
    assert_eq!(erased, specialize(&store, root, &[TypeId::ANY]));
    let t = type_param(&store, &mut interner, "U");
    assert_eq!(specialize_to_any(&store, t), TypeId::ANY);
    assert_eq!(specialize_to_any(&store, TypeId::STRING), TypeId::STRING);
}

#[test]
fn test_signature_to_any_and_instantiate_generic_signature() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let x = interner.intern("x");
    let mut params = SmallVec::new();
    params.push(t);
    let sig = store.add_signature(Signature::new(params, vec![ParamInfo::required(x, t)], t, None));

    let erased = store.signature(signature_to_any(&store, sig));
    assert!(!erased.is_generic());
    assert_eq!(erased.params[0].type_id, TypeId::ANY);
    assert_eq!(erased.return_type, TypeId::ANY);

    let applied = store.signature(instantiate_generic_signature(&store, sig, &[TypeId::NUMBER]));
    assert!(!applied.is_generic());
    assert_eq!(applied.params[0].type_id, TypeId::NUMBER);
    assert_eq!(applied.return_type, TypeId::NUMBER);
}

#[test]
fn test_signature_erased_once() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let x = interner.intern("x");
    let mut params = SmallVec::new();
    params.push(t);
    let sig = store.add_signature(Signature::new(params, vec![ParamInfo::required(x, t)], t, None));

    let first = signature_to_any(&store, sig);
    let count = store.signature_count();
    assert_eq!(signature_to_any(&store, sig), first);
    assert_eq!(signature_to_any(&store, first), first);
    assert_eq!(store.signature_count(), count);
}

#[test]
fn test_constraint_violation_reported_and_argument_used() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (root, t) = generic_root(&store, &mut interner, "Box", "value", |_, t| t);
    store.set_constraint(t, TypeId::NUMBER);
    let mut cache = RelationCache::new();

    let (ok, violations) = specialize_checked(&store, &mut cache, root, &[TypeId::NUMBER]);
    assert!(violations.is_empty());
    assert_eq!(ok, specialize(&store, root, &[TypeId::NUMBER]));

    let (bad, violations) = specialize_checked(&store, &mut cache, root, &[TypeId::STRING]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].argument, TypeId::STRING);
    assert_eq!(violations[0].constraint, TypeId::NUMBER);
    assert_eq!(bad, specialize(&store, root, &[TypeId::STRING]));
}

#[test]
fn test_self_referential_constraint_is_substituted() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    // T extends T[]: the constraint is checked as `number[]` for argument `number`
    store.set_constraint(t, store.array(t));
    let mut cache = RelationCache::new();
    let violations = check_constraints(&store, &mut cache, &[t], &[TypeId::NUMBER]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].constraint, store.array(TypeId::NUMBER));
}
