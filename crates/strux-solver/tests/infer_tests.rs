use super::*;
use crate::relation::RelationChecker;
use crate::relation_queries::RelationCache;
use crate::types::{ObjectShape, ParamInfo, PropertyInfo, ShapeFlags, Signature, TypeData, TypeParamInfo};
use strux_common::Interner;

fn type_param(store: &TypeStore, interner: &mut Interner, name: &str) -> TypeId {
    store.type_parameter(TypeParamInfo {
        name: interner.intern(name),
        constraint: None,
        declaration: None,
    })
}

#[test]
fn test_direct_parameter_records_candidate() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let mut ctx = InferenceContext::new(&[t]);
    ctx.infer_from_types(&store, TypeId::NUMBER, t);
    ctx.infer_from_types(&store, TypeId::NUMBER, t);
    assert_eq!(ctx.candidates(t).as_slice(), &[TypeId::NUMBER]);

    let mut cache = RelationCache::new();
    let mut host = RelationChecker::new(&store, &mut cache);
    assert_eq!(ctx.resolve(&mut host), Ok(vec![TypeId::NUMBER]));
}

#[test]
fn test_no_candidates_resolve_to_any() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let mut ctx = InferenceContext::new(&[t]);
    let mut cache = RelationCache::new();
    let mut host = RelationChecker::new(&store, &mut cache);
    assert_eq!(ctx.resolve(&mut host), Ok(vec![TypeId::ANY]));
}

#[test]
fn test_conflicting_candidates_are_unfit() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let mut ctx = InferenceContext::new(&[t]);
    ctx.infer_from_types(&store, TypeId::NUMBER, t);
    ctx.infer_from_types(&store, TypeId::STRING, t);
    let mut cache = RelationCache::new();
    let mut host = RelationChecker::new(&store, &mut cache);
    match ctx.resolve(&mut host) {
        Err(InferenceError::Unfit { type_param, candidates }) => {
            assert_eq!(type_param, t);
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected unfit, got {other:?}"),
    }
    // The tentative substitution never fails.
    assert_eq!(ctx.current_substitution(&mut host).get(t), Some(TypeId::ANY));
}

#[test]
fn test_infers_through_arrays_and_members() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let u = type_param(&store, &mut interner, "U");
    let items = interner.intern("items");

    let mut param_shape = ObjectShape::anonymous();
    param_shape.members.push(PropertyInfo::new(items, store.array(t)));
    let param = store.object_type(param_shape);
    let mut arg_shape = ObjectShape::anonymous();
    arg_shape.members.push(PropertyInfo::new(items, store.array(TypeId::STRING)));
    let arg = store.object_type(arg_shape);

    let mut ctx = InferenceContext::new(&[t, u]);
    ctx.infer_from_types(&store, arg, param);
    assert_eq!(ctx.candidates(t).as_slice(), &[TypeId::STRING]);
    assert!(ctx.candidates(u).is_empty());
}

#[test]
fn test_infers_through_signatures() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let r = type_param(&store, &mut interner, "R");
    let x = interner.intern("x");

    let param_sig = store.add_signature(Signature::new(
        SmallVec::new(),
        vec![ParamInfo::required(x, t)],
        r,
        None,
    ));
    let param = store.function_of(param_sig);
    let arg_sig = store.add_signature(Signature::new(
        SmallVec::new(),
        vec![ParamInfo::required(x, TypeId::NUMBER)],
        TypeId::BOOLEAN,
        None,
    ));
    let arg = store.function_of(arg_sig);

    let mut ctx = InferenceContext::new(&[t, r]);
    ctx.infer_from_types(&store, arg, param);
    let mut cache = RelationCache::new();
    let mut host = RelationChecker::new(&store, &mut cache);
    assert_eq!(ctx.resolve(&mut host), Ok(vec![TypeId::NUMBER, TypeId::BOOLEAN]));
}

#[test]
fn test_infers_through_shared_generic_root() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let box_name = interner.intern("Box");
    let inner_t = type_param(&store, &mut interner, "T");
    let shape_id = store.alloc_pending_shape(box_name, None, ShapeFlags::empty());
    let root = store.intern(TypeData::Generic(shape_id));
    let mut shape = ObjectShape::named(box_name, None);
    shape.type_params = vec![inner_t];
    store.set_shape(shape_id, shape);

    let t = type_param(&store, &mut interner, "U");
    let param = crate::instantiate::specialize(&store, root, &[t]);
    let arg = crate::instantiate::specialize(&store, root, &[TypeId::STRING]);
    let mut ctx = InferenceContext::new(&[t]);
    ctx.infer_from_types(&store, arg, param);
    assert_eq!(ctx.candidates(t).as_slice(), &[TypeId::STRING]);
}

#[test]
fn test_recursive_walk_terminates() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let t = type_param(&store, &mut interner, "T");
    let (name, next) = (interner.intern("Node"), interner.intern("next"));
    let id = store.alloc_pending_shape(name, None, ShapeFlags::empty());
    let node = store.intern(TypeData::Object(id));
    let mut shape = ObjectShape::named(name, None);
    shape.members.push(PropertyInfo::new(next, node));
    store.set_shape(id, shape);

    let mut param_shape = ObjectShape::anonymous();
    param_shape.members.push(PropertyInfo::new(next, t));
    let param = store.object_type(param_shape);

    let mut ctx = InferenceContext::new(&[t]);
    ctx.infer_from_types(&store, node, param);
    assert_eq!(ctx.candidates(t).as_slice(), &[node]);
}
