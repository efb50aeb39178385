use super::*;
use crate::types::ObjectShape;
use crate::types::PropertyInfo;
use smallvec::SmallVec;
use strux_common::Interner;

fn object(store: &TypeStore, members: Vec<PropertyInfo>) -> TypeId {
    let mut shape = ObjectShape::anonymous();
    shape.members = members;
    store.object_type(shape)
}

#[test]
fn test_param_type_at_expands_rest() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (a, rest) = (interner.intern("a"), interner.intern("rest"));
    let sig = Signature::new(
        SmallVec::new(),
        vec![
            ParamInfo::required(a, TypeId::STRING),
            ParamInfo {
                name: rest,
                type_id: store.array(TypeId::NUMBER),
                optional: false,
                rest: true,
            },
        ],
        TypeId::VOID,
        None,
    );
    assert_eq!(param_type_at(&store, &sig, 0), Some(TypeId::STRING));
    assert_eq!(param_type_at(&store, &sig, 1), Some(TypeId::NUMBER));
    assert_eq!(param_type_at(&store, &sig, 5), Some(TypeId::NUMBER));
}

#[test]
fn test_param_type_at_past_end_without_rest() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let sig = Signature::new(
        SmallVec::new(),
        vec![ParamInfo::required(interner.intern("a"), TypeId::STRING)],
        TypeId::VOID,
        None,
    );
    assert_eq!(param_type_at(&store, &sig, 1), None);
}

#[test]
fn test_plain_check_records_no_failure() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let a = interner.intern("a");
    let source = object(&store, vec![]);
    let target = object(&store, vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let mut cache = RelationCache::new();
    let mut checker = RelationChecker::new(&store, &mut cache);
    assert!(!checker.is_assignable(source, target));
    assert!(checker.last_failure.is_none());
}

#[test]
fn test_explained_failure_nests_one_level_per_member() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let (outer, inner) = (interner.intern("outer"), interner.intern("inner"));
    let source_inner = object(&store, vec![PropertyInfo::new(inner, TypeId::STRING)]);
    let target_inner = object(&store, vec![PropertyInfo::new(inner, TypeId::NUMBER)]);
    let source = object(&store, vec![PropertyInfo::new(outer, source_inner)]);
    let target = object(&store, vec![PropertyInfo::new(outer, target_inner)]);

    let mut cache = RelationCache::new();
    let mut info = ComparisonInfo::new();
    let mut checker = RelationChecker::new(&store, &mut cache);
    assert!(!checker.relate_explained(source, target, RelationKind::Assignable, &mut info));
    let failure = info.failure.expect("failure recorded");
    assert!(matches!(failure, RelationFailure::PropertyTypeMismatch { property, .. } if property == outer));
    assert_eq!(failure.depth(), 3);
}

#[test]
fn test_cached_negative_result_is_recomputed_when_explaining() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let a = interner.intern("a");
    let source = object(&store, vec![]);
    let target = object(&store, vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let mut cache = RelationCache::new();
    assert!(!RelationChecker::new(&store, &mut cache).is_subtype(source, target));
    assert!(matches!(
        cache.get(source, target, RelationKind::Subtype),
        Some(CacheEntry::Final(false))
    ));

    let mut info = ComparisonInfo::new();
    let related = RelationChecker::new(&store, &mut cache).relate_explained(
        source,
        target,
        RelationKind::Subtype,
        &mut info,
    );
    assert!(!related);
    assert!(matches!(info.failure, Some(RelationFailure::MissingProperty { .. })));
}

#[test]
fn test_depth_limit_assumes_related() {
    let mut interner = Interner::new();
    let store = TypeStore::new();
    let a = interner.intern("a");
    // Nested chain deeper than the custom limit, differing only at the bottom.
    let mut source = object(&store, vec![PropertyInfo::new(a, TypeId::STRING)]);
    let mut target = object(&store, vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    for _ in 0..4 {
        source = object(&store, vec![PropertyInfo::new(a, source)]);
        target = object(&store, vec![PropertyInfo::new(a, target)]);
    }
    let policy = RelationPolicy {
        profile: crate::recursion::RecursionProfile::Custom {
            max_depth: 2,
            max_iterations: 1_000,
        },
        grow_stack: false,
    };
    let mut cache = RelationCache::new();
    let mut checker = RelationChecker::with_policy(&store, &mut cache, policy);
    assert!(checker.is_subtype(source, target));
    assert!(checker.depth_exceeded());
}
