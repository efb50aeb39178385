//! Relation, specialization and best-common-type entry points on the checker.
//!
//! Thin wrappers over the solver that supply the checker's store, relation
//! cache and configured recursion policy.

use crate::context::Checker;
use strux_solver::{
    CandidateTypes, ComparisonInfo, ConstraintViolation, RelationKind, TypeId, query_relation,
};
use tracing::debug;

impl<'a> Checker<'a> {
    pub fn identical(&mut self, a: TypeId, b: TypeId, info: Option<&mut ComparisonInfo>) -> bool {
        self.relate(a, b, RelationKind::Identical, info)
    }

    pub fn subtype(&mut self, source: TypeId, target: TypeId, info: Option<&mut ComparisonInfo>) -> bool {
        self.relate(source, target, RelationKind::Subtype, info)
    }

    pub fn assignable(&mut self, source: TypeId, target: TypeId, info: Option<&mut ComparisonInfo>) -> bool {
        self.relate(source, target, RelationKind::Assignable, info)
    }

    fn relate(&mut self, source: TypeId, target: TypeId, kind: RelationKind, info: Option<&mut ComparisonInfo>) -> bool {
        let policy = self.options.relation_policy();
        let result = query_relation(&self.types, &mut self.relation_cache, source, target, kind, policy, info);
        if result.depth_exceeded {
            debug!(source = source.0, target = target.0, ?kind, "relation depth exceeded, assumed related");
        }
        result.is_related()
    }

    /// Best common type of `candidates`, merged with `seed` and `target` first.
    pub fn best_common_type<C>(&mut self, seed: Option<TypeId>, target: Option<TypeId>, candidates: &mut C) -> TypeId
    where
        C: CandidateTypes<Self> + ?Sized,
    {
        strux_solver::best_common_type(self, seed, target, candidates)
    }

    pub fn specialize(&self, generic: TypeId, args: &[TypeId]) -> TypeId {
        strux_solver::specialize(&self.types, generic, args)
    }

    pub fn specialize_to_any(&self, type_id: TypeId) -> TypeId {
        strux_solver::specialize_to_any(&self.types, type_id)
    }

    /// Specialize and report each argument that violates its constraint.
    pub fn specialize_checked(&mut self, generic: TypeId, args: &[TypeId]) -> (TypeId, Vec<ConstraintViolation>) {
        strux_solver::specialize_checked(&self.types, &mut self.relation_cache, generic, args)
    }
}
