//! Structural Type Solver
//!
//! Owns every type of a compilation unit and answers the questions the
//! resolver asks about them:
//!
//! - **Store**: interned `TypeData` handles, object shapes and signatures
//! - **Relations**: identity, subtyping and assignability with a pairwise
//!   cache so recursive types terminate
//! - **Specialization**: generic roots applied to arguments, materialized lazily
//! - **Inference**: `ena` union-find roots per type parameter
//! - **Best common type**: reduction of candidate lists to one supertype
pub mod bct;
mod diagnostics;
mod format;
pub mod infer;
pub mod instantiate;
pub mod recursion;
mod relation;
pub mod relation_queries;
pub mod scratch;
mod store;
pub mod types;

pub use bct::{CandidateTypes, CommonTypeHost, LazyCandidates, best_common_type, common_supertype};
pub use diagnostics::{ComparisonInfo, RelationFailure};
pub use format::TypeFormatter;
pub use infer::{InferenceContext, InferenceError};
pub use instantiate::{
    ConstraintViolation, TypeSubstitution, check_constraints, instantiate_generic_signature,
    instantiate_signature, instantiate_type, signature_to_any, specialize, specialize_checked,
    specialize_to_any,
};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use relation::{RelationChecker, param_type_at};
pub use relation_queries::{
    CacheEntry, RelationCache, RelationKind, RelationPolicy, RelationResult, is_assignable_to, is_identical,
    is_subtype_of, query_relation,
};
pub use scratch::{OverloadCandidate, ResolutionScratch, ScratchPool};
pub use store::{ApparentTypes, SpecializationKey, TypeStore};
pub use types::*;
