//! Type argument inference.
//!
//! Each type parameter of the signature being called gets one inference
//! root in an `ena` union-find table. Walking an argument type against its
//! parameter type records candidates on the roots it reaches; the
//! candidates of each root are reduced to their best common type when the
//! inference is resolved.

use crate::bct::{CommonTypeHost, common_supertype};
use crate::instantiate::{TypeSubstitution, signature_to_any};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::relation::param_type_at;
use crate::store::TypeStore;
use crate::types::{SignatureId, SignatureKind, TypeId};
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use smallvec::SmallVec;
use std::fmt;
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// Candidate types collected for one inference root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceCandidates(pub SmallVec<[TypeId; 4]>);

impl UnifyKey for InferenceVar {
    type Value = InferenceCandidates;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

impl UnifyValue for InferenceCandidates {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        let mut merged = a.0.clone();
        for &candidate in &b.0 {
            if !merged.contains(&candidate) {
                merged.push(candidate);
            }
        }
        Ok(InferenceCandidates(merged))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    /// The candidates recorded for `type_param` have no common supertype.
    Unfit {
        type_param: TypeId,
        candidates: Vec<TypeId>,
    },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Unfit {
                type_param,
                candidates,
            } => write!(
                f,
                "no common type among {} candidates for type parameter {}",
                candidates.len(),
                type_param.0
            ),
        }
    }
}

impl std::error::Error for InferenceError {}

pub struct InferenceContext {
    table: InPlaceUnificationTable<InferenceVar>,
    type_params: Vec<(TypeId, InferenceVar)>,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl InferenceContext {
    pub fn new(type_params: &[TypeId]) -> Self {
        let mut table = InPlaceUnificationTable::new();
        let type_params = type_params
            .iter()
            .map(|&param| (param, table.new_key(InferenceCandidates::default())))
            .collect();
        InferenceContext {
            table,
            type_params,
            guard: RecursionGuard::with_profile(RecursionProfile::InferenceWalk),
        }
    }

    /// The type parameters being inferred, in declaration order.
    pub fn type_params(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.type_params.iter().map(|(param, _)| *param)
    }

    fn var_for(&self, type_param: TypeId) -> Option<InferenceVar> {
        self.type_params
            .iter()
            .find(|(param, _)| *param == type_param)
            .map(|(_, var)| *var)
    }

    pub fn add_candidate(&mut self, type_param: TypeId, candidate: TypeId) {
        if let Some(var) = self.var_for(type_param) {
            trace!(type_param = type_param.0, candidate = candidate.0, "inference candidate");
            let mut single = SmallVec::new();
            single.push(candidate);
            self.table.union_value(var, InferenceCandidates(single));
        }
    }

    pub fn candidates(&mut self, type_param: TypeId) -> SmallVec<[TypeId; 4]> {
        match self.var_for(type_param) {
            Some(var) => self.table.probe_value(var).0,
            None => SmallVec::new(),
        }
    }

    // =========================================================================
    // Candidate collection
    // =========================================================================

    /// Walk `source` (an argument type) against `target` (a parameter type).
    pub fn infer_from_types(&mut self, store: &TypeStore, source: TypeId, target: TypeId) {
        let source = store.unalias(source);
        let target = store.unalias(target);
        if source == target {
            return;
        }
        if self.var_for(target).is_some() {
            self.add_candidate(target, source);
            return;
        }
        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {}
            denied => {
                trace!(?denied, "inference walk stopped");
                return;
            }
        }
        self.infer_structure(store, source, target);
        self.guard.leave((source, target));
    }

    fn infer_structure(&mut self, store: &TypeStore, source: TypeId, target: TypeId) {
        // Two applications of the same generic root: pair arguments by position.
        if let (Some(source_key), Some(target_key)) =
            (store.specialization_of(source), store.specialization_of(target))
            && source_key.root == target_key.root
        {
            for (&s, &t) in source_key.args.iter().zip(target_key.args.iter()) {
                self.infer_from_types(store, s, t);
            }
            return;
        }

        let array_root = store.apparent_types().array;
        let array_arg = |ty: TypeId| -> Option<TypeId> {
            store.array_element(ty).or_else(|| {
                let key = store.specialization_of(ty)?;
                if Some(key.root) == array_root {
                    key.args.first().copied()
                } else {
                    None
                }
            })
        };
        if let Some(target_elem) = array_arg(target) {
            if let Some(source_elem) = array_arg(source) {
                self.infer_from_types(store, source_elem, target_elem);
            }
            return;
        }

        if !store.is_object_like(target) {
            return;
        }
        let source = if store.is_object_like(source) {
            source
        } else {
            store.apparent_type(source)
        };
        if !store.is_object_like(source) {
            return;
        }

        for target_prop in store.properties_of(target) {
            if let Some(source_prop) = store.find_property(source, target_prop.name) {
                self.infer_from_types(store, source_prop.type_id, target_prop.type_id);
            }
        }
        for kind in [SignatureKind::Call, SignatureKind::Construct, SignatureKind::Index] {
            let source_sigs = store.signatures_of(source, kind);
            let target_sigs = store.signatures_of(target, kind);
            for (&s, &t) in source_sigs.iter().zip(target_sigs.iter()) {
                self.infer_from_signatures(store, s, t);
            }
        }
    }

    fn infer_from_signatures(&mut self, store: &TypeStore, source: SignatureId, target: SignatureId) {
        let source_sig = store.signature(signature_to_any(store, source));
        let target_sig = store.signature(target);
        for index in 0..target_sig.params.len() {
            if let (Some(s), Some(t)) = (
                param_type_at(store, &source_sig, index),
                param_type_at(store, &target_sig, index),
            ) {
                self.infer_from_types(store, s, t);
            }
        }
        self.infer_from_types(store, source_sig.return_type, target_sig.return_type);
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Inferences so far, for contextually typing the remaining arguments.
    /// Roots without a usable inference map to `any`.
    pub fn current_substitution<H>(&mut self, host: &mut H) -> TypeSubstitution
    where
        H: CommonTypeHost + ?Sized,
    {
        let mut subst = TypeSubstitution::new();
        for index in 0..self.type_params.len() {
            let (param, var) = self.type_params[index];
            let mut candidates: Vec<TypeId> = self.table.probe_value(var).0.into_vec();
            let inferred = common_supertype(host, None, None, &mut candidates).unwrap_or(TypeId::ANY);
            subst.insert(param, inferred);
        }
        subst
    }

    /// Final type arguments in declaration order.
    pub fn resolve<H>(&mut self, host: &mut H) -> Result<Vec<TypeId>, InferenceError>
    where
        H: CommonTypeHost + ?Sized,
    {
        let mut resolved = Vec::with_capacity(self.type_params.len());
        for index in 0..self.type_params.len() {
            let (param, var) = self.type_params[index];
            let mut candidates: Vec<TypeId> = self.table.probe_value(var).0.into_vec();
            if candidates.is_empty() {
                resolved.push(TypeId::ANY);
                continue;
            }
            match common_supertype(host, None, None, &mut candidates) {
                Some(inferred) => {
                    debug!(type_param = param.0, inferred = inferred.0, "inferred type argument");
                    resolved.push(inferred);
                }
                None => {
                    debug!(type_param = param.0, count = candidates.len(), "inference unfit");
                    return Err(InferenceError::Unfit {
                        type_param: param,
                        candidates,
                    });
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
