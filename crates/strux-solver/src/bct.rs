//! Best common type.
//!
//! Reduces a candidate sequence to one type that every candidate is a
//! subtype of. Candidates are pulled through [`CandidateTypes`] so callers
//! can type expressions on demand (return expressions, array elements)
//! instead of materializing every type up front.

use crate::relation::RelationChecker;
use crate::store::TypeStore;
use crate::types::TypeId;
use fixedbitset::FixedBitSet;
use tracing::trace;

/// What the reduction needs from its caller: type queries and strict subtyping.
pub trait CommonTypeHost {
    fn store(&self) -> &TypeStore;
    fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool;
}

impl CommonTypeHost for RelationChecker<'_> {
    fn store(&self) -> &TypeStore {
        RelationChecker::store(self)
    }

    fn is_subtype(&mut self, source: TypeId, target: TypeId) -> bool {
        RelationChecker::is_subtype(self, source, target)
    }
}

/// An indexable, possibly lazily typed, candidate sequence.
pub trait CandidateTypes<H: ?Sized> {
    fn count(&self) -> usize;
    fn candidate(&mut self, host: &mut H, index: usize) -> TypeId;
}

impl<H: ?Sized> CandidateTypes<H> for &[TypeId] {
    fn count(&self) -> usize {
        self.len()
    }

    fn candidate(&mut self, _host: &mut H, index: usize) -> TypeId {
        self.get(index).copied().unwrap_or(TypeId::ANY)
    }
}

impl<H: ?Sized> CandidateTypes<H> for Vec<TypeId> {
    fn count(&self) -> usize {
        self.len()
    }

    fn candidate(&mut self, _host: &mut H, index: usize) -> TypeId {
        self.get(index).copied().unwrap_or(TypeId::ANY)
    }
}

/// Candidates produced by a closure on first access and memoized.
pub struct LazyCandidates<F> {
    memo: Vec<Option<TypeId>>,
    produce: F,
}

impl<F> LazyCandidates<F> {
    pub fn new(count: usize, produce: F) -> Self {
        LazyCandidates {
            memo: vec![None; count],
            produce,
        }
    }
}

impl<H: ?Sized, F> CandidateTypes<H> for LazyCandidates<F>
where
    F: FnMut(&mut H, usize) -> TypeId,
{
    fn count(&self) -> usize {
        self.memo.len()
    }

    fn candidate(&mut self, host: &mut H, index: usize) -> TypeId {
        if let Some(Some(ty)) = self.memo.get(index) {
            return *ty;
        }
        let ty = (self.produce)(host, index);
        if let Some(slot) = self.memo.get_mut(index) {
            *slot = Some(ty);
        }
        ty
    }
}

// =============================================================================
// Reduction
// =============================================================================

/// Best common type, or the empty object type when the candidates do not converge.
pub fn best_common_type<H, C>(host: &mut H, seed: Option<TypeId>, target: Option<TypeId>, candidates: &mut C) -> TypeId
where
    H: CommonTypeHost + ?Sized,
    C: CandidateTypes<H> + ?Sized,
{
    common_supertype(host, seed, target, candidates).unwrap_or(TypeId::EMPTY_OBJECT)
}

/// Like [`best_common_type`] but reports non-convergence as `None`.
///
/// The seed is merged with the contextual target first; when that start
/// point never converges the reduction is retried without the target.
pub fn common_supertype<H, C>(
    host: &mut H,
    seed: Option<TypeId>,
    target: Option<TypeId>,
    candidates: &mut C,
) -> Option<TypeId>
where
    H: CommonTypeHost + ?Sized,
    C: CandidateTypes<H> + ?Sized,
{
    if let Some(target) = target {
        let initial = match seed {
            Some(seed) => merge(host, seed, target),
            None => Some(target),
        };
        if let Some(initial) = initial
            && let Some(result) = converge(host, Some(initial), candidates)
        {
            return Some(result);
        }
        trace!(target = target.0, "no convergence with contextual target, retrying without");
    }
    converge(host, seed, candidates)
}

fn converge<H, C>(host: &mut H, initial: Option<TypeId>, candidates: &mut C) -> Option<TypeId>
where
    H: CommonTypeHost + ?Sized,
    C: CandidateTypes<H> + ?Sized,
{
    let count = candidates.count();
    if count == 0 {
        return initial;
    }
    let mut tried = FixedBitSet::with_capacity(count);
    let mut start = 0;
    loop {
        tried.insert(start);
        let mut acc = initial;
        let mut failed_at = None;
        for offset in 0..count {
            let index = (start + offset) % count;
            let candidate = candidates.candidate(host, index);
            acc = match acc {
                None => Some(candidate),
                Some(current) => match merge(host, current, candidate) {
                    Some(merged) => Some(merged),
                    None => {
                        failed_at = Some(index);
                        break;
                    }
                },
            };
        }
        let Some(failed) = failed_at else {
            return acc;
        };
        // Restart from the candidate that broke the pass, each start at most once.
        start = if tried.contains(failed) {
            (0..count).find(|&i| !tried.contains(i))?
        } else {
            failed
        };
    }
}

/// Pairwise merge: the wider of two types, or `None` when neither contains the other.
fn merge<H>(host: &mut H, a: TypeId, b: TypeId) -> Option<TypeId>
where
    H: CommonTypeHost + ?Sized,
{
    let store = host.store();
    let a = store.unalias(a);
    let b = store.unalias(b);
    if a == b {
        return Some(a);
    }
    if a == TypeId::ANY || b == TypeId::ANY {
        return Some(TypeId::ANY);
    }
    if store.is_error(a) {
        return Some(a);
    }
    if store.is_error(b) {
        return Some(b);
    }
    if a.is_nullish() {
        return Some(b);
    }
    if b.is_nullish() {
        return Some(a);
    }
    if let (Some(ea), Some(eb)) = (store.array_element(a), store.array_element(b)) {
        let element = merge(host, ea, eb)?;
        return Some(host.store().array(element));
    }
    if host.is_subtype(b, a) {
        return Some(a);
    }
    if host.is_subtype(a, b) {
        return Some(b);
    }
    None
}

#[cfg(test)]
#[path = "../tests/bct_tests.rs"]
mod tests;
