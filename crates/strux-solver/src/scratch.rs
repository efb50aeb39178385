//! Reusable buffers for overload resolution.
//!
//! Overload resolution needs three short-lived lists per call site. Calls
//! nest (an argument may itself be a call), so the pool is a stack of owned
//! slots: [`ScratchPool::acquire`] moves the next slot out and
//! [`ScratchPool::release`] clears it and moves it back. Because the slot is
//! owned by the caller while in use, the resolver stays free to borrow
//! itself mutably for nested resolutions.

use crate::types::{SignatureId, TypeId};
use strux_common::limits::INITIAL_SCRATCH_SLOTS;
use tracing::trace;

/// A signature that survived generic filtering and arity checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverloadCandidate {
    /// The (possibly instantiated) signature.
    pub signature: SignatureId,
    /// Produced by specializing a generic signature.
    pub from_generic: bool,
    /// A provisional re-typing of a context-sensitive argument raised diagnostics.
    pub had_provisional_errors: bool,
}

impl OverloadCandidate {
    pub fn new(signature: SignatureId, from_generic: bool) -> Self {
        OverloadCandidate {
            signature,
            from_generic,
            had_provisional_errors: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolutionScratch {
    pub arg_types: Vec<TypeId>,
    pub exact: Vec<OverloadCandidate>,
    pub convertible: Vec<OverloadCandidate>,
}

impl ResolutionScratch {
    pub fn clear(&mut self) {
        self.arg_types.clear();
        self.exact.clear();
        self.convertible.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.arg_types.is_empty() && self.exact.is_empty() && self.convertible.is_empty()
    }
}

#[derive(Debug)]
pub struct ScratchPool {
    free: Vec<ResolutionScratch>,
    depth: usize,
    high_water: usize,
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchPool {
    pub fn new() -> Self {
        ScratchPool {
            free: (0..INITIAL_SCRATCH_SLOTS).map(|_| ResolutionScratch::default()).collect(),
            depth: 0,
            high_water: 0,
        }
    }

    /// Take the next slot, allocating one when nesting exceeds the pool.
    pub fn acquire(&mut self) -> ResolutionScratch {
        self.depth += 1;
        self.high_water = self.high_water.max(self.depth);
        match self.free.pop() {
            Some(scratch) => scratch,
            None => {
                trace!(depth = self.depth, "scratch pool grown");
                ResolutionScratch::default()
            }
        }
    }

    /// Return a slot. Its buffers keep their capacity.
    pub fn release(&mut self, mut scratch: ResolutionScratch) {
        scratch.clear();
        self.depth = self.depth.saturating_sub(1);
        self.free.push(scratch);
    }

    /// Slots currently acquired.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting seen so far.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Slots owned by the pool (free plus acquired).
    pub fn capacity(&self) -> usize {
        self.free.len() + self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_restores_depth() {
        let mut pool = ScratchPool::new();
        let mut outer = pool.acquire();
        outer.arg_types.push(TypeId::NUMBER);
        assert_eq!(pool.depth(), 1);
        pool.release(outer);
        assert_eq!(pool.depth(), 0);
        assert_eq!(pool.capacity(), INITIAL_SCRATCH_SLOTS);
    }

    #[test]
    fn released_slot_is_cleared() {
        let mut pool = ScratchPool::new();
        let mut scratch = pool.acquire();
        scratch.arg_types.extend([TypeId::NUMBER, TypeId::STRING]);
        scratch.exact.push(OverloadCandidate::new(SignatureId(0), false));
        pool.release(scratch);
        let again = pool.acquire();
        assert!(again.is_empty());
        assert!(again.arg_types.capacity() >= 2);
        pool.release(again);
    }

    #[test]
    fn nesting_beyond_initial_slots_grows_the_pool() {
        let mut pool = ScratchPool::new();
        let slots: Vec<_> = (0..INITIAL_SCRATCH_SLOTS + 2).map(|_| pool.acquire()).collect();
        assert_eq!(pool.depth(), INITIAL_SCRATCH_SLOTS + 2);
        for slot in slots {
            pool.release(slot);
        }
        assert_eq!(pool.depth(), 0);
        assert_eq!(pool.high_water(), INITIAL_SCRATCH_SLOTS + 2);
        assert_eq!(pool.capacity(), INITIAL_SCRATCH_SLOTS + 2);
    }
}
