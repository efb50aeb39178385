//! Recursion guards for cycle detection, depth limiting and iteration
//! bounding in recursive type computations.
//!
//! - [`RecursionGuard`] tracks a visiting set keyed by the computation's
//!   input (cycle detection) plus depth and total-work limits.
//! - [`DepthCounter`] only limits nesting depth, for computations that may
//!   legitimately revisit the same key (relation checks memoize through the
//!   relation cache instead).
//!
//! Limits come from named [`RecursionProfile`]s so call sites carry no magic
//! numbers.

use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Identity, subtype and assignability checks.
    ///
    /// depth = 100, iterations = 100,000
    SubtypeCheck,

    /// Structural walk that collects inference candidates.
    ///
    /// depth = 32, iterations = 100,000
    InferenceWalk,

    /// Typing of nested expressions in the resolver.
    ///
    /// depth = 500
    ExpressionCheck,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100,
            Self::InferenceWalk => strux_common::limits::MAX_INFERENCE_WALK_DEPTH,
            Self::ExpressionCheck => strux_common::limits::MAX_EXPR_CHECK_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Custom { max_iterations, .. } => max_iterations,
            _ => 100_000,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already being visited.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Visiting set plus depth and iteration limits.
///
/// Every successful [`enter`](Self::enter) must be paired with a
/// [`leave`](Self::leave) of the same key. Debug builds panic when a guard is
/// dropped with entries still active.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "RecursionGuard::leave() without matching enter()");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` between `enter` and `leave`; `Err` carries the reason entry was denied.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Sticky until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries",
                self.visiting.len()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard for stack overflow protection.
#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Returns `false` (and does not increment) once the limit is reached;
    /// do not call [`leave`](Self::leave) in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.exceeded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_subtype_check_limits() {
        let p = RecursionProfile::SubtypeCheck;
        assert_eq!(p.max_depth(), 100);
        assert_eq!(p.max_iterations(), 100_000);
    }

    #[test]
    fn profile_expression_check_limits() {
        let counter = DepthCounter::with_profile(RecursionProfile::ExpressionCheck);
        assert_eq!(counter.max_depth(), strux_common::limits::MAX_EXPR_CHECK_DEPTH);
    }

    #[test]
    fn profile_custom_limits() {
        let p = RecursionProfile::Custom {
            max_depth: 7,
            max_iterations: 42,
        };
        assert_eq!(p.max_depth(), 7);
        assert_eq!(p.max_iterations(), 42);
    }

    #[test]
    fn guard_detects_cycle() {
        let mut guard = RecursionGuard::<u32>::with_profile(RecursionProfile::InferenceWalk);
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(1).is_cycle());
        assert!(guard.is_visiting(&1));
        guard.leave(1);
        assert!(!guard.is_visiting(&1));
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn guard_depth_limit_is_sticky() {
        let mut guard = RecursionGuard::<u32>::new(2, 100);
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(2).is_entered());
        assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
        guard.leave(2);
        guard.leave(1);
        assert!(guard.is_exceeded());
        guard.reset();
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn guard_iteration_limit() {
        let mut guard = RecursionGuard::<u32>::new(10, 2);
        assert!(guard.scope(1, || ()).is_ok());
        assert!(guard.scope(2, || ()).is_ok());
        assert_eq!(guard.scope(3, || ()), Err(RecursionResult::IterationExceeded));
        assert_eq!(guard.iterations(), 3);
    }

    #[test]
    fn depth_counter_refuses_past_limit() {
        let mut counter = DepthCounter::new(1);
        assert!(counter.enter());
        assert!(!counter.enter());
        assert!(counter.is_exceeded());
        counter.leave();
        assert_eq!(counter.depth(), 0);
    }
}
