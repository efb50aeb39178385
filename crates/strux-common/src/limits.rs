//! Centralized limits and thresholds for the type resolver.
//!
//! Recursion limits for the relation engine are carried by
//! `strux_solver::recursion::RecursionProfile`; the constants here cover the
//! resolver driver and the inference/overload machinery.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for expression typing.
///
/// Nested call arguments (`f(g(h(...)))`) each add a resolver frame; past this
/// depth the expression is typed as `any`.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum depth for generic specialization of nested type arguments.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth of the structural walk that collects inference candidates.
pub const MAX_INFERENCE_WALK_DEPTH: u32 = 32;

/// Maximum depth for walking base-type chains when looking up members.
pub const MAX_BASE_CHAIN_DEPTH: u32 = 64;

/// Remaining stack below which deep relation checks grow the stack.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated when growing.
pub const STACK_GROW_SIZE: usize = 1024 * 1024;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Number of scratch slots pre-allocated for overload resolution.
pub const INITIAL_SCRATCH_SLOTS: usize = 4;

/// Initial capacity of the relation cache.
pub const RELATION_CACHE_CAPACITY: usize = 256;
