//! Pull-based type resolver.
//!
//! [`Checker`] resolves the symbols of one compilation unit on demand:
//!
//! - **State machine**: each symbol is resolved exactly once, with cycles
//!   broken by pre-allocated type handles (`state`)
//! - **Type lowering**: type syntax to types, specializing generic references
//! - **Expressions**: argument, initializer and return expression typing under
//!   a contextual type
//! - **Overloads**: candidate filtering, inference, provisional probes of
//!   context-sensitive arguments and tie-breaking (`call_checker`)
//! - **Deferred checks**: base-type, initializer and constraint checks run by
//!   [`Checker::check_unit`]

mod call_checker;
mod context;
mod deferred;
mod error_reporter;
mod expr;
mod provisional;
mod relations;
mod state;
mod type_lowering;

pub use call_checker::{CallSite, OverloadResult, SiteKind};
pub use context::{Checker, CheckerOptions, ProvisionalPolicy, ResolutionState, SymbolLinks, UnitReport};
pub use deferred::BaseKind;
