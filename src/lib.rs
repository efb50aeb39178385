//! Structural type resolution and relation engine.
//!
//! The workspace is split the way the pipeline runs:
//!
//! - [`common`]: interned names, spans, the diagnostic catalogue and limits
//! - [`binder`]: declarations, symbols and lexical lookup
//! - [`solver`]: the type store, relations, specialization, inference and
//!   best-common-type computation
//! - [`checker`]: on-demand symbol resolution and overload resolution
//!
//! ```ignore
//! let mut binder = strux::binder::Binder::new();
//! // ... declare the unit through the builder API ...
//! let report = strux::checker::Checker::new(&binder).check_unit();
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{}: {}", diagnostic.code, diagnostic.message_text);
//! }
//! ```

pub use strux_binder as binder;
pub use strux_checker as checker;
pub use strux_common as common;
pub use strux_solver as solver;

pub use strux_checker::{Checker, CheckerOptions, UnitReport};
pub use strux_common::Diagnostic;

pub mod tracing_config;
pub use tracing_config::init_tracing;
