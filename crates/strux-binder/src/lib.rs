//! Declaration graph consumed by the strux type resolver.
//!
//! The binder owns three arenas:
//! - `Symbol`s: named entities with one or more declarations
//! - `Declaration`s: declaration-graph nodes (kind, flags, parent, children, payload)
//! - `Node`s: the type and expression syntax the resolver reads
//!
//! It performs no parsing. Front ends (and tests) populate it through the
//! builder methods on [`Binder`], after which it is read-only for the resolver.

pub mod ids;
pub use ids::{DeclId, NodeIndex, SymbolId};

pub mod symbols;
pub use symbols::{Meaning, Symbol, SymbolFlags};

pub mod declarations;
pub use declarations::{DeclData, DeclFlags, DeclKind, Declaration, ParamKind};

pub mod nodes;
pub use nodes::{Node, NodeData};

mod builder;
pub use builder::Binder;

mod scopes;
