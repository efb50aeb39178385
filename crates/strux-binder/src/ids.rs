//! Arena handles.

/// Handle to a `Symbol` in the binder's symbol arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Handle to a `Declaration` in the binder's declaration arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    /// The synthetic global (source-file) declaration.
    pub const GLOBAL: DeclId = DeclId(0);
}

/// Handle to a syntax `Node`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);
