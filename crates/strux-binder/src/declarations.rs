//! Declaration-graph nodes.

use crate::ids::{DeclId, NodeIndex, SymbolId};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use strux_common::{Atom, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// The synthetic global container.
    SourceFile,
    Variable,
    Parameter,
    Property,
    Function,
    Method,
    Constructor,
    CallSignature,
    ConstructSignature,
    IndexSignature,
    Interface,
    Class,
    Enum,
    EnumMember,
    TypeParameter,
    Alias,
    /// Anonymous object type written as `{ ... }` in type position.
    TypeLiteral,
    /// `(x: T) => R` in type position.
    FunctionType,
    /// `new (x: T) => R` in type position.
    ConstructorType,
    FunctionExpression,
}

impl DeclKind {
    /// Kinds that carry a `DeclData::Signature` payload.
    #[inline]
    pub fn is_signature(self) -> bool {
        matches!(
            self,
            DeclKind::Function
                | DeclKind::Method
                | DeclKind::Constructor
                | DeclKind::CallSignature
                | DeclKind::ConstructSignature
                | DeclKind::IndexSignature
                | DeclKind::FunctionType
                | DeclKind::ConstructorType
                | DeclKind::FunctionExpression
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u16 {
        const OPTIONAL = 1 << 0;
        const REST = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const HAS_BODY = 1 << 4;
    }
}

/// How a parameter binds its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
}

/// Per-kind payload of a declaration.
#[derive(Debug, Clone, Default)]
pub enum DeclData {
    #[default]
    None,
    /// Variables, parameters and properties.
    Variable {
        type_annotation: Option<NodeIndex>,
        initializer: Option<NodeIndex>,
    },
    /// Functions, methods, constructors, signatures and function types.
    Signature {
        return_type: Option<NodeIndex>,
        /// Expressions of `return` statements in the body, in source order.
        returns: Vec<NodeIndex>,
    },
    /// Interfaces and classes.
    Heritage {
        extends: Vec<NodeIndex>,
        implements: Vec<NodeIndex>,
    },
    TypeParameter {
        constraint: Option<NodeIndex>,
    },
    /// Entity name the alias forwards to.
    Alias { target: NodeIndex },
}

/// One node in the declaration graph.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: Atom,
    pub flags: DeclFlags,
    /// Symbol this declaration contributes to. Signatures of type members have none.
    pub symbol: Option<SymbolId>,
    pub parent: Option<DeclId>,
    pub children: Vec<DeclId>,
    /// Syntax node standing for this declaration (used for node associations).
    pub node: NodeIndex,
    pub span: Span,
    pub data: DeclData,
    /// Names declared directly in this declaration's scope (type parameters, parameters,
    /// and top-level declarations of the source file).
    pub(crate) locals: FxHashMap<Atom, SymbolId>,
}

impl Declaration {
    #[inline]
    pub fn has_flags(&self, flags: DeclFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Type annotation of a variable, parameter or property.
    pub fn type_annotation(&self) -> Option<NodeIndex> {
        match &self.data {
            DeclData::Variable {
                type_annotation, ..
            } => *type_annotation,
            _ => None,
        }
    }

    pub fn initializer(&self) -> Option<NodeIndex> {
        match &self.data {
            DeclData::Variable { initializer, .. } => *initializer,
            _ => None,
        }
    }

    pub fn return_annotation(&self) -> Option<NodeIndex> {
        match &self.data {
            DeclData::Signature { return_type, .. } => *return_type,
            _ => None,
        }
    }

    pub fn return_expressions(&self) -> &[NodeIndex] {
        match &self.data {
            DeclData::Signature { returns, .. } => returns,
            _ => &[],
        }
    }

    pub fn extends(&self) -> &[NodeIndex] {
        match &self.data {
            DeclData::Heritage { extends, .. } => extends,
            _ => &[],
        }
    }

    pub fn implements(&self) -> &[NodeIndex] {
        match &self.data {
            DeclData::Heritage { implements, .. } => implements,
            _ => &[],
        }
    }

    pub fn constraint(&self) -> Option<NodeIndex> {
        match &self.data {
            DeclData::TypeParameter { constraint } => *constraint,
            _ => None,
        }
    }

    pub fn alias_target(&self) -> Option<NodeIndex> {
        match &self.data {
            DeclData::Alias { target } => Some(*target),
            _ => None,
        }
    }
}
