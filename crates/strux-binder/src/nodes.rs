//! Type and expression syntax read by the resolver.

use crate::ids::{DeclId, NodeIndex};
use strux_common::{Atom, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // ---- type syntax ----
    /// `Name` or `Name<A, B>`; keyword types (`number`, `any`, ...) are references too.
    TypeReference {
        name: Atom,
        type_args: Vec<NodeIndex>,
    },
    ArrayType {
        element: NodeIndex,
    },
    StringLiteralType {
        value: Atom,
    },
    /// `{ ... }`; members live on the declaration.
    TypeLiteral {
        decl: DeclId,
    },
    /// `(..) => R` or `new (..) => R`.
    FunctionType {
        decl: DeclId,
    },

    // ---- expressions ----
    NumericLiteral {
        value: f64,
    },
    StringLiteral {
        value: Atom,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    UndefinedLiteral,
    Identifier {
        name: Atom,
    },
    PropertyAccess {
        object: NodeIndex,
        name: Atom,
    },
    ElementAccess {
        object: NodeIndex,
        index: NodeIndex,
    },
    Call {
        callee: NodeIndex,
        type_args: Vec<NodeIndex>,
        args: Vec<NodeIndex>,
    },
    New {
        callee: NodeIndex,
        type_args: Vec<NodeIndex>,
        args: Vec<NodeIndex>,
    },
    FunctionExpression {
        decl: DeclId,
    },
    ObjectLiteral {
        properties: Vec<(Atom, NodeIndex)>,
    },
    ArrayLiteral {
        elements: Vec<NodeIndex>,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },

    /// Stands for a declaration in node-association tables.
    Declaration {
        decl: DeclId,
    },
}

impl Node {
    /// Expressions whose type depends on the contextual type they are checked against.
    #[inline]
    pub fn is_context_sensitive(&self) -> bool {
        matches!(
            self,
            Node::FunctionExpression { .. } | Node::ObjectLiteral { .. } | Node::ArrayLiteral { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub node: Node,
    pub span: Span,
}
