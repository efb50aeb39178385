//! Expression typing.
//!
//! Covers the expressions that reach the resolver as call arguments,
//! initializers and return expressions. Every expression is typed against the
//! innermost contextual type (see [`Checker::with_contextual_type`]).

use crate::call_checker::{CallSite, SiteKind};
use crate::context::Checker;
use strux_binder::{DeclId, DeclKind, Meaning, Node, NodeIndex};
use strux_common::Atom;
use strux_common::diagnostics::diagnostic_codes;
use strux_common::limits::{STACK_GROW_SIZE, STACK_RED_ZONE};
use strux_solver::{
    LazyCandidates, ObjectShape, PropertyInfo, SignatureId, SignatureKind, TypeId,
    best_common_type, signature_to_any,
};
use tracing::{debug, trace};

impl<'a> Checker<'a> {
    /// Type the expression at `node`, resolving names from `scope`.
    pub fn type_of_expression(&mut self, node: NodeIndex, scope: DeclId) -> TypeId {
        if !self.expr_depth.enter() {
            debug!(node = node.0, "expression depth exceeded, typed as any");
            return TypeId::ANY;
        }
        let ty = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.compute_expression_type(node, scope));
        self.expr_depth.leave();
        self.record_node_type(node, ty);
        ty
    }

    fn compute_expression_type(&mut self, node: NodeIndex, scope: DeclId) -> TypeId {
        let binder = self.binder;
        match binder.node(node) {
            Node::NumericLiteral { .. } => TypeId::NUMBER,
            Node::StringLiteral { value } => self.string_literal_expression_type(*value),
            Node::BooleanLiteral { .. } => TypeId::BOOLEAN,
            Node::NullLiteral => TypeId::NULL,
            Node::UndefinedLiteral => TypeId::UNDEFINED,
            Node::Identifier { name } => self.identifier_type(node, *name, scope),
            Node::PropertyAccess { object, name } => self.property_access_type(node, *object, *name, scope),
            Node::ElementAccess { object, index } => self.element_access_type(node, *object, *index, scope),
            Node::Call { callee, type_args, args } => {
                self.call_expression_type(node, *callee, type_args, args, scope, SiteKind::Call)
            }
            Node::New { callee, type_args, args } => {
                self.call_expression_type(node, *callee, type_args, args, scope, SiteKind::New)
            }
            Node::FunctionExpression { decl } => self.function_expression_type(*decl),
            Node::ObjectLiteral { properties } => self.object_literal_type(properties, scope),
            Node::ArrayLiteral { elements } => self.array_literal_type(elements, scope),
            Node::Conditional {
                condition,
                when_true,
                when_false,
            } => self.conditional_type(*condition, *when_true, *when_false, scope),
            Node::Declaration { decl } => match binder.symbol_of(*decl) {
                Some(symbol) => self.value_type_of_symbol(symbol),
                None => TypeId::ANY,
            },
            Node::TypeReference { .. }
            | Node::ArrayType { .. }
            | Node::StringLiteralType { .. }
            | Node::TypeLiteral { .. }
            | Node::FunctionType { .. } => TypeId::ERROR,
        }
    }

    /// A string literal keeps its literal type only where the contextual type
    /// asks for that same literal.
    fn string_literal_expression_type(&mut self, value: Atom) -> TypeId {
        let literal = self.types.string_literal(value);
        match self.contextual_type() {
            Some(contextual) if self.types.unalias(contextual) == literal => literal,
            _ => TypeId::STRING,
        }
    }

    fn identifier_type(&mut self, node: NodeIndex, name: Atom, scope: DeclId) -> TypeId {
        let binder = self.binder;
        match binder.lookup(name, scope, Meaning::Value) {
            Some(symbol) => {
                self.record_node_symbol(node, symbol);
                self.value_type_of_symbol(symbol)
            }
            None => self.error_at(node, diagnostic_codes::COULD_NOT_FIND_SYMBOL, &[binder.name(name)]),
        }
    }

    fn property_access_type(&mut self, node: NodeIndex, object: NodeIndex, name: Atom, scope: DeclId) -> TypeId {
        let object_ty = self.with_contextual_type(None, |c| c.type_of_expression(object, scope));
        let resolved = self.types.unalias(object_ty);
        if resolved == TypeId::ANY || self.types.is_error(resolved) {
            return resolved;
        }
        match self.types.find_apparent_property(resolved, name) {
            Some(property) => property.type_id,
            None => {
                let object_text = self.format_type(object_ty);
                let binder = self.binder;
                self.error_at(
                    node,
                    diagnostic_codes::PROPERTY_DOES_NOT_EXIST_ON_VALUE,
                    &[binder.name(name), &object_text],
                )
            }
        }
    }

    fn element_access_type(&mut self, node: NodeIndex, object: NodeIndex, index: NodeIndex, scope: DeclId) -> TypeId {
        let binder = self.binder;
        let object_ty = self.with_contextual_type(None, |c| c.type_of_expression(object, scope));
        let resolved = self.types.unalias(object_ty);
        if resolved == TypeId::ANY || self.types.is_error(resolved) {
            self.with_contextual_type(None, |c| c.type_of_expression(index, scope));
            return resolved;
        }

        if let Node::StringLiteral { value } = binder.node(index) {
            self.type_of_expression(index, scope);
            if let Some(property) = self.types.find_apparent_property(resolved, *value) {
                return property.type_id;
            }
        }

        let signatures = self.types.signatures_of(resolved, SignatureKind::Index);
        if !signatures.is_empty() {
            let site = CallSite {
                node,
                scope,
                kind: SiteKind::Index,
            };
            return self.resolve_overload(&signatures, std::slice::from_ref(&index), &[], site).return_type;
        }

        let index_ty = self.with_contextual_type(None, |c| c.type_of_expression(index, scope));
        if let Some(element) = self.types.array_element(resolved)
            && matches!(self.types.unalias(index_ty), TypeId::NUMBER | TypeId::ANY)
        {
            return element;
        }
        let object_text = self.format_type(object_ty);
        let index_text = self.format_type(index_ty);
        self.error_at(
            node,
            diagnostic_codes::VALUE_IS_NOT_INDEXABLE,
            &[&object_text, &index_text],
        )
    }

    fn call_expression_type(
        &mut self,
        node: NodeIndex,
        callee: NodeIndex,
        type_args: &[NodeIndex],
        args: &[NodeIndex],
        scope: DeclId,
        kind: SiteKind,
    ) -> TypeId {
        let callee_ty = self.with_contextual_type(None, |c| c.type_of_expression(callee, scope));
        let resolved = self.types.unalias(callee_ty);
        if resolved == TypeId::ANY || self.types.is_error(resolved) {
            for &arg in args {
                self.with_contextual_type(None, |c| c.type_of_expression(arg, scope));
            }
            return resolved;
        }

        let signature_kind = match kind {
            SiteKind::New => SignatureKind::Construct,
            SiteKind::Call | SiteKind::Index => SignatureKind::Call,
        };
        let signatures = self.types.signatures_of(resolved, signature_kind);
        if signatures.is_empty() {
            let code = match kind {
                SiteKind::New => diagnostic_codes::CANNOT_NEW_EXPRESSION_LACKING_CONSTRUCT_SIGNATURE,
                SiteKind::Call | SiteKind::Index => diagnostic_codes::CANNOT_INVOKE_EXPRESSION_LACKING_CALL_SIGNATURE,
            };
            for &arg in args {
                self.with_contextual_type(None, |c| c.type_of_expression(arg, scope));
            }
            return self.error_at(node, code, &[]);
        }

        let explicit: Vec<TypeId> = type_args.iter().map(|&arg| self.resolve_type(arg, scope)).collect();
        let site = CallSite { node, scope, kind };
        let result = self.resolve_overload(&signatures, args, &explicit, site);
        trace!(node = node.0, signature = ?result.signature, ret = result.return_type.0, "call typed");
        result.return_type
    }

    // =========================================================================
    // Context-sensitive expressions
    // =========================================================================

    /// The single call signature a contextual type offers, erased to `any`
    /// when generic.
    pub(crate) fn contextual_signature(&self, contextual: Option<TypeId>) -> Option<SignatureId> {
        let contextual = self.types.unalias(contextual?);
        let signatures = self.types.signatures_of(contextual, SignatureKind::Call);
        match signatures.as_slice() {
            [single] => Some(signature_to_any(&self.types, *single)),
            _ => None,
        }
    }

    fn function_expression_type(&mut self, decl: DeclId) -> TypeId {
        let binder = self.binder;
        // Parameter types depend on the contextual signature; drop earlier typings.
        for &child in &binder.declaration(decl).children {
            let child_decl = binder.declaration(child);
            if child_decl.kind == DeclKind::Parameter
                && let Some(symbol) = child_decl.symbol
            {
                self.links.remove(&symbol);
            }
        }
        let contextual = self.contextual_signature(self.contextual_type());
        if let Some(sig) = contextual {
            self.function_contexts.insert(decl, sig);
        }
        let sig = self.with_contextual_type(None, |c| c.build_signature(decl, &[], None));
        self.function_contexts.remove(&decl);
        self.types.function_of(sig)
    }

    fn object_literal_type(&mut self, properties: &[(Atom, NodeIndex)], scope: DeclId) -> TypeId {
        let contextual = self.contextual_type().map(|t| self.types.unalias(t));
        let mut shape = ObjectShape::anonymous();
        for &(name, value) in properties {
            let member_context = contextual
                .and_then(|t| self.types.find_apparent_property(t, name))
                .map(|p| p.type_id);
            let ty = self.with_contextual_type(member_context, |c| c.type_of_expression(value, scope));
            let ty = self.widen(ty);
            match shape.members.iter_mut().find(|m| m.name == name) {
                Some(existing) => existing.type_id = ty,
                None => shape.members.push(PropertyInfo::new(name, ty)),
            }
        }
        self.types.object_type(shape)
    }

    fn array_literal_type(&mut self, elements: &[NodeIndex], scope: DeclId) -> TypeId {
        let element_context = self
            .contextual_type()
            .and_then(|t| self.types.array_element(self.types.unalias(t)));
        if elements.is_empty() {
            return self.types.array(element_context.unwrap_or(TypeId::ANY));
        }
        let mut candidates = LazyCandidates::new(elements.len(), |checker: &mut Checker<'a>, index: usize| {
            elements.get(index).map_or(TypeId::ANY, |&element| {
                checker.with_contextual_type(element_context, |c| c.type_of_expression(element, scope))
            })
        });
        let element = best_common_type(self, None, element_context, &mut candidates);
        let element = self.widen(element);
        self.types.array(element)
    }

    fn conditional_type(&mut self, condition: NodeIndex, when_true: NodeIndex, when_false: NodeIndex, scope: DeclId) -> TypeId {
        self.with_contextual_type(None, |c| c.type_of_expression(condition, scope));
        let contextual = self.contextual_type();
        let branches = [when_true, when_false];
        let mut candidates = LazyCandidates::new(branches.len(), |checker: &mut Checker<'a>, index: usize| {
            branches.get(index).map_or(TypeId::ANY, |&branch| {
                checker.with_contextual_type(contextual, |c| c.type_of_expression(branch, scope))
            })
        });
        best_common_type(self, None, contextual, &mut candidates)
    }
}
