//! Type syntax to `TypeId`.
//!
//! Type references resolve through the binder's `Type` meaning. Generic
//! references are specialized on the spot; their constraint checks are
//! deferred to the end of the unit so that cyclic declarations are complete
//! before arguments are compared against constraints.

use crate::context::Checker;
use crate::deferred::DeferredCheck;
use strux_binder::{DeclId, DeclKind, Meaning, Node, NodeIndex};
use strux_common::diagnostics::diagnostic_codes;
use strux_solver::{ObjectShape, TypeData, TypeId, specialize, specialize_to_any};
use tracing::trace;

impl<'a> Checker<'a> {
    /// Lower the type syntax at `node`, resolving names from `context`.
    pub fn resolve_type(&mut self, node: NodeIndex, context: DeclId) -> TypeId {
        let binder = self.binder;
        let ty = match binder.node(node) {
            Node::TypeReference { name, type_args } => self.resolve_type_reference(node, *name, type_args, context),
            Node::ArrayType { element } => {
                let element = self.resolve_type(*element, context);
                self.types.array(element)
            }
            Node::StringLiteralType { value } => self.types.string_literal(*value),
            Node::TypeLiteral { decl } => self.type_literal_type(*decl),
            Node::FunctionType { decl } => {
                let sig = self.signature_of_declaration(*decl);
                if binder.declaration(*decl).kind == DeclKind::ConstructorType {
                    let mut shape = ObjectShape::anonymous();
                    shape.construct_signatures.push(sig);
                    self.types.function_type(shape)
                } else {
                    self.types.function_of(sig)
                }
            }
            _ => TypeId::ERROR,
        };
        self.record_node_type(node, ty);
        ty
    }

    fn resolve_type_reference(
        &mut self,
        node: NodeIndex,
        name: strux_common::Atom,
        type_args: &[NodeIndex],
        context: DeclId,
    ) -> TypeId {
        let binder = self.binder;
        let text = binder.name(name);
        if type_args.is_empty()
            && let Some(intrinsic) = Self::keyword_type(text)
        {
            return intrinsic;
        }

        let Some(symbol) = binder.lookup(name, context, Meaning::Type) else {
            return self.error_at(node, diagnostic_codes::COULD_NOT_FIND_SYMBOL, &[text]);
        };
        self.record_node_symbol(node, symbol);
        let ty = self.type_of_symbol(symbol);
        if self.types.is_error(ty) {
            return ty;
        }

        let root = self.types.unalias(ty);
        let params = match self.types.lookup(root) {
            TypeData::Generic(shape) => self.types.shape(shape).type_params.clone(),
            _ => Vec::new(),
        };

        if params.is_empty() {
            if !type_args.is_empty() {
                return self.error_at(node, diagnostic_codes::TYPE_IS_NOT_GENERIC, &[text]);
            }
            return ty;
        }
        if type_args.is_empty() {
            let count = params.len().to_string();
            self.post_error(node, diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS, &[text, &count]);
            return specialize_to_any(&self.types, root);
        }
        if type_args.len() != params.len() {
            let count = params.len().to_string();
            return self.error_at(
                node,
                diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS,
                &[text, &count],
            );
        }

        let args: Vec<TypeId> = type_args.iter().map(|&arg| self.resolve_type(arg, context)).collect();
        let specialized = specialize(&self.types, root, &args);
        trace!(root = root.0, specialized = specialized.0, "type reference specialized");
        if !self.is_provisional() && self.constraint_sites.insert(node) {
            self.deferred.push(DeferredCheck::Constraints { root, args, node });
        }
        specialized
    }

    fn keyword_type(text: &str) -> Option<TypeId> {
        Some(match text {
            "any" => TypeId::ANY,
            "number" => TypeId::NUMBER,
            "string" => TypeId::STRING,
            "boolean" => TypeId::BOOLEAN,
            "void" => TypeId::VOID,
            "null" => TypeId::NULL,
            "undefined" => TypeId::UNDEFINED,
            _ => return None,
        })
    }
}
