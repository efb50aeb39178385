//! Symbol resolution state machine.
//!
//! `resolve_symbol` turns an unresolved symbol into a typed one exactly once.
//! Each symbol moves `Unresolved -> Resolving -> Resolved`; meeting a symbol
//! that is still `Resolving` is a cycle. Value symbols caught in a cycle read
//! as `any`. Type symbols allocate their type handle (a pending shape) before
//! walking members and bases, so a cyclic reference sees a usable handle that
//! the outer frame completes.

use crate::context::{Checker, ResolutionState};
use crate::deferred::{BaseKind, DeferredCheck};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use strux_binder::{DeclFlags, DeclId, DeclKind, Meaning, Node, NodeIndex, SymbolFlags, SymbolId};
use strux_common::diagnostics::diagnostic_codes;
use strux_solver::{
    LazyCandidates, ObjectShape, ParamInfo, PropertyInfo, ShapeFlags, Signature, SignatureId,
    SignatureKind, TypeData, TypeId, TypeParamInfo, Visibility, best_common_type,
    instantiate_generic_signature, param_type_at,
};
use tracing::{debug, trace};

impl<'a> Checker<'a> {
    // =========================================================================
    // Entry points
    // =========================================================================

    /// Resolve `symbol` if it is not resolved yet. Idempotent.
    pub fn resolve_symbol(&mut self, symbol: SymbolId) -> SymbolId {
        let binder = self.binder;
        let Some(sym) = binder.get_symbol(symbol) else {
            return symbol;
        };
        match self.resolution_state(symbol) {
            ResolutionState::Resolved => return symbol,
            ResolutionState::Resolving => {
                let links = self.links_mut(symbol);
                if sym.has_any_flags(SymbolFlags::VALUE) && links.value_type.is_none() {
                    debug!(symbol = symbol.0, name = binder.name(sym.name), "cycle, value reads as any");
                    links.value_type = Some(TypeId::ANY);
                }
                return symbol;
            }
            ResolutionState::Unresolved => {}
        }

        trace!(symbol = symbol.0, name = binder.name(sym.name), "resolving");
        self.links_mut(symbol).state = ResolutionState::Resolving;
        self.provisional.note_resolved(symbol);

        let flags = sym.flags;
        if flags.contains(SymbolFlags::ALIAS) {
            self.resolve_alias(symbol);
        } else {
            if flags.contains(SymbolFlags::CLASS) {
                self.resolve_class(symbol);
            } else if flags.contains(SymbolFlags::INTERFACE) {
                self.resolve_interface(symbol);
            }
            if flags.contains(SymbolFlags::ENUM) {
                self.resolve_enum(symbol);
            }
            if flags.contains(SymbolFlags::TYPE_PARAMETER) {
                self.resolve_type_parameter(symbol);
            }
            if flags.intersects(SymbolFlags::FUNCTION | SymbolFlags::METHOD) {
                self.resolve_function_like(symbol);
            } else if flags.intersects(SymbolFlags::VARIABLE | SymbolFlags::PROPERTY | SymbolFlags::PARAMETER) {
                self.resolve_variable_like(symbol);
            }
            if flags.contains(SymbolFlags::ENUM_MEMBER) {
                self.resolve_enum_member(symbol);
            }
        }

        self.links_mut(symbol).state = ResolutionState::Resolved;
        self.associate_declarations(symbol);
        trace!(symbol = symbol.0, "resolved");
        symbol
    }

    /// The type meaning of `symbol` (its declared type).
    pub fn type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let symbol = self.resolve_symbol(symbol);
        self.symbol_links(symbol).declared_type.unwrap_or(TypeId::ERROR)
    }

    /// The value meaning of `symbol`.
    pub fn value_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let symbol = self.resolve_symbol(symbol);
        self.symbol_links(symbol).value_type.unwrap_or(TypeId::ERROR)
    }

    /// Follow alias links to the symbol they stand for.
    pub fn resolve_alias_target(&mut self, symbol: SymbolId) -> SymbolId {
        let mut current = symbol;
        let mut seen = FxHashSet::default();
        while seen.insert(current) {
            self.resolve_symbol(current);
            match self.symbol_links(current).alias_target {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    fn associate_declarations(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let links = self.symbol_links(symbol);
        let ty = links.value_type.or(links.declared_type);
        for &decl in &binder.symbol(symbol).declarations {
            let node = binder.declaration(decl).node;
            self.record_node_symbol(node, symbol);
            if let Some(ty) = ty {
                self.record_node_type(node, ty);
            }
        }
    }

    // =========================================================================
    // Type symbols
    // =========================================================================

    fn resolve_interface(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let sym = binder.symbol(symbol);
        let decls: SmallVec<[DeclId; 2]> = sym
            .declarations
            .iter()
            .copied()
            .filter(|&d| binder.declaration(d).kind == DeclKind::Interface)
            .collect();
        let Some(&first) = decls.first() else {
            return;
        };

        let shape_id = self.types.alloc_pending_shape(sym.name, Some(symbol), ShapeFlags::empty());
        let has_type_params = decls.iter().any(|&d| Self::declares_type_parameters(binder, d));
        let ty = self.types.intern(if has_type_params {
            TypeData::Generic(shape_id)
        } else {
            TypeData::Object(shape_id)
        });
        self.links_mut(symbol).declared_type = Some(ty);

        let type_params = self.type_parameters_of(first);
        for &decl in &decls[1..] {
            self.share_type_parameters(decl, &type_params);
        }
        self.types.set_type_params(shape_id, type_params.clone());

        let mut shape = ObjectShape::named(sym.name, Some(symbol));
        shape.type_params = type_params;
        let mut seen = FxHashSet::default();
        for &decl in &decls {
            self.collect_members(decl, symbol, false, &mut shape, &mut seen);
        }
        for &decl in &decls {
            for &node in binder.declaration(decl).extends() {
                let base = self.resolve_type(node, decl);
                if self.accept_base(symbol, ty, base, node) {
                    shape.base_types.push(base);
                    self.deferred.push(DeferredCheck::BaseType {
                        kind: BaseKind::InterfaceExtends,
                        derived: ty,
                        base,
                        node,
                    });
                }
            }
        }
        self.types.set_shape(shape_id, shape);
        debug!(symbol = symbol.0, ty = ty.0, "interface resolved");
    }

    fn resolve_class(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let sym = binder.symbol(symbol);
        let Some(decl) = sym
            .declarations
            .iter()
            .copied()
            .find(|&d| binder.declaration(d).kind == DeclKind::Class)
        else {
            return;
        };

        let instance_id = self.types.alloc_pending_shape(sym.name, Some(symbol), ShapeFlags::CLASS);
        let static_id = self.types.alloc_pending_shape(sym.name, Some(symbol), ShapeFlags::CONSTRUCTOR);
        let instance_ty = self.types.intern(if Self::declares_type_parameters(binder, decl) {
            TypeData::Generic(instance_id)
        } else {
            TypeData::Class(instance_id)
        });
        let constructor_ty = self.types.intern(TypeData::Function(static_id));
        {
            let links = self.links_mut(symbol);
            links.declared_type = Some(instance_ty);
            links.value_type = Some(constructor_ty);
        }

        let type_params = self.type_parameters_of(decl);
        self.types.set_type_params(instance_id, type_params.clone());

        let mut instance = ObjectShape::named(sym.name, Some(symbol));
        instance.flags = ShapeFlags::CLASS;
        instance.type_params = type_params.clone();
        let mut statics = ObjectShape::named(sym.name, Some(symbol));
        statics.flags = ShapeFlags::CONSTRUCTOR;
        let mut seen = FxHashSet::default();
        self.collect_members(decl, symbol, false, &mut instance, &mut seen);
        self.collect_members(decl, symbol, true, &mut statics, &mut seen);

        let mut base_class = None;
        if let Some(&node) = binder.declaration(decl).extends().first() {
            let base = self.resolve_type(node, decl);
            if self.accept_base(symbol, instance_ty, base, node) {
                instance.base_types.push(base);
                base_class = Some(base);
                self.deferred.push(DeferredCheck::BaseType {
                    kind: BaseKind::ClassExtends,
                    derived: instance_ty,
                    base,
                    node,
                });
            }
        }
        for &node in binder.declaration(decl).implements() {
            let contract = self.resolve_type(node, decl);
            self.deferred.push(DeferredCheck::BaseType {
                kind: BaseKind::ClassImplements,
                derived: instance_ty,
                base: contract,
                node,
            });
        }

        statics.construct_signatures = self.class_construct_signatures(decl, &type_params, instance_ty, base_class);
        if let Some(base) = base_class
            && let Some(base_symbol) = self.declaring_symbol(base)
        {
            let base_constructor = self.value_type_of_symbol(base_symbol);
            if !self.types.is_error(base_constructor) {
                statics.base_types.push(base_constructor);
            }
        }

        self.types.set_shape(instance_id, instance);
        self.types.set_shape(static_id, statics);
        debug!(symbol = symbol.0, instance = instance_ty.0, constructor = constructor_ty.0, "class resolved");
    }

    /// Declared constructors, else the base class's construct signatures
    /// retargeted at this class, else a zero-argument signature.
    fn class_construct_signatures(
        &mut self,
        decl: DeclId,
        type_params: &[TypeId],
        instance_ty: TypeId,
        base_class: Option<TypeId>,
    ) -> Vec<SignatureId> {
        let binder = self.binder;
        let declared: SmallVec<[DeclId; 2]> = binder
            .declaration(decl)
            .children
            .iter()
            .copied()
            .filter(|&c| binder.declaration(c).kind == DeclKind::Constructor)
            .collect();
        if !declared.is_empty() {
            return Self::visible_overloads(binder, &declared)
                .into_iter()
                .map(|ctor| self.build_signature(ctor, type_params, Some(instance_ty)))
                .collect();
        }

        if let Some(base) = base_class
            && let Some(base_symbol) = self.declaring_symbol(base)
        {
            let base_constructor = self.value_type_of_symbol(base_symbol);
            let inherited = self.types.signatures_of(base_constructor, SignatureKind::Construct);
            if !inherited.is_empty() {
                let base_args = self
                    .types
                    .specialization_of(base)
                    .map(|key| key.args.to_vec())
                    .unwrap_or_default();
                return inherited
                    .into_iter()
                    .map(|sig| {
                        let specialized = instantiate_generic_signature(&self.types, sig, &base_args);
                        let sig = self.types.signature(specialized);
                        self.types.add_signature(Signature::new(
                            type_params.iter().copied().collect(),
                            sig.params.clone(),
                            instance_ty,
                            sig.declaration,
                        ))
                    })
                    .collect();
            }
        }

        vec![self.types.add_signature(Signature::new(
            type_params.iter().copied().collect(),
            Vec::new(),
            instance_ty,
            None,
        ))]
    }

    fn resolve_enum(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let sym = binder.symbol(symbol);
        let enum_ty = self.types.enum_type(symbol);
        self.links_mut(symbol).declared_type = Some(enum_ty);

        let mut container = ObjectShape::named(sym.name, Some(symbol));
        container.flags = ShapeFlags::ENUM_CONTAINER;
        for &member in &sym.exports {
            let member_sym = binder.symbol(member);
            if !member_sym.has_any_flags(SymbolFlags::ENUM_MEMBER) {
                continue;
            }
            let mut info = PropertyInfo::new(member_sym.name, enum_ty);
            info.parent_id = Some(symbol);
            info.declaration = member_sym.declarations.first().copied();
            container.members.push(info);
        }
        let container_ty = self.types.object_type(container);
        self.links_mut(symbol).value_type = Some(container_ty);
    }

    fn resolve_enum_member(&mut self, symbol: SymbolId) {
        let parent = self.binder.symbol(symbol).parent;
        let ty = match parent {
            Some(parent) => self.type_of_symbol(parent),
            None => TypeId::NUMBER,
        };
        self.links_mut(symbol).value_type = Some(ty);
    }

    fn resolve_type_parameter(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let sym = binder.symbol(symbol);
        let Some(&decl_id) = sym.declarations.first() else {
            return;
        };
        let ty = self.types.type_parameter(TypeParamInfo {
            name: sym.name,
            constraint: None,
            declaration: Some(decl_id),
        });
        self.links_mut(symbol).declared_type = Some(ty);

        let decl = binder.declaration(decl_id);
        if let Some(node) = decl.constraint() {
            let owner = decl.parent.unwrap_or(DeclId::GLOBAL);
            let constraint = self.resolve_type(node, owner);
            if !self.types.is_error(constraint) {
                self.types.set_constraint(ty, constraint);
            }
        }
    }

    fn resolve_alias(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let Some(&decl_id) = binder.symbol(symbol).declarations.first() else {
            return;
        };
        let decl = binder.declaration(decl_id);
        let Some(target_node) = decl.alias_target() else {
            return;
        };
        let scope = decl.parent.unwrap_or(DeclId::GLOBAL);
        match self.resolve_entity_name(target_node, scope) {
            Some(target) => {
                let target = self.resolve_alias_target(target);
                let target_links = self.symbol_links(target);
                let declared = target_links.declared_type.map(|t| self.types.alias(t));
                let value = target_links.value_type.map(|t| self.types.alias(t));
                let links = self.links_mut(symbol);
                links.alias_target = Some(target);
                links.declared_type = declared;
                links.value_type = value;
            }
            None => {
                let text = self.entity_name_text(target_node);
                let error = self.error_at(target_node, diagnostic_codes::COULD_NOT_FIND_SYMBOL, &[&text]);
                let links = self.links_mut(symbol);
                links.declared_type = Some(error);
                links.value_type = Some(error);
            }
        }
    }

    /// Resolve `a` or `a.b.c` in `scope` to a symbol, looking through containers.
    pub(crate) fn resolve_entity_name(&mut self, node: NodeIndex, scope: DeclId) -> Option<SymbolId> {
        let binder = self.binder;
        match binder.node(node) {
            Node::Identifier { name } | Node::TypeReference { name, .. } => binder
                .lookup(*name, scope, Meaning::Type)
                .or_else(|| binder.lookup(*name, scope, Meaning::Value))
                .or_else(|| binder.lookup(*name, scope, Meaning::Container)),
            Node::PropertyAccess { object, name } => {
                let container = self.resolve_entity_name(*object, scope)?;
                let container = self.resolve_alias_target(container);
                let container_sym = binder.symbol(container);
                container_sym.export(*name).or_else(|| container_sym.member(*name))
            }
            _ => None,
        }
    }

    fn entity_name_text(&self, node: NodeIndex) -> String {
        match self.binder.node(node) {
            Node::Identifier { name } | Node::TypeReference { name, .. } => self.binder.name(*name).to_string(),
            Node::PropertyAccess { object, name } => {
                format!("{}.{}", self.entity_name_text(*object), self.binder.name(*name))
            }
            _ => String::new(),
        }
    }

    // =========================================================================
    // Value symbols
    // =========================================================================

    fn resolve_function_like(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let decls: SmallVec<[DeclId; 2]> = binder
            .symbol(symbol)
            .declarations
            .iter()
            .copied()
            .filter(|&d| matches!(binder.declaration(d).kind, DeclKind::Function | DeclKind::Method))
            .collect();
        let mut shape = ObjectShape::anonymous();
        shape.symbol = Some(symbol);
        for decl in Self::visible_overloads(binder, &decls) {
            let sig = self.signature_of_declaration(decl);
            shape.call_signatures.push(sig);
        }
        let ty = self.types.function_type(shape);
        self.links_mut(symbol).value_type = Some(ty);
    }

    fn resolve_variable_like(&mut self, symbol: SymbolId) {
        let binder = self.binder;
        let Some(decl_id) = binder.symbol(symbol).declarations.iter().copied().find(|&d| {
            matches!(
                binder.declaration(d).kind,
                DeclKind::Variable | DeclKind::Property | DeclKind::Parameter
            )
        }) else {
            return;
        };
        let decl = binder.declaration(decl_id);
        let scope = decl.parent.unwrap_or(DeclId::GLOBAL);
        let ty = if decl.kind == DeclKind::Parameter {
            self.parameter_type(decl_id)
        } else {
            match (decl.type_annotation(), decl.initializer()) {
                (Some(annotation), initializer) => {
                    let declared = self.resolve_type(annotation, scope);
                    if let Some(expr) = initializer {
                        self.deferred.push(DeferredCheck::Initializer {
                            expr,
                            scope,
                            target: declared,
                        });
                    }
                    declared
                }
                (None, Some(initializer)) => {
                    let ty = self.with_contextual_type(None, |c| c.type_of_expression(initializer, scope));
                    self.widen(ty)
                }
                (None, None) => TypeId::ANY,
            }
        };
        self.links_mut(symbol).value_type = Some(ty);
    }

    /// Annotation, else the contextual signature's parameter type, else `any`.
    fn parameter_type(&mut self, decl_id: DeclId) -> TypeId {
        let binder = self.binder;
        let decl = binder.declaration(decl_id);
        let owner = decl.parent.unwrap_or(DeclId::GLOBAL);
        let is_rest = decl.has_flags(DeclFlags::REST);
        if let Some(annotation) = decl.type_annotation() {
            return self.resolve_type(annotation, owner);
        }
        if let Some(&contextual) = self.function_contexts.get(&owner) {
            let index = binder
                .declaration(owner)
                .children
                .iter()
                .filter(|&&c| binder.declaration(c).kind == DeclKind::Parameter)
                .position(|&c| c == decl_id)
                .unwrap_or(0);
            let sig = self.types.signature(contextual);
            if is_rest {
                if let Some(param) = sig.params.get(index).filter(|p| p.rest) {
                    return param.type_id;
                }
            } else if let Some(ty) = param_type_at(&self.types, &sig, index) {
                return ty;
            }
        }
        if is_rest {
            self.types.array(TypeId::ANY)
        } else {
            TypeId::ANY
        }
    }

    /// `null` and `undefined` initializers widen to `any`.
    pub(crate) fn widen(&self, ty: TypeId) -> TypeId {
        match self.types.unalias(ty) {
            TypeId::NULL | TypeId::UNDEFINED => TypeId::ANY,
            _ => ty,
        }
    }

    // =========================================================================
    // Members and signatures
    // =========================================================================

    /// Walk the members of `decl` into `shape`. `statics` selects static
    /// members; signatures are only collected for the instance side.
    fn collect_members(
        &mut self,
        decl: DeclId,
        owner: SymbolId,
        statics: bool,
        shape: &mut ObjectShape,
        seen: &mut FxHashSet<SymbolId>,
    ) {
        let binder = self.binder;
        for &child_id in &binder.declaration(decl).children {
            let child = binder.declaration(child_id);
            match child.kind {
                DeclKind::Property | DeclKind::Method => {
                    if child.has_flags(DeclFlags::STATIC) != statics {
                        continue;
                    }
                    let Some(member) = child.symbol else {
                        continue;
                    };
                    if !seen.insert(member) {
                        continue;
                    }
                    let ty = self.value_type_of_symbol(member);
                    shape.members.push(PropertyInfo {
                        name: child.name,
                        type_id: ty,
                        optional: child.has_flags(DeclFlags::OPTIONAL),
                        visibility: if child.has_flags(DeclFlags::PRIVATE) {
                            Visibility::Private
                        } else {
                            Visibility::Public
                        },
                        parent_id: Some(owner),
                        declaration: Some(child_id),
                    });
                }
                DeclKind::CallSignature if !statics => {
                    let sig = self.signature_of_declaration(child_id);
                    shape.call_signatures.push(sig);
                }
                DeclKind::ConstructSignature if !statics => {
                    let sig = self.signature_of_declaration(child_id);
                    shape.construct_signatures.push(sig);
                }
                DeclKind::IndexSignature if !statics => {
                    let sig = self.signature_of_declaration(child_id);
                    shape.index_signatures.push(sig);
                }
                _ => {}
            }
        }
    }

    /// Anonymous object type for a type literal declaration.
    pub(crate) fn type_literal_type(&mut self, decl: DeclId) -> TypeId {
        let owner = self.binder.symbol_of(decl);
        let mut shape = ObjectShape::anonymous();
        shape.symbol = owner;
        let mut seen = FxHashSet::default();
        if let Some(owner) = owner {
            self.collect_members(decl, owner, false, &mut shape, &mut seen);
        }
        self.types.object_type(shape)
    }

    /// Overload declarations hide the body-bearing implementation.
    fn visible_overloads(binder: &strux_binder::Binder, decls: &[DeclId]) -> SmallVec<[DeclId; 2]> {
        let overloads: SmallVec<[DeclId; 2]> = decls
            .iter()
            .copied()
            .filter(|&d| !binder.declaration(d).has_flags(DeclFlags::HAS_BODY))
            .collect();
        if overloads.is_empty() {
            decls.iter().copied().collect()
        } else {
            overloads
        }
    }

    /// Signature of a function-like declaration, built once per declaration.
    pub fn signature_of_declaration(&mut self, decl: DeclId) -> SignatureId {
        if let Some(&sig) = self.decl_signatures.get(&decl) {
            return sig;
        }
        let sig = self.build_signature(decl, &[], None);
        let cacheable = self.binder.declaration(decl).kind != DeclKind::FunctionExpression;
        if cacheable && !self.is_provisional() {
            self.decl_signatures.insert(decl, sig);
        }
        sig
    }

    /// Build a signature for `decl`. `outer_type_params` are prepended to the
    /// declaration's own (class type parameters on constructors);
    /// `fixed_return` overrides the declared return type.
    pub(crate) fn build_signature(
        &mut self,
        decl_id: DeclId,
        outer_type_params: &[TypeId],
        fixed_return: Option<TypeId>,
    ) -> SignatureId {
        let binder = self.binder;
        let mut type_params: SmallVec<[TypeId; 2]> = outer_type_params.iter().copied().collect();
        type_params.extend(self.type_parameters_of(decl_id));

        let mut params = Vec::new();
        for &child_id in &binder.declaration(decl_id).children {
            let child = binder.declaration(child_id);
            if child.kind != DeclKind::Parameter {
                continue;
            }
            let ty = match child.symbol {
                Some(symbol) => self.value_type_of_symbol(symbol),
                None => self.parameter_type(child_id),
            };
            params.push(ParamInfo {
                name: child.name,
                type_id: ty,
                optional: child.has_flags(DeclFlags::OPTIONAL),
                rest: child.has_flags(DeclFlags::REST),
            });
        }

        let return_type = match fixed_return {
            Some(ty) => ty,
            None => self.return_type_of(decl_id),
        };
        let sig = Signature::new(type_params, params, return_type, Some(decl_id));
        trace!(decl = decl_id.0, params = sig.params.len(), ret = return_type.0, "signature built");
        self.types.add_signature(sig)
    }

    /// Annotation, else the best common type of the return expressions with the
    /// contextual return type as target, else `void` for bodies and `any` for
    /// bodiless declarations.
    fn return_type_of(&mut self, decl_id: DeclId) -> TypeId {
        let binder = self.binder;
        let decl = binder.declaration(decl_id);
        if let Some(annotation) = decl.return_annotation() {
            return self.resolve_type(annotation, decl_id);
        }
        let returns: &'a [NodeIndex] = decl.return_expressions();
        if returns.is_empty() {
            return if decl.has_flags(DeclFlags::HAS_BODY) {
                TypeId::VOID
            } else {
                TypeId::ANY
            };
        }
        let target = self
            .function_contexts
            .get(&decl_id)
            .map(|&sig| self.types.signature(sig).return_type);
        let mut candidates = LazyCandidates::new(returns.len(), |checker: &mut Checker<'a>, index: usize| {
            returns.get(index).map_or(TypeId::ANY, |&node| {
                checker.with_contextual_type(target, |c| c.type_of_expression(node, decl_id))
            })
        });
        let inferred = best_common_type(self, None, target, &mut candidates);
        let inferred = self.widen(inferred);
        debug!(decl = decl_id.0, inferred = inferred.0, "return type inferred");
        inferred
    }

    // =========================================================================
    // Type parameters and bases
    // =========================================================================

    fn declares_type_parameters(binder: &strux_binder::Binder, decl: DeclId) -> bool {
        binder
            .declaration(decl)
            .children
            .iter()
            .any(|&c| binder.declaration(c).kind == DeclKind::TypeParameter)
    }

    pub(crate) fn type_parameters_of(&mut self, decl: DeclId) -> Vec<TypeId> {
        let binder = self.binder;
        let mut params = Vec::new();
        for &child in &binder.declaration(decl).children {
            let child_decl = binder.declaration(child);
            if child_decl.kind != DeclKind::TypeParameter {
                continue;
            }
            if let Some(symbol) = child_decl.symbol {
                params.push(self.type_of_symbol(symbol));
            }
        }
        params
    }

    /// Later declarations of a merged interface reuse the first declaration's
    /// type parameters.
    fn share_type_parameters(&mut self, decl: DeclId, shared: &[TypeId]) {
        let binder = self.binder;
        let own = binder
            .declaration(decl)
            .children
            .iter()
            .filter_map(|&c| {
                let child = binder.declaration(c);
                (child.kind == DeclKind::TypeParameter).then_some(child.symbol).flatten()
            });
        for (symbol, &ty) in own.zip(shared) {
            if self.resolution_state(symbol) == ResolutionState::Unresolved {
                let links = self.links_mut(symbol);
                links.state = ResolutionState::Resolved;
                links.declared_type = Some(ty);
                self.provisional.note_resolved(symbol);
            }
        }
    }

    /// Accept `base` for `own` unless it leads back to `own`. A recursive base
    /// is reported once per symbol and excluded. Reports inside a probe are
    /// discarded, so they do not count.
    fn accept_base(&mut self, symbol: SymbolId, own: TypeId, base: TypeId, node: NodeIndex) -> bool {
        let base = self.types.unalias(base);
        if self.types.is_error(base) || !self.types.is_object_like(base) {
            return false;
        }
        let root = self.types.specialization_of(base).map_or(base, |key| key.root);
        if root == own || self.types.has_base(base, own) {
            if self.is_provisional() || self.recursive_bases.insert(symbol) {
                let name = self.binder.symbol_name(symbol).to_string();
                self.post_error(
                    node,
                    diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE,
                    &[&name],
                );
            }
            self.types.mark_recursive_base(own);
            return false;
        }
        true
    }

    /// Declaring symbol of a named object type, looking through specializations.
    pub(crate) fn declaring_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        let ty = self.types.unalias(ty);
        let ty = self.types.specialization_of(ty).map_or(ty, |key| key.root);
        let shape = self.types.lookup(ty).direct_shape()?;
        self.types.shape(shape).symbol
    }
}
