//! Arena owner and the programmatic builder API.

use crate::declarations::{DeclData, DeclFlags, DeclKind, Declaration, ParamKind};
use crate::ids::{DeclId, NodeIndex, SymbolId};
use crate::nodes::{Node, NodeData};
use crate::symbols::{Symbol, SymbolFlags};
use rustc_hash::FxHashMap;
use strux_common::{Atom, Interner, Span};
use tracing::trace;

/// Holds every symbol, declaration and syntax node of one compilation unit.
pub struct Binder {
    interner: Interner,
    symbols: Vec<Symbol>,
    declarations: Vec<Declaration>,
    nodes: Vec<NodeData>,
    next_offset: u32,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_well_known();
        let mut binder = Binder {
            interner,
            symbols: Vec::new(),
            declarations: Vec::new(),
            nodes: Vec::new(),
            next_offset: 0,
        };
        let node = binder.alloc_node(Node::Declaration {
            decl: DeclId::GLOBAL,
        });
        binder.declarations.push(Declaration {
            kind: DeclKind::SourceFile,
            name: Atom::NONE,
            flags: DeclFlags::empty(),
            symbol: None,
            parent: None,
            children: Vec::new(),
            node,
            span: binder.nodes[node.0 as usize].span,
            data: DeclData::None,
            locals: FxHashMap::default(),
        });
        binder
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    #[inline]
    pub fn global(&self) -> DeclId {
        DeclId::GLOBAL
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    #[inline]
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    #[inline]
    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.0 as usize]
    }

    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0 as usize].node
    }

    #[inline]
    pub fn span(&self, idx: NodeIndex) -> Span {
        self.nodes
            .get(idx.0 as usize)
            .map(|n| n.span)
            .unwrap_or_default()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Symbol declared by `decl`, if any.
    #[inline]
    pub fn symbol_of(&self, decl: DeclId) -> Option<SymbolId> {
        self.declaration(decl).symbol
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.name(self.symbol(id).name)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn intern(&mut self, s: &str) -> Atom {
        self.interner.intern(s)
    }

    pub fn declare_variable(
        &mut self,
        parent: DeclId,
        name: &str,
        type_annotation: Option<NodeIndex>,
        initializer: Option<NodeIndex>,
    ) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Variable,
            name,
            DeclFlags::empty(),
            parent,
            DeclData::Variable {
                type_annotation,
                initializer,
            },
        );
        self.declare_local(parent, name, SymbolFlags::VARIABLE, decl);
        decl
    }

    /// Declare a function signature. Repeated names add overloads to the same symbol.
    pub fn declare_function(&mut self, parent: DeclId, name: &str) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Function,
            name,
            DeclFlags::empty(),
            parent,
            signature_data(),
        );
        self.declare_local(parent, name, SymbolFlags::FUNCTION, decl);
        decl
    }

    pub fn add_type_parameter(
        &mut self,
        owner: DeclId,
        name: &str,
        constraint: Option<NodeIndex>,
    ) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::TypeParameter,
            name,
            DeclFlags::empty(),
            owner,
            DeclData::TypeParameter { constraint },
        );
        self.declare_local(owner, name, SymbolFlags::TYPE_PARAMETER, decl);
        decl
    }

    pub fn add_parameter(
        &mut self,
        owner: DeclId,
        name: &str,
        type_annotation: Option<NodeIndex>,
        kind: ParamKind,
    ) -> DeclId {
        let name = self.intern(name);
        let flags = match kind {
            ParamKind::Required => DeclFlags::empty(),
            ParamKind::Optional => DeclFlags::OPTIONAL,
            ParamKind::Rest => DeclFlags::REST,
        };
        let decl = self.alloc_decl(
            DeclKind::Parameter,
            name,
            flags,
            owner,
            DeclData::Variable {
                type_annotation,
                initializer: None,
            },
        );
        self.declare_local(owner, name, SymbolFlags::PARAMETER, decl);
        decl
    }

    pub fn set_return_type(&mut self, owner: DeclId, type_node: NodeIndex) {
        if let DeclData::Signature { return_type, .. } = &mut self.decl_mut(owner).data {
            *return_type = Some(type_node);
        }
    }

    /// Record a `return expr;` in the body of `owner`.
    pub fn add_return(&mut self, owner: DeclId, expr: NodeIndex) {
        let decl = self.decl_mut(owner);
        decl.flags |= DeclFlags::HAS_BODY;
        if let DeclData::Signature { returns, .. } = &mut decl.data {
            returns.push(expr);
        }
    }

    /// Mark `owner` as an implementation (has a body) without return expressions.
    pub fn set_body(&mut self, owner: DeclId) {
        self.decl_mut(owner).flags |= DeclFlags::HAS_BODY;
    }

    pub fn declare_interface(&mut self, parent: DeclId, name: &str) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Interface,
            name,
            DeclFlags::empty(),
            parent,
            heritage_data(),
        );
        self.declare_local(parent, name, SymbolFlags::INTERFACE, decl);
        decl
    }

    pub fn declare_class(&mut self, parent: DeclId, name: &str) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Class,
            name,
            DeclFlags::empty(),
            parent,
            heritage_data(),
        );
        self.declare_local(parent, name, SymbolFlags::CLASS, decl);
        decl
    }

    pub fn add_extends(&mut self, decl: DeclId, type_ref: NodeIndex) {
        if let DeclData::Heritage { extends, .. } = &mut self.decl_mut(decl).data {
            extends.push(type_ref);
        }
    }

    pub fn add_implements(&mut self, decl: DeclId, type_ref: NodeIndex) {
        if let DeclData::Heritage { implements, .. } = &mut self.decl_mut(decl).data {
            implements.push(type_ref);
        }
    }

    pub fn add_property(
        &mut self,
        owner: DeclId,
        name: &str,
        type_annotation: Option<NodeIndex>,
        flags: DeclFlags,
    ) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Property,
            name,
            flags,
            owner,
            DeclData::Variable {
                type_annotation,
                initializer: None,
            },
        );
        self.declare_member(owner, name, SymbolFlags::PROPERTY, decl);
        decl
    }

    pub fn set_initializer(&mut self, decl: DeclId, expr: NodeIndex) {
        if let DeclData::Variable { initializer, .. } = &mut self.decl_mut(decl).data {
            *initializer = Some(expr);
        }
    }

    /// Add a method signature. Repeated names add overloads to the same member.
    pub fn add_method(&mut self, owner: DeclId, name: &str, flags: DeclFlags) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(DeclKind::Method, name, flags, owner, signature_data());
        self.declare_member(owner, name, SymbolFlags::METHOD, decl);
        decl
    }

    pub fn add_call_signature(&mut self, owner: DeclId) -> DeclId {
        self.alloc_decl(
            DeclKind::CallSignature,
            Atom::NONE,
            DeclFlags::empty(),
            owner,
            signature_data(),
        )
    }

    pub fn add_construct_signature(&mut self, owner: DeclId) -> DeclId {
        self.alloc_decl(
            DeclKind::ConstructSignature,
            Atom::NONE,
            DeclFlags::empty(),
            owner,
            signature_data(),
        )
    }

    /// `[key: key_type]: value_type`
    pub fn add_index_signature(
        &mut self,
        owner: DeclId,
        key: &str,
        key_type: NodeIndex,
        value_type: NodeIndex,
    ) -> DeclId {
        let decl = self.alloc_decl(
            DeclKind::IndexSignature,
            Atom::NONE,
            DeclFlags::empty(),
            owner,
            signature_data(),
        );
        self.add_parameter(decl, key, Some(key_type), ParamKind::Required);
        self.set_return_type(decl, value_type);
        decl
    }

    pub fn add_constructor(&mut self, class: DeclId) -> DeclId {
        let name = self.intern("constructor");
        self.alloc_decl(
            DeclKind::Constructor,
            name,
            DeclFlags::HAS_BODY,
            class,
            signature_data(),
        )
    }

    pub fn declare_enum(&mut self, parent: DeclId, name: &str, members: &[&str]) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(DeclKind::Enum, name, DeclFlags::empty(), parent, DeclData::None);
        self.declare_local(parent, name, SymbolFlags::ENUM, decl);
        for member in members {
            let member = self.intern(member);
            let member_decl = self.alloc_decl(
                DeclKind::EnumMember,
                member,
                DeclFlags::empty(),
                decl,
                DeclData::None,
            );
            self.declare_member(decl, member, SymbolFlags::ENUM_MEMBER, member_decl);
        }
        decl
    }

    /// `import name = target;` where `target` is an identifier or property-access node.
    pub fn declare_alias(&mut self, parent: DeclId, name: &str, target: NodeIndex) -> DeclId {
        let name = self.intern(name);
        let decl = self.alloc_decl(
            DeclKind::Alias,
            name,
            DeclFlags::empty(),
            parent,
            DeclData::Alias { target },
        );
        self.declare_local(parent, name, SymbolFlags::ALIAS, decl);
        decl
    }

    // =========================================================================
    // Type syntax
    // =========================================================================

    pub fn type_ref(&mut self, name: &str, type_args: Vec<NodeIndex>) -> NodeIndex {
        let name = self.intern(name);
        self.alloc_node(Node::TypeReference { name, type_args })
    }

    pub fn type_name(&mut self, name: &str) -> NodeIndex {
        self.type_ref(name, Vec::new())
    }

    pub fn array_type(&mut self, element: NodeIndex) -> NodeIndex {
        self.alloc_node(Node::ArrayType { element })
    }

    pub fn string_literal_type(&mut self, value: &str) -> NodeIndex {
        let value = self.intern(value);
        self.alloc_node(Node::StringLiteralType { value })
    }

    /// `{ ... }` in type position. Members are added to the returned declaration.
    pub fn type_literal(&mut self, parent: DeclId) -> (NodeIndex, DeclId) {
        let decl = self.anonymous_container(DeclKind::TypeLiteral, parent, DeclData::None);
        let node = self.alloc_node(Node::TypeLiteral { decl });
        (node, decl)
    }

    /// `(..) => R` in type position. Parameters go on the returned declaration.
    pub fn function_type(&mut self, parent: DeclId) -> (NodeIndex, DeclId) {
        let decl = self.anonymous_container(DeclKind::FunctionType, parent, signature_data());
        let node = self.alloc_node(Node::FunctionType { decl });
        (node, decl)
    }

    /// `new (..) => R` in type position.
    pub fn constructor_type(&mut self, parent: DeclId) -> (NodeIndex, DeclId) {
        let decl = self.anonymous_container(DeclKind::ConstructorType, parent, signature_data());
        let node = self.alloc_node(Node::FunctionType { decl });
        (node, decl)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn num(&mut self, value: f64) -> NodeIndex {
        self.alloc_node(Node::NumericLiteral { value })
    }

    pub fn str(&mut self, value: &str) -> NodeIndex {
        let value = self.intern(value);
        self.alloc_node(Node::StringLiteral { value })
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        self.alloc_node(Node::BooleanLiteral { value })
    }

    pub fn null(&mut self) -> NodeIndex {
        self.alloc_node(Node::NullLiteral)
    }

    pub fn undefined(&mut self) -> NodeIndex {
        self.alloc_node(Node::UndefinedLiteral)
    }

    pub fn ident(&mut self, name: &str) -> NodeIndex {
        let name = self.intern(name);
        self.alloc_node(Node::Identifier { name })
    }

    pub fn prop(&mut self, object: NodeIndex, name: &str) -> NodeIndex {
        let name = self.intern(name);
        self.alloc_node(Node::PropertyAccess { object, name })
    }

    pub fn index(&mut self, object: NodeIndex, index: NodeIndex) -> NodeIndex {
        self.alloc_node(Node::ElementAccess { object, index })
    }

    pub fn call(&mut self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.call_generic(callee, Vec::new(), args)
    }

    pub fn call_generic(
        &mut self,
        callee: NodeIndex,
        type_args: Vec<NodeIndex>,
        args: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.alloc_node(Node::Call {
            callee,
            type_args,
            args,
        })
    }

    pub fn new_expr(&mut self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.new_generic(callee, Vec::new(), args)
    }

    pub fn new_generic(
        &mut self,
        callee: NodeIndex,
        type_args: Vec<NodeIndex>,
        args: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.alloc_node(Node::New {
            callee,
            type_args,
            args,
        })
    }

    /// `function (..) { .. }` nested under `parent` for name lookup.
    pub fn function_expression(&mut self, parent: DeclId) -> (NodeIndex, DeclId) {
        let decl = self.anonymous_container(DeclKind::FunctionExpression, parent, signature_data());
        self.decl_mut(decl).flags |= DeclFlags::HAS_BODY;
        let node = self.alloc_node(Node::FunctionExpression { decl });
        (node, decl)
    }

    pub fn object_literal(&mut self, properties: &[(&str, NodeIndex)]) -> NodeIndex {
        let properties = properties
            .iter()
            .map(|(name, value)| (self.interner.intern(name), *value))
            .collect();
        self.alloc_node(Node::ObjectLiteral { properties })
    }

    pub fn array_literal(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.alloc_node(Node::ArrayLiteral { elements })
    }

    pub fn conditional(
        &mut self,
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    ) -> NodeIndex {
        self.alloc_node(Node::Conditional {
            condition,
            when_true,
            when_false,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.declarations[id.0 as usize]
    }

    fn alloc_node(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        let start = self.next_offset;
        self.next_offset += 2;
        self.nodes.push(NodeData {
            node,
            span: Span::new(start, start + 1),
        });
        idx
    }

    fn alloc_decl(
        &mut self,
        kind: DeclKind,
        name: Atom,
        flags: DeclFlags,
        parent: DeclId,
        data: DeclData,
    ) -> DeclId {
        let id = DeclId(self.declarations.len() as u32);
        let node = self.alloc_node(Node::Declaration { decl: id });
        let span = self.span(node);
        self.declarations.push(Declaration {
            kind,
            name,
            flags,
            symbol: None,
            parent: Some(parent),
            children: Vec::new(),
            node,
            span,
            data,
            locals: FxHashMap::default(),
        });
        self.decl_mut(parent).children.push(id);
        trace!(decl = id.0, ?kind, parent = parent.0, "declared");
        id
    }

    /// Type literals and function expressions get a nameless symbol so that
    /// their members and node associations have an owner.
    fn anonymous_container(&mut self, kind: DeclKind, parent: DeclId, data: DeclData) -> DeclId {
        let decl = self.alloc_decl(kind, Atom::NONE, DeclFlags::empty(), parent, data);
        let symbol = self.alloc_symbol(Atom::NONE, SymbolFlags::empty(), None);
        self.symbols[symbol.0 as usize].declarations.push(decl);
        self.decl_mut(decl).symbol = Some(symbol);
        decl
    }

    fn alloc_symbol(&mut self, name: Atom, flags: SymbolFlags, parent: Option<SymbolId>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(name, flags, parent));
        id
    }

    /// Add `decl` to the symbol named `name` in `container`'s scope, merging with
    /// an existing symbol of the same name.
    fn declare_local(
        &mut self,
        container: DeclId,
        name: Atom,
        flags: SymbolFlags,
        decl: DeclId,
    ) -> SymbolId {
        let existing = self.declaration(container).locals.get(&name).copied();
        let symbol = match existing {
            Some(id) => {
                self.symbols[id.0 as usize].flags |= flags;
                id
            }
            None => {
                let id = self.alloc_symbol(name, flags, None);
                self.decl_mut(container).locals.insert(name, id);
                id
            }
        };
        self.symbols[symbol.0 as usize].declarations.push(decl);
        self.decl_mut(decl).symbol = Some(symbol);
        symbol
    }

    /// Add `decl` as a member of the symbol declared by `owner`. Static members and
    /// enum members are exports; everything else is an instance member.
    fn declare_member(
        &mut self,
        owner: DeclId,
        name: Atom,
        flags: SymbolFlags,
        decl: DeclId,
    ) -> Option<SymbolId> {
        let owner_symbol = self.declaration(owner).symbol?;
        let is_export = self.declaration(decl).has_flags(DeclFlags::STATIC)
            || flags.contains(SymbolFlags::ENUM_MEMBER);
        let existing = {
            let owner = self.symbol(owner_symbol);
            if is_export {
                owner.export(name)
            } else {
                owner.member(name)
            }
        };
        let flags = if is_export && !flags.contains(SymbolFlags::ENUM_MEMBER) {
            flags | SymbolFlags::STATIC
        } else {
            flags
        };
        let member = match existing {
            Some(id) => {
                self.symbols[id.0 as usize].flags |= flags;
                id
            }
            None => {
                let id = self.alloc_symbol(name, flags, Some(owner_symbol));
                let owner = &mut self.symbols[owner_symbol.0 as usize];
                if is_export {
                    owner.add_export(name, id);
                } else {
                    owner.add_member(name, id);
                }
                id
            }
        };
        self.symbols[member.0 as usize].declarations.push(decl);
        self.decl_mut(decl).symbol = Some(member);
        Some(member)
    }
}

fn signature_data() -> DeclData {
    DeclData::Signature {
        return_type: None,
        returns: Vec::new(),
    }
}

fn heritage_data() -> DeclData {
    DeclData::Heritage {
        extends: Vec::new(),
        implements: Vec::new(),
    }
}
