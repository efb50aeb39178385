//! Core type representation.
//!
//! Every type is a `TypeId` handle into the [`TypeStore`](crate::TypeStore).
//! Handle equality is type identity for intrinsics, literals, arrays,
//! enums and specializations (all interned); object-like types carry a
//! `ShapeId` that is unique per declaration, so structurally equal but
//! separately declared shapes get distinct handles.

use bitflags::bitflags;
use smallvec::SmallVec;
use strux_binder::{DeclId, SymbolId};
use strux_common::Atom;

// =============================================================================
// Handles
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const NUMBER: TypeId = TypeId(1);
    pub const STRING: TypeId = TypeId(2);
    pub const BOOLEAN: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    /// The error type produced without a specific diagnostic.
    pub const ERROR: TypeId = TypeId(7);
    /// The empty anonymous object type `{}`.
    pub const EMPTY_OBJECT: TypeId = TypeId(8);

    #[inline]
    pub fn is_primitive(self) -> bool {
        matches!(self, TypeId::NUMBER | TypeId::STRING | TypeId::BOOLEAN)
    }

    /// `null`, `undefined` and `void`.
    #[inline]
    pub fn is_nullish(self) -> bool {
        matches!(self, TypeId::NULL | TypeId::UNDEFINED | TypeId::VOID)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParamId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecializationId(pub u32);

/// Index of a diagnostic in the resolver's diagnostic list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticId(pub u32);

// =============================================================================
// TypeData
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Number,
    String,
    Boolean,
    Void,
    Null,
    Undefined,
}

impl IntrinsicKind {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Undefined => "undefined",
        }
    }
}

/// The closed set of type shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    StringLiteral(Atom),
    /// Interface or anonymous structural type.
    Object(ShapeId),
    /// Class instance type.
    Class(ShapeId),
    /// Function or constructor type: a shape with call and/or construct signatures.
    Function(ShapeId),
    Array(TypeId),
    /// Unspecialized interface or class declaring type parameters.
    Generic(ShapeId),
    /// A generic root applied to concrete arguments.
    Specialized(SpecializationId),
    TypeParameter(TypeParamId),
    /// Enum type, identified by its declaring symbol.
    Enum(SymbolId),
    /// Forwards to another type.
    Alias(TypeId),
    /// Produced by a failed resolution; related to everything.
    Error(Option<DiagnosticId>),
}

impl TypeData {
    /// Shape-backed variants (everything except `Specialized`, which is materialized lazily).
    #[inline]
    pub fn direct_shape(self) -> Option<ShapeId> {
        match self {
            TypeData::Object(s) | TypeData::Class(s) | TypeData::Function(s) | TypeData::Generic(s) => {
                Some(s)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Shapes
// =============================================================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShapeFlags: u16 {
        /// Type literal, object literal or function type: substituted eagerly.
        const ANONYMOUS = 1 << 0;
        const CLASS = 1 << 1;
        /// Constructor (static side) of a class.
        const CONSTRUCTOR = 1 << 2;
        /// Allocated but members not yet filled in.
        const PENDING = 1 << 3;
        const ENUM_CONTAINER = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub visibility: Visibility,
    /// Symbol of the declaring container.
    pub parent_id: Option<SymbolId>,
    /// First declaration of the member. Private members only relate when this matches.
    pub declaration: Option<DeclId>,
}

impl PropertyInfo {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        PropertyInfo {
            name,
            type_id,
            optional: false,
            visibility: Visibility::Public,
            parent_id: None,
            declaration: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    Call,
    Construct,
    Index,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectShape {
    pub flags: ShapeFlags,
    pub symbol: Option<SymbolId>,
    pub name: Atom,
    /// Own type parameters (each a `TypeData::TypeParameter`).
    pub type_params: Vec<TypeId>,
    pub members: Vec<PropertyInfo>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
    pub index_signatures: Vec<SignatureId>,
    /// Ordered `extends`/`implements` list.
    pub base_types: Vec<TypeId>,
}

impl ObjectShape {
    pub fn anonymous() -> Self {
        ObjectShape {
            flags: ShapeFlags::ANONYMOUS,
            ..ObjectShape::default()
        }
    }

    pub fn named(name: Atom, symbol: Option<SymbolId>) -> Self {
        ObjectShape {
            name,
            symbol,
            ..ObjectShape::default()
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.flags.contains(ShapeFlags::PENDING)
    }
}

/// Structural capabilities shared by every shape-backed type.
pub trait StructuralView {
    fn members(&self) -> &[PropertyInfo];
    fn signatures(&self, kind: SignatureKind) -> &[SignatureId];

    fn find_member(&self, name: Atom) -> Option<&PropertyInfo> {
        self.members().iter().find(|m| m.name == name)
    }

    fn has_members(&self) -> bool {
        !self.members().is_empty()
    }

    fn has_call_or_construct_signatures(&self) -> bool {
        !self.signatures(SignatureKind::Call).is_empty()
            || !self.signatures(SignatureKind::Construct).is_empty()
    }
}

impl StructuralView for ObjectShape {
    fn members(&self) -> &[PropertyInfo] {
        &self.members
    }

    fn signatures(&self, kind: SignatureKind) -> &[SignatureId] {
        match kind {
            SignatureKind::Call => &self.call_signatures,
            SignatureKind::Construct => &self.construct_signatures,
            SignatureKind::Index => &self.index_signatures,
        }
    }
}

// =============================================================================
// Signatures
// =============================================================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SignatureFlags: u8 {
        const GENERIC = 1 << 0;
        const HAS_VARARGS = 1 << 1;
        /// Implementation signature of an overloaded function.
        const DEFINITION = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    /// Rest parameter; its type is an array whose element type binds surplus arguments.
    pub rest: bool,
}

impl ParamInfo {
    pub fn required(name: Atom, type_id: TypeId) -> Self {
        ParamInfo {
            name,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub type_params: SmallVec<[TypeId; 2]>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub flags: SignatureFlags,
    pub non_optional_param_count: usize,
    pub declaration: Option<DeclId>,
}

impl Signature {
    /// Build a signature, deriving flags and the required-parameter count.
    pub fn new(
        type_params: SmallVec<[TypeId; 2]>,
        params: Vec<ParamInfo>,
        return_type: TypeId,
        declaration: Option<DeclId>,
    ) -> Self {
        let mut flags = SignatureFlags::empty();
        if !type_params.is_empty() {
            flags |= SignatureFlags::GENERIC;
        }
        if params.last().is_some_and(|p| p.rest) {
            flags |= SignatureFlags::HAS_VARARGS;
        }
        let non_optional_param_count = params
            .iter()
            .take_while(|p| !p.optional && !p.rest)
            .count();
        Signature {
            type_params,
            params,
            return_type,
            flags,
            non_optional_param_count,
            declaration,
        }
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        self.flags.contains(SignatureFlags::GENERIC)
    }

    #[inline]
    pub fn has_varargs(&self) -> bool {
        self.flags.contains(SignatureFlags::HAS_VARARGS)
    }

    /// Whether `count` arguments fit this signature's arity.
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.non_optional_param_count && (self.has_varargs() || count <= self.params.len())
    }
}

// =============================================================================
// Type parameters
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    /// Filled in once the constraint has been resolved.
    pub constraint: Option<TypeId>,
    pub declaration: Option<DeclId>,
}
