//! Symbols and symbol flags.

use crate::ids::{DeclId, SymbolId};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strux_common::Atom;

bitflags! {
    /// What a symbol declares. A merged symbol carries the union of its declarations' flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u32 {
        const VARIABLE = 1 << 0;
        const PARAMETER = 1 << 1;
        const PROPERTY = 1 << 2;
        const FUNCTION = 1 << 3;
        const METHOD = 1 << 4;
        const CLASS = 1 << 5;
        const INTERFACE = 1 << 6;
        const ENUM = 1 << 7;
        const ENUM_MEMBER = 1 << 8;
        const TYPE_PARAMETER = 1 << 9;
        const ALIAS = 1 << 10;
        const CONSTRUCTOR = 1 << 11;
        const STATIC = 1 << 12;

        const VALUE = Self::VARIABLE.bits()
            | Self::PARAMETER.bits()
            | Self::PROPERTY.bits()
            | Self::FUNCTION.bits()
            | Self::METHOD.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM.bits()
            | Self::TYPE_PARAMETER.bits();
        const CONTAINER = Self::CLASS.bits() | Self::ENUM.bits();
    }
}

/// The meaning a name is looked up under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meaning {
    Value,
    Type,
    /// A symbol whose exports can be accessed with `.` (enums, classes for statics).
    Container,
}

impl Meaning {
    #[inline]
    pub fn flags(self) -> SymbolFlags {
        match self {
            Meaning::Value => SymbolFlags::VALUE,
            Meaning::Type => SymbolFlags::TYPE,
            Meaning::Container => SymbolFlags::CONTAINER,
        }
    }
}

/// A named entity with one or more declarations.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Atom,
    pub flags: SymbolFlags,
    pub declarations: SmallVec<[DeclId; 1]>,
    /// Enclosing container symbol (class for members, enum for enum members).
    pub parent: Option<SymbolId>,
    /// Instance members (classes and interfaces), in declaration order.
    pub members: Vec<SymbolId>,
    /// Static members and enum members, in declaration order.
    pub exports: Vec<SymbolId>,
    member_index: FxHashMap<Atom, SymbolId>,
    export_index: FxHashMap<Atom, SymbolId>,
}

impl Symbol {
    pub(crate) fn new(name: Atom, flags: SymbolFlags, parent: Option<SymbolId>) -> Self {
        Symbol {
            name,
            flags,
            declarations: SmallVec::new(),
            parent,
            members: Vec::new(),
            exports: Vec::new(),
            member_index: FxHashMap::default(),
            export_index: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn has_any_flags(&self, flags: SymbolFlags) -> bool {
        self.flags.intersects(flags)
    }

    /// Look up an instance member by name.
    #[inline]
    pub fn member(&self, name: Atom) -> Option<SymbolId> {
        self.member_index.get(&name).copied()
    }

    /// Look up a static member or enum member by name.
    #[inline]
    pub fn export(&self, name: Atom) -> Option<SymbolId> {
        self.export_index.get(&name).copied()
    }

    pub(crate) fn add_member(&mut self, name: Atom, id: SymbolId) {
        if self.member_index.insert(name, id).is_none() {
            self.members.push(id);
        }
    }

    pub(crate) fn add_export(&mut self, name: Atom, id: SymbolId) {
        if self.export_index.insert(name, id).is_none() {
            self.exports.push(id);
        }
    }
}
