//! Rendering types as source-like text for diagnostics.

use crate::store::TypeStore;
use crate::types::{ObjectShape, ShapeFlags, SignatureId, TypeData, TypeId};
use strux_binder::Binder;
use strux_common::Atom;

/// Nesting depth past which anonymous shapes print as `{ ... }`.
const MAX_FORMAT_DEPTH: u32 = 4;

pub struct TypeFormatter<'a> {
    store: &'a TypeStore,
    binder: &'a Binder,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(store: &'a TypeStore, binder: &'a Binder) -> Self {
        TypeFormatter { store, binder }
    }

    #[inline]
    pub fn name(&self, atom: Atom) -> &'a str {
        self.binder.name(atom)
    }

    pub fn format(&self, type_id: TypeId) -> String {
        self.format_at(type_id, 0)
    }

    pub fn format_signature(&self, signature: SignatureId) -> String {
        self.signature_text(signature, ": ", 0)
    }

    fn format_at(&self, type_id: TypeId, depth: u32) -> String {
        match self.store.lookup(type_id) {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Error(_) => "error".to_string(),
            TypeData::StringLiteral(value) => format!("\"{}\"", self.name(value)),
            TypeData::Array(element) => {
                let inner = self.format_at(element, depth);
                if matches!(self.store.lookup(element), TypeData::Function(_)) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::Alias(target) => self.format_at(target, depth),
            TypeData::Enum(symbol) => self.binder.symbol_name(symbol).to_string(),
            TypeData::TypeParameter(_) => self
                .store
                .type_param_info(type_id)
                .map(|info| self.name(info.name).to_string())
                .unwrap_or_default(),
            TypeData::Specialized(spec) => match self.store.specialization(spec) {
                Some(key) => {
                    let root = self.root_name(key.root);
                    let args: Vec<String> = key.args.iter().map(|&a| self.format_at(a, depth + 1)).collect();
                    format!("{root}<{}>", args.join(", "))
                }
                None => "error".to_string(),
            },
            TypeData::Generic(shape) => {
                let shape = self.store.shape(shape);
                let params: Vec<String> = shape.type_params.iter().map(|&p| self.format_at(p, depth + 1)).collect();
                format!("{}<{}>", self.name(shape.name), params.join(", "))
            }
            TypeData::Object(shape) | TypeData::Class(shape) | TypeData::Function(shape) => {
                let shape = self.store.shape(shape);
                if shape.flags.contains(ShapeFlags::ANONYMOUS) || shape.name.is_none() {
                    self.anonymous_text(&shape, depth)
                } else if shape.flags.contains(ShapeFlags::CONSTRUCTOR) {
                    format!("typeof {}", self.name(shape.name))
                } else {
                    self.name(shape.name).to_string()
                }
            }
        }
    }

    fn root_name(&self, root: TypeId) -> String {
        match self.store.shape_of(root) {
            Some(shape) => self.name(shape.name).to_string(),
            None => self.format(root),
        }
    }

    fn anonymous_text(&self, shape: &ObjectShape, depth: u32) -> String {
        if depth >= MAX_FORMAT_DEPTH {
            return "{ ... }".to_string();
        }
        let only_call = shape.members.is_empty()
            && shape.construct_signatures.is_empty()
            && shape.index_signatures.is_empty()
            && shape.call_signatures.len() == 1;
        if only_call {
            return self.signature_text(shape.call_signatures[0], " => ", depth + 1);
        }
        let only_construct = shape.members.is_empty()
            && shape.call_signatures.is_empty()
            && shape.index_signatures.is_empty()
            && shape.construct_signatures.len() == 1;
        if only_construct {
            return format!(
                "new {}",
                self.signature_text(shape.construct_signatures[0], " => ", depth + 1)
            );
        }
        let mut parts = Vec::new();
        for member in &shape.members {
            let optional = if member.optional { "?" } else { "" };
            parts.push(format!(
                "{}{optional}: {};",
                self.name(member.name),
                self.format_at(member.type_id, depth + 1)
            ));
        }
        for &sig in &shape.call_signatures {
            parts.push(format!("{};", self.signature_text(sig, ": ", depth + 1)));
        }
        for &sig in &shape.construct_signatures {
            parts.push(format!("new {};", self.signature_text(sig, ": ", depth + 1)));
        }
        for &sig in &shape.index_signatures {
            let sig = self.store.signature(sig);
            let key = sig
                .params
                .first()
                .map(|p| format!("{}: {}", self.name(p.name), self.format_at(p.type_id, depth + 1)))
                .unwrap_or_default();
            parts.push(format!("[{key}]: {};", self.format_at(sig.return_type, depth + 1)));
        }
        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join(" "))
        }
    }

    fn signature_text(&self, signature: SignatureId, arrow: &str, depth: u32) -> String {
        let sig = self.store.signature(signature);
        let type_params = if sig.type_params.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = sig.type_params.iter().map(|&p| self.format_at(p, depth)).collect();
            format!("<{}>", names.join(", "))
        };
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|p| {
                let rest = if p.rest { "..." } else { "" };
                let optional = if p.optional { "?" } else { "" };
                format!("{rest}{}{optional}: {}", self.name(p.name), self.format_at(p.type_id, depth))
            })
            .collect();
        format!(
            "{type_params}({}){arrow}{}",
            params.join(", "),
            self.format_at(sig.return_type, depth)
        )
    }
}

