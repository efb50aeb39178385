//! Lexical name lookup over the declaration graph.

use crate::builder::Binder;
use crate::ids::{DeclId, SymbolId};
use crate::symbols::{Meaning, SymbolFlags};
use strux_common::Atom;
use tracing::trace;

impl Binder {
    /// Find `name` under `meaning`, starting in the scope of `context` and walking
    /// outward to the global scope. Aliases match every meaning; callers follow them.
    pub fn lookup(&self, name: Atom, context: DeclId, meaning: Meaning) -> Option<SymbolId> {
        let wanted = meaning.flags() | SymbolFlags::ALIAS;
        let mut current = Some(context);
        while let Some(decl_id) = current {
            let decl = self.declaration(decl_id);
            if let Some(&symbol) = decl.locals.get(&name) {
                if self.symbol(symbol).has_any_flags(wanted) {
                    trace!(name = self.name(name), ?meaning, symbol = symbol.0, "lookup hit");
                    return Some(symbol);
                }
            }
            current = decl.parent;
        }
        None
    }

    /// Look up a name declared in the global scope.
    pub fn lookup_global(&self, name: &str, meaning: Meaning) -> Option<SymbolId> {
        let atom = self.interner().lookup(name)?;
        self.lookup(atom, DeclId::GLOBAL, meaning)
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
