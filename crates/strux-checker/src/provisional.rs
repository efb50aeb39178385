//! Provisional probes.
//!
//! Overload resolution and type-argument inference type context-sensitive
//! arguments (function, object and array literals) against candidate
//! parameter types before a winner is known. Such a probe must leave no trace:
//!
//! - symbols first resolved during the probe go back to `Unresolved`
//! - diagnostics raised during it are discarded and counted as soft errors
//! - deferred checks queued during it are dropped
//! - under [`ProvisionalPolicy::Snapshot`] node associations written during it
//!   are rolled back from a journal
//!
//! Probes nest; each one undoes only what happened inside it.

use crate::context::{Checker, ProvisionalPolicy};
use strux_binder::{NodeIndex, SymbolId};
use strux_common::Diagnostic;
use strux_solver::TypeId;
use tracing::trace;

/// A node association overwritten during a probe, with its previous value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum JournalEntry {
    NodeType(NodeIndex, Option<TypeId>),
    NodeSymbol(NodeIndex, Option<SymbolId>),
}

#[derive(Debug, Default)]
pub(crate) struct ProvisionalState {
    depth: u32,
    /// Symbols whose resolution started inside an open probe.
    resolved: Vec<SymbolId>,
    journal: Vec<JournalEntry>,
    discarded: Vec<Diagnostic>,
    soft_errors: u32,
}

impl ProvisionalState {
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn discard(&mut self, diagnostic: Diagnostic) {
        self.discarded.push(diagnostic);
        self.soft_errors += 1;
    }

    pub(crate) fn note_resolved(&mut self, symbol: SymbolId) {
        if self.is_active() {
            self.resolved.push(symbol);
        }
    }
}

/// Where a probe started, so that it can be unwound.
struct ProbeMarks {
    resolved: usize,
    journal: usize,
    deferred: usize,
    soft_errors: u32,
}

impl<'a> Checker<'a> {
    /// Whether a provisional probe is open.
    pub fn is_provisional(&self) -> bool {
        self.provisional.is_active()
    }

    /// Run `f` as a provisional probe. Returns its result and the number of
    /// diagnostics raised inside it.
    pub fn provisionally<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> (R, u32) {
        let marks = ProbeMarks {
            resolved: self.provisional.resolved.len(),
            journal: self.provisional.journal.len(),
            deferred: self.deferred.len(),
            soft_errors: self.provisional.soft_errors,
        };
        self.provisional.depth += 1;
        let result = f(self);
        self.provisional.depth -= 1;
        let soft_errors = self.provisional.soft_errors - marks.soft_errors;
        self.unwind_probe(marks);
        trace!(soft_errors, depth = self.provisional.depth, "probe closed");
        (result, soft_errors)
    }

    fn unwind_probe(&mut self, marks: ProbeMarks) {
        let invalidated: Vec<SymbolId> = self.provisional.resolved.drain(marks.resolved..).collect();
        for symbol in invalidated {
            self.links.remove(&symbol);
        }
        let entries: Vec<JournalEntry> = self.provisional.journal.drain(marks.journal..).collect();
        if self.options.provisional_policy == ProvisionalPolicy::Snapshot {
            for entry in entries.into_iter().rev() {
                match entry {
                    JournalEntry::NodeType(node, Some(previous)) => {
                        self.node_types.insert(node, previous);
                    }
                    JournalEntry::NodeType(node, None) => {
                        self.node_types.remove(&node);
                    }
                    JournalEntry::NodeSymbol(node, Some(previous)) => {
                        self.node_symbols.insert(node, previous);
                    }
                    JournalEntry::NodeSymbol(node, None) => {
                        self.node_symbols.remove(&node);
                    }
                }
            }
        }
        self.deferred.truncate(marks.deferred);
        if !self.provisional.is_active() {
            self.provisional.discarded.clear();
            self.provisional.soft_errors = 0;
        }
    }

    // =========================================================================
    // Journaled node associations
    // =========================================================================

    pub(crate) fn record_node_type(&mut self, node: NodeIndex, type_id: TypeId) {
        let previous = self.node_types.insert(node, type_id);
        if self.journaling() {
            self.provisional.journal.push(JournalEntry::NodeType(node, previous));
        }
    }

    pub(crate) fn record_node_symbol(&mut self, node: NodeIndex, symbol: SymbolId) {
        let previous = self.node_symbols.insert(node, symbol);
        if self.journaling() {
            self.provisional.journal.push(JournalEntry::NodeSymbol(node, previous));
        }
    }

    #[inline]
    fn journaling(&self) -> bool {
        self.provisional.is_active() && self.options.provisional_policy == ProvisionalPolicy::Snapshot
    }
}
