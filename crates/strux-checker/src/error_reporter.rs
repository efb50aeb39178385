//! Diagnostic emission.
//!
//! Every diagnostic goes through [`Checker::post_error`]. Inside a provisional
//! probe the diagnostic is diverted to the probe's discard buffer and counted
//! as a soft error; otherwise it is appended to the unit's diagnostics,
//! deduplicated by `(start, code)`.

use crate::context::Checker;
use strux_binder::NodeIndex;
use strux_common::Diagnostic;
use strux_solver::{ComparisonInfo, DiagnosticId, RelationFailure, TypeFormatter, TypeId};
use tracing::trace;

impl<'a> Checker<'a> {
    /// Report `code` at `location` with the catalogue template filled from `args`.
    pub fn post_error(&mut self, location: NodeIndex, code: u32, args: &[&str]) -> DiagnosticId {
        self.post_error_with_detail(location, code, args, None)
    }

    /// Like [`post_error`](Self::post_error), with the rendered comparison detail
    /// appended below the headline.
    pub fn post_error_with_detail(
        &mut self,
        location: NodeIndex,
        code: u32,
        args: &[&str],
        detail: Option<&ComparisonInfo>,
    ) -> DiagnosticId {
        let span = self.binder.span(location);
        let mut diagnostic =
            Diagnostic::from_code(self.options.file_name.clone(), span.start, span.len(), code, args);
        if let Some(info) = detail {
            let rendered = info.render(&self.formatter());
            diagnostic = diagnostic.with_elaboration(&rendered);
        }
        self.push_diagnostic(diagnostic)
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) -> DiagnosticId {
        let id = DiagnosticId(self.diagnostic_count);
        self.diagnostic_count += 1;
        if self.provisional.is_active() {
            trace!(code = diagnostic.code, "diagnostic discarded by provisional probe");
            self.provisional.discard(diagnostic);
            return id;
        }
        if self.emitted.insert((diagnostic.start, diagnostic.code)) {
            trace!(code = diagnostic.code, start = diagnostic.start, "diagnostic");
            self.diagnostics.push(diagnostic);
        }
        id
    }

    /// An `Error` type carrying the diagnostic that produced it.
    pub(crate) fn error_at(&mut self, location: NodeIndex, code: u32, args: &[&str]) -> TypeId {
        let id = self.post_error(location, code, args);
        self.types.error_type(Some(id))
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    pub fn formatter(&self) -> TypeFormatter<'_> {
        TypeFormatter::new(&self.types, self.binder)
    }

    pub fn format_type(&self, type_id: TypeId) -> String {
        self.formatter().format(type_id)
    }

    /// Wrap an existing failure one level below `failure`.
    pub(crate) fn nest_failure(failure: RelationFailure, info: ComparisonInfo) -> ComparisonInfo {
        let failure = match failure {
            RelationFailure::PropertyTypeMismatch {
                property,
                source,
                target,
                ..
            } => RelationFailure::PropertyTypeMismatch {
                property,
                source,
                target,
                nested: info.failure.map(Box::new),
            },
            other => other,
        };
        ComparisonInfo {
            failure: Some(failure),
        }
    }
}
