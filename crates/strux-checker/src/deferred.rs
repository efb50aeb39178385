//! Deferred checks and the unit driver.
//!
//! Some checks compare types that may still be under construction when they
//! are discovered: a base type met while its derived interface is being
//! resolved, or the constraints of a type reference inside a cyclic
//! declaration. These are queued and run by [`Checker::check_unit`] once every
//! symbol has been resolved.

use crate::context::{Checker, ResolutionState, UnitReport};
use strux_binder::{DeclId, DeclKind, NodeIndex, SymbolId};
use strux_common::diagnostics::diagnostic_codes;
use strux_solver::{ComparisonInfo, RelationFailure, TypeData, TypeId, check_constraints};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseKind {
    InterfaceExtends,
    ClassExtends,
    ClassImplements,
}

impl BaseKind {
    fn code(self) -> u32 {
        match self {
            BaseKind::InterfaceExtends => diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS_INTERFACE,
            BaseKind::ClassExtends => diagnostic_codes::CLASS_INCORRECTLY_EXTENDS_BASE_CLASS,
            BaseKind::ClassImplements => diagnostic_codes::CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum DeferredCheck {
    /// `derived` against one of its `extends`/`implements` entries.
    BaseType {
        kind: BaseKind,
        derived: TypeId,
        base: TypeId,
        node: NodeIndex,
    },
    /// An initializer against its variable's annotation.
    Initializer {
        expr: NodeIndex,
        scope: DeclId,
        target: TypeId,
    },
    /// Type arguments of a generic reference against their constraints.
    Constraints {
        root: TypeId,
        args: Vec<TypeId>,
        node: NodeIndex,
    },
}

impl<'a> Checker<'a> {
    /// Resolve every symbol of the unit, run the deferred checks and hand the
    /// diagnostics to the caller.
    pub fn check_unit(&mut self) -> UnitReport {
        let binder = self.binder;
        for index in 0..binder.symbol_count() {
            let symbol = SymbolId(index as u32);
            if self.declared_in_function_expression(symbol) {
                continue;
            }
            self.resolve_symbol(symbol);
        }
        self.drain_deferred();

        let symbols_resolved = self
            .links
            .values()
            .filter(|links| links.state == ResolutionState::Resolved)
            .count();
        let report = UnitReport {
            diagnostics: std::mem::take(&mut self.diagnostics),
            symbols_resolved,
            specializations: self.types.specialization_count(),
            scratch_high_water: self.scratch.high_water(),
        };
        debug!(
            diagnostics = report.diagnostics.len(),
            symbols = report.symbols_resolved,
            specializations = report.specializations,
            "unit checked"
        );
        report
    }

    /// Parameters and locals of function expressions are only typed against
    /// the contextual type of their expression.
    fn declared_in_function_expression(&self, symbol: SymbolId) -> bool {
        let binder = self.binder;
        let Some(&decl) = binder.get_symbol(symbol).and_then(|s| s.declarations.first()) else {
            return false;
        };
        let mut current = binder.declaration(decl).parent;
        while let Some(parent) = current {
            let parent_decl = binder.declaration(parent);
            if parent_decl.kind == DeclKind::FunctionExpression {
                return true;
            }
            current = parent_decl.parent;
        }
        false
    }

    /// Run queued checks until none are left; checks may queue more.
    pub(crate) fn drain_deferred(&mut self) {
        loop {
            let batch = std::mem::take(&mut self.deferred);
            if batch.is_empty() {
                break;
            }
            trace!(count = batch.len(), "running deferred checks");
            for check in batch {
                self.run_deferred(check);
            }
        }
    }

    fn run_deferred(&mut self, check: DeferredCheck) {
        match check {
            DeferredCheck::BaseType {
                kind: BaseKind::ClassImplements,
                derived,
                base,
                node,
            } => self.check_implements(derived, base, node),
            DeferredCheck::BaseType {
                kind,
                derived,
                base,
                node,
            } => self.check_inherited_members(kind, derived, base, node),
            DeferredCheck::Initializer { expr, scope, target } => self.check_initializer(expr, scope, target),
            DeferredCheck::Constraints { root, args, node } => self.check_type_arguments(root, &args, node),
        }
    }

    /// Every member `derived` redeclares must be assignable to the inherited one.
    fn check_inherited_members(&mut self, kind: BaseKind, derived: TypeId, base: TypeId, node: NodeIndex) {
        let Some(own) = self.types.shape_of(derived) else {
            return;
        };
        for inherited in self.types.properties_of(base) {
            let Some(member) = own.members.iter().find(|m| m.name == inherited.name) else {
                continue;
            };
            let mut info = ComparisonInfo::new();
            if self.assignable(member.type_id, inherited.type_id, Some(&mut info)) {
                continue;
            }
            let detail = Self::nest_failure(
                RelationFailure::PropertyTypeMismatch {
                    property: inherited.name,
                    source: derived,
                    target: base,
                    nested: None,
                },
                info,
            );
            self.report_base_failure(kind, derived, base, node, &detail);
            return;
        }
    }

    fn check_implements(&mut self, derived: TypeId, contract: TypeId, node: NodeIndex) {
        let mut info = ComparisonInfo::new();
        if !self.assignable(derived, contract, Some(&mut info)) {
            self.report_base_failure(BaseKind::ClassImplements, derived, contract, node, &info);
        }
    }

    fn report_base_failure(&mut self, kind: BaseKind, derived: TypeId, base: TypeId, node: NodeIndex, detail: &ComparisonInfo) {
        let derived_text = self.format_type(derived);
        let base_text = self.format_type(base);
        debug!(?kind, derived = %derived_text, base = %base_text, "incompatible base type");
        self.post_error_with_detail(node, kind.code(), &[&derived_text, &base_text], Some(detail));
    }

    fn check_initializer(&mut self, expr: NodeIndex, scope: DeclId, target: TypeId) {
        let ty = self.with_contextual_type(Some(target), |c| c.type_of_expression(expr, scope));
        let mut info = ComparisonInfo::new();
        if self.assignable(ty, target, Some(&mut info)) {
            return;
        }
        let source_text = self.format_type(ty);
        let target_text = self.format_type(target);
        let detail = info.has_failure().then_some(&info);
        self.post_error_with_detail(
            expr,
            diagnostic_codes::CANNOT_CONVERT,
            &[&source_text, &target_text],
            detail,
        );
    }

    fn check_type_arguments(&mut self, root: TypeId, args: &[TypeId], node: NodeIndex) {
        let TypeData::Generic(shape) = self.types.lookup(root) else {
            return;
        };
        let params = self.types.shape(shape).type_params.clone();
        let violations = check_constraints(&self.types, &mut self.relation_cache, &params, args);
        for violation in violations {
            let argument = self.format_type(violation.argument);
            let constraint = self.format_type(violation.constraint);
            let name = self
                .types
                .type_param_info(violation.type_param)
                .map(|info| self.binder.name(info.name).to_string())
                .unwrap_or_default();
            self.post_error(
                node,
                diagnostic_codes::TYPE_DOES_NOT_SATISFY_THE_CONSTRAINT,
                &[&argument, &constraint, &name],
            );
        }
    }
}
