//! Overload resolution and type-argument inference for call, `new` and index sites.
//!
//! Resolution runs in four steps over the candidate signatures:
//!
//! 1. generic filtering: explicit type arguments or inference, then constraints
//! 2. arity and a left-to-right applicability scan that sorts survivors into
//!    exact and convertible candidates
//! 3. selection among the exact candidates, else the convertible ones
//! 4. pairwise tie-break, with an ambiguity check on the final contenders
//!
//! Context-sensitive arguments (function, object and array literals) take their
//! type from the parameter they are checked against, so during steps 1 and 2
//! they are only ever typed inside a provisional probe. Once a winner is known
//! they are typed for real against its parameters.

use crate::context::Checker;
use smallvec::SmallVec;
use strux_binder::{DeclId, Node, NodeIndex};
use strux_common::diagnostics::diagnostic_codes;
use strux_solver::{
    ComparisonInfo, InferenceContext, InferenceError, OverloadCandidate, ResolutionScratch, SignatureId,
    TypeId, TypeSubstitution, check_constraints, common_supertype, instantiate_generic_signature,
    instantiate_type, param_type_at,
};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteKind {
    Call,
    New,
    Index,
}

/// The expression an overload set is resolved for.
#[derive(Clone, Copy, Debug)]
pub struct CallSite {
    pub node: NodeIndex,
    /// Scope the arguments are typed in.
    pub scope: DeclId,
    pub kind: SiteKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverloadResult {
    /// The selected (instantiated) signature; `None` when nothing applied.
    pub signature: Option<SignatureId>,
    pub return_type: TypeId,
    /// The winner tied with another candidate whose return type shares no
    /// common type with its own.
    pub ambiguous: bool,
}

enum Applicability {
    Applicable { exact: bool, had_provisional_errors: bool },
    /// First argument that did not fit.
    Inapplicable { index: usize },
}

enum Preference {
    Best,
    Challenger,
    Undecided,
}

/// Per-site argument facts shared by every candidate.
struct SiteArgs<'n> {
    /// Where site-level diagnostics go.
    node: NodeIndex,
    nodes: &'n [NodeIndex],
    /// Types of the context-free arguments; context-sensitive slots hold `any`.
    types: &'n [TypeId],
    sensitive: SmallVec<[bool; 8]>,
    scope: DeclId,
}

impl SiteArgs<'_> {
    fn is_sensitive(&self, index: usize) -> bool {
        self.sensitive.get(index).copied().unwrap_or(false)
    }

    fn known_type(&self, index: usize) -> TypeId {
        self.types.get(index).copied().unwrap_or(TypeId::ANY)
    }
}

impl<'a> Checker<'a> {
    // =========================================================================
    // Overload resolution
    // =========================================================================

    /// Select the signature of `candidates` that `args` apply to.
    pub fn resolve_overload(
        &mut self,
        candidates: &[SignatureId],
        args: &[NodeIndex],
        explicit_type_args: &[TypeId],
        site: CallSite,
    ) -> OverloadResult {
        self.with_scratch(|checker, scratch| {
            checker.resolve_overload_in(scratch, candidates, args, explicit_type_args, site)
        })
    }

    /// Run `f` with a scratch slot; the slot goes back to the pool on every path.
    fn with_scratch<R>(&mut self, f: impl FnOnce(&mut Self, &mut ResolutionScratch) -> R) -> R {
        let mut scratch = self.scratch.acquire();
        let result = f(self, &mut scratch);
        self.scratch.release(scratch);
        result
    }

    fn resolve_overload_in(
        &mut self,
        scratch: &mut ResolutionScratch,
        candidates: &[SignatureId],
        args: &[NodeIndex],
        explicit_type_args: &[TypeId],
        site: CallSite,
    ) -> OverloadResult {
        let binder = self.binder;
        let sensitive: SmallVec<[bool; 8]> = args
            .iter()
            .map(|&arg| binder.node(arg).is_context_sensitive())
            .collect();
        for (index, &arg) in args.iter().enumerate() {
            let ty = if sensitive[index] {
                TypeId::ANY
            } else {
                self.with_contextual_type(None, |c| c.type_of_expression(arg, site.scope))
            };
            scratch.arg_types.push(ty);
        }
        let site_args = SiteArgs {
            node: site.node,
            nodes: args,
            types: &scratch.arg_types,
            sensitive,
            scope: site.scope,
        };

        if !explicit_type_args.is_empty()
            && !candidates
                .iter()
                .any(|&sig| self.types.signature(sig).type_params.len() == explicit_type_args.len())
        {
            let expected = candidates
                .iter()
                .map(|&sig| self.types.signature(sig).type_params.len())
                .find(|&n| n > 0)
                .unwrap_or(0)
                .to_string();
            let got = explicit_type_args.len().to_string();
            let error = self.error_at(site.node, diagnostic_codes::EXPECTED_TYPE_ARGUMENTS, &[&expected, &got]);
            self.type_remaining_arguments(&site_args, None);
            return OverloadResult {
                signature: None,
                return_type: error,
                ambiguous: false,
            };
        }

        let mut first_failure: Option<(SignatureId, Option<usize>)> = None;

        for &original in candidates {
            let sig = self.types.signature(original);
            if !sig.accepts_arity(args.len()) {
                first_failure.get_or_insert((original, None));
                continue;
            }
            let (signature, from_generic) = if sig.is_generic() || !explicit_type_args.is_empty() {
                match self.instantiate_candidate(original, &site_args, explicit_type_args) {
                    Some(instantiated) => (instantiated, true),
                    None => {
                        first_failure.get_or_insert((original, None));
                        continue;
                    }
                }
            } else {
                (original, false)
            };
            match self.applicability(signature, &site_args) {
                Applicability::Applicable {
                    exact: is_exact,
                    had_provisional_errors,
                } => {
                    let mut candidate = OverloadCandidate::new(signature, from_generic);
                    candidate.had_provisional_errors = had_provisional_errors;
                    if is_exact {
                        scratch.exact.push(candidate);
                    } else {
                        scratch.convertible.push(candidate);
                    }
                }
                Applicability::Inapplicable { index } => {
                    first_failure.get_or_insert((signature, Some(index)));
                }
            }
        }
        trace!(
            exact = scratch.exact.len(),
            convertible = scratch.convertible.len(),
            "overload candidates classified"
        );

        let pool = if scratch.exact.is_empty() {
            &scratch.convertible
        } else {
            &scratch.exact
        };
        match pool.split_first() {
            Some((&first, rest)) => {
                let (best, ambiguous) = self.select_best(first, rest, &site_args);
                self.type_remaining_arguments(&site_args, Some(best.signature));
                let return_type = self.types.signature(best.signature).return_type;
                debug!(signature = best.signature.0, ret = return_type.0, ambiguous, "overload selected");
                OverloadResult {
                    signature: Some(best.signature),
                    return_type,
                    ambiguous,
                }
            }
            None => {
                let error = self.report_overload_mismatch(site.node, first_failure, &site_args);
                self.type_remaining_arguments(&site_args, None);
                OverloadResult {
                    signature: None,
                    return_type: error,
                    ambiguous: false,
                }
            }
        }
    }

    /// Explicit type arguments or inferred ones, checked against constraints.
    fn instantiate_candidate(
        &mut self,
        signature: SignatureId,
        args: &SiteArgs<'_>,
        explicit_type_args: &[TypeId],
    ) -> Option<SignatureId> {
        let sig = self.types.signature(signature);
        let type_args = if explicit_type_args.is_empty() {
            match self.infer_from_arguments(signature, args) {
                Ok(inferred) => inferred,
                Err(InferenceError::Unfit { type_param, .. }) => {
                    debug!(signature = signature.0, type_param = type_param.0, "candidate dropped, inference unfit");
                    return None;
                }
            }
        } else if explicit_type_args.len() == sig.type_params.len() {
            explicit_type_args.to_vec()
        } else {
            return None;
        };
        let violations = check_constraints(&self.types, &mut self.relation_cache, &sig.type_params, &type_args);
        if !violations.is_empty() {
            debug!(signature = signature.0, violations = violations.len(), "candidate dropped, constraints violated");
            return None;
        }
        Some(instantiate_generic_signature(&self.types, signature, &type_args))
    }

    /// One left-to-right scan: exact when every argument is identical to its
    /// parameter (or a matching string literal), convertible when assignable.
    fn applicability(&mut self, signature: SignatureId, args: &SiteArgs<'_>) -> Applicability {
        let sig = self.types.signature(signature);
        let mut exact = true;
        let mut had_provisional_errors = false;
        for (index, &arg) in args.nodes.iter().enumerate() {
            let Some(param) = param_type_at(&self.types, &sig, index) else {
                return Applicability::Inapplicable { index };
            };
            if args.is_sensitive(index) {
                let (arg_ty, soft_errors) = self.probe_argument(arg, param, args.scope);
                if !self.assignable(arg_ty, param, None) {
                    return Applicability::Inapplicable { index };
                }
                had_provisional_errors |= soft_errors > 0;
                exact &= self.identical(arg_ty, param, None);
                continue;
            }
            if self.is_literal_match(arg, param) {
                continue;
            }
            let arg_ty = args.known_type(index);
            if self.identical(arg_ty, param, None) {
                continue;
            }
            exact = false;
            if !self.assignable(arg_ty, param, None) {
                return Applicability::Inapplicable { index };
            }
        }
        Applicability::Applicable {
            exact,
            had_provisional_errors,
        }
    }

    /// Type a context-sensitive argument against `param` without leaving a trace.
    fn probe_argument(&mut self, arg: NodeIndex, param: TypeId, scope: DeclId) -> (TypeId, u32) {
        self.provisionally(|c| c.with_contextual_type(Some(param), |c| c.type_of_expression(arg, scope)))
    }

    /// A string literal argument passed to a parameter of that literal type.
    fn is_literal_match(&self, arg: NodeIndex, param: TypeId) -> bool {
        match self.binder.node(arg) {
            Node::StringLiteral { value } => self.types.unalias(param) == self.types.string_literal(*value),
            _ => false,
        }
    }

    // =========================================================================
    // Tie-break
    // =========================================================================

    fn select_best(
        &mut self,
        first: OverloadCandidate,
        rest: &[OverloadCandidate],
        args: &SiteArgs<'_>,
    ) -> (OverloadCandidate, bool) {
        let mut best = first;
        let mut tied: Option<OverloadCandidate> = None;
        for &challenger in rest {
            match self.prefer(best, challenger, args) {
                Preference::Challenger => {
                    best = challenger;
                    tied = None;
                }
                Preference::Best => {}
                Preference::Undecided => tied = Some(challenger),
            }
        }
        let Some(other) = tied else {
            return (best, false);
        };

        let best_return = self.types.signature(best.signature).return_type;
        let other_return = self.types.signature(other.signature).return_type;
        let mut returns = vec![best_return, other_return];
        if common_supertype(self, None, None, &mut returns).is_some() {
            return (best, false);
        }
        debug!(best = best.signature.0, other = other.signature.0, "ambiguous overload");
        // Only ambiguity between candidates produced by generic filtering is reported.
        if best.from_generic {
            let best_text = self.format_type(best_return);
            let other_text = self.format_type(other_return);
            self.post_error(
                args.node,
                diagnostic_codes::AMBIGUOUS_GENERIC_CALL,
                &[&best_text, &other_text],
            );
        }
        (best, true)
    }

    /// Decide between the current best and a challenger at the first argument
    /// position where their parameter types differ.
    fn prefer(&mut self, best: OverloadCandidate, challenger: OverloadCandidate, args: &SiteArgs<'_>) -> Preference {
        let best_sig = self.types.signature(best.signature);
        let challenger_sig = self.types.signature(challenger.signature);
        let mut differed = false;
        for (index, &arg) in args.nodes.iter().enumerate() {
            let (Some(best_param), Some(challenger_param)) = (
                param_type_at(&self.types, &best_sig, index),
                param_type_at(&self.types, &challenger_sig, index),
            ) else {
                continue;
            };
            if self.identical(best_param, challenger_param, None) {
                continue;
            }
            differed = true;

            let best_literal = self.is_literal_match(arg, best_param);
            let challenger_literal = self.is_literal_match(arg, challenger_param);
            if challenger_literal != best_literal {
                return if challenger_literal {
                    Preference::Challenger
                } else {
                    Preference::Best
                };
            }
            if !args.is_sensitive(index) {
                let arg_ty = args.known_type(index);
                let best_identical = self.identical(arg_ty, best_param, None);
                let challenger_identical = self.identical(arg_ty, challenger_param, None);
                if challenger_identical != best_identical {
                    return if challenger_identical {
                        Preference::Challenger
                    } else {
                        Preference::Best
                    };
                }
            }
            let challenger_narrower = self.subtype(challenger_param, best_param, None);
            let best_narrower = self.subtype(best_param, challenger_param, None);
            if challenger_narrower && !best_narrower {
                return Preference::Challenger;
            }
            if best_narrower && !challenger_narrower {
                return Preference::Best;
            }
            break;
        }

        if best.had_provisional_errors != challenger.had_provisional_errors {
            return if best.had_provisional_errors {
                Preference::Challenger
            } else {
                Preference::Best
            };
        }
        if differed {
            Preference::Undecided
        } else {
            Preference::Best
        }
    }

    // =========================================================================
    // Final argument typing and failure
    // =========================================================================

    /// Type context-sensitive arguments for real, against the winner's
    /// parameters when there is one.
    fn type_remaining_arguments(&mut self, args: &SiteArgs<'_>, winner: Option<SignatureId>) {
        let sig = winner.map(|s| self.types.signature(s));
        for (index, &arg) in args.nodes.iter().enumerate() {
            if !args.is_sensitive(index) {
                continue;
            }
            let param = sig.as_ref().and_then(|sig| param_type_at(&self.types, sig, index));
            self.with_contextual_type(param, |c| c.type_of_expression(arg, args.scope));
        }
    }

    fn report_overload_mismatch(
        &mut self,
        node: NodeIndex,
        first_failure: Option<(SignatureId, Option<usize>)>,
        args: &SiteArgs<'_>,
    ) -> TypeId {
        let mut info = ComparisonInfo::new();
        if let Some((signature, Some(index))) = first_failure {
            let sig = self.types.signature(signature);
            if let (Some(param), Some(&arg)) = (param_type_at(&self.types, &sig, index), args.nodes.get(index)) {
                let arg_ty = if args.is_sensitive(index) {
                    self.probe_argument(arg, param, args.scope).0
                } else {
                    args.known_type(index)
                };
                self.assignable(arg_ty, param, Some(&mut info));
            }
        }
        let detail = info.has_failure().then_some(&info);
        let id = self.post_error_with_detail(
            node,
            diagnostic_codes::SUPPLIED_PARAMETERS_DO_NOT_MATCH_ANY_SIGNATURE,
            &[],
            detail,
        );
        self.types.error_type(Some(id))
    }

    // =========================================================================
    // Type argument inference
    // =========================================================================

    /// Infer the type arguments of a generic `signature` from `args`.
    pub fn infer_type_arguments(
        &mut self,
        signature: SignatureId,
        args: &[NodeIndex],
        scope: DeclId,
    ) -> Result<Vec<TypeId>, InferenceError> {
        let binder = self.binder;
        let sensitive: SmallVec<[bool; 8]> = args
            .iter()
            .map(|&arg| binder.node(arg).is_context_sensitive())
            .collect();
        let types: Vec<TypeId> = args
            .iter()
            .zip(&sensitive)
            .map(|(&arg, &is_sensitive)| {
                if is_sensitive {
                    TypeId::ANY
                } else {
                    self.with_contextual_type(None, |c| c.type_of_expression(arg, scope))
                }
            })
            .collect();
        let site_args = SiteArgs {
            node: args.first().copied().unwrap_or(binder.declaration(scope).node),
            nodes: args,
            types: &types,
            sensitive,
            scope,
        };
        self.infer_from_arguments(signature, &site_args)
    }

    /// Context-free arguments first; context-sensitive ones are then probed
    /// against their parameter with the inferences made so far substituted.
    fn infer_from_arguments(&mut self, signature: SignatureId, args: &SiteArgs<'_>) -> Result<Vec<TypeId>, InferenceError> {
        let sig = self.types.signature(signature);
        let mut ctx = InferenceContext::new(&sig.type_params);

        for index in 0..args.nodes.len() {
            if args.is_sensitive(index) {
                continue;
            }
            if let Some(param) = param_type_at(&self.types, &sig, index) {
                ctx.infer_from_types(&self.types, args.known_type(index), param);
            }
        }

        for (index, &arg) in args.nodes.iter().enumerate() {
            if !args.is_sensitive(index) {
                continue;
            }
            let Some(param) = param_type_at(&self.types, &sig, index) else {
                continue;
            };
            let partial = self.partial_substitution(&mut ctx);
            let contextual = instantiate_type(&self.types, param, &partial);
            let (arg_ty, _) = self.probe_argument(arg, contextual, args.scope);
            ctx.infer_from_types(&self.types, arg_ty, param);
        }

        let inferred = ctx.resolve(self)?;
        // A parameter inferred as one of the signature's own parameters has no
        // usable inference.
        let inferred: Vec<TypeId> = inferred
            .into_iter()
            .map(|ty| if sig.type_params.contains(&ty) { TypeId::ANY } else { ty })
            .collect();
        trace!(signature = signature.0, ?inferred, "type arguments inferred");
        Ok(inferred)
    }

    /// Substitution for the parameters that have candidates so far; the rest
    /// stay unsubstituted.
    fn partial_substitution(&mut self, ctx: &mut InferenceContext) -> TypeSubstitution {
        let full = ctx.current_substitution(self);
        let params: Vec<TypeId> = ctx.type_params().collect();
        let mut partial = TypeSubstitution::new();
        for param in params {
            if ctx.candidates(param).is_empty() {
                continue;
            }
            if let Some(inferred) = full.get(param) {
                partial.insert(param, inferred);
            }
        }
        partial
    }
}
