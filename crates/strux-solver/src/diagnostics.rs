//! Structured relation failures and their rendering.
//!
//! Relation checks record *why* they failed only when a detail sink is
//! active: the failure is built lazily by the checker (see
//! [`RelationChecker::fail`](crate::relation::RelationChecker)) and rendered
//! to text only when a diagnostic is actually reported.

use crate::format::TypeFormatter;
use crate::types::{SignatureId, SignatureKind, TypeId};
use strux_common::diagnostics::{diagnostic_messages, format_message};
use strux_common::Atom;

/// The first point at which a relation check diverged. Nested reasons describe
/// the divergence one structural level down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelationFailure {
    TypeMismatch {
        source: TypeId,
        target: TypeId,
    },
    MissingProperty {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    PrivatePublicMismatch {
        property: Atom,
        private_in: TypeId,
        public_in: TypeId,
    },
    PrivateDeclarationMismatch {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    OptionalPropertyRequired {
        property: Atom,
        source: TypeId,
        target: TypeId,
    },
    PropertyTypeMismatch {
        property: Atom,
        source: TypeId,
        target: TypeId,
        nested: Option<Box<RelationFailure>>,
    },
    MissingSignature {
        kind: SignatureKind,
        source: TypeId,
        target: TypeId,
    },
    SignatureMismatch {
        kind: SignatureKind,
        source: TypeId,
        target: TypeId,
        nested: Option<Box<RelationFailure>>,
    },
    TooManyParameters {
        max: usize,
    },
    ParameterTypeMismatch {
        source_param: Atom,
        target_param: Atom,
        source: SignatureId,
        target: SignatureId,
        nested: Option<Box<RelationFailure>>,
    },
    ReturnTypeMismatch {
        source: SignatureId,
        target: SignatureId,
        nested: Option<Box<RelationFailure>>,
    },
    /// Type parameter count, parameter count, optionality or varargs differ
    /// between signatures compared for identity.
    SignatureShapeMismatch {
        source: SignatureId,
        target: SignatureId,
    },
}

impl RelationFailure {
    pub fn nested(&self) -> Option<&RelationFailure> {
        match self {
            RelationFailure::PropertyTypeMismatch { nested, .. }
            | RelationFailure::SignatureMismatch { nested, .. }
            | RelationFailure::ParameterTypeMismatch { nested, .. }
            | RelationFailure::ReturnTypeMismatch { nested, .. } => nested.as_deref(),
            _ => None,
        }
    }

    /// Number of structural levels in this failure chain.
    pub fn depth(&self) -> usize {
        1 + self.nested().map_or(0, RelationFailure::depth)
    }

    fn headline(&self, fmt: &TypeFormatter<'_>) -> String {
        match self {
            RelationFailure::TypeMismatch { source, target } => format_message(
                diagnostic_messages::TYPE_IS_NOT_ASSIGNABLE,
                &[&fmt.format(*source), &fmt.format(*target)],
            ),
            RelationFailure::MissingProperty {
                property,
                source,
                target,
            } => format_message(
                diagnostic_messages::PROPERTY_IS_MISSING_IN_TYPE,
                &[&fmt.format(*source), fmt.name(*property), &fmt.format(*target)],
            ),
            RelationFailure::PrivatePublicMismatch {
                property,
                private_in,
                public_in,
            } => format_message(
                diagnostic_messages::PROPERTY_PRIVATE_IN_ONE_PUBLIC_IN_OTHER,
                &[fmt.name(*property), &fmt.format(*private_in), &fmt.format(*public_in)],
            ),
            RelationFailure::PrivateDeclarationMismatch {
                property,
                source,
                target,
            } => format_message(
                diagnostic_messages::TYPES_DEFINE_PROPERTY_AS_PRIVATE,
                &[&fmt.format(*source), &fmt.format(*target), fmt.name(*property)],
            ),
            RelationFailure::OptionalPropertyRequired {
                property,
                source,
                target,
            } => format_message(
                diagnostic_messages::PROPERTY_OPTIONAL_IN_SOURCE_REQUIRED_IN_TARGET,
                &[fmt.name(*property), &fmt.format(*source), &fmt.format(*target)],
            ),
            RelationFailure::PropertyTypeMismatch {
                property,
                source,
                target,
                ..
            } => format_message(
                diagnostic_messages::TYPES_OF_PROPERTY_ARE_INCOMPATIBLE,
                &[fmt.name(*property), &fmt.format(*source), &fmt.format(*target)],
            ),
            RelationFailure::MissingSignature {
                kind,
                source,
                target,
            } => {
                let template = match kind {
                    SignatureKind::Call => diagnostic_messages::TYPE_LACKS_CALL_SIGNATURE,
                    SignatureKind::Construct => diagnostic_messages::TYPE_LACKS_CONSTRUCT_SIGNATURE,
                    SignatureKind::Index => diagnostic_messages::TYPE_LACKS_INDEX_SIGNATURE,
                };
                format_message(template, &[&fmt.format(*target), &fmt.format(*source)])
            }
            RelationFailure::SignatureMismatch {
                kind,
                source,
                target,
                ..
            } => {
                let template = match kind {
                    SignatureKind::Call => diagnostic_messages::CALL_SIGNATURES_ARE_INCOMPATIBLE,
                    SignatureKind::Construct => {
                        diagnostic_messages::CONSTRUCT_SIGNATURES_ARE_INCOMPATIBLE
                    }
                    SignatureKind::Index => diagnostic_messages::INDEX_SIGNATURES_ARE_INCOMPATIBLE,
                };
                format_message(template, &[&fmt.format(*source), &fmt.format(*target)])
            }
            RelationFailure::TooManyParameters { max } => format_message(
                diagnostic_messages::CALL_SIGNATURE_EXPECTS_FEWER_PARAMETERS,
                &[&max.to_string()],
            ),
            RelationFailure::ParameterTypeMismatch {
                source_param,
                target_param,
                source,
                target,
                ..
            } => format_message(
                diagnostic_messages::TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE,
                &[
                    fmt.name(*source_param),
                    fmt.name(*target_param),
                    &fmt.format_signature(*source),
                    &fmt.format_signature(*target),
                ],
            ),
            RelationFailure::ReturnTypeMismatch { source, target, .. } => format_message(
                diagnostic_messages::RETURN_TYPES_ARE_INCOMPATIBLE,
                &[&fmt.format_signature(*source), &fmt.format_signature(*target)],
            ),
            RelationFailure::SignatureShapeMismatch { source, target } => format_message(
                diagnostic_messages::SIGNATURE_SHAPES_DIFFER,
                &[&fmt.format_signature(*source), &fmt.format_signature(*target)],
            ),
        }
    }
}

/// Detail sink passed to relation checks.
#[derive(Clone, Debug, Default)]
pub struct ComparisonInfo {
    pub failure: Option<RelationFailure>,
}

impl ComparisonInfo {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// One line per structural level, each indented one step deeper than its parent.
    pub fn render(&self, fmt: &TypeFormatter<'_>) -> String {
        let mut lines = Vec::new();
        let mut current = self.failure.as_ref();
        let mut depth = 0usize;
        while let Some(failure) = current {
            lines.push(format!("{}{}", "  ".repeat(depth + 1), failure.headline(fmt)));
            current = failure.nested();
            depth += 1;
        }
        lines.join("\n")
    }
}
