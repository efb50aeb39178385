//! Reported diagnostics: codes, messages and deduplication.

use strux_binder::{Binder, DeclFlags, DeclId, ParamKind};
use strux_checker::Checker;
use strux_common::Diagnostic;

fn check(binder: &Binder) -> Vec<Diagnostic> {
    Checker::new(binder).check_unit().diagnostics
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

/// `interface name { <member>: <ty> }` (or a class when `class` is set).
fn declare_with_member(binder: &mut Binder, class: bool, name: &str, member: &str, ty: &str) -> DeclId {
    let global = binder.global();
    let decl = if class {
        binder.declare_class(global, name)
    } else {
        binder.declare_interface(global, name)
    };
    let ty = binder.type_name(ty);
    binder.add_property(decl, member, Some(ty), DeclFlags::empty());
    decl
}

// =============================================================================
// Names and members
// =============================================================================

#[test]
fn test_unknown_names_reported() {
    let mut binder = Binder::new();
    let global = binder.global();
    let missing_type = binder.type_name("Missing");
    binder.declare_variable(global, "a", Some(missing_type), None);
    let missing_value = binder.ident("missing");
    binder.declare_variable(global, "b", None, Some(missing_value));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2304, 2304]);
    assert!(diagnostics[0].message_text.contains("'Missing'"));
    assert!(diagnostics[1].message_text.contains("'missing'"));
}

#[test]
fn test_unknown_property_reported() {
    let mut binder = Binder::new();
    let global = binder.global();
    declare_with_member(&mut binder, false, "Point", "a", "number");
    let point = binder.type_name("Point");
    binder.declare_variable(global, "p", Some(point), None);
    let object = binder.ident("p");
    let access = binder.prop(object, "b");
    binder.declare_variable(global, "q", None, Some(access));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2339]);
    assert_eq!(
        diagnostics[0].message_text,
        "The property 'b' does not exist on value of type 'Point'."
    );
}

#[test]
fn test_invoking_non_callable_values() {
    let mut binder = Binder::new();
    let global = binder.global();
    let number = binder.type_name("number");
    binder.declare_variable(global, "n", Some(number), None);
    let callee = binder.ident("n");
    let call = binder.call(callee, Vec::new());
    binder.declare_variable(global, "called", None, Some(call));
    let callee = binder.ident("n");
    let construct = binder.new_expr(callee, Vec::new());
    binder.declare_variable(global, "constructed", None, Some(construct));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2349, 2351]);
}

#[test]
fn test_initializer_mismatch_reported() {
    let mut binder = Binder::new();
    let global = binder.global();
    let number = binder.type_name("number");
    let text = binder.str("s");
    binder.declare_variable(global, "v", Some(number), Some(text));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2322]);
    assert_eq!(diagnostics[0].message_text, "Cannot convert 'string' to 'number'.\n  Type 'string' is not assignable to type 'number'.");
}

// =============================================================================
// Base types
// =============================================================================

#[test]
fn test_incompatible_interface_base() {
    let mut binder = Binder::new();
    declare_with_member(&mut binder, false, "Base", "a", "number");
    let derived = declare_with_member(&mut binder, false, "Derived", "a", "string");
    let base = binder.type_name("Base");
    binder.add_extends(derived, base);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2430]);
    let message = &diagnostics[0].message_text;
    assert!(message.starts_with("Interface 'Derived' cannot extend interface 'Base':"), "{message}");
    assert!(message.contains("Types of property 'a'"), "{message}");
}

#[test]
fn test_incompatible_class_base() {
    let mut binder = Binder::new();
    declare_with_member(&mut binder, true, "Base", "a", "number");
    let derived = declare_with_member(&mut binder, true, "Derived", "a", "string");
    let base = binder.type_name("Base");
    binder.add_extends(derived, base);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2415]);
}

#[test]
fn test_compatible_class_base_is_silent() {
    let mut binder = Binder::new();
    declare_with_member(&mut binder, true, "Base", "a", "number");
    let derived = declare_with_member(&mut binder, true, "Derived", "b", "string");
    let base = binder.type_name("Base");
    binder.add_extends(derived, base);

    assert!(check(&binder).is_empty());
}

#[test]
fn test_unimplemented_interface() {
    let mut binder = Binder::new();
    declare_with_member(&mut binder, false, "Shape", "area", "number");
    let circle = declare_with_member(&mut binder, true, "Circle", "radius", "number");
    let shape = binder.type_name("Shape");
    binder.add_implements(circle, shape);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2420]);
    assert!(diagnostics[0].message_text.contains("'area'"));
}

#[test]
fn test_recursive_base_reported_once() {
    let mut binder = Binder::new();
    let global = binder.global();
    let a = binder.declare_interface(global, "A");
    let self_ref = binder.type_name("A");
    binder.add_extends(a, self_ref);
    let again = binder.type_name("A");
    binder.add_extends(a, again);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2310]);
    assert_eq!(
        diagnostics[0].message_text,
        "Type 'A' recursively references itself as a base type."
    );
}

// =============================================================================
// Generic references
// =============================================================================

/// `interface Box<T extends string> { value: T }`
fn declare_constrained_box(binder: &mut Binder) {
    let global = binder.global();
    let boxed = binder.declare_interface(global, "Box");
    let string = binder.type_name("string");
    binder.add_type_parameter(boxed, "T", Some(string));
    let t = binder.type_name("T");
    binder.add_property(boxed, "value", Some(t), DeclFlags::empty());
}

#[test]
fn test_constraint_violation_reported() {
    let mut binder = Binder::new();
    let global = binder.global();
    declare_constrained_box(&mut binder);
    let number = binder.type_name("number");
    let bad = binder.type_ref("Box", vec![number]);
    binder.declare_variable(global, "bad", Some(bad), None);
    let string = binder.type_name("string");
    let good = binder.type_ref("Box", vec![string]);
    binder.declare_variable(global, "good", Some(good), None);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2344]);
    assert_eq!(
        diagnostics[0].message_text,
        "Type 'number' does not satisfy the constraint 'string' for type parameter 'T'."
    );
}

#[test]
fn test_type_argument_count_reported() {
    let mut binder = Binder::new();
    let global = binder.global();
    declare_constrained_box(&mut binder);
    let bare = binder.type_name("Box");
    binder.declare_variable(global, "bare", Some(bare), None);
    let first = binder.type_name("string");
    let second = binder.type_name("string");
    let surplus = binder.type_ref("Box", vec![first, second]);
    binder.declare_variable(global, "surplus", Some(surplus), None);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2314, 2314]);
    assert_eq!(diagnostics[0].message_text, "Generic type 'Box' requires 1 type argument(s).");
}

#[test]
fn test_type_arguments_on_plain_type() {
    let mut binder = Binder::new();
    let global = binder.global();
    declare_with_member(&mut binder, false, "Plain", "a", "number");
    let number = binder.type_name("number");
    let reference = binder.type_ref("Plain", vec![number]);
    binder.declare_variable(global, "p", Some(reference), None);

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2315]);
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_overload_mismatch_elaborated() {
    let mut binder = Binder::new();
    let global = binder.global();
    let f = binder.declare_function(global, "f");
    let number = binder.type_name("number");
    binder.add_parameter(f, "x", Some(number), ParamKind::Required);
    let callee = binder.ident("f");
    let text = binder.str("s");
    let call = binder.call(callee, vec![text]);
    binder.declare_variable(global, "r", None, Some(call));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2346]);
    let mut lines = diagnostics[0].message_text.lines();
    assert_eq!(lines.next(), Some("Supplied parameters do not match any signature of call target."));
    assert_eq!(lines.next(), Some("  Type 'string' is not assignable to type 'number'."));
}

#[test]
fn test_arity_mismatch_has_no_elaboration() {
    let mut binder = Binder::new();
    let global = binder.global();
    let f = binder.declare_function(global, "f");
    let number = binder.type_name("number");
    binder.add_parameter(f, "x", Some(number), ParamKind::Required);
    let callee = binder.ident("f");
    let call = binder.call(callee, Vec::new());
    binder.declare_variable(global, "r", None, Some(call));

    let diagnostics = check(&binder);
    assert_eq!(codes(&diagnostics), [2346]);
    assert!(!diagnostics[0].message_text.contains('\n'));
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn test_same_site_reported_once() {
    let mut binder = Binder::new();
    let global = binder.global();
    let missing = binder.type_name("Missing");

    let mut checker = Checker::new(&binder);
    let first = checker.resolve_type(missing, global);
    let second = checker.resolve_type(missing, global);
    assert!(checker.types().is_error(first));
    assert!(checker.types().is_error(second));
    assert_eq!(checker.diagnostics().len(), 1);
}

#[test]
fn test_diagnostics_carry_node_spans() {
    let mut binder = Binder::new();
    let global = binder.global();
    let missing = binder.ident("missing");
    binder.declare_variable(global, "v", None, Some(missing));

    let diagnostics = check(&binder);
    let span = binder.span(missing);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start, span.start);
    assert_eq!(diagnostics[0].length, span.len());
    assert_eq!(diagnostics[0].file, "input.ts");
}
