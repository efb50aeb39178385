//! Symbol resolution: declaration kinds, cycles and generic references.

use strux_binder::{Binder, DeclFlags, Meaning, ParamKind, SymbolId};
use strux_checker::{Checker, ResolutionState};
use strux_solver::{TypeData, TypeId};

fn value_symbol(binder: &Binder, name: &str) -> SymbolId {
    binder.lookup_global(name, Meaning::Value).expect("value symbol")
}

fn type_symbol(binder: &Binder, name: &str) -> SymbolId {
    binder.lookup_global(name, Meaning::Type).expect("type symbol")
}

// =============================================================================
// State machine
// =============================================================================

#[test]
fn test_resolve_symbol_is_idempotent() {
    let mut binder = Binder::new();
    let global = binder.global();
    let number = binder.type_name("number");
    binder.declare_variable(global, "x", Some(number), None);

    let mut checker = Checker::new(&binder);
    let x = value_symbol(&binder, "x");
    assert_eq!(checker.resolution_state(x), ResolutionState::Unresolved);
    assert_eq!(checker.resolve_symbol(x), x);
    assert_eq!(checker.resolution_state(x), ResolutionState::Resolved);
    let first = checker.symbol_links(x).value_type;
    checker.resolve_symbol(x);
    assert_eq!(checker.symbol_links(x).value_type, first);
    assert_eq!(first, Some(TypeId::NUMBER));
}

#[test]
fn test_mutually_dependent_variables_read_as_any() {
    let mut binder = Binder::new();
    let global = binder.global();
    let b_ref = binder.ident("b");
    binder.declare_variable(global, "a", None, Some(b_ref));
    let a_ref = binder.ident("a");
    binder.declare_variable(global, "b", None, Some(a_ref));

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let a = value_symbol(&binder, "a");
    let b = value_symbol(&binder, "b");
    assert_eq!(checker.value_type_of_symbol(a), TypeId::ANY);
    assert_eq!(checker.value_type_of_symbol(b), TypeId::ANY);
}

#[test]
fn test_initializers_widen_null_and_undefined() {
    let mut binder = Binder::new();
    let global = binder.global();
    let null = binder.null();
    binder.declare_variable(global, "n", None, Some(null));
    let undefined = binder.undefined();
    binder.declare_variable(global, "u", None, Some(undefined));
    let text = binder.str("hi");
    binder.declare_variable(global, "s", None, Some(text));
    binder.declare_variable(global, "bare", None, None);

    let mut checker = Checker::new(&binder);
    for (name, expected) in [
        ("n", TypeId::ANY),
        ("u", TypeId::ANY),
        ("s", TypeId::STRING),
        ("bare", TypeId::ANY),
    ] {
        let symbol = value_symbol(&binder, name);
        assert_eq!(checker.value_type_of_symbol(symbol), expected, "{name}");
    }
}

#[test]
fn test_array_literal_takes_best_common_element() {
    let mut binder = Binder::new();
    let global = binder.global();
    let one = binder.num(1.0);
    let null = binder.null();
    let two = binder.num(2.0);
    let array = binder.array_literal(vec![one, null, two]);
    binder.declare_variable(global, "xs", None, Some(array));
    let empty = binder.array_literal(Vec::new());
    binder.declare_variable(global, "none", None, Some(empty));

    let mut checker = Checker::new(&binder);
    let xs = checker.value_type_of_symbol(value_symbol(&binder, "xs"));
    assert_eq!(checker.types().array_element(xs), Some(TypeId::NUMBER));
    let none = checker.value_type_of_symbol(value_symbol(&binder, "none"));
    assert_eq!(checker.types().array_element(none), Some(TypeId::ANY));
}

// =============================================================================
// Interfaces
// =============================================================================

#[test]
fn test_self_referencing_interface_member() {
    let mut binder = Binder::new();
    let global = binder.global();
    let list = binder.declare_interface(global, "Node");
    let next = binder.type_name("Node");
    binder.add_property(list, "next", Some(next), DeclFlags::empty());

    let mut checker = Checker::new(&binder);
    let ty = checker.type_of_symbol(type_symbol(&binder, "Node"));
    assert!(matches!(checker.types().lookup(ty), TypeData::Object(_)));
    let next = binder.interner().lookup("next").expect("atom");
    let member = checker.types().find_property(ty, next).expect("next member");
    assert_eq!(member.type_id, ty);
    assert!(checker.subtype(ty, ty, None));
}

#[test]
fn test_merged_interface_declarations_share_members() {
    let mut binder = Binder::new();
    let global = binder.global();
    let first = binder.declare_interface(global, "Pair");
    let number = binder.type_name("number");
    binder.add_property(first, "left", Some(number), DeclFlags::empty());
    let second = binder.declare_interface(global, "Pair");
    let string = binder.type_name("string");
    binder.add_property(second, "right", Some(string), DeclFlags::empty());

    let mut checker = Checker::new(&binder);
    let ty = checker.type_of_symbol(type_symbol(&binder, "Pair"));
    let names: Vec<&str> = checker
        .types()
        .properties_of(ty)
        .iter()
        .map(|p| binder.name(p.name))
        .collect();
    assert_eq!(names, ["left", "right"]);
}

#[test]
fn test_interface_extending_itself_terminates() {
    let mut binder = Binder::new();
    let global = binder.global();
    let a = binder.declare_interface(global, "A");
    let self_ref = binder.type_name("A");
    binder.add_extends(a, self_ref);

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    let recursive: Vec<u32> = report
        .diagnostics
        .iter()
        .map(|d| d.code)
        .filter(|&code| code == 2310)
        .collect();
    assert_eq!(recursive.len(), 1);
    let ty = checker.type_of_symbol(type_symbol(&binder, "A"));
    assert!(checker.types().shape_of(ty).expect("shape").base_types.is_empty());
    assert!(checker.subtype(ty, ty, None));
}

#[test]
fn test_mutually_recursive_bases_reported_once() {
    let mut binder = Binder::new();
    let global = binder.global();
    let a = binder.declare_interface(global, "A");
    let b_ref = binder.type_name("B");
    binder.add_extends(a, b_ref);
    let b = binder.declare_interface(global, "B");
    let a_ref = binder.type_name("A");
    binder.add_extends(b, a_ref);

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    let codes: Vec<u32> = report.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, [2310]);
}

// =============================================================================
// Generics
// =============================================================================

#[test]
fn test_generic_reference_specializes_once() {
    let mut binder = Binder::new();
    let global = binder.global();
    let boxed = binder.declare_interface(global, "Box");
    binder.add_type_parameter(boxed, "T", None);
    let t = binder.type_name("T");
    binder.add_property(boxed, "value", Some(t), DeclFlags::empty());
    for name in ["a", "b"] {
        let number = binder.type_name("number");
        let reference = binder.type_ref("Box", vec![number]);
        binder.declare_variable(global, name, Some(reference), None);
    }

    let mut checker = Checker::new(&binder);
    let a = checker.value_type_of_symbol(value_symbol(&binder, "a"));
    let b = checker.value_type_of_symbol(value_symbol(&binder, "b"));
    assert_eq!(a, b);

    let root = checker.type_of_symbol(type_symbol(&binder, "Box"));
    assert!(matches!(checker.types().lookup(root), TypeData::Generic(_)));
    assert_eq!(checker.specialize(root, &[TypeId::NUMBER]), a);

    let value = binder.interner().lookup("value").expect("atom");
    let member = checker.types().find_property(a, value).expect("value member");
    assert_eq!(member.type_id, TypeId::NUMBER);
}

#[test]
fn test_recursive_generic_member_terminates() {
    let mut binder = Binder::new();
    let global = binder.global();
    let list = binder.declare_interface(global, "List");
    binder.add_type_parameter(list, "T", None);
    let t = binder.type_name("T");
    let next = binder.type_ref("List", vec![t]);
    binder.add_property(list, "next", Some(next), DeclFlags::empty());
    let string = binder.type_name("string");
    let reference = binder.type_ref("List", vec![string]);
    binder.declare_variable(global, "xs", Some(reference), None);

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let xs = checker.value_type_of_symbol(value_symbol(&binder, "xs"));
    let next = binder.interner().lookup("next").expect("atom");
    let member = checker.types().find_property(xs, next).expect("next member");
    assert_eq!(member.type_id, xs);
    assert!(checker.assignable(xs, xs, None));
}

// =============================================================================
// Classes, enums and aliases
// =============================================================================

#[test]
fn test_new_expression_produces_instance_type() {
    let mut binder = Binder::new();
    let global = binder.global();
    let point = binder.declare_class(global, "Point");
    let number = binder.type_name("number");
    binder.add_property(point, "x", Some(number), DeclFlags::empty());
    let callee = binder.ident("Point");
    let construct = binder.new_expr(callee, Vec::new());
    binder.declare_variable(global, "p", None, Some(construct));

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let instance = checker.type_of_symbol(type_symbol(&binder, "Point"));
    let p = checker.value_type_of_symbol(value_symbol(&binder, "p"));
    assert_eq!(p, instance);
    assert!(matches!(checker.types().lookup(instance), TypeData::Class(_)));
}

#[test]
fn test_derived_class_inherits_base_constructor() {
    let mut binder = Binder::new();
    let global = binder.global();
    let base = binder.declare_class(global, "Base");
    let ctor = binder.add_constructor(base);
    let number = binder.type_name("number");
    binder.add_parameter(ctor, "x", Some(number), ParamKind::Required);
    let derived = binder.declare_class(global, "Derived");
    let base_ref = binder.type_name("Base");
    binder.add_extends(derived, base_ref);

    let callee = binder.ident("Derived");
    let one = binder.num(1.0);
    let construct = binder.new_expr(callee, vec![one]);
    binder.declare_variable(global, "d", None, Some(construct));

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let derived_ty = checker.type_of_symbol(type_symbol(&binder, "Derived"));
    let base_ty = checker.type_of_symbol(type_symbol(&binder, "Base"));
    let d = checker.value_type_of_symbol(value_symbol(&binder, "d"));
    assert_eq!(d, derived_ty);
    assert!(checker.subtype(derived_ty, base_ty, None));
}

#[test]
fn test_enum_members_have_enum_type() {
    let mut binder = Binder::new();
    let global = binder.global();
    binder.declare_enum(global, "Color", &["Red", "Green"]);
    let color = binder.ident("Color");
    let red = binder.prop(color, "Red");
    binder.declare_variable(global, "c", None, Some(red));

    let mut checker = Checker::new(&binder);
    let enum_ty = checker.type_of_symbol(type_symbol(&binder, "Color"));
    let c = checker.value_type_of_symbol(value_symbol(&binder, "c"));
    assert_eq!(c, enum_ty);
    assert!(checker.assignable(enum_ty, TypeId::NUMBER, None));
    assert!(checker.assignable(TypeId::NUMBER, enum_ty, None));
}

#[test]
fn test_alias_forwards_to_target() {
    let mut binder = Binder::new();
    let global = binder.global();
    let target = binder.declare_interface(global, "Shape");
    let number = binder.type_name("number");
    binder.add_property(target, "area", Some(number), DeclFlags::empty());
    let target_name = binder.ident("Shape");
    binder.declare_alias(global, "Figure", target_name);
    let figure = binder.type_name("Figure");
    binder.declare_variable(global, "f", Some(figure), None);

    let mut checker = Checker::new(&binder);
    let report = checker.check_unit();
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let shape = checker.type_of_symbol(type_symbol(&binder, "Shape"));
    let f = checker.value_type_of_symbol(value_symbol(&binder, "f"));
    assert_eq!(checker.types().unalias(f), shape);
    assert!(checker.identical(f, shape, None));
}

// =============================================================================
// Signatures
// =============================================================================

#[test]
fn test_unannotated_return_types() {
    let mut binder = Binder::new();
    let global = binder.global();
    let f = binder.declare_function(global, "f");
    let one = binder.num(1.0);
    binder.add_return(f, one);
    let null = binder.null();
    binder.add_return(f, null);
    let g = binder.declare_function(global, "g");
    binder.set_body(g);

    let f_ref = binder.ident("f");
    let f_call = binder.call(f_ref, Vec::new());
    binder.declare_variable(global, "r", None, Some(f_call));

    let mut checker = Checker::new(&binder);
    let f_sig = checker.signature_of_declaration(f);
    assert_eq!(checker.types().signature(f_sig).return_type, TypeId::NUMBER);
    let g_sig = checker.signature_of_declaration(g);
    assert_eq!(checker.types().signature(g_sig).return_type, TypeId::VOID);
    let r = checker.value_type_of_symbol(value_symbol(&binder, "r"));
    assert_eq!(r, TypeId::NUMBER);
}

#[test]
fn test_implementation_signature_is_hidden_by_overloads() {
    let mut binder = Binder::new();
    let global = binder.global();
    let overload = binder.declare_function(global, "f");
    let number = binder.type_name("number");
    binder.add_parameter(overload, "x", Some(number), ParamKind::Required);
    let implementation = binder.declare_function(global, "f");
    let any = binder.type_name("any");
    binder.add_parameter(implementation, "x", Some(any), ParamKind::Required);
    binder.set_body(implementation);

    let mut checker = Checker::new(&binder);
    let f = checker.value_type_of_symbol(value_symbol(&binder, "f"));
    let signatures = checker.types().signatures_of(f, strux_solver::SignatureKind::Call);
    assert_eq!(signatures.len(), 1);
    let sig = checker.types().signature(signatures[0]);
    assert_eq!(sig.params[0].type_id, TypeId::NUMBER);
}
