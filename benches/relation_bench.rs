//! Resolver benchmarks.
//!
//! Builds synthetic units through the binder API and measures whole-unit
//! checking, repeated relation queries and deeply nested overload resolution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use strux::binder::{Binder, DeclFlags, Meaning, ParamKind};
use strux::checker::Checker;
use strux::solver::TypeId;

/// `interface I0 { p0: number }`, `interface I1 extends I0 { p1: number }`, ...
fn interface_chain(length: usize) -> Binder {
    let mut binder = Binder::new();
    let global = binder.global();
    for i in 0..length {
        let decl = binder.declare_interface(global, &format!("I{i}"));
        let number = binder.type_name("number");
        binder.add_property(decl, &format!("p{i}"), Some(number), DeclFlags::empty());
        if i > 0 {
            let base = binder.type_name(&format!("I{}", i - 1));
            binder.add_extends(decl, base);
        }
    }
    binder
}

/// `interface Box<T> { value: T; next: Box<T> }` referenced from `width` variables.
fn generic_references(width: usize) -> Binder {
    let mut binder = Binder::new();
    let global = binder.global();
    let boxed = binder.declare_interface(global, "Box");
    binder.add_type_parameter(boxed, "T", None);
    let t = binder.type_name("T");
    binder.add_property(boxed, "value", Some(t), DeclFlags::empty());
    let t = binder.type_name("T");
    let next = binder.type_ref("Box", vec![t]);
    binder.add_property(boxed, "next", Some(next), DeclFlags::empty());

    for i in 0..width {
        let argument = if i % 2 == 0 {
            binder.type_name("number")
        } else {
            let string = binder.type_name("string");
            binder.type_ref("Box", vec![string])
        };
        let reference = binder.type_ref("Box", vec![argument]);
        binder.declare_variable(global, &format!("v{i}"), Some(reference), None);
    }
    binder
}

/// Overloaded `f` applied to itself `depth` times.
fn nested_calls(depth: usize) -> Binder {
    let mut binder = Binder::new();
    let global = binder.global();
    for (param, ret) in [("number", "number"), ("string", "string"), ("boolean", "boolean")] {
        let f = binder.declare_function(global, "f");
        let param = binder.type_name(param);
        binder.add_parameter(f, "x", Some(param), ParamKind::Required);
        let ret = binder.type_name(ret);
        binder.set_return_type(f, ret);
    }
    let mut expr = binder.num(1.0);
    for _ in 0..depth {
        let callee = binder.ident("f");
        expr = binder.call(callee, vec![expr]);
    }
    binder.declare_variable(global, "r", None, Some(expr));
    binder
}

fn bench_check_unit(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_unit");
    for length in [16, 64, 256] {
        let binder = interface_chain(length);
        group.bench_with_input(BenchmarkId::new("interface_chain", length), &binder, |b, binder| {
            b.iter(|| {
                let report = Checker::new(binder).check_unit();
                black_box(report.symbols_resolved)
            });
        });
    }
    for width in [8, 64] {
        let binder = generic_references(width);
        group.bench_with_input(BenchmarkId::new("generic_references", width), &binder, |b, binder| {
            b.iter(|| {
                let report = Checker::new(binder).check_unit();
                black_box(report.specializations)
            });
        });
    }
    group.finish();
}

fn bench_relations(c: &mut Criterion) {
    let mut group = c.benchmark_group("relations");
    let binder = interface_chain(64);
    let first = binder.lookup_global("I0", Meaning::Type).expect("I0");
    let last = binder.lookup_global("I63", Meaning::Type).expect("I63");

    group.bench_function("subtype_cold_cache", |b| {
        let mut checker = Checker::new(&binder);
        let base = checker.type_of_symbol(first);
        let derived = checker.type_of_symbol(last);
        b.iter(|| {
            checker.clear_relation_cache();
            black_box(checker.subtype(derived, base, None))
        });
    });
    group.bench_function("assignable_warm_cache", |b| {
        let mut checker = Checker::new(&binder);
        let base = checker.type_of_symbol(first);
        let derived = checker.type_of_symbol(last);
        b.iter(|| black_box(checker.assignable(derived, base, None)));
    });
    group.bench_function("identical_primitives", |b| {
        let mut checker = Checker::new(&binder);
        b.iter(|| black_box(checker.identical(TypeId::NUMBER, TypeId::STRING, None)));
    });
    group.finish();
}

fn bench_nested_overloads(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_overloads");
    for depth in [4, 32, 128] {
        let binder = nested_calls(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &binder, |b, binder| {
            b.iter(|| {
                let mut checker = Checker::new(binder);
                let report = checker.check_unit();
                black_box(report.scratch_high_water)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_check_unit, bench_relations, bench_nested_overloads);
criterion_main!(benches);
