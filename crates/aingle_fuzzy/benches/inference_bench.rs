//! Benchmarks for the fuzzy inference engine
//!
//! Run with: cargo bench -p aingle_fuzzy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use aingle_fuzzy::{
    evaluate, normalize_description, parse_description, BuiltinSystems, EvaluationSettings,
    Rule, System, SystemOp,
};

/// Benchmark full evaluations of the built-in systems
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluate");

    let fan = BuiltinSystems::fan_controller();
    let comfort = BuiltinSystems::comfort_controller();

    for (label, settings) in [
        ("mamdani", EvaluationSettings::mamdani()),
        ("algebraic", EvaluationSettings::algebraic()),
    ] {
        group.bench_function(BenchmarkId::new("fan", label), |b| {
            b.iter(|| black_box(evaluate(&fan, &settings, &[("temperature", 22.5)])));
        });
        group.bench_function(BenchmarkId::new("comfort", label), |b| {
            b.iter(|| {
                black_box(evaluate(
                    &comfort,
                    &settings,
                    &[("temperature", 27.0), ("humidity", 65.0)],
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark evaluation cost as the rule list grows
fn bench_rule_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rule Count");
    let settings = EvaluationSettings::default();

    for size in [3, 30, 300].iter() {
        let mut system: System = BuiltinSystems::fan_controller();
        let extra: Vec<Rule> = system.rules().iter().cycle().take(size - 3).cloned().collect();
        for rule in extra {
            let _ = system.apply(SystemOp::AddRule(rule));
        }

        group.bench_with_input(BenchmarkId::new("rules", size), size, |b, _| {
            b.iter(|| black_box(evaluate(&system, &settings, &[("temperature", 18.0)])));
        });
    }

    group.finish();
}

/// Benchmark description parsing and building
fn bench_description(c: &mut Criterion) {
    let mut group = c.benchmark_group("Description");

    let json = BuiltinSystems::comfort_controller()
        .to_description()
        .to_json()
        .unwrap_or_default();
    let raw: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();

    group.bench_function("normalize", |b| {
        b.iter(|| black_box(normalize_description(&raw)));
    });

    group.bench_function("parse_and_build", |b| {
        b.iter(|| {
            let parsed = parse_description(&json);
            black_box(parsed.and_then(|p| p.value.build()))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_rule_count, bench_description);
criterion_main!(benches);
