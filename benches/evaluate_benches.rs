use RustedCalc::calc::pipeline::evaluate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const RELAXED_INPUT: &str = "(1 - 25e^5)e^{-5t} + (25e^5 - 1)t e^{-5t} + t e^{-5t} ln(t)";

fn bench_strict(c: &mut Criterion) {
    let mut group = c.benchmark_group("strict");
    group.bench_function("arithmetic", |b| {
        b.iter(|| evaluate(black_box("1/3 + 1/6"), false))
    });
    group.bench_function("derivative", |b| {
        b.iter(|| evaluate(black_box("d(x^3 + 2*x)"), false))
    });
    group.bench_function("integral", |b| {
        b.iter(|| evaluate(black_box("int(x*exp(x))"), false))
    });
    group.bench_function("solve", |b| {
        b.iter(|| evaluate(black_box("solve(x^2 - 4, x)"), false))
    });
    group.finish();
}

fn bench_relaxed(c: &mut Criterion) {
    c.bench_function("relaxed long expression", |b| {
        b.iter(|| evaluate(black_box(RELAXED_INPUT), true))
    });
}

fn bench_rejected(c: &mut Criterion) {
    let long = "1+".repeat(2000);
    c.bench_function("rejected input", |b| {
        b.iter(|| evaluate(black_box(&long), false))
    });
}

criterion_group!(benches, bench_strict, bench_relaxed, bench_rejected);
criterion_main!(benches);
