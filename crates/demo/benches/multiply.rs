// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sopc_core::custom::VectorMultiply;
use sopc_demo::matrix::{multiply_hardware, multiply_software, set_input_matrices};

fn bench_multiply(c: &mut Criterion) {
    let (a, b) = set_input_matrices();
    let mut group = c.benchmark_group("matrix_multiply");

    group.bench_function("software", |bencher| {
        bencher.iter(|| multiply_software(black_box(&a), black_box(&b)))
    });

    let mut unit = VectorMultiply::new();
    group.bench_function("vector_mult", |bencher| {
        bencher.iter(|| multiply_hardware(black_box(&a), black_box(&b), &mut unit))
    });

    group.finish();
}

criterion_group!(benches, bench_multiply);
criterion_main!(benches);
