//! Benchmarks for the convergence engines
//!
//! Measures:
//! - Sequential runs on grids and random graphs
//! - Concurrent runs on random graphs
//! - Oracle checks on a converged topology

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spantree_bridge::FloodPolicy;
use spantree_engine::{ConcurrentEngine, Engine, EngineConfig, SequentialEngine, Topology};
use spantree_topology::generate;

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    let engine = SequentialEngine::default();

    for &side in &[8usize, 16, 32] {
        let mut topology = Topology::new(generate::grid(side, side), FloodPolicy::Full).unwrap();
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_function(BenchmarkId::new("grid", side), |b| {
            b.iter(|| engine.run(black_box(&mut topology)).unwrap())
        });
    }

    for &n in &[100usize, 1_000] {
        let mut topology = Topology::new(generate::random_connected(n, n, 42), FloodPolicy::Full).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("random", n), |b| {
            b.iter(|| engine.run(black_box(&mut topology)).unwrap())
        });
    }
    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");
    group.sample_size(10);
    let engine = ConcurrentEngine::new(EngineConfig::default());

    for &n in &[100usize, 1_000] {
        let mut topology = Topology::new(generate::random_connected(n, n, 42), FloodPolicy::Full).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::new("random", n), |b| {
            b.iter(|| engine.run(black_box(&mut topology)).unwrap())
        });
    }
    group.finish();
}

fn bench_oracle(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle");

    for &side in &[32usize, 100] {
        let mut topology = Topology::new(generate::grid(side, side), FloodPolicy::Full).unwrap();
        SequentialEngine::default().run(&mut topology).unwrap();
        let routes = topology.routes();
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("grid", side), &routes, |b, routes| {
            b.iter(|| topology.oracle().is_converged(black_box(routes)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequential, bench_concurrent, bench_oracle);
criterion_main!(benches);
