//! Benchmarks for spantree topologies
//!
//! Measures performance of:
//! - Topology generation
//! - Component labelling
//! - BFS reference distances
//! - Edge-list parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spantree_topology::{edgelist, generate, NodeId};

/// Benchmark random connected graph generation
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_connected");

    for &n in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| generate::random_connected(black_box(n), n / 2, 42))
        });
    }
    group.finish();
}

/// Benchmark component labelling on graphs with many components
fn bench_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("components");

    for &side in &[10usize, 50, 100] {
        let g = generate::grid(side, side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("grid", side), &g, |b, g| {
            b.iter(|| black_box(g).components())
        });
    }
    group.finish();
}

/// Benchmark BFS from the root corner
fn bench_bfs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfs_distances");

    for &side in &[10usize, 50, 100] {
        let g = generate::grid(side, side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("grid", side), &g, |b, g| {
            b.iter(|| g.bfs_distances(black_box(NodeId(0))))
        });
    }
    group.finish();
}

/// Benchmark edge-list parsing
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("edgelist_parse");

    for &n in &[1_000usize, 10_000] {
        let text = edgelist::render(&generate::random_connected(n, n, 7));
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| edgelist::parse(black_box(text)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_components, bench_bfs, bench_parse);
criterion_main!(benches);
