//! Criterion benchmarks for the expression-graph substrate.
//!
//! Measures graph overhead independently of any particular effect using a
//! synthetic arithmetic chain. Two axes:
//!
//! - **Compile** — reachability marking + schedule construction
//! - **Execute** — `process_block()` throughput at varying block sizes
//!
//! Run with: `cargo bench -p grafo-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use grafo_core::{Graph, Signal};

const SAMPLE_RATE: f32 = 48000.0;
const CHAIN_DEPTH: usize = 64;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

/// A deep alternating add/mul chain with an envelope follower and a select —
/// one of every node class, scaled by depth.
fn build_chain(depth: usize) -> (Graph, Signal) {
    let mut g = Graph::new(SAMPLE_RATE);
    let x = g.input();
    let attack = g.tau2pole(0.010);
    let release = g.tau2pole(0.100);
    let env = g.env(attack, release, x);
    let env_db = g.gain2db(env);

    let mut acc = env_db;
    for i in 0..depth {
        let c = g.constant(0.25 + i as f32 * 0.01);
        acc = if i % 2 == 0 { g.add(acc, c) } else { g.mul(acc, c) };
    }
    let gate = g.geq(acc, -20.0);
    let gated = g.select(gate, acc, 0.0);
    let lin = g.db2gain(gated);
    let out = g.mul(x, lin);
    (g, out)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    let (graph, out) = build_chain(CHAIN_DEPTH);
    c.bench_function("graph/compile", |b| {
        b.iter(|| black_box(graph.compile(out).unwrap()));
    });
}

fn bench_execute(c: &mut Criterion) {
    let (graph, out) = build_chain(CHAIN_DEPTH);
    let mut run = graph.compile(out).unwrap();

    let mut group = c.benchmark_group("graph/execute");
    for &block_size in BLOCK_SIZES {
        let input: Vec<f32> = (0..block_size)
            .map(|n| libm::sinf(n as f32 * 0.05) * 0.8)
            .collect();
        let inputs: [&[f32]; 1] = [&input];
        let mut output = vec![0.0f32; block_size];
        group.throughput(criterion::Throughput::Elements(block_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    run.process_block(black_box(&inputs), black_box(&mut output))
                        .unwrap();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_execute);
criterion_main!(benches);
