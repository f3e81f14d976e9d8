use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dobfs::bfs::serial_push_bfs;
use dobfs::{BfsConfig, BfsEngine, DirectedGraph, NodeId, SwitchPolicy};

/// Deterministic pseudo-random graph with a heavy-tailed out-degree, so the
/// frontier grows fast enough for pull epochs to pay off.
fn synthetic_graph(nodes: usize, avg_degree: usize) -> DirectedGraph {
    let mut state = 0x9E37_79B9_7F4A_7C15_u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut edges = Vec::with_capacity(nodes * avg_degree);
    for u in 0..nodes {
        let degree = if u % 16 == 0 { avg_degree * 8 } else { avg_degree / 2 };
        for _ in 0..degree {
            let v = (next() % nodes as u64) as NodeId;
            edges.push((u as NodeId, v));
        }
    }
    DirectedGraph::from_edges(nodes, &edges).unwrap()
}

fn bench_policies(c: &mut Criterion) {
    let g = synthetic_graph(20_000, 8);
    let mut group = c.benchmark_group("bfs_policy");
    for (name, policy) in [
        ("adaptive", SwitchPolicy::Adaptive),
        ("beamer", SwitchPolicy::Beamer),
        ("push", SwitchPolicy::AlwaysPush),
        ("pull", SwitchPolicy::AlwaysPull),
    ] {
        let engine = BfsEngine::<16>::new(g.forward(), g.reverse(), BfsConfig::default().with_policy(policy))
            .unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(engine.run(0).unwrap())));
    }
    group.bench_function("serial_oracle", |b| {
        b.iter(|| black_box(serial_push_bfs(g.forward(), 0)));
    });
    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let g = synthetic_graph(20_000, 8);
    let mut group = c.benchmark_group("bfs_pull_cache");
    let base = BfsConfig::default().with_policy(SwitchPolicy::AlwaysPull);

    let direct = BfsEngine::<16>::new(g.forward(), g.reverse(), base.clone().with_cache(false)).unwrap();
    group.bench_function("no_cache", |b| b.iter(|| black_box(direct.run(0).unwrap())));

    for lines in [1usize, 64, 1024, 16_384] {
        let engine =
            BfsEngine::<16>::new(g.forward(), g.reverse(), base.clone().with_cache_lines(lines)).unwrap();
        group.bench_with_input(BenchmarkId::new("lines", lines), &engine, |b, engine| {
            b.iter(|| black_box(engine.run(0).unwrap()));
        });
    }

    let no_exit = BfsEngine::<16>::new(g.forward(), g.reverse(), base.with_early_exit(false)).unwrap();
    group.bench_function("no_early_exit", |b| b.iter(|| black_box(no_exit.run(0).unwrap())));
    group.finish();
}

criterion_group!(benches, bench_policies, bench_cache);
criterion_main!(benches);
