use dobfs::bfs::{serial_pull_bfs, serial_push_bfs, PushKernel};
use dobfs::{BfsConfig, BfsEngine, DirectedGraph, SwitchPolicy, UNREACHED};
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use proptest::prelude::*;

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(u32, u32)>, usize)> {
    (1usize..48).prop_flat_map(|n| {
        let id = 0..n as u32;
        (
            Just(n),
            proptest::collection::vec((id.clone(), id), 0..(n * 4)),
            0..n,
        )
    })
}

fn policy_strategy() -> impl Strategy<Value = SwitchPolicy> {
    prop_oneof![
        Just(SwitchPolicy::Adaptive),
        Just(SwitchPolicy::Beamer),
        Just(SwitchPolicy::AlwaysPush),
        Just(SwitchPolicy::AlwaysPull),
    ]
}

fn kernel_strategy() -> impl Strategy<Value = PushKernel> {
    let mut kernels = vec![PushKernel::VertexCentric, PushKernel::ScatterGather];
    #[cfg(feature = "parallel")]
    kernels.push(PushKernel::Parallel);
    proptest::sample::select(kernels)
}

/// Unit-weight shortest paths from petgraph.
fn petgraph_depths(n: usize, edges: &[(u32, u32)], start: usize) -> Vec<i32> {
    let mut g = DiGraph::<(), ()>::with_capacity(n, edges.len());
    for _ in 0..n {
        g.add_node(());
    }
    for &(u, v) in edges {
        g.add_edge(NodeIndex::new(u as usize), NodeIndex::new(v as usize), ());
    }
    let dist = dijkstra(&g, NodeIndex::new(start), None, |_| 1i32);
    (0..n)
        .map(|v| dist.get(&NodeIndex::new(v)).copied().unwrap_or(UNREACHED))
        .collect()
}

proptest! {
    #[test]
    fn test_engine_matches_serial_oracles(
        (n, edges, start) in graph_strategy(),
        policy in policy_strategy(),
        cache_lines in 1usize..8,
        use_cache in any::<bool>(),
        early_exit in any::<bool>(),
        kernel in kernel_strategy(),
    ) {
        let g = DirectedGraph::from_edges(n, &edges).unwrap();
        let config = BfsConfig::default()
            .with_policy(policy)
            .with_cache(use_cache)
            .with_cache_lines(cache_lines)
            .with_early_exit(early_exit)
            .with_push_kernel(kernel);

        let out = BfsEngine::<4>::new(g.forward(), g.reverse(), config)
            .unwrap()
            .run(start)
            .unwrap();

        let expected = serial_push_bfs(g.forward(), start);
        prop_assert_eq!(&out.depths, &expected);
        prop_assert_eq!(serial_pull_bfs(g.reverse(), start), expected);
        prop_assert_eq!(out.depths[start], 0);
    }

    #[test]
    fn test_engine_matches_petgraph((n, edges, start) in graph_strategy()) {
        let g = DirectedGraph::from_edges(n, &edges).unwrap();
        let out = BfsEngine::<16>::new(g.forward(), g.reverse(), BfsConfig::default())
            .unwrap()
            .run(start)
            .unwrap();
        prop_assert_eq!(out.depths, petgraph_depths(n, &edges, start));
    }

    #[test]
    fn test_epochs_partition_explored_nodes((n, edges, start) in graph_strategy()) {
        let g = DirectedGraph::from_edges(n, &edges).unwrap();
        let out = BfsEngine::<8>::new(g.forward(), g.reverse(), BfsConfig::default())
            .unwrap()
            .run(start)
            .unwrap();

        let reached = out.depths.iter().filter(|&&d| d != UNREACHED).count() as u64;
        prop_assert_eq!(out.report.nodes_explored(), reached);
        prop_assert_eq!(out.report.epochs.last().map(|e| e.stats.nodes_updated), Some(0));
        prop_assert!(out.report.epochs[..out.report.epochs.len() - 1]
            .iter()
            .all(|e| e.stats.nodes_updated > 0));
    }
}
