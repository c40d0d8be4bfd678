//! Random-graph properties of the election.

use proptest::prelude::*;
use spantree_bridge::FloodPolicy;
use spantree_engine::{ConcurrentEngine, Engine, EngineConfig, FinalTree, SequentialEngine, Topology};
use spantree_topology::{Graph, NodeId};

/// Random graph that may be disconnected.
fn graph() -> impl Strategy<Value = Graph> {
    (1usize..24).prop_flat_map(|n| {
        let edge = (0..n as u32, 0..n as u32);
        prop::collection::vec(edge, 0..n * 2).prop_map(move |edges| {
            let mut graph = Graph::new(n);
            for (u, v) in edges {
                if u != v {
                    graph.add_edge(NodeId(u), NodeId(v)).unwrap();
                }
            }
            graph
        })
    })
}

/// Every bridge sits on a shortest path to its component's smallest id,
/// through its smallest neighbor on such a path.
fn assert_shortest_path_tree(graph: &Graph, tree: &FinalTree) {
    let components = graph.components();
    for entry in tree {
        let root = components.representative(entry.node);
        assert_eq!(entry.root, root);

        let distances = graph.bfs_distances(root);
        assert_eq!(Some(entry.distance), distances[entry.node.index()]);

        if entry.node == root {
            assert_eq!(entry.designated, root);
        } else {
            let parent = graph
                .neighbors(entry.node)
                .iter()
                .copied()
                .filter(|n| distances[n.index()] == Some(entry.distance - 1))
                .min();
            assert_eq!(Some(entry.designated), parent);
        }
    }
}

proptest! {
    #[test]
    fn sequential_builds_shortest_path_tree(graph in graph()) {
        let mut topology = Topology::new(graph.clone(), FloodPolicy::Full).unwrap();
        let report = SequentialEngine::default().run(&mut topology).unwrap();
        let tree = report.tree().expect("full flooding always converges");
        prop_assert_eq!(tree.len(), graph.vertex_count());
        assert_shortest_path_tree(&graph, tree);
    }

    #[test]
    fn empty_update_is_idempotent(graph in graph(), rounds in 0u64..4) {
        let mut topology = Topology::new(graph, FloodPolicy::Full).unwrap();
        topology.restart();
        for round in 1..=rounds {
            topology.round(round, None);
        }
        // Drain what is in flight, then an update with nothing queued must
        // leave every route alone.
        while topology.round(0, None).sent > 0 {}
        let before = topology.routes();
        prop_assert_eq!(topology.round(0, None).changed, 0);
        prop_assert_eq!(topology.routes(), before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn concurrent_matches_sequential(graph in graph()) {
        let mut a = Topology::new(graph.clone(), FloodPolicy::Full).unwrap();
        let mut b = Topology::new(graph, FloodPolicy::Full).unwrap();
        let seq = SequentialEngine::default().run(&mut a).unwrap();
        let conc = ConcurrentEngine::new(EngineConfig::default().with_worker_threads(2))
            .run(&mut b)
            .unwrap();
        prop_assert!(conc.is_converged());
        prop_assert_eq!(seq.tree(), conc.tree());
    }
}
