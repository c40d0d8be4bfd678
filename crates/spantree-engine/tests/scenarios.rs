//! End-to-end election scenarios on both engines.

use std::time::Duration;

use spantree_bridge::{FloodPolicy, Route};
use spantree_engine::{
    ConcurrentEngine, Engine, EngineConfig, RunOutcome, SequentialEngine, StopReason, Topology,
};
use spantree_topology::{edgelist, generate, NodeId};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("spantree_engine=debug"))
        .with_test_writer()
        .try_init();
}

fn concurrent() -> ConcurrentEngine {
    ConcurrentEngine::new(EngineConfig::default().with_worker_threads(2))
}

fn both(edges: &[(u32, u32)], n: usize) -> [spantree_engine::RunReport; 2] {
    init_logging();
    let mut a = Topology::from_edges(n, edges.iter().copied(), FloodPolicy::Full).unwrap();
    let mut b = Topology::from_edges(n, edges.iter().copied(), FloodPolicy::Full).unwrap();
    [
        SequentialEngine::default().run(&mut a).unwrap(),
        concurrent().run(&mut b).unwrap(),
    ]
}

#[test]
fn triangle() {
    for report in both(&[(0, 1), (1, 2), (0, 2)], 3) {
        let tree = report.tree().expect("triangle converges");
        for entry in tree {
            assert_eq!(entry.root, NodeId(0));
        }
        assert_eq!(tree.get(NodeId(1)).unwrap().distance, 1);
        assert_eq!(tree.get(NodeId(2)).unwrap().distance, 1);
        assert_eq!(tree.get(NodeId(1)).unwrap().designated, NodeId(0));
        assert_eq!(tree.get(NodeId(2)).unwrap().designated, NodeId(0));
    }
}

#[test]
fn path_of_four() {
    for report in both(&[(0, 1), (1, 2), (2, 3)], 4) {
        let tree = report.tree().unwrap();
        let distances: Vec<_> = tree.iter().map(|e| e.distance).collect();
        assert_eq!(distances, vec![0, 1, 2, 3]);
        let parents: Vec<_> = tree.parent_edges().collect();
        assert_eq!(
            parents,
            vec![(NodeId(1), NodeId(0)), (NodeId(2), NodeId(1)), (NodeId(3), NodeId(2))]
        );
    }
}

#[test]
fn disconnected_components_converge_separately() {
    // {0, 1} and {2, 3}
    for report in both(&[(0, 1), (2, 3)], 4) {
        let tree = report.tree().unwrap();
        assert_eq!(tree.roots(), vec![NodeId(0), NodeId(2)]);
        assert_eq!(tree.get(NodeId(1)).unwrap().root, NodeId(0));
        assert_eq!(tree.get(NodeId(3)).unwrap().root, NodeId(2));
        assert_eq!(tree.get(NodeId(3)).unwrap().distance, 1);
    }

    // Without the (2, 3) link both are roots of themselves.
    for report in both(&[(0, 1)], 4) {
        let tree = report.tree().unwrap();
        assert_eq!(tree.roots(), vec![NodeId(0), NodeId(2), NodeId(3)]);
    }
}

#[test]
fn single_bridge_is_already_converged() {
    let mut topology = Topology::from_edges(1, [], FloodPolicy::Full).unwrap();
    let report = SequentialEngine::default().run(&mut topology).unwrap();
    assert_eq!(report.rounds, 0);
    assert_eq!(report.tree().unwrap().get(NodeId(0)).unwrap().distance, 0);
}

#[test]
fn sequential_is_deterministic() {
    let graph = generate::random_connected(40, 30, 7);
    let engine = SequentialEngine::new(EngineConfig::default().with_trace(true));

    let mut topology = Topology::new(graph, FloodPolicy::Full).unwrap();
    let first = engine.run(&mut topology).unwrap();
    let second = engine.run(&mut topology).unwrap();

    assert_eq!(first.tree(), second.tree());
    assert_eq!(first.rounds, second.rounds);
    assert_eq!(first.messages, second.messages);
    assert_eq!(first.trace, second.trace);
}

#[test]
fn routes_only_improve() {
    let mut topology = Topology::new(generate::random_connected(30, 25, 11), FloodPolicy::Full).unwrap();
    let report = SequentialEngine::new(EngineConfig::default().with_trace(true))
        .run(&mut topology)
        .unwrap();
    assert!(report.is_converged());
    assert!(!report.trace.is_empty());

    let mut last: Vec<Route> = topology.graph().nodes().map(Route::own).collect();
    for change in &report.trace {
        assert!(change.to < change.from, "{change:?} is not an improvement");
        assert_eq!(last[change.node.index()], change.from);
        last[change.node.index()] = change.to;
    }
    assert_eq!(last, topology.routes());
}

#[test]
fn extra_round_after_convergence_is_idle() {
    let mut topology = Topology::new(generate::grid(5, 4), FloodPolicy::Full).unwrap();
    SequentialEngine::default().run(&mut topology).unwrap();
    let before = topology.routes();
    let summary = topology.round(u64::MAX, None);
    assert_eq!(summary.changed, 0);
    assert_eq!(summary.sent, 0);
    assert_eq!(topology.routes(), before);
}

#[test]
fn root_only_flooding_does_not_cross_a_path() {
    let mut topology = Topology::from_edges(4, [(0, 1), (1, 2), (2, 3)], FloodPolicy::RootOnly).unwrap();
    let report = SequentialEngine::default().run(&mut topology).unwrap();
    let RunOutcome::NotConverged { reason, state } = report.outcome else {
        panic!("root-only flooding should stall");
    };
    assert_eq!(reason, StopReason::Stalled);
    assert!(state.disagreeing.contains(&NodeId(3)));

    let config = EngineConfig::default()
        .with_worker_threads(2)
        .with_max_duration(Duration::from_millis(200));
    let report = ConcurrentEngine::new(config).run(&mut topology).unwrap();
    assert_eq!(report.stop_reason(), Some(StopReason::Deadline));
}

#[test]
fn topology_from_edge_list() {
    let graph = edgelist::parse("5 5\n0 1\n1 2\n2 3\n3 4\n4 0\n").unwrap();
    let mut topology = Topology::new(graph, FloodPolicy::Full).unwrap();
    let report = concurrent().run(&mut topology).unwrap();
    let tree = report.tree().unwrap();
    // Ring of five: 2 and 3 are both two hops out.
    assert_eq!(tree.get(NodeId(2)).unwrap().designated, NodeId(1));
    assert_eq!(tree.get(NodeId(3)).unwrap().designated, NodeId(4));
    assert_eq!(tree.depth(), 2);
}

#[test]
fn topology_reusable_after_adding_an_edge() {
    let mut topology = Topology::from_edges(4, [(0, 1), (2, 3)], FloodPolicy::Full).unwrap();
    let engine = SequentialEngine::default();
    assert_eq!(engine.run(&mut topology).unwrap().tree().unwrap().roots().len(), 2);

    topology.add_edge(NodeId(1), NodeId(3)).unwrap();
    assert_eq!(topology.policy(), FloodPolicy::Full);
    let tree = engine.run(&mut topology).unwrap().into_tree().unwrap();
    assert_eq!(tree.roots(), vec![NodeId(0)]);
    assert_eq!(tree.get(NodeId(2)).unwrap().distance, 3);
}
