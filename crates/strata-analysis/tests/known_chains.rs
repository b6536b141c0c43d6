//! Known-topology regression tests for the analysis pipeline.
//!
//! Each test uses a small hand-written chain whose classes, labels, periods
//! and convergence behaviour can be worked out on paper.

use strata_analysis::matrix::{converge_powers, period};
use strata_analysis::{
    ChainAnalysis, ClassKind, Matrix, Period, build_links, classify, decompose, reduce_transitive,
};
use strata_core::{AnalysisConfig, Graph, parse_graph};

fn graph(n: usize, edges: &[(usize, usize, f64)]) -> Graph {
    Graph::from_edges(n, edges).expect("valid graph")
}

fn analyze(g: &Graph) -> ChainAnalysis {
    ChainAnalysis::run(g, &AnalysisConfig::default()).expect("analysis")
}

// ---------------------------------------------------------------------------
// Single absorbing state
// ---------------------------------------------------------------------------

#[test]
fn self_loop_is_absorbing() {
    let g = graph(1, &[(1, 1, 1.0)]);
    let a = analyze(&g);

    assert_eq!(a.partition.len(), 1);
    assert_eq!(a.partition.classes()[0].members(), &[1]);
    assert!(a.links.is_empty());
    assert!(a.hasse.is_empty());
    assert!(a.classification.irreducible);

    let class = &a.classes[0];
    assert_eq!(class.kind, ClassKind::Persistent);
    assert!(class.absorbing);
    assert_eq!(class.period, Period::Periodic(1));
    assert!(class.converged);
    assert!((class.mass - 1.0).abs() < 1e-9);
    assert!(a.labels_consistent());
}

// ---------------------------------------------------------------------------
// Two-cycle
// ---------------------------------------------------------------------------

#[test]
fn two_cycle_merges_into_one_class_of_period_two() {
    let g = graph(2, &[(1, 2, 1.0), (2, 1, 1.0)]);
    let a = analyze(&g);

    assert_eq!(a.partition.len(), 1);
    let mut members = a.partition.classes()[0].members().to_vec();
    members.sort_unstable();
    assert_eq!(members, vec![1, 2]);
    assert!(a.classification.irreducible);

    let class = &a.classes[0];
    assert_eq!(class.kind, ClassKind::Persistent);
    assert!(!class.absorbing);
    assert_eq!(class.period, Period::Periodic(2));

    // Uniform is already the fixed point of the swap.
    assert!(class.converged);
    assert!((class.limiting[0] - 0.5).abs() < 1e-12);
    assert!((class.limiting[1] - 0.5).abs() < 1e-12);

    // The full matrix alternates between P and the identity.
    assert!(!a.chain.converged);
    assert_eq!(a.chain.iterations, AnalysisConfig::default().chain.max_iter);
}

// ---------------------------------------------------------------------------
// Transitive state feeding an absorbing one
// ---------------------------------------------------------------------------

#[test]
fn transitive_feeds_absorbing() {
    let g = graph(2, &[(1, 2, 1.0), (2, 2, 1.0)]);
    let a = analyze(&g);

    assert_eq!(a.partition.len(), 2);
    assert!(!a.classification.irreducible);

    let one = a.class_of(1).expect("class of 1");
    let two = a.class_of(2).expect("class of 2");
    assert_eq!(one.kind, ClassKind::Transitive);
    assert!(!one.absorbing);
    assert_eq!(two.kind, ClassKind::Persistent);
    assert!(two.absorbing);

    assert_eq!(a.hasse.len(), 1);
    assert!(a.hasse.contains(one.index, two.index));

    // Vertex 1 has no self-return.
    assert_eq!(one.period, Period::Undetermined);
    assert!(one.mass < 1e-9);
    assert!(a.labels_consistent());
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn aperiodic_chain_converges() {
    let m = Matrix::from_rows(&[vec![0.5, 0.5], vec![0.2, 0.8]]).expect("square");
    let result = converge_powers(&m, 0.01, 10_000);

    assert!(result.converged);
    assert!(result.iterations < 10_000);
    assert!(result.residual < 0.01);

    // Every row approaches the stationary distribution (2/7, 5/7).
    for row in result.value.rows() {
        assert!((row[0] - 2.0 / 7.0).abs() < 0.01);
        assert!((row[1] - 5.0 / 7.0).abs() < 0.01);
    }
}

#[test]
fn periodic_two_class_chain_does_not_converge() {
    let g = graph(3, &[(1, 2, 1.0), (2, 1, 1.0), (3, 1, 1.0)]);
    let m = Matrix::from_graph(&g);
    let result = converge_powers(&m, 0.01, 10_000);

    assert!(!result.converged);
    assert_eq!(result.iterations, 10_000);
    assert!(result.residual >= 0.01);

    let a = analyze(&g);
    assert_eq!(a.partition.len(), 2);
    let cycle = a.class_of(1).expect("cycle class");
    assert_eq!(cycle.period, Period::Periodic(2));
    assert_eq!(cycle.kind, ClassKind::Persistent);
}

// ---------------------------------------------------------------------------
// A larger mixed chain
// ---------------------------------------------------------------------------

/// Ten states: a transient cycle {1,2,3} leaking into a persistent
/// period-3 cycle {4,5,6} and an absorbing state 7; {8,9} is a transient
/// pair leaking into {1,2,3} and directly into 7, and 10 feeds 8.
const MIXED: &str = "\
10
1 2 0.5
1 4 0.5
2 3 1.0
3 1 0.8
3 7 0.2
4 5 1.0
5 6 1.0
6 4 1.0
7 7 1.0
8 9 0.5
8 1 0.5
9 8 0.9
9 7 0.1
10 8 1.0
";

#[test]
fn mixed_chain_structure() {
    let g = parse_graph(MIXED).expect("parse").graph;
    let a = analyze(&g);

    assert!(a.stochastic.is_markov());
    assert_eq!(a.partition.len(), 5);

    let cycle = a.class_of(1).expect("class");
    let periodic = a.class_of(4).expect("class");
    let absorbing = a.class_of(7).expect("class");
    let pair = a.class_of(8).expect("class");
    let feeder = a.class_of(10).expect("class");

    assert_eq!(cycle.members.len(), 3);
    assert_eq!(periodic.members.len(), 3);
    assert_eq!(pair.members.len(), 2);

    assert_eq!(cycle.kind, ClassKind::Transitive);
    assert_eq!(pair.kind, ClassKind::Transitive);
    assert_eq!(feeder.kind, ClassKind::Transitive);
    assert_eq!(periodic.kind, ClassKind::Persistent);
    assert_eq!(absorbing.kind, ClassKind::Persistent);
    assert!(absorbing.absorbing);
    assert!(!periodic.absorbing);

    assert_eq!(periodic.period, Period::Periodic(3));
    assert_eq!(absorbing.period, Period::Periodic(1));
    assert_eq!(feeder.period, Period::Undetermined);

    // pair -> 7 is implied by pair -> cycle -> 7 and must be reduced away.
    assert!(a.links.contains(pair.index, absorbing.index));
    assert!(!a.hasse.contains(pair.index, absorbing.index));
    assert!(a.hasse.contains(pair.index, cycle.index));
    assert!(a.hasse.contains(cycle.index, absorbing.index));
    assert!(a.hasse.contains(cycle.index, periodic.index));
    assert!(a.hasse.contains(feeder.index, pair.index));
    assert_eq!(a.hasse.len(), 4);

    assert!(a.labels_consistent());
}

#[test]
fn absorbing_states_listed_from_classification() {
    let g = parse_graph(MIXED).expect("parse").graph;
    let partition = decompose(&g);
    let hasse = reduce_transitive(&build_links(&g, &partition.vertex_to_class())).expect("acyclic");
    let classification = classify(&partition, &hasse);

    assert_eq!(classification.absorbing_states(&partition), vec![7]);
    assert_eq!(classification.persistent().count(), 2);
    assert_eq!(classification.transitive().count(), 3);
}

#[test]
fn period_of_mixed_cycle_lengths() {
    // Cycles of length 2 and 3 through vertex 1 give gcd 1.
    let g = graph(
        4,
        &[(1, 2, 0.5), (2, 1, 1.0), (1, 3, 0.5), (3, 4, 1.0), (4, 1, 1.0)],
    );
    let m = Matrix::from_graph(&g);
    assert_eq!(period(&m), Period::Periodic(1));
}

#[test]
fn analysis_serializes_to_json() {
    let g = graph(2, &[(1, 2, 1.0), (2, 2, 1.0)]);
    let a = analyze(&g);
    let json = serde_json::to_value(&a).expect("serialize");

    assert_eq!(json["vertex_count"], 2);
    assert_eq!(json["classification"]["irreducible"], false);
    assert_eq!(json["hasse"].as_array().map(Vec::len), Some(1));

    let classes = json["classes"].as_array().expect("classes array");
    let absorbing = classes
        .iter()
        .find(|c| c["absorbing"] == true)
        .expect("absorbing class");
    assert_eq!(absorbing["kind"], "persistent");
    assert_eq!(absorbing["members"], serde_json::json!([2]));
    assert_eq!(absorbing["period"], serde_json::json!({ "periodic": 1 }));

    let transient = classes
        .iter()
        .find(|c| c["kind"] == "transitive")
        .expect("transitive class");
    assert_eq!(transient["period"], "undetermined");
}
