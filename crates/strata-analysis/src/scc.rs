//! Communicating classes via Tarjan's strongly connected components.
//!
//! # Overview
//!
//! Two states communicate when each is reachable from the other. The
//! communicating classes of a chain are exactly the strongly connected
//! components of its transition graph, which this module computes with
//! Tarjan's algorithm.
//!
//! # Ordering
//!
//! Roots are tried in ascending vertex id order and each vertex's edges are
//! followed in insertion order. A class is emitted when its root closes, so
//! classes come out in reverse topological order of the class graph (sinks
//! first). Classes are named `C1`, `C2`, … in emission order and members are
//! listed in the order they are popped off the Tarjan stack.
//!
//! # Depth
//!
//! The depth-first search runs on an explicit frame stack instead of the call
//! stack, so long simple paths cannot overflow the thread stack. The frame
//! stack reproduces the recursive formulation step for step, so the output
//! order is the same as the textbook recursive version.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use strata_core::{Graph, VertexId};
use tracing::{debug, instrument};

/// 1-based index of a class within a [`Partition`].
pub type ClassIndex = usize;

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// One communicating class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    name: String,
    members: Vec<VertexId>,
}

impl Class {
    /// Stable display name (`C1`, `C2`, …).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member vertices, in discovery (stack pop) order.
    #[must_use]
    pub fn members(&self) -> &[VertexId] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Return `true` if the class has exactly one member.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.members.contains(&vertex)
    }
}

/// The communicating classes of a chain.
///
/// Every vertex of the source graph belongs to exactly one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    vertex_count: usize,
    classes: Vec<Class>,
}

impl Partition {
    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of vertices in the partitioned graph.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Classes in emission order.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Look up a class by its 1-based index.
    #[must_use]
    pub fn class(&self, index: ClassIndex) -> Option<&Class> {
        index.checked_sub(1).and_then(|i| self.classes.get(i))
    }

    /// Iterate over `(index, class)` pairs with 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, &Class)> + '_ {
        self.classes.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    /// Build the vertex → class lookup table.
    #[must_use]
    pub fn vertex_to_class(&self) -> VertexClassMap {
        let mut map = vec![0; self.vertex_count];
        for (index, class) in self.iter() {
            for &vertex in class.members() {
                map[vertex - 1] = index;
            }
        }
        VertexClassMap { map }
    }
}

/// Total map from vertex id to the 1-based index of its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexClassMap {
    map: Vec<ClassIndex>,
}

impl VertexClassMap {
    /// Class of `vertex`, or `None` for ids outside the graph.
    #[must_use]
    pub fn class_of(&self, vertex: VertexId) -> Option<ClassIndex> {
        vertex
            .checked_sub(1)
            .and_then(|i| self.map.get(i))
            .copied()
    }

    /// Return `true` if both vertices lie in the same class.
    #[must_use]
    pub fn same_class(&self, a: VertexId, b: VertexId) -> bool {
        matches!((self.class_of(a), self.class_of(b)), (Some(x), Some(y)) if x == y)
    }
}

// ---------------------------------------------------------------------------
// Tarjan
// ---------------------------------------------------------------------------

/// Decompose `graph` into its communicating classes.
///
/// Deterministic for a fixed graph and edge insertion order. A vertex with no
/// outgoing edges, or only a self-loop, forms its own singleton class.
///
/// The graph must satisfy the target-range invariant, which [`Graph`]
/// enforces on construction.
#[must_use]
#[instrument(skip(graph), fields(vertices = graph.vertex_count()))]
pub fn decompose(graph: &Graph) -> Partition {
    let mut tarjan = Tarjan::new(graph.vertex_count());

    for root in graph.vertices() {
        if tarjan.index[root - 1].is_none() {
            tarjan.strong_connect(graph, root);
        }
    }

    debug!(classes = tarjan.classes.len(), "decomposition complete");

    Partition {
        vertex_count: graph.vertex_count(),
        classes: tarjan.classes,
    }
}

/// Mutable search state shared by every root.
struct Tarjan {
    next_index: usize,
    /// Discovery index, `None` while unvisited.
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<VertexId>,
    classes: Vec<Class>,
}

impl Tarjan {
    fn new(vertex_count: usize) -> Self {
        Self {
            next_index: 0,
            index: vec![None; vertex_count],
            lowlink: vec![0; vertex_count],
            on_stack: vec![false; vertex_count],
            stack: Vec::with_capacity(vertex_count),
            classes: Vec::new(),
        }
    }

    fn visit(&mut self, v: VertexId) {
        self.index[v - 1] = Some(self.next_index);
        self.lowlink[v - 1] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v - 1] = true;
    }

    fn strong_connect(&mut self, graph: &Graph, root: VertexId) {
        // Each frame is (vertex, position of the next edge to follow).
        let mut frames: Vec<(VertexId, usize)> = vec![(root, 0)];
        self.visit(root);

        while let Some(&(v, pos)) = frames.last() {
            if let Some(edge) = graph.edges(v).get(pos) {
                let top = frames.len() - 1;
                frames[top].1 += 1;

                let w = edge.target;
                match self.index[w - 1] {
                    None => {
                        self.visit(w);
                        frames.push((w, 0));
                    }
                    Some(w_index) if self.on_stack[w - 1] => {
                        self.lowlink[v - 1] = self.lowlink[v - 1].min(w_index);
                    }
                    // Edge into an already closed class.
                    Some(_) => {}
                }
                continue;
            }

            // All edges of `v` explored: this is the return from the recursive call.
            frames.pop();
            if self.index[v - 1] == Some(self.lowlink[v - 1]) {
                self.close_class(v);
            }
            if let Some(&(parent, _)) = frames.last() {
                self.lowlink[parent - 1] = self.lowlink[parent - 1].min(self.lowlink[v - 1]);
            }
        }
    }

    /// Pop the stack down to and including `root` into a new class.
    fn close_class(&mut self, root: VertexId) {
        let mut members = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack[w - 1] = false;
            members.push(w);
            if w == root {
                break;
            }
        }

        let name = format!("C{}", self.classes.len() + 1);
        debug!(%name, size = members.len(), "class closed");
        self.classes.push(Class { name, members });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Graph {
        let weighted: Vec<(usize, usize, f64)> = edges.iter().map(|&(a, b)| (a, b, 1.0)).collect();
        Graph::from_edges(n, &weighted).expect("valid test graph")
    }

    fn member_sets(p: &Partition) -> Vec<Vec<VertexId>> {
        p.classes()
            .iter()
            .map(|c| {
                let mut m = c.members().to_vec();
                m.sort_unstable();
                m
            })
            .collect()
    }

    #[test]
    fn self_loop_is_singleton_class() {
        let p = decompose(&graph(1, &[(1, 1)]));
        assert_eq!(p.len(), 1);
        assert_eq!(p.classes()[0].name(), "C1");
        assert_eq!(p.classes()[0].members(), &[1]);
    }

    #[test]
    fn two_cycle_merges() {
        let p = decompose(&graph(2, &[(1, 2), (2, 1)]));
        assert_eq!(member_sets(&p), vec![vec![1, 2]]);
    }

    #[test]
    fn sink_class_is_emitted_first() {
        // 1 -> 2, 2 -> 2: class {2} closes before {1}.
        let p = decompose(&graph(2, &[(1, 2), (2, 2)]));
        assert_eq!(p.classes()[0].members(), &[2]);
        assert_eq!(p.classes()[1].members(), &[1]);
        assert_eq!(p.classes()[0].name(), "C1");
        assert_eq!(p.classes()[1].name(), "C2");
    }

    #[test]
    fn members_are_in_pop_order() {
        // DFS visits 1, 2, 3; the stack pops 3, 2, 1.
        let p = decompose(&graph(3, &[(1, 2), (2, 3), (3, 1)]));
        assert_eq!(p.classes()[0].members(), &[3, 2, 1]);
    }

    #[test]
    fn isolated_vertices_are_singletons() {
        let p = decompose(&graph(3, &[]));
        assert_eq!(member_sets(&p), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn edge_into_closed_class_is_ignored() {
        // Root 1 closes {2,3} first; a later edge 4 -> 2 must not merge 4 into it.
        let p = decompose(&graph(4, &[(1, 2), (2, 3), (3, 2), (4, 2), (4, 4)]));
        assert_eq!(member_sets(&p), vec![vec![2, 3], vec![1], vec![4]]);
    }

    #[test]
    fn mixed_topology() {
        // {1,2,3} cycle feeding {4,5} cycle, 6 isolated with self-loop.
        let p = decompose(&graph(
            6,
            &[(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 4), (6, 6)],
        ));
        assert_eq!(member_sets(&p), vec![vec![4, 5], vec![1, 2, 3], vec![6]]);
    }

    #[test]
    fn vertex_to_class_is_total() {
        let p = decompose(&graph(4, &[(1, 2), (2, 1), (3, 4)]));
        let map = p.vertex_to_class();

        for v in 1..=4 {
            let c = map.class_of(v).expect("every vertex has a class");
            assert!(p.class(c).expect("class exists").contains(v));
        }
        assert!(map.same_class(1, 2));
        assert!(!map.same_class(3, 4));
        assert_eq!(map.class_of(0), None);
        assert_eq!(map.class_of(5), None);
    }

    #[test]
    fn long_path_does_not_overflow() {
        let n = 200_000;
        let edges: Vec<(usize, usize)> = (1..n).map(|v| (v, v + 1)).collect();
        let p = decompose(&graph(n, &edges));
        assert_eq!(p.len(), n);
        assert_eq!(p.classes()[0].members(), &[n], "the deepest vertex closes first");
    }

    #[test]
    fn empty_graph_has_no_classes() {
        let p = decompose(&Graph::new(0));
        assert!(p.is_empty());
        assert_eq!(p.vertex_count(), 0);
    }

    #[test]
    fn class_lookup_is_one_based() {
        let p = decompose(&graph(1, &[(1, 1)]));
        assert!(p.class(0).is_none());
        assert_eq!(p.class(1).map(Class::name), Some("C1"));
        assert!(p.class(2).is_none());
    }
}
