//! Class graph construction and transitive reduction (Hasse diagram).
//!
//! # Overview
//!
//! Every transition `u → v` between two different classes induces a link
//! `class(u) → class(v)`. The resulting [`LinkSet`] is the quotient graph of
//! the chain; since every node is a maximal SCC it is always acyclic.
//!
//! [`reduce_transitive`] then removes every link `a → b` for which another
//! path `a → … → b` exists. The result is the unique minimal link set with
//! the same reachability relation: the Hasse diagram of the class order.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};
use serde::Serialize;
use strata_core::{Graph, error::ErrorCode};
use tracing::{debug, instrument};

use crate::scc::{ClassIndex, VertexClassMap};

// ---------------------------------------------------------------------------
// LinkSet
// ---------------------------------------------------------------------------

/// A directed link between two distinct classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub from: ClassIndex,
    pub to: ClassIndex,
}

/// Duplicate-free links between classes, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkSet {
    links: Vec<Link>,
}

impl LinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `from → to` unless it is a self-link or already present.
    ///
    /// Returns `true` if the link was added. Duplicate detection is a linear
    /// scan; the number of classes is small relative to the number of vertices.
    pub fn insert(&mut self, from: ClassIndex, to: ClassIndex) -> bool {
        if from == to || self.contains(from, to) {
            return false;
        }
        self.links.push(Link { from, to });
        true
    }

    #[must_use]
    pub fn contains(&self, from: ClassIndex, to: ClassIndex) -> bool {
        self.links.iter().any(|l| l.from == from && l.to == to)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter()
    }

    /// Return `true` if `class` is the source of at least one link.
    #[must_use]
    pub fn has_outgoing(&self, class: ClassIndex) -> bool {
        self.links.iter().any(|l| l.from == class)
    }

    /// Direct successors of `class`, in insertion order.
    pub fn successors(&self, class: ClassIndex) -> impl Iterator<Item = ClassIndex> + '_ {
        self.links
            .iter()
            .filter(move |l| l.from == class)
            .map(|l| l.to)
    }

    /// Return `true` if a path of one or more links leads from `from` to `to`.
    #[must_use]
    pub fn reaches(&self, from: ClassIndex, to: ClassIndex) -> bool {
        let mut seen = vec![from];
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if next == to {
                    return true;
                }
                if !seen.contains(&next) {
                    seen.push(next);
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build the class graph induced by `graph`'s transitions.
///
/// Links appear in the order of the first transition inducing them
/// (vertices ascending, edges in insertion order).
#[must_use]
#[instrument(skip(graph, classes))]
pub fn build_links(graph: &Graph, classes: &VertexClassMap) -> LinkSet {
    let mut links = LinkSet::new();
    for (from, edge) in graph.transitions() {
        if let (Some(cu), Some(cv)) = (classes.class_of(from), classes.class_of(edge.target)) {
            links.insert(cu, cv);
        }
    }
    debug!(links = links.len(), "class links built");
    links
}

// ---------------------------------------------------------------------------
// Transitive reduction
// ---------------------------------------------------------------------------

/// Errors raised by [`reduce_transitive`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotientError {
    /// The link set contains a cycle through `class`; reduction is only
    /// defined on acyclic class graphs.
    #[error("class graph contains a cycle through C{class}")]
    Cyclic { class: ClassIndex },

    /// Class indices are 1-based.
    #[error("link {from} -> {to} uses class index 0")]
    ZeroClassIndex { from: ClassIndex, to: ClassIndex },
}

impl QuotientError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Cyclic { .. } => ErrorCode::QuotientCyclic,
            Self::ZeroClassIndex { .. } => ErrorCode::InternalUnexpected,
        }
    }
}

/// Compute the transitive reduction of an acyclic link set.
///
/// A link `(a, b)` is dropped when `b` is reachable from some other direct
/// successor `w ≠ b` of `a`. Surviving links keep their insertion order, so
/// reducing an already reduced set returns it unchanged.
///
/// # Algorithm
///
/// Classes are visited in reverse topological order (sinks first). For each
/// class `u` the set of classes reachable from it is the union, over its
/// successors `v`, of `{v}` and the reachable set of `v`. Reachable sets are
/// bitsets indexed by class.
///
/// # Errors
///
/// Returns [`QuotientError::Cyclic`] if the links contain a cycle, and
/// [`QuotientError::ZeroClassIndex`] if a link uses index 0.
#[instrument(skip(links), fields(links = links.len()))]
pub fn reduce_transitive(links: &LinkSet) -> Result<LinkSet, QuotientError> {
    let g = class_digraph(links)?;

    let topo = toposort(&g, None).map_err(|cycle| QuotientError::Cyclic {
        class: g[cycle.node_id()],
    })?;

    let n = g.node_count();
    let mut reachable: Vec<FixedBitSet> = vec![FixedBitSet::with_capacity(n); n];
    for &u in topo.iter().rev() {
        let mut reach_u = FixedBitSet::with_capacity(n);
        for v in g.neighbors_directed(u, Direction::Outgoing) {
            reach_u.insert(v.index());
            reach_u.union_with(&reachable[v.index()]);
        }
        reachable[u.index()] = reach_u;
    }

    let mut reduced = LinkSet::new();
    for link in links {
        let redundant = links
            .successors(link.from)
            .filter(|&w| w != link.to)
            .any(|w| reachable[w - 1].contains(link.to - 1));
        if !redundant {
            reduced.insert(link.from, link.to);
        }
    }

    debug!(
        before = links.len(),
        after = reduced.len(),
        "transitive reduction complete"
    );
    Ok(reduced)
}

/// Class graph with node `i - 1` standing for class `i`.
fn class_digraph(links: &LinkSet) -> Result<DiGraph<ClassIndex, ()>, QuotientError> {
    if let Some(bad) = links.iter().find(|l| l.from == 0 || l.to == 0) {
        return Err(QuotientError::ZeroClassIndex {
            from: bad.from,
            to: bad.to,
        });
    }

    let class_count = links.iter().map(|l| l.from.max(l.to)).max().unwrap_or(0);
    let mut g = DiGraph::with_capacity(class_count, links.len());
    for class in 1..=class_count {
        g.add_node(class);
    }
    for link in links {
        g.add_edge(NodeIndex::new(link.from - 1), NodeIndex::new(link.to - 1), ());
    }
    Ok(g)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
