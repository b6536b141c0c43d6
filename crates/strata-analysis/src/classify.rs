//! Persistent / transitive labelling of communicating classes.
//!
//! A class is **persistent** when no link leaves it in the class graph:
//! probability mass that enters it never leaves. Otherwise it is
//! **transitive**. A persistent class with a single member is an absorbing
//! state. The chain is irreducible iff it has exactly one class.

use serde::Serialize;
use strata_core::VertexId;

use crate::quotient::LinkSet;
use crate::scc::{ClassIndex, Partition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Persistent,
    Transitive,
}

impl ClassKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Transitive => "transitive",
        }
    }
}

/// Label of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassLabel {
    pub class: ClassIndex,
    pub kind: ClassKind,
    /// Persistent singleton: its only member is an absorbing state.
    pub absorbing: bool,
}

/// Labels for every class of a partition, in partition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub labels: Vec<ClassLabel>,
    pub irreducible: bool,
}

impl Classification {
    /// Label of the class at 1-based `class`.
    #[must_use]
    pub fn label(&self, class: ClassIndex) -> Option<&ClassLabel> {
        class.checked_sub(1).and_then(|i| self.labels.get(i))
    }

    pub fn persistent(&self) -> impl Iterator<Item = &ClassLabel> + '_ {
        self.labels.iter().filter(|l| l.kind == ClassKind::Persistent)
    }

    pub fn transitive(&self) -> impl Iterator<Item = &ClassLabel> + '_ {
        self.labels.iter().filter(|l| l.kind == ClassKind::Transitive)
    }

    /// Absorbing states, in partition order.
    #[must_use]
    pub fn absorbing_states(&self, partition: &Partition) -> Vec<VertexId> {
        self.labels
            .iter()
            .filter(|l| l.absorbing)
            .filter_map(|l| partition.class(l.class))
            .flat_map(|c| c.members().iter().copied())
            .collect()
    }
}

/// Label each class of `partition` from the (reduced) class links.
#[must_use]
pub fn classify(partition: &Partition, links: &LinkSet) -> Classification {
    let labels = partition
        .iter()
        .map(|(class, members)| {
            let kind = if links.has_outgoing(class) {
                ClassKind::Transitive
            } else {
                ClassKind::Persistent
            };
            ClassLabel {
                class,
                kind,
                absorbing: kind == ClassKind::Persistent && members.is_singleton(),
            }
        })
        .collect();

    Classification {
        labels,
        irreducible: partition.len() == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotient::{build_links, reduce_transitive};
    use crate::scc::decompose;
    use strata_core::Graph;

    fn classify_graph(n: usize, edges: &[(usize, usize, f64)]) -> (Partition, Classification) {
        let g = Graph::from_edges(n, edges).expect("graph");
        let p = decompose(&g);
        let links = reduce_transitive(&build_links(&g, &p.vertex_to_class())).expect("acyclic");
        let c = classify(&p, &links);
        (p, c)
    }

    #[test]
    fn absorbing_self_loop() {
        let (p, c) = classify_graph(1, &[(1, 1, 1.0)]);
        assert!(c.irreducible);
        assert_eq!(c.labels[0].kind, ClassKind::Persistent);
        assert!(c.labels[0].absorbing);
        assert_eq!(c.absorbing_states(&p), vec![1]);
    }

    #[test]
    fn transient_feeder_and_absorbing_sink() {
        let (p, c) = classify_graph(2, &[(1, 2, 1.0), (2, 2, 1.0)]);
        assert!(!c.irreducible);

        let map = p.vertex_to_class();
        let c1 = c.label(map.class_of(1).expect("class")).expect("label");
        let c2 = c.label(map.class_of(2).expect("class")).expect("label");
        assert_eq!(c1.kind, ClassKind::Transitive);
        assert!(!c1.absorbing);
        assert_eq!(c2.kind, ClassKind::Persistent);
        assert!(c2.absorbing);
    }

    #[test]
    fn persistent_cycle_is_not_absorbing() {
        let (_, c) = classify_graph(2, &[(1, 2, 1.0), (2, 1, 1.0)]);
        assert!(c.irreducible);
        assert_eq!(c.labels[0].kind, ClassKind::Persistent);
        assert!(!c.labels[0].absorbing);
    }

    #[test]
    fn counts_by_kind() {
        // 1 -> {2,3} cycle, 1 -> 4 absorbing.
        let (_, c) = classify_graph(
            4,
            &[(1, 2, 0.5), (1, 4, 0.5), (2, 3, 1.0), (3, 2, 1.0), (4, 4, 1.0)],
        );
        assert_eq!(c.persistent().count(), 2);
        assert_eq!(c.transitive().count(), 1);
    }

    #[test]
    fn isolated_vertex_without_edges_is_absorbing() {
        let (_, c) = classify_graph(1, &[]);
        assert!(c.labels[0].absorbing);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ClassKind::Persistent.as_str(), "persistent");
        assert_eq!(ClassKind::Transitive.as_str(), "transitive");
    }
}
