use std::collections::HashSet;
use std::fmt::Write as _;

use proptest::prelude::*;
use strata_core::label::vertex_label;
use strata_core::{ReadError, check_stochastic, parse_graph};

/// `(vertex_count, triples)` with sources that may fall outside `1..=n`.
/// Targets stay in range whenever their source does; a skipped source may
/// carry any target.
fn arb_listing() -> impl Strategy<Value = (usize, Vec<(i64, i64, f64)>)> {
    (1usize..20).prop_flat_map(|n| {
        let max = i64::try_from(n).unwrap_or(i64::MAX);
        let triple = (-2i64..=max + 2, -2i64..=max + 2, 0.0f64..=1.0).prop_map(
            move |(from, to, p)| {
                if (1..=max).contains(&from) {
                    (from, to.rem_euclid(max) + 1, p)
                } else {
                    (from, to, p)
                }
            },
        );
        (Just(n), prop::collection::vec(triple, 0..60))
    })
}

fn render((n, triples): &(usize, Vec<(i64, i64, f64)>)) -> String {
    let mut text = format!("{n}\n");
    for (from, to, p) in triples {
        let _ = writeln!(text, "{from} {to} {p}");
    }
    text
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn out_of_range_sources_are_counted(listing in arb_listing()) {
        let (n, triples) = &listing;
        let outcome = parse_graph(&render(&listing)).expect("targets are in range");

        let n_i64 = i64::try_from(*n).unwrap_or(i64::MAX);
        let kept: Vec<_> = triples
            .iter()
            .filter(|(from, _, _)| (1..=n_i64).contains(from))
            .collect();
        prop_assert_eq!(outcome.skipped, triples.len() - kept.len());
        prop_assert_eq!(outcome.graph.edge_count(), kept.len());
        prop_assert_eq!(outcome.graph.vertex_count(), *n);
    }

    #[test]
    fn edges_keep_file_order(listing in arb_listing()) {
        let (n, triples) = &listing;
        let outcome = parse_graph(&render(&listing)).expect("targets are in range");

        for v in 1..=*n {
            let expected: Vec<usize> = triples
                .iter()
                .filter(|(from, _, _)| usize::try_from(*from).ok() == Some(v))
                .filter_map(|&(_, to, _)| usize::try_from(to).ok())
                .collect();
            let actual: Vec<usize> = outcome.graph.edges(v).iter().map(|e| e.target).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn out_of_range_target_is_rejected(n in 1usize..20, extra in 1usize..5) {
        let text = format!("{n}\n1 {} 1.0\n", n + extra);
        let err = parse_graph(&text).expect_err("target out of range");
        let is_invalid_target = matches!(err, ReadError::InvalidTarget { .. });
        prop_assert!(is_invalid_target);
    }

    #[test]
    fn uniform_rows_are_stochastic(n in 1usize..30, fanout in 1usize..6) {
        let mut text = format!("{n}\n");
        for v in 1..=n {
            let k = fanout.min(n);
            for j in 0..k {
                #[allow(clippy::cast_precision_loss)]
                let p = 1.0 / k as f64;
                let _ = writeln!(text, "{v} {} {p}", (v + j - 1) % n + 1);
            }
        }
        let graph = parse_graph(&text).expect("valid").graph;
        prop_assert!(check_stochastic(&graph, 0.01).is_markov());
    }

    #[test]
    fn labels_are_distinct(ids in prop::collection::btree_set(1usize..100_000, 1..200)) {
        let labels: HashSet<String> = ids.iter().map(|&id| vertex_label(id)).collect();
        prop_assert_eq!(labels.len(), ids.len());
        prop_assert!(labels.iter().all(|l| l.bytes().all(|b| b.is_ascii_uppercase())));
    }
}
