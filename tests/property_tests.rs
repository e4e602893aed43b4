//! Property-based tests for the clustering kernel.
//!
//! These tests check invariants that should hold on any small graph:
//! - Cut statistics are symmetric under complement
//! - Metrics are non-negative and vanish on trivial sets
//! - Rankings are sorted and respect degree-zero vertices
//! - Sweeps never select past the scan limit
//! - Coverage terminates with disjoint claims

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use local_nibble::cluster::detection::{CoverageDriver, CoverageState};
use local_nibble::cluster::metrics::CutStats;
use local_nibble::cluster::rank::rank_by_degree;
use local_nibble::cluster::sweep::SweepSelector;
use local_nibble::cluster::walk::{random_walk, DEFAULT_EXPLORATION_DAMPING};
use local_nibble::cluster::{CutMetric, PageRankScorer, Scorer, SweepOutcome, Variant};
use local_nibble::config::Config;
use local_nibble::graph::builder::GraphBuilder;
use local_nibble::graph::{CompressedGraph, VertexId};
use local_nibble::ClusterError;

const MAX_VERTEX: u64 = 10;

/// Small graphs; self-loop pairs leave isolated vertices behind
fn arb_graph() -> impl Strategy<Value = CompressedGraph> {
    prop::collection::vec((0..MAX_VERTEX, 0..MAX_VERTEX), 1..25)
        .prop_map(|edges| GraphBuilder::from_edges(&edges))
}

fn arb_metric() -> impl Strategy<Value = CutMetric> {
    prop_oneof![
        Just(CutMetric::Conductance),
        Just(CutMetric::RatioCut),
        Just(CutMetric::NormalizedCut),
    ]
}

fn split(graph: &CompressedGraph, mask: &[bool]) -> (Vec<VertexId>, Vec<VertexId>) {
    graph.vertices().partition(|&v| mask[v as usize])
}

fn first_vertex(graph: &CompressedGraph) -> VertexId {
    graph.id_at(0)
}

mod cut_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn cut_matches_complement(
            graph in arb_graph(),
            mask in prop::collection::vec(any::<bool>(), MAX_VERTEX as usize),
        ) {
            let (inside, outside) = split(&graph, &mask);
            let stats = CutStats::compute(&graph, &inside).unwrap();
            let complement = CutStats::compute(&graph, &outside).unwrap();

            prop_assert_eq!(stats.cut, complement.cut);
            prop_assert_eq!(stats.volume_in, complement.volume_out);
            prop_assert_eq!(stats.size_in + stats.size_out, graph.node_count);
        }

        #[test]
        fn volumes_add_up_to_twice_the_edges(
            graph in arb_graph(),
            mask in prop::collection::vec(any::<bool>(), MAX_VERTEX as usize),
        ) {
            let (inside, _) = split(&graph, &mask);
            let stats = CutStats::compute(&graph, &inside).unwrap();

            prop_assert_eq!(stats.volume_in + stats.volume_out, 2 * graph.edge_count());
            prop_assert!(stats.cut <= stats.volume_in.min(stats.volume_out));
        }

        #[test]
        fn metrics_non_negative_and_zero_on_trivial_sets(
            graph in arb_graph(),
            metric in arb_metric(),
            mask in prop::collection::vec(any::<bool>(), MAX_VERTEX as usize),
        ) {
            let (inside, _) = split(&graph, &mask);
            let all: Vec<VertexId> = graph.vertices().collect();

            let quality = metric.evaluate(&graph, &inside).unwrap();
            prop_assert!(quality >= 0.0 && quality.is_finite(), "{} gave {}", metric, quality);
            prop_assert_eq!(metric.evaluate(&graph, &[]).unwrap(), 0.0);
            prop_assert_eq!(metric.evaluate(&graph, &all).unwrap(), 0.0);
        }

        #[test]
        fn unknown_member_is_rejected(graph in arb_graph()) {
            let missing = MAX_VERTEX + 1;
            prop_assert_eq!(
                CutStats::compute(&graph, &[missing]),
                Err(ClusterError::VertexNotFound(missing))
            );
        }
    }
}

mod ranking_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn pagerank_ranking_is_sorted(graph in arb_graph()) {
            let mut scorer = PageRankScorer::new(0.85, 1e-7, 100).unwrap();
            let scores = scorer.score(&graph, first_vertex(&graph)).unwrap();
            let ranking = rank_by_degree(&scores, &graph).unwrap();

            prop_assert_eq!(ranking.len(), graph.node_count);
            for pair in ranking.windows(2) {
                prop_assert!(pair[0].1 >= pair[1].1, "{:?} before {:?}", pair[0], pair[1]);
            }
            for &(vertex, score) in &ranking {
                prop_assert!(score >= 0.0);
                if graph.degree(vertex).unwrap() == 0 {
                    prop_assert_eq!(score, 0.0);
                }
            }
        }

        #[test]
        fn walk_scores_are_positive(graph in arb_graph(), rng_seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(rng_seed);
            let seed = first_vertex(&graph);

            match random_walk(&graph, seed, 50, 0, DEFAULT_EXPLORATION_DAMPING, &mut rng) {
                Ok(scores) => {
                    prop_assert!(scores.contains(seed));
                    for (_, score) in scores.iter() {
                        prop_assert!(score > 0.0 && score.is_finite(), "score {}", score);
                    }
                }
                Err(ClusterError::StuckWalk { vertex, .. }) => {
                    prop_assert_eq!(vertex, seed);
                    prop_assert_eq!(graph.degree(seed).unwrap(), 0);
                }
                Err(err) => prop_assert!(false, "unexpected error {}", err),
            }
        }
    }
}

mod sweep_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn selected_prefix_stays_below_limit(
            graph in arb_graph(),
            metric in arb_metric(),
            max_cutsize in 0usize..12,
        ) {
            let mut scorer = PageRankScorer::new(0.85, 1e-7, 100).unwrap();
            let scores = scorer.score(&graph, first_vertex(&graph)).unwrap();
            let ranking = rank_by_degree(&scores, &graph).unwrap();

            let selector = SweepSelector::new(metric, max_cutsize);
            let limit = selector.limit(ranking.len());

            match selector.select(&graph, &ranking).unwrap() {
                SweepOutcome::Cut(cut) => {
                    prop_assert!(cut.k >= 1 && cut.k < limit, "k={} limit={}", cut.k, limit);
                    prop_assert!(cut.quality >= 0.0);
                }
                SweepOutcome::Degenerate { vertex, .. } => {
                    prop_assert!(limit <= 1);
                    prop_assert_eq!(vertex, ranking[0].0);
                }
                SweepOutcome::Empty => prop_assert!(ranking.is_empty()),
            }
        }
    }
}

mod coverage_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(60))]

        #[test]
        fn coverage_terminates_with_disjoint_claims(
            graph in arb_graph(),
            walk in any::<bool>(),
            rng_seed in any::<u64>(),
        ) {
            let variant = if walk { Variant::Vanilla } else { Variant::PageRank };
            let config = Config {
                rng_seed,
                ..Config::new(variant, CutMetric::Conductance, 0, 100, 1e-7)
            };
            let mut scorer = config.scorer().unwrap();
            let mut driver = CoverageDriver::from_config(&graph, first_vertex(&graph), &config).unwrap();

            let mut previous: HashSet<VertexId> = HashSet::new();
            let mut iterations = 0;
            while driver.step(scorer.as_mut()).unwrap() == CoverageState::Running {
                iterations += 1;
                prop_assert!(iterations <= graph.node_count, "no progress after {} iterations", iterations);
                prop_assert!(driver.used().is_superset(&previous));
                prop_assert!(driver.used().len() > previous.len());
                previous = driver.used().clone();
            }

            let mut seen = HashSet::new();
            for record in driver.records() {
                prop_assert!(record.members.contains(&record.seed));
                for &vertex in &record.members {
                    prop_assert!(seen.insert(vertex), "vertex {} claimed twice", vertex);
                }
            }
            prop_assert_eq!(&seen, driver.used());

            if driver.state() == CoverageState::Covered {
                prop_assert_eq!(driver.used().len(), graph.node_count);
            }
        }
    }
}
