//! Property checks of the job dependency graph over generated workflows.

#[allow(dead_code)]
mod helpers;

use analyzer::parse::DependencyGraph;
use helpers::{job_graphs, parse_jobs};
use petgraph::algo::is_cyclic_directed;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reported_cycle_is_a_real_closed_path(jobs in job_graphs(8, false)) {
        let document = parse_jobs(&jobs);
        let cycle = DependencyGraph::build(&document).find_cycle();
        if !cycle.is_empty() {
            prop_assert!(cycle.len() >= 2, "{:?}", cycle);
            prop_assert_eq!(cycle.first(), cycle.last());
            for pair in cycle.windows(2) {
                let job = document.job(&pair[0]).expect("cycle names existing jobs");
                prop_assert!(job.depends_on(&pair[1]), "'{}' does not need '{}'", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn acyclic_graphs_report_no_cycle(jobs in job_graphs(10, true)) {
        let graph = DependencyGraph::build(&parse_jobs(&jobs));
        prop_assert!(graph.find_cycle().is_empty(), "{:?}", jobs);
        prop_assert!(graph.levels().is_some());
    }

    #[test]
    fn cycle_detection_agrees_with_petgraph(jobs in job_graphs(8, false)) {
        let graph = DependencyGraph::build(&parse_jobs(&jobs));
        prop_assert_eq!(!graph.find_cycle().is_empty(), is_cyclic_directed(&graph.graph));
    }

    #[test]
    fn levels_respect_every_edge(jobs in job_graphs(10, true)) {
        let graph = DependencyGraph::build(&parse_jobs(&jobs));
        let levels = graph.levels().expect("acyclic");
        for (id, needs) in &jobs {
            if needs.is_empty() {
                prop_assert_eq!(levels[id], 0);
            }
            for need in needs {
                prop_assert!(levels[need] < levels[id], "{} -> {}", need, id);
            }
        }
    }

    #[test]
    fn ancestors_are_transitive_dependencies(jobs in job_graphs(10, true)) {
        let graph = DependencyGraph::build(&parse_jobs(&jobs));
        for (id, _) in &jobs {
            let ancestors = graph.ancestors(id);
            for dependency in graph.dependencies(id) {
                prop_assert!(ancestors.contains(&dependency));
                for indirect in graph.ancestors(dependency) {
                    prop_assert!(ancestors.contains(&indirect));
                }
            }
            prop_assert!(!ancestors.contains(&id.as_str()));
        }
    }
}
