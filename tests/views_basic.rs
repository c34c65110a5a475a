//! Caching, artifact, suggestion and layout views.

use analyzer::parse::{self, DependencyGraph};
use analyzer::views::artifacts::ArtifactDirection;
use analyzer::views::layout::{LayoutEdgeKind, LayoutNodeKind};
use analyzer::views::{artifact_report, caching_report, layout_view, suggestions_report};

const CI: &str = include_str!("fixtures/ci_pipeline.yml");

#[test]
fn setup_action_cache_counts_as_caching() {
    let report = caching_report(&parse::parse(CI).unwrap());
    assert!(report.used);
    assert_eq!(report.steps.len(), 1);
    assert!(report.steps[0].managed_by_setup);
    assert_eq!(report.steps[0].step.label, "Setup Node");
    assert!(report.recommendations.is_empty());
}

#[test]
fn cache_key_without_hash_files() {
    let yaml = "jobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/cache@v4\n        with:\n          path: target\n          key: cargo-cache\n";
    let report = caching_report(&parse::parse(yaml).unwrap());
    assert_eq!(report.steps[0].key.as_deref(), Some("cargo-cache"));
    assert_eq!(report.recommendations.len(), 1);
    assert!(report.recommendations[0].contains("hashFiles()"));
}

#[test]
fn no_caching_recommends_adding_it() {
    let yaml = "jobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: make\n";
    let report = caching_report(&parse::parse(yaml).unwrap());
    assert!(!report.used);
    assert_eq!(report.recommendations.len(), 1);
}

#[test]
fn artifacts_flow_along_needs() {
    let report = artifact_report(&parse::parse(CI).unwrap());
    assert!(report.used);
    let directions: Vec<(&str, ArtifactDirection)> = report
        .steps
        .iter()
        .map(|s| (s.step.job_id.as_str(), s.direction))
        .collect();
    assert_eq!(
        directions,
        vec![
            ("build", ArtifactDirection::Upload),
            ("test", ArtifactDirection::Download),
        ]
    );
    assert_eq!(report.steps[0].retention_days.as_deref(), Some("7"));
    assert!(report.recommendations.is_empty(), "{:?}", report.recommendations);
}

#[test]
fn download_without_upload_dependency() {
    let yaml = "jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/upload-artifact@v4
  report:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/download-artifact@v4
        with:
          name: dist
";
    let report = artifact_report(&parse::parse(yaml).unwrap());
    assert_eq!(report.recommendations.len(), 3);
    assert!(report.recommendations[0].contains("retention-days"));
    assert!(report.recommendations[1].contains("no `name`"));
    assert!(report.recommendations[2].starts_with("Job 'report' downloads artifacts"));
}

#[test]
fn ci_fixture_suggestions() {
    let report = suggestions_report(&parse::parse(CI).unwrap());
    assert!(report.uses_timeouts);
    assert!(!report.uses_continue_on_error);
    assert!(report.uses_matrix);
    assert!(report.uses_github_token);
    assert_eq!(report.recommendations.len(), 1);
    assert!(report.recommendations[0].contains("continue-on-error"));
}

#[test]
fn no_jobs_no_suggestions() {
    let report = suggestions_report(&parse::parse("name: Idle\non: push\n").unwrap());
    assert!(report.recommendations.is_empty());
}

#[test]
fn layout_of_ci_fixture() {
    let document = parse::parse(CI).unwrap();
    let view = layout_view(&document, &DependencyGraph::build(&document));

    let jobs: Vec<(&str, Option<usize>)> = view
        .nodes
        .iter()
        .filter(|n| n.kind == LayoutNodeKind::Job)
        .map(|n| (n.id.as_str(), n.level))
        .collect();
    assert_eq!(jobs, vec![("build", Some(0)), ("test", Some(1)), ("deploy", Some(2))]);
    assert_eq!(view.nodes.len(), 11);

    let needs: Vec<(&str, &str)> = view
        .edges
        .iter()
        .filter(|e| e.kind == LayoutEdgeKind::Needs)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(needs, vec![("build", "test"), ("build", "deploy"), ("test", "deploy")]);

    let sequence = view
        .edges
        .iter()
        .filter(|e| e.kind == LayoutEdgeKind::Sequence)
        .count();
    assert_eq!(sequence, 3 + 2);
}
