//! End-to-end analysis: Parse → Graph → Validate → Extract → Views.

use analyzer::analysis::{self, AnalysisState};
use analyzer::config::AnalyzerConfig;
use analyzer::error::ParseError;

#[test]
fn end_to_end_ci_pipeline() {
    let analysis = analysis::analyze(include_str!("fixtures/ci_pipeline.yml")).unwrap();

    assert_eq!(analysis.state, AnalysisState::Ready);
    assert!(analysis.can_visualize());
    assert!(analysis.cycle.is_empty());
    assert_eq!(analysis.document.jobs.len(), 3);
    assert_eq!(analysis.diagnostics.len(), 2);
    assert_eq!(analysis.variables.len(), 8);
    assert!(analysis.caching.as_ref().is_some_and(|c| c.used));
    assert!(analysis.artifacts.as_ref().is_some_and(|a| a.used));
    assert!(analysis.layout.is_some());

    insta::assert_json_snapshot!(analysis.diagnostics, @r#"
    [
      {
        "code": "V007",
        "kind": "info",
        "message": "Uses secret 'GITHUB_TOKEN'",
        "job_id": null
      },
      {
        "code": "V007",
        "kind": "info",
        "message": "Uses repository variable 'DEPLOY_REGION'",
        "job_id": null
      }
    ]
    "#);
}

#[test]
fn cycle_blocks_visualization() {
    let analysis = analysis::analyze(include_str!("fixtures/cycle.yml")).unwrap();
    assert_eq!(analysis.state, AnalysisState::Ready);
    assert!(!analysis.can_visualize());
    assert_eq!(analysis.cycle, vec!["build", "package", "build"]);
    let layout = analysis.layout.expect("layout still computed");
    assert!(layout.nodes.iter().all(|n| n.level.is_none()));
}

#[test]
fn broken_indentation_is_repaired_before_analysis() {
    let analysis = analysis::analyze(include_str!("fixtures/broken_indentation.yml")).unwrap();
    assert_eq!(analysis.state, AnalysisState::Ready);
    assert!(!analysis.diagnostics.iter().any(|d| d.code == "P001"));
}

#[test]
fn custom_runner_config_silences_warning() {
    let yaml = "jobs:\n  build:\n    runs-on: gpu-box\n    timeout-minutes: 5\n    steps:\n      - run: make\n";
    assert_eq!(analysis::analyze(yaml).unwrap().diagnostics.len(), 1);

    let config = AnalyzerConfig {
        known_runners: vec!["gpu-box".into()],
        ..Default::default()
    };
    let analysis = analysis::analyze_with_config(yaml, &config).unwrap();
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn parse_failure_surfaces_as_error() {
    let err = analysis::analyze("jobs: [unclosed").unwrap_err();
    assert!(matches!(err, ParseError::Yaml(_)));
}

#[test]
fn analysis_is_idempotent() {
    let yaml = include_str!("fixtures/problems.yml");
    assert_eq!(analysis::analyze(yaml).unwrap(), analysis::analyze(yaml).unwrap());
}
