//! Job-graph structural rules (V001–V003).

use crate::error::Diagnostic;
use crate::parse::graph::DependencyGraph;
use crate::parse::types::WorkflowDocument;

pub fn validate_structural(document: &WorkflowDocument, graph: &DependencyGraph) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    v001_has_jobs(document, &mut diagnostics);
    v002_no_cycles(graph, &mut diagnostics);
    v003_needs_reference_existing_jobs(graph, &mut diagnostics);

    diagnostics
}

fn v001_has_jobs(document: &WorkflowDocument, diagnostics: &mut Vec<Diagnostic>) {
    if document.jobs.is_empty() {
        diagnostics.push(Diagnostic::error("V001", "No jobs defined in workflow", None));
    }
}

fn v002_no_cycles(graph: &DependencyGraph, diagnostics: &mut Vec<Diagnostic>) {
    let cycle = graph.find_cycle();
    if !cycle.is_empty() {
        diagnostics.push(Diagnostic::error(
            "V002",
            format!("Circular dependency detected: {}", cycle.join(" → ")),
            cycle.first().cloned(),
        ));
    }
}

fn v003_needs_reference_existing_jobs(graph: &DependencyGraph, diagnostics: &mut Vec<Diagnostic>) {
    for dangling in &graph.dangling {
        diagnostics.push(Diagnostic::error(
            "V003",
            format!(
                "Job '{}' depends on non-existent job '{}'",
                dangling.job_id, dangling.missing
            ),
            Some(dangling.job_id.clone()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn run(yaml: &str) -> Vec<Diagnostic> {
        let document = parse(yaml).unwrap();
        let graph = DependencyGraph::build(&document);
        validate_structural(&document, &graph)
    }

    #[test]
    fn missing_jobs() {
        let diagnostics = run("name: CI\non: push\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "V001");
    }

    #[test]
    fn cycle_message_names_chain() {
        let diagnostics = run("jobs:\n  a: {needs: [b]}\n  b: {needs: [a]}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Circular dependency detected: a → b → a");
    }

    #[test]
    fn dangling_need_names_both_jobs() {
        let diagnostics = run("jobs:\n  deploy: {needs: [build]}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "V003");
        assert_eq!(
            diagnostics[0].message,
            "Job 'deploy' depends on non-existent job 'build'"
        );
        assert_eq!(diagnostics[0].job_id.as_deref(), Some("deploy"));
    }
}
