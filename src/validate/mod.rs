//! Rule-based validation over a parsed `WorkflowDocument`.
//!
//! Every check runs, in a fixed order, whatever earlier checks found. The
//! output order is check order, not severity order.

pub mod content_rules;
pub mod job_rules;
pub mod structural;

use crate::config::AnalyzerConfig;
use crate::error::Diagnostic;
use crate::parse::graph::DependencyGraph;
use crate::parse::types::WorkflowDocument;

/// Validate with the default analyzer configuration.
pub fn validate(document: &WorkflowDocument) -> Vec<Diagnostic> {
    validate_with_config(document, &AnalyzerConfig::default())
}

pub fn validate_with_config(document: &WorkflowDocument, config: &AnalyzerConfig) -> Vec<Diagnostic> {
    let graph = DependencyGraph::build(document);

    let mut diagnostics = structural::validate_structural(document, &graph);
    diagnostics.extend(job_rules::validate_jobs(document, config));
    diagnostics.extend(content_rules::validate_content(document));

    tracing::debug!(
        total = diagnostics.len(),
        errors = diagnostics.iter().filter(|d| d.is_error()).count(),
        "validated workflow"
    );
    diagnostics
}
