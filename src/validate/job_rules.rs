//! Per-job rules (V004).

use crate::config::AnalyzerConfig;
use crate::error::Diagnostic;
use crate::parse::types::{Job, RunsOn, WorkflowDocument};

pub fn validate_jobs(document: &WorkflowDocument, config: &AnalyzerConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for job in &document.jobs {
        v004_runner(job, config, &mut diagnostics);
    }
    diagnostics
}

/// Only the single-label and absent forms are checked; label lists and
/// runner groups pass unchecked.
fn v004_runner(job: &Job, config: &AnalyzerConfig, diagnostics: &mut Vec<Diagnostic>) {
    match &job.runs_on {
        None => diagnostics.push(Diagnostic::error(
            "V004",
            format!("Job '{}' is missing 'runs-on'", job.id),
            Some(job.id.clone()),
        )),
        Some(RunsOn::Label(label)) if !config.accepts_runner(label) => {
            diagnostics.push(Diagnostic::warning(
                "V004",
                format!("Job '{}' uses unknown runner '{}'", job.id, label),
                Some(job.id.clone()),
            ))
        }
        Some(_) => {}
    }
}
