//! Improvement suggestions from presence/absence rules.

use serde::Serialize;

use crate::extract::expression::{self, ExpressionCategory};
use crate::parse::types::WorkflowDocument;

const MOVING_REFS: &[&str] = &["main", "master"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionReport {
    pub uses_timeouts: bool,
    pub uses_continue_on_error: bool,
    pub uses_matrix: bool,
    pub uses_github_token: bool,
    pub recommendations: Vec<String>,
}

pub fn suggestions_report(document: &WorkflowDocument) -> SuggestionReport {
    let jobs = &document.jobs;
    let uses_timeouts = jobs.iter().any(|j| j.timeout_minutes.is_some());
    let uses_continue_on_error = jobs.iter().any(|j| j.continue_on_error.is_some());
    let uses_matrix = jobs.iter().any(|j| j.has_matrix);
    let uses_github_token = expression::expressions_in_value(&document.raw)
        .iter()
        .map(|found| expression::classify(&found.inner))
        .any(|(category, name)| category == ExpressionCategory::Secret && name == "GITHUB_TOKEN");

    let mut recommendations = Vec::new();
    if !jobs.is_empty() {
        if !uses_timeouts {
            recommendations.push(
                "No job sets `timeout-minutes`; hung jobs run for the 360 minute default".to_string(),
            );
        }
        if !uses_continue_on_error {
            recommendations.push(
                "No job uses `continue-on-error`; consider it for optional checks that should not fail the run"
                    .to_string(),
            );
        }
        if !uses_matrix {
            recommendations.push(
                "No job uses a matrix strategy; `strategy.matrix` can test across versions or platforms"
                    .to_string(),
            );
        }
        if !uses_github_token {
            recommendations.push(
                "No `secrets.GITHUB_TOKEN` reference found; steps calling the GitHub API need it for authentication"
                    .to_string(),
            );
        }
    }

    for (job, step) in document.steps() {
        let Some((action, git_ref)) = step.uses.as_deref().and_then(|u| u.split_once('@')) else {
            continue;
        };
        if MOVING_REFS.contains(&git_ref) {
            recommendations.push(format!(
                "Step '{}' in job '{}' pins {} to branch '{}'; pin a release tag or commit SHA instead",
                step.label(),
                job.id,
                action,
                git_ref
            ));
        }
    }

    SuggestionReport {
        uses_timeouts,
        uses_continue_on_error,
        uses_matrix,
        uses_github_token,
        recommendations,
    }
}
