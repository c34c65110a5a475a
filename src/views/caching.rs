//! Dependency caching usage.

use serde::Serialize;

use super::StepRef;
use crate::parse::types::WorkflowDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStep {
    pub step: StepRef,
    pub key: Option<String>,
    pub path: Option<String>,
    /// Cache managed by an `actions/setup-*` action through its `cache` input.
    pub managed_by_setup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheReport {
    pub used: bool,
    pub steps: Vec<CacheStep>,
    pub recommendations: Vec<String>,
}

pub fn caching_report(document: &WorkflowDocument) -> CacheReport {
    let mut steps = Vec::new();
    let mut recommendations = Vec::new();

    for (job, step) in document.steps() {
        if step.uses_action_prefix("actions/cache") {
            let key = step.input("key").map(str::to_string);
            match &key {
                None => recommendations.push(format!(
                    "Cache step '{}' in job '{}' has no `key`; derive one from hashFiles() of your lockfile",
                    step.label(),
                    job.id
                )),
                Some(k) if !k.contains("hashFiles") => recommendations.push(format!(
                    "Cache key of step '{}' in job '{}' does not use hashFiles(); the cache will not follow dependency changes",
                    step.label(),
                    job.id
                )),
                Some(_) => {}
            }
            steps.push(CacheStep {
                step: StepRef::new(job, step),
                key,
                path: step.input("path").map(str::to_string),
                managed_by_setup: false,
            });
        } else if step.uses_action_prefix("actions/setup-") && step.input("cache").is_some() {
            steps.push(CacheStep {
                step: StepRef::new(job, step),
                key: None,
                path: step.input("cache-dependency-path").map(str::to_string),
                managed_by_setup: true,
            });
        }
    }

    if steps.is_empty() && !document.jobs.is_empty() {
        recommendations.push(
            "No dependency caching found; use actions/cache or the `cache` input of an actions/setup-* action to speed up builds"
                .to_string(),
        );
    }

    CacheReport {
        used: !steps.is_empty(),
        steps,
        recommendations,
    }
}
