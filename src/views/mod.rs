//! Read-only projections of a `WorkflowDocument` for presentation.
//!
//! Each builder is independent of the others and of validation.

pub mod artifacts;
pub mod caching;
pub mod layout;
pub mod suggestions;

pub use artifacts::{ArtifactReport, artifact_report};
pub use caching::{CacheReport, caching_report};
pub use layout::{LayoutView, layout_view};
pub use suggestions::{SuggestionReport, suggestions_report};

use serde::Serialize;

use crate::parse::types::{Job, Step};

/// A step located by job and position, with its action reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRef {
    pub job_id: String,
    pub step_key: String,
    pub step_index: usize,
    pub label: String,
    pub uses: Option<String>,
}

impl StepRef {
    pub fn new(job: &Job, step: &Step) -> Self {
        StepRef {
            job_id: job.id.clone(),
            step_key: step.key.clone(),
            step_index: step.index,
            label: step.label().to_string(),
            uses: step.uses.clone(),
        }
    }
}
