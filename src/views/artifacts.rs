//! Artifact upload/download usage.

use serde::Serialize;

use super::StepRef;
use crate::parse::graph::DependencyGraph;
use crate::parse::types::WorkflowDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactDirection {
    Upload,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStep {
    pub step: StepRef,
    pub direction: ArtifactDirection,
    pub name: Option<String>,
    pub retention_days: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub used: bool,
    pub steps: Vec<ArtifactStep>,
    pub recommendations: Vec<String>,
}

pub fn artifact_report(document: &WorkflowDocument) -> ArtifactReport {
    let mut steps = Vec::new();
    let mut recommendations = Vec::new();

    for (job, step) in document.steps() {
        let direction = if step.uses_action_prefix("actions/upload-artifact") {
            ArtifactDirection::Upload
        } else if step.uses_action_prefix("actions/download-artifact") {
            ArtifactDirection::Download
        } else {
            continue;
        };

        let name = step.input("name").map(str::to_string);
        let retention_days = step.input("retention-days").map(str::to_string);

        if direction == ArtifactDirection::Upload {
            if retention_days.is_none() {
                recommendations.push(format!(
                    "Artifact upload '{}' in job '{}' has no `retention-days`; set one to limit storage usage",
                    name.as_deref().unwrap_or(step.label()),
                    job.id
                ));
            }
            if name.is_none() {
                recommendations.push(format!(
                    "Artifact upload in job '{}' ({}) has no `name`; the default name 'artifact' can collide between jobs",
                    job.id, step.key
                ));
            }
        }

        steps.push(ArtifactStep {
            step: StepRef::new(job, step),
            direction,
            name,
            retention_days,
        });
    }

    recommend_download_dependencies(document, &steps, &mut recommendations);

    ArtifactReport {
        used: !steps.is_empty(),
        steps,
        recommendations,
    }
}

/// A download only sees artifacts of jobs that finished before it: the job
/// itself or one of its (transitive) `needs`.
fn recommend_download_dependencies(
    document: &WorkflowDocument,
    steps: &[ArtifactStep],
    recommendations: &mut Vec<String>,
) {
    let uploaders: Vec<&str> = steps
        .iter()
        .filter(|s| s.direction == ArtifactDirection::Upload)
        .map(|s| s.step.job_id.as_str())
        .collect();
    if uploaders.is_empty() {
        return;
    }

    let graph = DependencyGraph::build(document);
    let mut flagged: Vec<&str> = Vec::new();
    for download in steps.iter().filter(|s| s.direction == ArtifactDirection::Download) {
        let job_id = download.step.job_id.as_str();
        if flagged.contains(&job_id) {
            continue;
        }
        let ancestors = graph.ancestors(job_id);
        let reachable = uploaders
            .iter()
            .any(|u| *u == job_id || ancestors.contains(u));
        if !reachable {
            flagged.push(job_id);
            recommendations.push(format!(
                "Job '{}' downloads artifacts but does not need any job that uploads them; add the uploading job to `needs`",
                job_id
            ));
        }
    }
}
