//! Node/edge projection consumed by the graph renderer.
//!
//! Job nodes use the job id; step nodes use `<job id>/<step key>`. Both are
//! stable for the lifetime of one parsed document and nothing more.

use serde::Serialize;

use crate::parse::graph::DependencyGraph;
use crate::parse::types::WorkflowDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutNodeKind {
    Job,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutEdgeKind {
    /// Dependency → dependent job.
    Needs,
    /// Job → its step.
    Contains,
    /// Step → next step in the same job.
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub kind: LayoutNodeKind,
    pub job_id: String,
    /// Longest-path level of the owning job; `None` when the graph is cyclic.
    pub level: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub kind: LayoutEdgeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutView {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

pub fn step_node_id(job_id: &str, step_key: &str) -> String {
    format!("{job_id}/{step_key}")
}

pub fn layout_view(document: &WorkflowDocument, graph: &DependencyGraph) -> LayoutView {
    let levels = graph.levels();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for job in &document.jobs {
        let level = levels.as_ref().and_then(|l| l.get(&job.id).copied());
        nodes.push(LayoutNode {
            id: job.id.clone(),
            label: job.display_name.clone(),
            kind: LayoutNodeKind::Job,
            job_id: job.id.clone(),
            level,
        });

        for dependency in graph.dependencies(&job.id) {
            edges.push(LayoutEdge {
                source: dependency.to_string(),
                target: job.id.clone(),
                kind: LayoutEdgeKind::Needs,
            });
        }

        let mut previous: Option<String> = None;
        for step in &job.steps {
            let id = step_node_id(&job.id, &step.key);
            nodes.push(LayoutNode {
                id: id.clone(),
                label: step.label().to_string(),
                kind: LayoutNodeKind::Step,
                job_id: job.id.clone(),
                level,
            });
            edges.push(LayoutEdge {
                source: job.id.clone(),
                target: id.clone(),
                kind: LayoutEdgeKind::Contains,
            });
            if let Some(prev) = previous.replace(id.clone()) {
                edges.push(LayoutEdge {
                    source: prev,
                    target: id,
                    kind: LayoutEdgeKind::Sequence,
                });
            }
        }
    }

    LayoutView { nodes, edges }
}
