//! Parse phase: YAML text → indentation repair → `WorkflowDocument` + graph.

pub mod graph;
pub mod repair;
pub mod types;

pub use graph::DependencyGraph;
pub use repair::repair;
pub use types::*;

use serde_yaml::Value;

use crate::error::ParseError;

/// Repair and decode workflow YAML into a `WorkflowDocument`.
///
/// Blank or comment-only text, `null` and `{}` produce an empty document, not
/// an error. Only malformed YAML and non-mapping roots fail.
pub fn parse(yaml: &str) -> Result<WorkflowDocument, ParseError> {
    if is_blank(yaml) {
        tracing::debug!("blank workflow text, returning empty document");
        return Ok(WorkflowDocument::empty());
    }

    let repaired = repair(yaml);
    let value: Value = serde_yaml::from_str(&repaired)?;
    let document = match &value {
        Value::Null => WorkflowDocument::empty(),
        Value::Mapping(root) => WorkflowDocument::from_mapping(root),
        other => {
            return Err(ParseError::NotAMapping {
                found: value_kind(other),
            });
        }
    };

    tracing::debug!(jobs = document.jobs.len(), "parsed workflow document");
    Ok(document)
}

/// Parse and build the dependency graph in one step.
pub fn parse_and_build(yaml: &str) -> Result<(WorkflowDocument, DependencyGraph), ParseError> {
    let document = parse(yaml)?;
    let graph = DependencyGraph::build(&document);
    Ok((document, graph))
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}
