//! Full analysis pass: parse → graph → validate → extract → views.

use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::error::{Diagnostic, ParseError};
use crate::extract::{self, StepVariables, VariableInventory};
use crate::parse::{self, DependencyGraph, WorkflowDocument};
use crate::validate;
use crate::views::{self, ArtifactReport, CacheReport, LayoutView, SuggestionReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    /// Nothing written yet. Not an error; nothing else is computed.
    Empty,
    Ready,
}

/// Everything the presentation layer reads back for one input text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowAnalysis {
    pub state: AnalysisState,
    pub document: WorkflowDocument,
    pub diagnostics: Vec<Diagnostic>,
    /// First dependency cycle found, empty when acyclic.
    pub cycle: Vec<String>,
    pub variables: Vec<StepVariables>,
    pub inventory: VariableInventory,
    pub caching: Option<CacheReport>,
    pub artifacts: Option<ArtifactReport>,
    pub suggestions: Option<SuggestionReport>,
    pub layout: Option<LayoutView>,
}

impl WorkflowAnalysis {
    fn empty(document: WorkflowDocument) -> Self {
        WorkflowAnalysis {
            state: AnalysisState::Empty,
            document,
            diagnostics: Vec::new(),
            cycle: Vec::new(),
            variables: Vec::new(),
            inventory: VariableInventory::default(),
            caching: None,
            artifacts: None,
            suggestions: None,
            layout: None,
        }
    }

    /// Rendering is blocked by any error-kind diagnostic.
    pub fn can_visualize(&self) -> bool {
        self.state == AnalysisState::Ready && !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub fn analyze(yaml: &str) -> Result<WorkflowAnalysis, ParseError> {
    analyze_with_config(yaml, &AnalyzerConfig::default())
}

pub fn analyze_with_config(yaml: &str, config: &AnalyzerConfig) -> Result<WorkflowAnalysis, ParseError> {
    let document = parse::parse(yaml)?;
    Ok(analyze_document(document, config))
}

/// Run every analyzer over an already parsed document.
pub fn analyze_document(document: WorkflowDocument, config: &AnalyzerConfig) -> WorkflowAnalysis {
    if document.is_empty() {
        tracing::debug!("empty workflow, skipping analysis");
        return WorkflowAnalysis::empty(document);
    }

    let graph = DependencyGraph::build(&document);
    let diagnostics = validate::validate_with_config(&document, config);
    let cycle = graph.find_cycle();
    let variables = extract::extract_variables(&document);
    let inventory = extract::extract_inventory(&document);
    let caching = views::caching_report(&document);
    let artifacts = views::artifact_report(&document);
    let suggestions = views::suggestions_report(&document);
    let layout = views::layout_view(&document, &graph);

    tracing::debug!(
        jobs = document.jobs.len(),
        diagnostics = diagnostics.len(),
        expressions = inventory.expressions.len(),
        "analyzed workflow"
    );

    WorkflowAnalysis {
        state: AnalysisState::Ready,
        document,
        diagnostics,
        cycle,
        variables,
        inventory,
        caching: Some(caching),
        artifacts: Some(artifacts),
        suggestions: Some(suggestions),
        layout: Some(layout),
    }
}
