//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::analysis::{self, AnalysisState, WorkflowAnalysis};
use crate::config::AnalyzerConfig;
use crate::error::Diagnostic;

/// Full analysis of a workflow YAML text.
/// Returns `{status: "ready", ...}`, `{status: "empty"}` or `{status: "error", message}`.
#[wasm_bindgen]
pub fn analyze_workflow(yaml: &str) -> JsValue {
    let result = analyze_workflow_inner(yaml, &AnalyzerConfig::default());
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Same as `analyze_workflow` with an `AnalyzerConfig` JSON object.
#[wasm_bindgen]
pub fn analyze_workflow_with_config(yaml: &str, config_json: &str) -> JsValue {
    let result = match AnalyzerConfig::from_json(config_json) {
        Ok(config) => analyze_workflow_inner(yaml, &config),
        Err(e) => AnalysisDto::Error {
            message: e.to_string(),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Validate only. Returns a JSON array of diagnostics; a parse failure is
/// reported as a single error diagnostic with code `P001`.
#[wasm_bindgen]
pub fn validate_workflow(yaml: &str) -> JsValue {
    let result = validate_workflow_inner(yaml);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Indentation repair only.
#[wasm_bindgen]
pub fn repair_workflow(yaml: &str) -> String {
    crate::parse::repair(yaml)
}

fn analyze_workflow_inner(yaml: &str, config: &AnalyzerConfig) -> AnalysisDto {
    match analysis::analyze_with_config(yaml, config) {
        Ok(analysis) if analysis.state == AnalysisState::Empty => AnalysisDto::Empty,
        Ok(analysis) => AnalysisDto::Ready(Box::new(analysis)),
        Err(e) => AnalysisDto::Error {
            message: e.to_string(),
        },
    }
}

fn validate_workflow_inner(yaml: &str) -> Vec<Diagnostic> {
    match crate::parse::parse(yaml) {
        Ok(document) if document.is_empty() => Vec::new(),
        Ok(document) => crate::validate::validate(&document),
        Err(e) => vec![Diagnostic::error("P001", e.to_string(), None)],
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum AnalysisDto {
    #[serde(rename = "ready")]
    Ready(Box<WorkflowAnalysis>),
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "error")]
    Error { message: String },
}
