//! Error and diagnostic types shared by every analysis phase.

use serde::Serialize;
use thiserror::Error;

/// Failure to turn input text into a `WorkflowDocument`.
///
/// This is the only failing boundary of the engine; every analyzer after the
/// loader is total and reports findings as `Diagnostic`s instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Workflow root must be a mapping, found {found}")]
    NotAMapping { found: &'static str },
}

/// Invalid analyzer configuration handed over by the host.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse analyzer config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::Info => write!(f, "info"),
        }
    }
}

/// A classified finding produced by validation. Never mutated once pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub kind: DiagnosticKind,
    pub message: String,
    /// The job the finding is attached to, if any.
    pub job_id: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.job_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (job '{}')",
                self.kind, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.kind, self.code, self.message),
        }
    }
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, job_id: Option<String>) -> Self {
        Diagnostic {
            code,
            kind: DiagnosticKind::Error,
            message: message.into(),
            job_id,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, job_id: Option<String>) -> Self {
        Diagnostic {
            code,
            kind: DiagnosticKind::Warning,
            message: message.into(),
            job_id,
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            kind: DiagnosticKind::Info,
            message: message.into(),
            job_id: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }
}
