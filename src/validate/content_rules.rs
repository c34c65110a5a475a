//! Whole-document text rules (V005–V007).
//!
//! These scan the serialized document rather than the typed model. The
//! hardcoded-secret patterns are coarse and also match long hex runs such as
//! pinned commit SHAs.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Diagnostic;
use crate::extract::expression::{self, ExpressionCategory};
use crate::parse::types::WorkflowDocument;

fn secret_regex() -> &'static Regex {
    static SECRET: OnceLock<Regex> = OnceLock::new();
    SECRET.get_or_init(|| Regex::new(r"AKIA|[A-Za-z0-9+/]{40,}").expect("valid regex"))
}

pub fn validate_content(document: &WorkflowDocument) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let text = document.serialized_text();

    v005_no_todo(&text, &mut diagnostics);
    v006_no_hardcoded_secrets(&text, &mut diagnostics);
    v007_expression_references(document, &mut diagnostics);

    diagnostics
}

fn v005_no_todo(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    if text.contains("TODO") {
        diagnostics.push(Diagnostic::warning(
            "V005",
            "Workflow contains TODO comments",
            None,
        ));
    }
}

fn v006_no_hardcoded_secrets(text: &str, diagnostics: &mut Vec<Diagnostic>) {
    if secret_regex().is_match(text) {
        diagnostics.push(Diagnostic::error(
            "V006",
            "Possible hardcoded secret detected; use ${{ secrets.NAME }} instead",
            None,
        ));
    }
}

fn v007_expression_references(document: &WorkflowDocument, diagnostics: &mut Vec<Diagnostic>) {
    let defined = |name: &str| {
        document.env.contains_key(name) || document.jobs.iter().any(|j| j.env.contains_key(name))
    };

    for found in expression::expressions_in_value(&document.raw) {
        let (category, name) = expression::classify(&found.inner);
        match category {
            ExpressionCategory::Env if !defined(name) => diagnostics.push(Diagnostic::warning(
                "V007",
                format!(
                    "Environment variable '{}' is referenced but not defined in workflow or job env",
                    name
                ),
                None,
            )),
            ExpressionCategory::RepoVar => diagnostics.push(Diagnostic::info(
                "V007",
                format!("Uses repository variable '{}'", name),
            )),
            ExpressionCategory::Secret => diagnostics.push(Diagnostic::info(
                "V007",
                format!("Uses secret '{}'", name),
            )),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::parse::parse;

    fn run(yaml: &str) -> Vec<Diagnostic> {
        validate_content(&parse(yaml).unwrap())
    }

    #[test]
    fn todo_is_a_warning() {
        let diagnostics = run("jobs:\n  a:\n    steps:\n      - run: echo TODO remove\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "V005");
    }

    #[test]
    fn aws_key_prefix_is_flagged() {
        let diagnostics = run("env:\n  KEY: AKIAEXAMPLE\n");
        assert_eq!(diagnostics[0].code, "V006");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Error);
    }

    #[test]
    fn long_base64_run_is_flagged() {
        let token = "QWxhZGRpbjpvcGVuIHNlc2FtZQ+abcdefghijklmnopqrstuv";
        let diagnostics = run(&format!("env:\n  TOKEN: {token}\n"));
        assert!(diagnostics.iter().any(|d| d.code == "V006"));
    }

    #[test]
    fn short_values_are_not_secrets() {
        assert!(run("env:\n  REGION: eu-west-1\n").is_empty());
    }

    #[test]
    fn expression_references() {
        let diagnostics = run(
            "env:\n  A: one\njobs:\n  j:\n    env:\n      B: two\n    steps:\n      - run: echo ${{ env.A }} ${{ env.B }} ${{ env.C }} ${{ vars.V }} ${{ secrets.S }} ${{ github.sha }}\n",
        );
        let messages: Vec<(&str, DiagnosticKind)> =
            diagnostics.iter().map(|d| (d.message.as_str(), d.kind)).collect();
        assert_eq!(
            messages,
            vec![
                (
                    "Environment variable 'C' is referenced but not defined in workflow or job env",
                    DiagnosticKind::Warning
                ),
                ("Uses repository variable 'V'", DiagnosticKind::Info),
                ("Uses secret 'S'", DiagnosticKind::Info),
            ]
        );
    }

    #[test]
    fn repeated_expression_is_reported_once() {
        let diagnostics = run(
            "jobs:\n  j:\n    steps:\n      - run: echo ${{ secrets.S }}\n      - run: echo ${{ secrets.S }} ${{secrets.S}}\n",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Uses secret 'S'");
    }
}
