//! `${{ ... }}` expression scanning, classification and value prediction.
//!
//! Classification is an ordered table of rules; the first rule whose matcher
//! accepts the expression decides its category and predicts an example value.
//! Predicted values are illustrative placeholders, never real runtime values.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;

use crate::parse::types::collect_strings;

pub const EXAMPLE_SHA: &str = "a1b2c3d4e5f6789012345678901234567890abcd";
pub const EXAMPLE_REF: &str = "refs/heads/main";
pub const EXAMPLE_EVENT: &str = "push";
pub const EXAMPLE_RUN_NUMBER: &str = "42";
pub const EXAMPLE_ACTOR: &str = "octocat";
pub const EXAMPLE_REPOSITORY: &str = "octocat/hello-world";
pub const EXAMPLE_WORKSPACE: &str = "/home/runner/work/hello-world/hello-world";
pub const EXAMPLE_GITHUB_ENV: &str = "/home/runner/work/_temp/_runner_file_commands/set_env";
pub const SECRET_PLACEHOLDER: &str = "***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionCategory {
    Env,
    Secret,
    RepoVar,
    GithubContext,
    GithubEnvVar,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionReference {
    /// `env`, `jobs.<id>` or `jobs.<id>.steps[<n>]`.
    pub location: String,
    /// Full `${{ ... }}` text as written.
    pub raw_expression: String,
    /// Trimmed inner expression.
    pub expression: String,
    pub category: ExpressionCategory,
    /// Variable, secret or context field the expression names.
    pub name: String,
    pub predicted_value: String,
}

/// One `${{ }}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundExpression {
    pub raw: String,
    pub inner: String,
}

/// Env definitions visible where an expression is evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionScope<'a> {
    pub workflow_name: Option<&'a str>,
    pub workflow_env: Option<&'a BTreeMap<String, String>>,
    pub job_env: Option<&'a BTreeMap<String, String>>,
    pub step_env: Option<&'a BTreeMap<String, String>>,
}

impl<'a> PredictionScope<'a> {
    /// Most specific static definition: step, then job, then workflow.
    pub fn lookup_env(&self, name: &str) -> Option<&'a str> {
        [self.step_env, self.job_env, self.workflow_env]
            .into_iter()
            .flatten()
            .find_map(|env| env.get(name).map(String::as_str))
    }
}

// =============================================================================
// SCANNING
// =============================================================================

fn expression_regex() -> &'static Regex {
    static EXPRESSION: OnceLock<Regex> = OnceLock::new();
    EXPRESSION.get_or_init(|| Regex::new(r"\$\{\{\s*(.*?)\s*\}\}").expect("valid regex"))
}

/// Every expression in `text`, in order of appearance.
pub fn find_expressions(text: &str) -> Vec<FoundExpression> {
    expression_regex()
        .captures_iter(text)
        .map(|caps| FoundExpression {
            raw: caps[0].to_string(),
            inner: caps[1].to_string(),
        })
        .collect()
}

/// Distinct expressions (by inner text) across every string in `value`.
pub fn expressions_in_value(value: &Value) -> Vec<FoundExpression> {
    let mut strings = Vec::new();
    collect_strings(value, &mut strings);
    let mut seen = HashSet::new();
    strings
        .into_iter()
        .flat_map(find_expressions)
        .filter(|e| seen.insert(e.inner.clone()))
        .collect()
}

// =============================================================================
// CLASSIFICATION TABLE
// =============================================================================

struct ClassificationRule {
    category: ExpressionCategory,
    /// Returns the referenced name when the rule applies.
    matches: fn(&str) -> Option<&str>,
    predict: fn(&str, &PredictionScope<'_>) -> String,
}

const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        category: ExpressionCategory::Env,
        matches: env_name,
        predict: predict_env,
    },
    ClassificationRule {
        category: ExpressionCategory::Secret,
        matches: secret_name,
        predict: predict_secret,
    },
    ClassificationRule {
        category: ExpressionCategory::RepoVar,
        matches: repo_var_name,
        predict: predict_repo_var,
    },
    ClassificationRule {
        category: ExpressionCategory::GithubContext,
        matches: github_field,
        predict: predict_github_context,
    },
    ClassificationRule {
        category: ExpressionCategory::GithubEnvVar,
        matches: bare_env_name,
        predict: predict_github_env_var,
    },
];

/// Category and referenced name of an inner expression.
pub fn classify(expression: &str) -> (ExpressionCategory, &str) {
    let expression = expression.trim();
    RULES
        .iter()
        .find_map(|rule| (rule.matches)(expression).map(|name| (rule.category, name)))
        .unwrap_or((ExpressionCategory::Unknown, expression))
}

pub fn predict(category: ExpressionCategory, name: &str, scope: &PredictionScope<'_>) -> String {
    RULES
        .iter()
        .find(|rule| rule.category == category)
        .map(|rule| (rule.predict)(name, scope))
        .unwrap_or_else(|| format!("evaluated at runtime: `{name}`"))
}

pub fn reference(
    location: &str,
    found: &FoundExpression,
    scope: &PredictionScope<'_>,
) -> ExpressionReference {
    let (category, name) = classify(&found.inner);
    ExpressionReference {
        location: location.to_string(),
        raw_expression: found.raw.clone(),
        expression: found.inner.clone(),
        category,
        name: name.to_string(),
        predicted_value: predict(category, name, scope),
    }
}

fn prefixed_name<'e>(expression: &'e str, prefix: &str) -> Option<&'e str> {
    let rest = expression.strip_prefix(prefix)?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn env_name(expression: &str) -> Option<&str> {
    prefixed_name(expression, "env.")
}

fn secret_name(expression: &str) -> Option<&str> {
    prefixed_name(expression, "secrets.")
}

fn repo_var_name(expression: &str) -> Option<&str> {
    prefixed_name(expression, "vars.")
}

fn github_field(expression: &str) -> Option<&str> {
    let rest = expression.strip_prefix("github.")?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn bare_env_name(expression: &str) -> Option<&str> {
    let is_bare = !expression.is_empty() && expression.chars().all(|c| c.is_ascii_uppercase() || c == '_');
    is_bare.then_some(expression)
}

fn predict_env(name: &str, scope: &PredictionScope<'_>) -> String {
    scope
        .lookup_env(name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("value of `{name}` environment variable"))
}

fn predict_secret(_name: &str, _scope: &PredictionScope<'_>) -> String {
    SECRET_PLACEHOLDER.to_string()
}

fn predict_repo_var(name: &str, _scope: &PredictionScope<'_>) -> String {
    format!("value of repository variable `{name}`")
}

fn predict_github_context(field: &str, scope: &PredictionScope<'_>) -> String {
    match field {
        "sha" => EXAMPLE_SHA.to_string(),
        "ref" => EXAMPLE_REF.to_string(),
        "event_name" => EXAMPLE_EVENT.to_string(),
        "workflow" => scope.workflow_name.unwrap_or("Workflow").to_string(),
        "run_number" => EXAMPLE_RUN_NUMBER.to_string(),
        "actor" => EXAMPLE_ACTOR.to_string(),
        "repository" => EXAMPLE_REPOSITORY.to_string(),
        other => format!("GitHub context: `{other}`"),
    }
}

fn predict_github_env_var(name: &str, _scope: &PredictionScope<'_>) -> String {
    match name {
        "GITHUB_SHA" => EXAMPLE_SHA.to_string(),
        "GITHUB_REF" => EXAMPLE_REF.to_string(),
        "GITHUB_WORKSPACE" => EXAMPLE_WORKSPACE.to_string(),
        "GITHUB_ENV" => EXAMPLE_GITHUB_ENV.to_string(),
        "GITHUB_RUN_NUMBER" => EXAMPLE_RUN_NUMBER.to_string(),
        other => format!("GitHub environment variable `{other}`"),
    }
}
