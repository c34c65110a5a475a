//! Shell-level environment mutations inside `run:` scripts.

use std::sync::OnceLock;

use regex::Regex;

use super::expression::{EXAMPLE_RUN_NUMBER, EXAMPLE_SHA, PredictionScope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAssignmentKind {
    /// `export NAME=value`, visible for the rest of the step.
    Export,
    /// Written to `$GITHUB_ENV`, visible to later steps of the job.
    GithubEnv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellAssignment {
    pub kind: ShellAssignmentKind,
    pub name: String,
    /// Value as written in the script.
    pub value: String,
    /// 1-based line within the script.
    pub line: usize,
}

fn export_regex() -> &'static Regex {
    static EXPORT: OnceLock<Regex> = OnceLock::new();
    EXPORT.get_or_init(|| {
        Regex::new(r"^\s*export\s+([A-Za-z_][A-Za-z0-9_]*)=(.*?)\s*$").expect("valid regex")
    })
}

/// `NAME=value >> $GITHUB_ENV`, optionally behind `echo` and inside quotes.
fn github_env_regex() -> &'static Regex {
    static GITHUB_ENV: OnceLock<Regex> = OnceLock::new();
    GITHUB_ENV.get_or_init(|| {
        Regex::new(
            r#"^\s*(?:echo\s+)?["']?([A-Za-z_][A-Za-z0-9_]*)=(.*?)["']?\s*>>\s*"?\$\{?GITHUB_ENV\}?"?\s*$"#,
        )
        .expect("valid regex")
    })
}

fn sha_slice_regex() -> &'static Regex {
    static SHA_SLICE: OnceLock<Regex> = OnceLock::new();
    SHA_SLICE.get_or_init(|| Regex::new(r"\$\{GITHUB_SHA::?(\d+)\}").expect("valid regex"))
}

/// `$GITHUB_SHA` / `$GITHUB_RUN_NUMBER`, braced or bare, but not a longer
/// name such as `$GITHUB_SHA_SHORT`.
fn runtime_var_regex() -> &'static Regex {
    static RUNTIME_VAR: OnceLock<Regex> = OnceLock::new();
    RUNTIME_VAR.get_or_init(|| {
        Regex::new(r"\$(?:\{(GITHUB_SHA|GITHUB_RUN_NUMBER)\}|(GITHUB_SHA|GITHUB_RUN_NUMBER)\b)")
            .expect("valid regex")
    })
}

fn env_expression_regex() -> &'static Regex {
    static ENV_EXPRESSION: OnceLock<Regex> = OnceLock::new();
    ENV_EXPRESSION
        .get_or_init(|| Regex::new(r"\$\{\{\s*env\.([A-Za-z0-9_-]+)\s*\}\}").expect("valid regex"))
}

/// Scan a script line by line for `export` and `$GITHUB_ENV` assignments.
pub fn scan_script(script: &str) -> Vec<ShellAssignment> {
    script
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            if let Some(caps) = github_env_regex().captures(line) {
                return Some(ShellAssignment {
                    kind: ShellAssignmentKind::GithubEnv,
                    name: caps[1].to_string(),
                    value: caps[2].to_string(),
                    line: i + 1,
                });
            }
            export_regex().captures(line).map(|caps| ShellAssignment {
                kind: ShellAssignmentKind::Export,
                name: caps[1].to_string(),
                value: unquote(&caps[2]).to_string(),
                line: i + 1,
            })
        })
        .collect()
}

/// Example value of a `$GITHUB_ENV` assignment plus an optional note about
/// `${GITHUB_SHA::N}` truncation. The full example SHA is substituted
/// whatever N is; N only shows up in the note.
pub fn predict_github_env_value(value: &str, scope: &PredictionScope<'_>) -> (String, Option<String>) {
    let truncation = sha_slice_regex()
        .captures(value)
        .map(|caps| format!("GITHUB_SHA truncated to {} characters at runtime", &caps[1]));

    let predicted = sha_slice_regex().replace_all(value, EXAMPLE_SHA);
    let predicted = runtime_var_regex().replace_all(&predicted, |caps: &regex::Captures<'_>| {
        match caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) {
            Some("GITHUB_SHA") => EXAMPLE_SHA,
            _ => EXAMPLE_RUN_NUMBER,
        }
    });
    let predicted = env_expression_regex()
        .replace_all(&predicted, |caps: &regex::Captures<'_>| {
            scope
                .lookup_env(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| format!("value of `{}` environment variable", &caps[1]))
        })
        .into_owned();

    (predicted, truncation)
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
