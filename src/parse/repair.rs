//! Indentation repair for step blocks, applied before YAML decoding.
//!
//! Targets a fixed set of authoring mistakes seen in hand-written workflows:
//! step properties (`if:` / `run:`) indented off the `step + 2` column, and a
//! Slack notification step whose `curl --data` payload line lost its
//! indentation. Anything else passes through untouched and may still fail to
//! parse.

use std::sync::OnceLock;

use regex::Regex;

/// Keys that continue a step block after a blank line.
const STEP_PROPERTY_KEYS: &[&str] = &[
    "if:",
    "run:",
    "uses:",
    "with:",
    "env:",
    "id:",
    "shell:",
    "working-directory:",
    "continue-on-error:",
    "timeout-minutes:",
];

/// Step properties whose indentation is forced to `step + 2`.
const REINDENTED_KEYS: &[&str] = &["if:", "run:"];

fn slack_payload_regex() -> &'static Regex {
    static SLACK_PAYLOAD: OnceLock<Regex> = OnceLock::new();
    SLACK_PAYLOAD.get_or_init(|| Regex::new(r#"--data\s.*\\"text\\""#).expect("valid regex"))
}

fn slack_step_regex() -> &'static Regex {
    static SLACK_STEP: OnceLock<Regex> = OnceLock::new();
    SLACK_STEP.get_or_init(|| {
        Regex::new(
            r"(?m)^([ \t]*)- name:[ \t]*Notify Slack[ \t]*\r?\n[ \t]*if:[ \t]*success\(\)[ \t]*\r?\n[ \t]*run:[ \t]*curl",
        )
        .expect("valid regex")
    })
}

#[derive(Debug, Default)]
struct RepairState {
    /// Column of the `-` of the current `- name:` step, while inside one.
    step_indent: Option<usize>,
    /// Inside a `run: |` / `run: >` block scalar.
    in_run_block: bool,
    /// Column of a step property that opened a nested mapping (`with:`, `env:`).
    nested_indent: Option<usize>,
}

impl RepairState {
    fn leave_step(&mut self) {
        self.step_indent = None;
        self.in_run_block = false;
        self.nested_indent = None;
    }
}

/// Repair known indentation defects. Total; never fails.
pub fn repair(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut state = RepairState::default();
    let mut rewritten = 0usize;

    for (i, &line) in lines.iter().enumerate() {
        let indent = indentation(line);
        let trimmed = &line[indent..];
        let blank = line.trim().is_empty();

        if state.in_run_block {
            let step = state.step_indent.unwrap_or(0);
            if blank || indent > step {
                out.push(line.to_string());
                continue;
            }
            state.in_run_block = false;
        }

        if trimmed.starts_with("- name:") {
            state.leave_step();
            state.step_indent = Some(indent);
            out.push(line.to_string());
            continue;
        }

        let Some(step) = state.step_indent else {
            out.push(line.to_string());
            continue;
        };
        let expected = step + 2;

        if blank {
            if !continues_step(lines.get(i + 1).copied(), step) {
                state.leave_step();
            }
            out.push(line.to_string());
            continue;
        }

        // The payload continues the `run:` scalar, so it must sit right of the key.
        if slack_payload_regex().is_match(trimmed) {
            if indent <= expected {
                rewritten += 1;
                out.push(reindent(trimmed, expected + 2));
            } else {
                out.push(line.to_string());
            }
            continue;
        }

        if indent < step {
            state.leave_step();
            out.push(line.to_string());
            continue;
        }

        if let Some(nested) = state.nested_indent {
            if indent > nested {
                out.push(line.to_string());
                continue;
            }
            state.nested_indent = None;
        }

        if let Some(key) = REINDENTED_KEYS.iter().find(|k| trimmed.starts_with(**k)) {
            if *key == "run:" && opens_block_scalar(&trimmed[key.len()..]) {
                state.in_run_block = true;
            }
            if indent != expected {
                rewritten += 1;
                out.push(reindent(trimmed, expected));
            } else {
                out.push(line.to_string());
            }
            continue;
        }

        if indent == expected && trimmed.trim_end().ends_with(':') {
            state.nested_indent = Some(indent);
        }
        out.push(line.to_string());
    }

    let joined = out.join("\n");
    let repaired = reflow_slack_notification(&joined);
    if rewritten > 0 || repaired != joined {
        tracing::debug!(rewritten, "repaired step indentation");
    }
    repaired
}

/// Rewrite a `- name: Notify Slack` / `if: success()` / `run: curl` triple so
/// the `if` and `run` lines sit two columns right of the `-`.
pub fn reflow_slack_notification(text: &str) -> String {
    slack_step_regex()
        .replace_all(text, "${1}- name: Notify Slack\n${1}  if: success()\n${1}  run: curl")
        .into_owned()
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn reindent(trimmed: &str, column: usize) -> String {
    format!("{}{}", " ".repeat(column), trimmed)
}

fn opens_block_scalar(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.starts_with('|') || rest.starts_with('>')
}

fn continues_step(next: Option<&str>, step: usize) -> bool {
    let Some(next) = next else { return false };
    let indent = indentation(next);
    let trimmed = &next[indent..];
    if next.trim().is_empty() || trimmed.starts_with("- ") {
        return false;
    }
    indent > step || STEP_PROPERTY_KEYS.iter().any(|k| trimmed.starts_with(k))
}
