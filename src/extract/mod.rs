//! Variable and expression extraction.
//!
//! Produces a per-step variable list (step env, `${{ }}` references, shell
//! exports and `$GITHUB_ENV` writes) and a document-wide inventory. Every
//! value is an illustrative prediction; nothing is executed.

pub mod expression;
pub mod shell;

use std::collections::BTreeSet;

use serde::Serialize;
use serde_yaml::Value;

use crate::parse::types::{Job, Step, WorkflowDocument};
use expression::{ExpressionCategory, ExpressionReference, PredictionScope};
use shell::ShellAssignmentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Declared in a step `env:` block.
    Env,
    /// A `${{ }}` reference.
    Expression(ExpressionCategory),
    /// `export NAME=value` in a run script.
    Export,
    /// `NAME=value >> $GITHUB_ENV` in a run script.
    GithubEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    Workflow,
    Job,
    Step,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub scope: VariableScope,
    /// Text as written (env value, expression, or script right-hand side).
    pub source: String,
    pub value: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepVariables {
    pub job_id: String,
    pub step_key: String,
    pub step_label: String,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvDefinition {
    pub scope: VariableScope,
    /// `env`, `jobs.<id>` or `jobs.<id>.steps[<n>]`.
    pub location: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableInventory {
    pub env: Vec<EnvDefinition>,
    pub expressions: Vec<ExpressionReference>,
    pub secrets: BTreeSet<String>,
    pub repo_vars: BTreeSet<String>,
    pub github_context: BTreeSet<String>,
    pub github_env_vars: BTreeSet<String>,
    /// Variables defined by run scripts (`export` / `$GITHUB_ENV`).
    pub shell_variables: Vec<Variable>,
}

pub fn step_location(job: &Job, step: &Step) -> String {
    format!("jobs.{}.steps[{}]", job.id, step.index)
}

fn scope_for<'a>(
    document: &'a WorkflowDocument,
    job: Option<&'a Job>,
    step: Option<&'a Step>,
) -> PredictionScope<'a> {
    PredictionScope {
        workflow_name: document.name.as_deref(),
        workflow_env: Some(&document.env),
        job_env: job.map(|j| &j.env),
        step_env: step.map(|s| &s.env),
    }
}

/// Variables of every step, in job then step order.
pub fn extract_variables(document: &WorkflowDocument) -> Vec<StepVariables> {
    document
        .steps()
        .map(|(job, step)| StepVariables {
            job_id: job.id.clone(),
            step_key: step.key.clone(),
            step_label: step.label().to_string(),
            variables: step_variables(document, job, step),
        })
        .collect()
}

fn step_variables(document: &WorkflowDocument, job: &Job, step: &Step) -> Vec<Variable> {
    let scope = scope_for(document, Some(job), Some(step));
    let location = step_location(job, step);
    let mut variables = Vec::new();

    for (name, value) in &step.env {
        variables.push(Variable {
            name: name.clone(),
            kind: VariableKind::Env,
            scope: VariableScope::Step,
            source: value.clone(),
            value: value.clone(),
            note: None,
        });
    }

    for found in expression::expressions_in_value(&step.raw) {
        let reference = expression::reference(&location, &found, &scope);
        variables.push(Variable {
            name: reference.name,
            kind: VariableKind::Expression(reference.category),
            scope: VariableScope::Step,
            source: reference.raw_expression,
            value: reference.predicted_value,
            note: None,
        });
    }

    if let Some(script) = &step.run {
        for assignment in shell::scan_script(script) {
            variables.push(match assignment.kind {
                ShellAssignmentKind::Export => Variable {
                    name: assignment.name,
                    kind: VariableKind::Export,
                    scope: VariableScope::Step,
                    value: assignment.value.clone(),
                    source: assignment.value,
                    note: Some(format!("Exported for the rest of step {}", step.key)),
                },
                ShellAssignmentKind::GithubEnv => {
                    let (value, truncation) = shell::predict_github_env_value(&assignment.value, &scope);
                    let mut note = format!("Available to all subsequent steps in job {}", job.id);
                    if let Some(truncation) = truncation {
                        note.push_str("; ");
                        note.push_str(&truncation);
                    }
                    Variable {
                        name: assignment.name,
                        kind: VariableKind::GithubEnv,
                        scope: VariableScope::Job,
                        source: assignment.value,
                        value,
                        note: Some(note),
                    }
                }
            });
        }
    }

    variables
}

/// Document-wide aggregation: env by scope, expressions by location, and the
/// distinct names of secrets, repository variables and context fields.
pub fn extract_inventory(document: &WorkflowDocument) -> VariableInventory {
    let mut inventory = VariableInventory::default();

    for (name, value) in &document.env {
        inventory.env.push(EnvDefinition {
            scope: VariableScope::Workflow,
            location: "env".into(),
            name: name.clone(),
            value: value.clone(),
        });
    }
    if let Some(env) = document.raw.get("env") {
        record_expressions(&mut inventory, "env", env, &scope_for(document, None, None));
    }

    for job in &document.jobs {
        let job_location = format!("jobs.{}", job.id);
        for (name, value) in &job.env {
            inventory.env.push(EnvDefinition {
                scope: VariableScope::Job,
                location: job_location.clone(),
                name: name.clone(),
                value: value.clone(),
            });
        }
        let job_fields = without_steps(&job.raw);
        record_expressions(&mut inventory, &job_location, &job_fields, &scope_for(document, Some(job), None));

        for step in &job.steps {
            let location = step_location(job, step);
            for (name, value) in &step.env {
                inventory.env.push(EnvDefinition {
                    scope: VariableScope::Step,
                    location: location.clone(),
                    name: name.clone(),
                    value: value.clone(),
                });
            }
            record_expressions(&mut inventory, &location, &step.raw, &scope_for(document, Some(job), Some(step)));
        }
    }

    for step in extract_variables(document) {
        inventory.shell_variables.extend(
            step.variables
                .into_iter()
                .filter(|v| matches!(v.kind, VariableKind::Export | VariableKind::GithubEnv)),
        );
    }

    tracing::trace!(
        expressions = inventory.expressions.len(),
        secrets = inventory.secrets.len(),
        "built variable inventory"
    );
    inventory
}

fn record_expressions(
    inventory: &mut VariableInventory,
    location: &str,
    value: &Value,
    scope: &PredictionScope<'_>,
) {
    for found in expression::expressions_in_value(value) {
        let reference = expression::reference(location, &found, scope);
        let name = reference.name.clone();
        match reference.category {
            ExpressionCategory::Secret => {
                inventory.secrets.insert(name);
            }
            ExpressionCategory::RepoVar => {
                inventory.repo_vars.insert(name);
            }
            ExpressionCategory::GithubContext => {
                inventory.github_context.insert(name);
            }
            ExpressionCategory::GithubEnvVar => {
                inventory.github_env_vars.insert(name);
            }
            ExpressionCategory::Env | ExpressionCategory::Unknown => {}
        }
        inventory.expressions.push(reference);
    }
}

fn without_steps(job: &Value) -> Value {
    let mut job = job.clone();
    if let Some(mapping) = job.as_mapping_mut() {
        mapping.remove("steps");
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    const WORKFLOW: &str = r#"
name: Release
env:
  REGISTRY: ghcr.io
jobs:
  build:
    runs-on: ubuntu-latest
    if: ${{ github.event_name == 'push' }}
    env:
      IMAGE: app
    steps:
      - name: Tag
        env:
          STAGE: prod
        run: |
          export TAG=v1
          echo "IMAGE_TAG=${{ env.REGISTRY }}/${GITHUB_SHA::8}" >> $GITHUB_ENV
      - name: Push
        run: docker push ${{ env.IMAGE }} --token ${{ secrets.REGISTRY_TOKEN }} ${{ github.sha }} ${{ vars.REGION }}
"#;

    #[test]
    fn step_variables_in_order() {
        let doc = parse(WORKFLOW).unwrap();
        let steps = extract_variables(&doc);
        assert_eq!(steps.len(), 2);

        let kinds: Vec<VariableKind> = steps[0].variables.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VariableKind::Env,
                VariableKind::Expression(ExpressionCategory::Env),
                VariableKind::Export,
                VariableKind::GithubEnv,
            ]
        );
        let image_tag = &steps[0].variables[3];
        assert_eq!(image_tag.name, "IMAGE_TAG");
        assert_eq!(image_tag.value, format!("ghcr.io/{}", expression::EXAMPLE_SHA));
        assert!(image_tag.note.as_deref().unwrap().contains("truncated to 8"));
    }

    #[test]
    fn expression_predictions_use_static_env() {
        let doc = parse(WORKFLOW).unwrap();
        let push = &extract_variables(&doc)[1];
        let by_name = |n: &str| push.variables.iter().find(|v| v.name == n).unwrap();
        assert_eq!(by_name("IMAGE").value, "app");
        assert_eq!(by_name("REGISTRY_TOKEN").value, expression::SECRET_PLACEHOLDER);
        assert_eq!(by_name("sha").value, expression::EXAMPLE_SHA);
        assert_eq!(by_name("REGION").kind, VariableKind::Expression(ExpressionCategory::RepoVar));
    }

    #[test]
    fn inventory_collects_distinct_names_and_locations() {
        let doc = parse(WORKFLOW).unwrap();
        let inventory = extract_inventory(&doc);
        assert!(inventory.secrets.contains("REGISTRY_TOKEN"));
        assert!(inventory.repo_vars.contains("REGION"));
        assert!(inventory.github_context.contains("sha"));
        assert!(inventory.github_context.contains("event_name"));
        assert!(inventory
            .expressions
            .iter()
            .any(|e| e.location == "jobs.build" && e.name == "event_name"));
        let scopes: Vec<VariableScope> = inventory.env.iter().map(|e| e.scope).collect();
        assert_eq!(scopes, vec![VariableScope::Workflow, VariableScope::Job, VariableScope::Step]);
        assert_eq!(inventory.shell_variables.len(), 2);
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = parse(WORKFLOW).unwrap();
        assert_eq!(extract_variables(&doc), extract_variables(&doc));
        assert_eq!(extract_inventory(&doc), extract_inventory(&doc));
    }
}
