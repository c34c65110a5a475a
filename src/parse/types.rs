//! Rust model of the GitHub Actions workflow subset the engine understands.
//!
//! Built from a decoded `serde_yaml::Value` rather than derived directly, so
//! that absent or wrong-typed fields degrade to "absent" instead of failing
//! the whole document. Only the root being a mapping is enforced.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

// =============================================================================
// TOP-LEVEL WORKFLOW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowDocument {
    pub name: Option<String>,
    pub triggers: Option<Triggers>,
    /// Workflow-level `env`.
    pub env: BTreeMap<String, String>,
    /// Jobs in document order. Ids are the mapping keys and are unique.
    pub jobs: Vec<Job>,
    #[serde(skip)]
    pub raw: Value,
}

/// The `on:` section: a single event, a list of events, or per-event config.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Triggers {
    Event(String),
    Events(Vec<String>),
    Configured(Vec<TriggerConfig>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerConfig {
    pub event: String,
    pub config: Value,
}

impl Triggers {
    pub fn event_names(&self) -> Vec<&str> {
        match self {
            Triggers::Event(e) => vec![e.as_str()],
            Triggers::Events(events) => events.iter().map(String::as_str).collect(),
            Triggers::Configured(configs) => configs.iter().map(|c| c.event.as_str()).collect(),
        }
    }
}

// =============================================================================
// JOBS & STEPS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: String,
    pub display_name: String,
    pub needs: Vec<String>,
    pub runs_on: Option<RunsOn>,
    pub env: BTreeMap<String, String>,
    pub steps: Vec<Step>,
    pub timeout_minutes: Option<f64>,
    pub continue_on_error: Option<bool>,
    /// `strategy.matrix` is present. Its content is not interpreted.
    pub has_matrix: bool,
    /// Job-level `if:` condition.
    pub condition: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

/// Runner label(s) from `runs-on`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RunsOn {
    Label(String),
    Labels(Vec<String>),
    /// Mapping form (`group:` / `labels:`). Kept opaque.
    Group(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// 0-based position within the job.
    pub index: usize,
    /// Position-based identifier, unique within the job (`step-1`, `step-2`, ...).
    pub key: String,
    /// User-assigned `id:`.
    pub id: Option<String>,
    pub name: Option<String>,
    pub uses: Option<String>,
    pub run: Option<String>,
    pub condition: Option<String>,
    pub env: BTreeMap<String, String>,
    pub with: BTreeMap<String, String>,
    #[serde(skip)]
    pub raw: Value,
}

impl WorkflowDocument {
    /// A document whose root carried no keys at all (blank input, `null`, `{}`).
    pub fn empty() -> Self {
        WorkflowDocument {
            name: None,
            triggers: None,
            env: BTreeMap::new(),
            jobs: Vec::new(),
            raw: Value::Mapping(Mapping::new()),
        }
    }

    pub fn from_mapping(root: &Mapping) -> Self {
        let name = root.get("name").and_then(scalar_string);
        let triggers = root
            .get("on")
            .or_else(|| root.get(Value::Bool(true)))
            .and_then(triggers_from_value);
        let env = root.get("env").map(string_map).unwrap_or_default();

        let jobs = root
            .get("jobs")
            .and_then(Value::as_mapping)
            .map(|jobs| {
                jobs.iter()
                    .filter_map(|(key, value)| {
                        let id = scalar_string(key)?;
                        Some(Job::from_value(id, value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        WorkflowDocument {
            name,
            triggers,
            env,
            jobs,
            raw: Value::Mapping(root.clone()),
        }
    }

    /// True for the distinct "nothing written yet" state.
    pub fn is_empty(&self) -> bool {
        match &self.raw {
            Value::Mapping(m) => m.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn has_job(&self, id: &str) -> bool {
        self.job(id).is_some()
    }

    /// Serialized text of the whole document, used by text-level checks.
    pub fn serialized_text(&self) -> String {
        serialize_value(&self.raw)
    }

    pub fn steps(&self) -> impl Iterator<Item = (&Job, &Step)> {
        self.jobs
            .iter()
            .flat_map(|job| job.steps.iter().map(move |step| (job, step)))
    }
}

impl Job {
    fn from_value(id: String, value: &Value) -> Self {
        let display_name = value
            .get("name")
            .and_then(scalar_string)
            .unwrap_or_else(|| id.clone());

        let needs = match value.get("needs") {
            Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_string).collect(),
            Some(v) => scalar_string(v).into_iter().collect(),
            None => Vec::new(),
        };

        let runs_on = value.get("runs-on").and_then(|v| match v {
            Value::Sequence(seq) => Some(RunsOn::Labels(
                seq.iter().filter_map(scalar_string).collect(),
            )),
            Value::Mapping(_) => Some(RunsOn::Group(v.clone())),
            Value::Null => None,
            other => scalar_string(other).map(RunsOn::Label),
        });

        let steps = value
            .get("steps")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().enumerate().map(|(i, s)| Step::from_value(i, s)).collect())
            .unwrap_or_default();

        let has_matrix = value
            .get("strategy")
            .and_then(|s| s.get("matrix"))
            .is_some();

        Job {
            display_name,
            needs,
            runs_on,
            env: value.get("env").map(string_map).unwrap_or_default(),
            steps,
            timeout_minutes: value.get("timeout-minutes").and_then(Value::as_f64),
            continue_on_error: value.get("continue-on-error").and_then(Value::as_bool),
            has_matrix,
            condition: value.get("if").and_then(scalar_string),
            raw: value.clone(),
            id,
        }
    }

    pub fn depends_on(&self, other: &str) -> bool {
        self.needs.iter().any(|n| n == other)
    }
}

impl Step {
    fn from_value(index: usize, value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(scalar_string);
        Step {
            index,
            key: format!("step-{}", index + 1),
            id: field("id"),
            name: field("name"),
            uses: field("uses"),
            run: field("run"),
            condition: field("if"),
            env: value.get("env").map(string_map).unwrap_or_default(),
            with: value.get("with").map(string_map).unwrap_or_default(),
            raw: value.clone(),
        }
    }

    /// Human label: name, then action reference, then the step key.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.uses.as_deref())
            .unwrap_or(self.key.as_str())
    }

    /// True when `uses` names `action` (`owner/repo[/path]`), at any ref.
    pub fn uses_action(&self, action: &str) -> bool {
        self.uses
            .as_deref()
            .map(|u| u.split('@').next().unwrap_or(u))
            .is_some_and(|name| name == action)
    }

    pub fn uses_action_prefix(&self, prefix: &str) -> bool {
        self.uses.as_deref().is_some_and(|u| u.starts_with(prefix))
    }

    pub fn input(&self, name: &str) -> Option<&str> {
        self.with.get(name).map(String::as_str)
    }
}

// =============================================================================
// VALUE HELPERS
// =============================================================================

/// String form of a scalar. `null`, sequences and mappings have none.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

/// Mapping of scalar keys to scalar values; non-scalar entries are dropped.
pub fn string_map(value: &Value) -> BTreeMap<String, String> {
    let Some(mapping) = value.as_mapping() else {
        return BTreeMap::new();
    };
    mapping
        .iter()
        .filter_map(|(k, v)| Some((scalar_string(k)?, scalar_string(v).unwrap_or_default())))
        .collect()
}

fn triggers_from_value(value: &Value) -> Option<Triggers> {
    match value {
        Value::Sequence(seq) => Some(Triggers::Events(
            seq.iter().filter_map(scalar_string).collect(),
        )),
        Value::Mapping(mapping) => Some(Triggers::Configured(
            mapping
                .iter()
                .filter_map(|(k, v)| {
                    Some(TriggerConfig {
                        event: scalar_string(k)?,
                        config: v.clone(),
                    })
                })
                .collect(),
        )),
        other => scalar_string(other).map(Triggers::Event),
    }
}

/// JSON text of a decoded value. Mappings with non-string keys cannot be
/// written as JSON; those fall back to YAML text.
pub fn serialize_value(value: &Value) -> String {
    serde_json::to_string(value)
        .or_else(|_| serde_yaml::to_string(value))
        .unwrap_or_default()
}

/// Every string scalar reachable from `value`, in document order.
pub fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Sequence(seq) => seq.iter().for_each(|v| collect_strings(v, out)),
        Value::Mapping(mapping) => mapping.values().for_each(|v| collect_strings(v, out)),
        Value::Tagged(tagged) => collect_strings(&tagged.value, out),
        _ => {}
    }
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
