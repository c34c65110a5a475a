use analyzer::parse::{self, WorkflowDocument};
use proptest::prelude::*;

// =============================================================================
// Workflow text builders
// =============================================================================

/// Workflow YAML with one job per `(id, needs)` entry, all on ubuntu-latest.
pub fn workflow_with_needs(jobs: &[(&str, &[&str])]) -> String {
    let mut yaml = String::from("name: Generated\non: push\njobs:\n");
    for (id, needs) in jobs {
        yaml.push_str(&format!("  {id}:\n    runs-on: ubuntu-latest\n"));
        if !needs.is_empty() {
            yaml.push_str(&format!("    needs: [{}]\n", needs.join(", ")));
        }
        yaml.push_str("    steps:\n      - run: echo ok\n");
    }
    yaml
}

pub fn parse_needs(jobs: &[(&str, &[&str])]) -> WorkflowDocument {
    parse::parse(&workflow_with_needs(jobs)).expect("generated workflow should parse")
}

/// Single job `build` with one step running `script`.
pub fn workflow_with_script(script: &str) -> String {
    let mut yaml = String::from(
        "jobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - name: Script\n        run: |\n",
    );
    for line in script.lines() {
        yaml.push_str("          ");
        yaml.push_str(line);
        yaml.push('\n');
    }
    yaml
}

// =============================================================================
// Generated job graphs
// =============================================================================

/// Job graphs of 1..=`max_jobs` jobs named `j0..`, each needing up to two
/// others. With `acyclic` set, a job only needs jobs with a lower index.
pub fn job_graphs(max_jobs: usize, acyclic: bool) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_jobs).prop_flat_map(move |size| {
        prop::collection::vec(prop::collection::vec(0..size, 0..3), size).prop_map(move |targets| {
            targets
                .into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    let mut needs: Vec<String> = Vec::new();
                    for pick in picks {
                        let target = if acyclic {
                            if i == 0 {
                                break;
                            }
                            pick % i
                        } else {
                            pick
                        };
                        let name = format!("j{target}");
                        if !needs.contains(&name) {
                            needs.push(name);
                        }
                    }
                    (format!("j{i}"), needs)
                })
                .collect()
        })
    })
}

pub fn parse_jobs(jobs: &[(String, Vec<String>)]) -> WorkflowDocument {
    let borrowed: Vec<(&str, Vec<&str>)> = jobs
        .iter()
        .map(|(id, needs)| (id.as_str(), needs.iter().map(String::as_str).collect()))
        .collect();
    let refs: Vec<(&str, &[&str])> = borrowed.iter().map(|(id, n)| (*id, n.as_slice())).collect();
    parse_needs(&refs)
}
