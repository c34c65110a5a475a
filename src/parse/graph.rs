//! Job dependency graph built from `needs`, with cycle search and layering.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::types::WorkflowDocument;

/// A `needs` entry naming a job that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingNeed {
    pub job_id: String,
    pub missing: String,
}

/// Derived on every analysis pass; never persisted.
///
/// `dependencies[i]` lists the jobs job `i` needs, in `needs` order, restricted
/// to jobs that exist. The petgraph view carries the same edges pointing from
/// dependency to dependent, i.e. in execution order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub job_ids: Vec<String>,
    pub dependencies: Vec<Vec<usize>>,
    pub dangling: Vec<DanglingNeed>,
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn build(document: &WorkflowDocument) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut job_ids = Vec::with_capacity(document.jobs.len());

        for job in &document.jobs {
            let idx = graph.add_node(job.id.clone());
            node_indices.insert(job.id.clone(), idx);
            job_ids.push(job.id.clone());
        }

        let mut dependencies = Vec::with_capacity(document.jobs.len());
        let mut dangling = Vec::new();

        for job in &document.jobs {
            let mut deps = Vec::with_capacity(job.needs.len());
            for need in &job.needs {
                match node_indices.get(need) {
                    Some(&dep_idx) => {
                        deps.push(dep_idx.index());
                        graph.update_edge(dep_idx, node_indices[&job.id], ());
                    }
                    None => dangling.push(DanglingNeed {
                        job_id: job.id.clone(),
                        missing: need.clone(),
                    }),
                }
            }
            dependencies.push(deps);
        }

        DependencyGraph {
            job_ids,
            dependencies,
            dangling,
            graph,
            node_indices,
        }
    }

    /// First cycle found by depth-first search, or empty.
    ///
    /// Roots are tried in job order and children in `needs` order. The search
    /// stops at the first node reached that is already on the current path;
    /// the result is the path from that node's occurrence through the revisit,
    /// so the first and last ids are equal. A self-loop yields `[a, a]`.
    pub fn find_cycle(&self) -> Vec<String> {
        let n = self.job_ids.len();
        let mut visited = vec![false; n];
        let mut on_path = vec![false; n];
        let mut path: Vec<usize> = Vec::new();
        // (node, index of the next dependency to explore)
        let mut worklist: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            on_path[root] = true;
            path.push(root);
            worklist.push((root, 0));

            while let Some(frame) = worklist.last_mut() {
                let node = frame.0;
                let Some(&next) = self.dependencies[node].get(frame.1) else {
                    on_path[node] = false;
                    path.pop();
                    worklist.pop();
                    continue;
                };
                frame.1 += 1;

                if on_path[next] {
                    let start = path.iter().position(|&p| p == next).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..]
                        .iter()
                        .map(|&i| self.job_ids[i].clone())
                        .collect();
                    cycle.push(self.job_ids[next].clone());
                    tracing::debug!(?cycle, "dependency cycle found");
                    return cycle;
                }
                if !visited[next] {
                    visited[next] = true;
                    on_path[next] = true;
                    path.push(next);
                    worklist.push((next, 0));
                }
            }
        }

        Vec::new()
    }

    pub fn dependencies(&self, job_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(job_id) else {
            return vec![];
        };
        self.dependencies[idx.index()]
            .iter()
            .map(|&i| self.job_ids[i].as_str())
            .collect()
    }

    pub fn dependents(&self, job_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(job_id) else {
            return vec![];
        };
        let mut dependents: Vec<&str> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        // petgraph yields neighbors newest-first
        dependents.reverse();
        dependents
    }

    /// Every job `job_id` needs directly or transitively.
    pub fn ancestors(&self, job_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(job_id) else {
            return vec![];
        };
        let mut seen = vec![false; self.job_ids.len()];
        let mut stack = self.dependencies[idx.index()].clone();
        let mut out = Vec::new();
        while let Some(i) = stack.pop() {
            if std::mem::replace(&mut seen[i], true) {
                continue;
            }
            out.push(self.job_ids[i].as_str());
            stack.extend(self.dependencies[i].iter().copied());
        }
        out
    }

    /// Longest-path layer of every job: 0 for jobs with no (existing)
    /// dependencies, otherwise one more than the deepest dependency.
    /// `None` when the graph has a cycle.
    pub fn levels(&self) -> Option<HashMap<String, usize>> {
        let order = toposort(&self.graph, None).ok()?;
        let mut level = vec![0usize; self.job_ids.len()];
        for idx in order {
            let i = idx.index();
            level[i] = self.dependencies[i]
                .iter()
                .map(|&d| level[d] + 1)
                .max()
                .unwrap_or(0);
        }
        Some(
            self.job_ids
                .iter()
                .cloned()
                .zip(level)
                .collect(),
        )
    }
}
