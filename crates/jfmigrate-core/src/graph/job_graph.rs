//! Job graph
//!
//! Jobs are kept in insertion (document) order. Edges are derived from the
//! predecessor sets of the jobs.

use super::{JobAction, JobNode};
use crate::ast::PostBlock;
use crate::error::{CoreError, Result};
use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A dependency graph of jobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobGraph {
    jobs: Vec<JobNode>,
}

impl JobGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job; its id must not be taken yet
    pub fn push(&mut self, job: JobNode) -> Result<()> {
        if self.contains(&job.id) {
            return Err(CoreError::DuplicateJob(job.id));
        }
        self.jobs.push(job);
        Ok(())
    }

    pub fn jobs(&self) -> &[JobNode] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&JobNode> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All edges as (predecessor, dependent) pairs, in document order
    pub fn edges(&self) -> Vec<(String, String)> {
        self.jobs
            .iter()
            .flat_map(|job| {
                job.needs
                    .iter()
                    .map(move |need| (need.clone(), job.id.clone()))
            })
            .collect()
    }

    /// Jobs without predecessors
    pub fn roots(&self) -> Vec<&str> {
        self.jobs
            .iter()
            .filter(|job| job.needs.is_empty())
            .map(|job| job.id.as_str())
            .collect()
    }

    /// Jobs that no other job depends on
    pub fn leaves(&self) -> Vec<&str> {
        let depended_on: HashSet<&str> = self
            .jobs
            .iter()
            .flat_map(|job| job.needs.iter().map(String::as_str))
            .collect();

        self.jobs
            .iter()
            .filter(|job| !depended_on.contains(job.id.as_str()))
            .map(|job| job.id.as_str())
            .collect()
    }

    /// Jobs that directly depend on `id`
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.jobs
            .iter()
            .filter(|job| job.needs.iter().any(|need| need == id))
            .map(|job| job.id.as_str())
            .collect()
    }

    /// The synthetic terminal job, if any
    pub fn terminal(&self) -> Option<&JobNode> {
        self.jobs.iter().find(|job| job.is_aggregate())
    }

    /// Topological order (Kahn's algorithm, ties broken by document order).
    ///
    /// Fails on unknown dependencies and on cycles.
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for job in &self.jobs {
            for need in &job.needs {
                if !self.contains(need) {
                    return Err(CoreError::UnknownDependency {
                        job: job.id.clone(),
                        dependency: need.clone(),
                    });
                }
            }
            in_degree.insert(job.id.as_str(), job.needs.len());
        }

        let mut queue: VecDeque<&str> = self
            .jobs
            .iter()
            .filter(|job| job.needs.is_empty())
            .map(|job| job.id.as_str())
            .collect();
        let mut order = Vec::with_capacity(self.jobs.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for successor in self.successors(id) {
                if let Some(degree) = in_degree.get_mut(successor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(successor);
                    }
                }
            }
        }

        if order.len() != self.jobs.len() {
            let mut stuck: Vec<String> = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id.to_string())
                .collect();
            stuck.sort();
            return Err(CoreError::CyclicGraph(stuck));
        }

        Ok(order)
    }

    /// Check that every dependency exists and the graph is acyclic
    pub fn validate(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    /// Re-extract a job graph from a workflow document.
    ///
    /// Jobs calling a local action map back to that bundle; any other job is
    /// treated as the aggregate post job. Post hook contents are not
    /// recovered.
    pub fn from_workflow(workflow: &Workflow) -> Self {
        let jobs = workflow
            .jobs
            .iter()
            .map(|(id, job)| {
                let action = job
                    .steps
                    .iter()
                    .find(|step| step.is_local_action())
                    .and_then(|step| step.uses.as_deref())
                    .and_then(|uses| uses.trim_end_matches('/').rsplit('/').next())
                    .map(|bundle| JobAction::Bundle(bundle.to_string()))
                    .unwrap_or_else(|| JobAction::PipelinePost(PostBlock::new()));

                JobNode {
                    id: id.clone(),
                    name: job.name.clone().unwrap_or_else(|| id.clone()),
                    runs_on: job.runs_on.clone(),
                    container: job.container.clone(),
                    environment: job.env.clone(),
                    condition: job.condition.clone(),
                    needs: job.needs.as_ref().map(|needs| needs.ids()).unwrap_or_default(),
                    action,
                }
            })
            .collect();

        Self { jobs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, needs: &[&str]) -> JobNode {
        JobNode::new(id, id, JobAction::Bundle(id.to_string()))
            .with_needs(needs.iter().map(|n| n.to_string()).collect())
    }

    fn graph(jobs: Vec<JobNode>) -> JobGraph {
        let mut graph = JobGraph::new();
        for job in jobs {
            graph.push(job).unwrap();
        }
        graph
    }

    #[test]
    fn test_roots_and_leaves() {
        let graph = graph(vec![
            job("a", &[]),
            job("x", &["a"]),
            job("y", &["a"]),
            job("d", &["x", "y"]),
        ]);

        assert_eq!(graph.roots(), vec!["a"]);
        assert_eq!(graph.leaves(), vec!["d"]);
        assert_eq!(graph.successors("a"), vec!["x", "y"]);
        assert_eq!(graph.topological_order().unwrap(), vec!["a", "x", "y", "d"]);
    }

    #[test]
    fn test_duplicate_job_rejected() {
        let mut graph = JobGraph::new();
        graph.push(job("a", &[])).unwrap();
        assert_eq!(
            graph.push(job("a", &[])),
            Err(CoreError::DuplicateJob("a".to_string()))
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let graph = graph(vec![job("a", &["ghost"])]);
        assert!(matches!(
            graph.validate(),
            Err(CoreError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let graph = graph(vec![job("a", &["b"]), job("b", &["a"]), job("c", &[])]);
        assert_eq!(
            graph.validate(),
            Err(CoreError::CyclicGraph(vec!["a".to_string(), "b".to_string()]))
        );
    }
}
