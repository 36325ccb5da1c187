//! Task registry and prerequisite resolution
//!
//! The registry owns every declared task and resolves a target into its
//! transitive prerequisite closure in dependency order. Resolution is pure:
//! it performs no side effects, so an unknown task or a dependency cycle is
//! reported before any action has run. Uses petgraph for the graph walk.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use thiserror::Error;

use super::task::{Task, TaskName};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Unknown task: {0}")]
    UnknownTask(TaskName),

    #[error("Prerequisite cycle detected at task: {0}")]
    CyclicDependency(TaskName),

    #[error("Task already defined: {0}")]
    DuplicateTask(TaskName),
}

/// The set of declared tasks for one process run
///
/// Tasks are declared once at startup and never mutated afterwards.
/// Prerequisites may reference tasks that are defined later; names are only
/// resolved when a target is invoked.
#[derive(Default)]
pub struct Registry<'a> {
    tasks: HashMap<TaskName, Task<'a>>,

    /// Declaration order, for stable task listings
    declared: Vec<TaskName>,
}

impl<'a> Registry<'a> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            declared: Vec::new(),
        }
    }

    /// Registers a task. A second definition under the same name is an
    /// error, not a replacement.
    pub fn define(&mut self, task: Task<'a>) -> Result<(), GraphError> {
        let name = task.name().clone();
        if self.tasks.contains_key(&name) {
            return Err(GraphError::DuplicateTask(name));
        }

        self.declared.push(name.clone());
        self.tasks.insert(name, task);
        Ok(())
    }

    /// Returns a registered task by name
    pub fn get(&self, name: &TaskName) -> Option<&Task<'a>> {
        self.tasks.get(name)
    }

    /// Returns true if the name is registered
    pub fn contains(&self, name: &TaskName) -> bool {
        self.tasks.contains_key(name)
    }

    /// Returns the number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no tasks are registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns all tasks in declaration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task<'a>> {
        self.declared.iter().filter_map(|name| self.tasks.get(name))
    }

    /// Resolves the execution order for a target: the target's transitive
    /// prerequisite closure, prerequisites before dependents, each task
    /// exactly once regardless of how many paths reach it.
    ///
    /// Fails with [`GraphError::UnknownTask`] if the target or any
    /// transitively referenced prerequisite is unregistered, and with
    /// [`GraphError::CyclicDependency`] if the reachable graph contains a
    /// cycle.
    pub fn execution_order(&self, target: &TaskName) -> Result<Vec<TaskName>, GraphError> {
        // Edge direction follows the dependency arrow: prerequisite -> dependent,
        // so a topological sort yields prerequisites first.
        let mut graph: DiGraph<TaskName, ()> = DiGraph::new();
        let mut nodes = HashMap::new();

        let root = graph.add_node(target.clone());
        nodes.insert(target.clone(), root);

        let mut pending = vec![target.clone()];
        while let Some(name) = pending.pop() {
            let idx = nodes[&name];
            let task = self
                .tasks
                .get(&name)
                .ok_or_else(|| GraphError::UnknownTask(name.clone()))?;

            for prerequisite in task.prerequisites() {
                let prereq_idx = match nodes.get(prerequisite) {
                    Some(&i) => i,
                    None => {
                        let i = graph.add_node(prerequisite.clone());
                        nodes.insert(prerequisite.clone(), i);
                        pending.push(prerequisite.clone());
                        i
                    }
                };
                graph.add_edge(prereq_idx, idx, ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let at = graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_else(|| target.clone());
                Err(GraphError::CyclicDependency(at))
            }
        }
    }
}
