//! Task execution with per-run state
//!
//! A runner owns the "already executed" set for one invocation of the
//! pipeline. The set lives on the runner instance rather than in ambient
//! process state, so independent runners (e.g. in tests) never leak state
//! into each other.

use std::collections::HashSet;

use thiserror::Error;

use super::registry::{GraphError, Registry};
use super::task::TaskName;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Task {task} failed")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: anyhow::Error,
    },
}

/// Executes tasks from a registry, each at most once per runner
pub struct Runner<'r, 'a> {
    registry: &'r Registry<'a>,
    completed: HashSet<TaskName>,
}

impl<'r, 'a> Runner<'r, 'a> {
    /// Creates a runner with an empty completed set
    pub fn new(registry: &'r Registry<'a>) -> Self {
        Self {
            registry,
            completed: HashSet::new(),
        }
    }

    /// Runs the target and everything it transitively requires, in
    /// dependency order.
    ///
    /// Tasks already completed by this runner are skipped, so a task shared
    /// by several targets runs once no matter how many of them are invoked.
    /// The first failing action aborts the remaining sequence; effects of
    /// already-completed tasks are not rolled back.
    pub fn invoke(&mut self, target: &TaskName) -> Result<(), RunError> {
        let order = self.registry.execution_order(target)?;

        for name in order {
            if self.completed.contains(&name) {
                continue;
            }

            let task = self
                .registry
                .get(&name)
                .ok_or_else(|| GraphError::UnknownTask(name.clone()))?;

            task.run().map_err(|source| RunError::TaskFailed {
                task: name.clone(),
                source,
            })?;

            self.completed.insert(name);
        }

        Ok(())
    }

    /// Returns true if this runner has already executed the task
    pub fn has_run(&self, name: &TaskName) -> bool {
        self.completed.contains(name)
    }
}
