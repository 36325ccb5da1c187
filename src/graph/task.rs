//! Task identity and declaration
//!
//! Task names are namespaced: `build:merge`, `stats:report`. The namespace
//! qualifies the name to avoid collisions between graphs; it carries no
//! execution semantics of its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NameError {
    #[error("Invalid task name '{0}': expected 'namespace:name'")]
    Invalid(String),
}

/// A namespaced task name in the format `namespace:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskName {
    namespace: String,
    name: String,
}

impl TaskName {
    /// Creates a task name from its namespace and name parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the namespace portion (`build` in `build:merge`)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the bare name portion (`merge` in `build:merge`)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl FromStr for TaskName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (namespace, name) = s
            .split_once(':')
            .ok_or_else(|| NameError::Invalid(s.to_string()))?;

        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        };

        if !valid_part(namespace) || !valid_part(name) {
            return Err(NameError::Invalid(s.to_string()));
        }

        Ok(Self::new(namespace, name))
    }
}

impl TryFrom<String> for TaskName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskName> for String {
    fn from(name: TaskName) -> Self {
        name.to_string()
    }
}

/// A task action: a side-effecting procedure with no return value consumed
/// by the graph. Failures propagate as `anyhow::Error` so actions can carry
/// any underlying cause.
pub type Action<'a> = Box<dyn Fn() -> anyhow::Result<()> + 'a>;

/// A declared unit of work: a name, an ordered prerequisite list, and an
/// optional action.
///
/// Tasks without an action are aggregates: they exist only to group their
/// prerequisites (e.g. `build:setup`, `build:all`).
pub struct Task<'a> {
    name: TaskName,
    prerequisites: Vec<TaskName>,
    description: Option<String>,
    action: Option<Action<'a>>,
}

impl<'a> Task<'a> {
    /// Creates a task with no prerequisites and no action
    pub fn new(name: TaskName) -> Self {
        Self {
            name,
            prerequisites: Vec::new(),
            description: None,
            action: None,
        }
    }

    /// Appends a prerequisite; prerequisites run in declaration order
    pub fn needs(mut self, prerequisite: TaskName) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    /// Sets the human-readable description shown by the task listing
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Sets the action to run after all prerequisites have completed
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'a,
    {
        self.action = Some(Box::new(f));
        self
    }

    /// Returns the task's name
    pub fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the task's prerequisites in declaration order
    pub fn prerequisites(&self) -> &[TaskName] {
        &self.prerequisites
    }

    /// Returns the task's description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Runs the task's action, if it has one
    pub(crate) fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}
