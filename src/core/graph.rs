//! Named tasks with prerequisites.
//!
//! Tasks are registered into an owned [`TaskGraph`] and run depth-first: every
//! prerequisite before its dependents, each task at most once per run. The
//! whole execution order is resolved before the first action runs, so an
//! unknown name or a cycle leaves the world untouched.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;

use crate::error::{Error, Result};

pub const NAMESPACE_SEPARATOR: char = ':';

pub type Action<C> = Box<dyn Fn(&C) -> Result<()>>;

/// Declaration of a single task, built fluently and handed to
/// [`TaskGraph::declare`].
pub struct TaskSpec<C> {
    name: String,
    prerequisites: Vec<String>,
    description: Option<String>,
    action: Option<Action<C>>,
}

impl<C> TaskSpec<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prerequisites: Vec::new(),
            description: None,
            action: None,
        }
    }

    pub fn needs<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&C) -> Result<()> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }
}

pub struct Task<C> {
    pub name: String,
    pub prerequisites: Vec<String>,
    pub description: Option<String>,
    scope: Vec<String>,
    action: Option<Action<C>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub name: String,
    pub started_at: String,
    pub duration_ms: u64,
}

pub struct TaskGraph<C> {
    tasks: HashMap<String, Task<C>>,
    order: Vec<String>,
    scope: Vec<String>,
}

impl<C> Default for TaskGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TaskGraph<C> {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            order: Vec::new(),
            scope: Vec::new(),
        }
    }

    /// Register a task under the current namespace.
    pub fn declare(&mut self, spec: TaskSpec<C>) -> Result<()> {
        let name = self.qualify(&spec.name)?;
        if self.tasks.contains_key(&name) {
            return Err(Error::task_duplicate(name));
        }

        self.order.push(name.clone());
        self.insert(name, spec);
        Ok(())
    }

    /// Redefine an existing task. Declaration order is kept.
    pub fn replace(&mut self, spec: TaskSpec<C>) -> Result<()> {
        let name = self.qualify(&spec.name)?;
        if !self.tasks.contains_key(&name) {
            return Err(Error::task_not_found(name, None));
        }

        self.insert(name, spec);
        Ok(())
    }

    /// Declare every task in `body` under `name:`.
    pub fn namespace<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        validate_segment(name)?;
        self.scope.push(name.to_string());
        let result = body(self);
        self.scope.pop();
        result
    }

    pub fn get(&self, name: &str) -> Option<&Task<C>> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task<C>> {
        self.order.iter().filter_map(|name| self.tasks.get(name))
    }

    /// Describe every task, prerequisites shown fully qualified when they resolve.
    pub fn summaries(&self) -> Vec<TaskSummary> {
        self.tasks()
            .map(|task| TaskSummary {
                name: task.name.clone(),
                description: task.description.clone(),
                prerequisites: task
                    .prerequisites
                    .iter()
                    .map(|p| {
                        self.lookup(p, &task.scope)
                            .unwrap_or_else(|| p.clone())
                    })
                    .collect(),
            })
            .collect()
    }

    /// Resolve the execution order for `names` without running anything.
    pub fn plan(&self, names: &[&str]) -> Result<Vec<String>> {
        let mut planner = Planner {
            graph: self,
            visited: HashSet::new(),
            path: Vec::new(),
            ordered: Vec::new(),
        };

        for name in names {
            let qualified = self
                .lookup(name, &[])
                .ok_or_else(|| Error::task_not_found(*name, None))?;
            planner.visit(&qualified)?;
        }

        Ok(planner.ordered)
    }

    /// Run `names` and all their prerequisites. Fails fast on the first error.
    pub fn run(&self, names: &[&str], ctx: &C) -> Result<Vec<TaskRecord>> {
        let plan = self.plan(names)?;
        let mut records = Vec::with_capacity(plan.len());

        for name in plan {
            let Some(task) = self.tasks.get(&name) else {
                return Err(Error::task_not_found(name, None));
            };

            let started_at = chrono::Utc::now().to_rfc3339();
            let started = Instant::now();

            if let Some(action) = &task.action {
                action(ctx).map_err(|e| e.in_task(&name))?;
            }

            records.push(TaskRecord {
                name,
                started_at,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        Ok(records)
    }

    pub fn invoke(&self, name: &str, ctx: &C) -> Result<Vec<TaskRecord>> {
        self.run(&[name], ctx)
    }

    fn insert(&mut self, name: String, spec: TaskSpec<C>) {
        self.tasks.insert(
            name.clone(),
            Task {
                name,
                prerequisites: spec.prerequisites,
                description: spec.description,
                scope: self.scope.clone(),
                action: spec.action,
            },
        );
    }

    fn qualify(&self, name: &str) -> Result<String> {
        for segment in name.split(NAMESPACE_SEPARATOR) {
            validate_segment(segment)?;
        }

        if self.scope.is_empty() {
            Ok(name.to_string())
        } else {
            Ok(format!(
                "{}{}{}",
                self.scope.join(":"),
                NAMESPACE_SEPARATOR,
                name
            ))
        }
    }

    /// Innermost scope first: `a:b` looks up `a:b:p`, then `a:p`, then `p`.
    fn lookup(&self, name: &str, scope: &[String]) -> Option<String> {
        (0..=scope.len()).rev().find_map(|depth| {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}{}{}", scope[..depth].join(":"), NAMESPACE_SEPARATOR, name)
            };
            self.tasks.contains_key(&candidate).then_some(candidate)
        })
    }
}

struct Planner<'g, C> {
    graph: &'g TaskGraph<C>,
    visited: HashSet<String>,
    path: Vec<String>,
    ordered: Vec<String>,
}

impl<C> Planner<'_, C> {
    fn visit(&mut self, name: &str) -> Result<()> {
        if self.visited.contains(name) {
            return Ok(());
        }

        if let Some(pos) = self.path.iter().position(|p| p == name) {
            let mut cycle = self.path[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(Error::task_cycle(cycle));
        }

        let graph = self.graph;
        let task = graph
            .tasks
            .get(name)
            .ok_or_else(|| Error::task_not_found(name, self.path.last().cloned()))?;

        self.path.push(name.to_string());
        for prerequisite in &task.prerequisites {
            let qualified = graph
                .lookup(prerequisite, &task.scope)
                .ok_or_else(|| Error::task_not_found(prerequisite, Some(name.to_string())))?;
            self.visit(&qualified)?;
        }
        self.path.pop();

        self.visited.insert(name.to_string());
        self.ordered.push(name.to_string());
        Ok(())
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.chars().any(char::is_whitespace) {
        return Err(Error::validation_invalid_argument(
            "task",
            format!("Invalid task name segment '{}'", segment),
            None,
            None,
        ));
    }
    Ok(())
}
