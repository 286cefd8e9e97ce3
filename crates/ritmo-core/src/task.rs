//! Task queue with priority ordering.
//!
//! The queue is kept sorted by descending priority (stable sort, so ties
//! preserve their prior relative order). The one exception is
//! [`TaskQueue::reorder`]: a manual placement is committed as-is, and the
//! next mutating operation snaps the order back to priority.
//!
//! Tasks carry a stable opaque id; callers bind to a task by id and look
//! up its position when needed, so deletion and reordering never invalidate
//! an outstanding reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub(crate) const UNNAMED_TASK: &str = "Unnamed task";
pub(crate) const NO_DESCRIPTION: &str = "No description";

/// Task priority. `Ord` ranks `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected high, medium or low, got '{other}'"),
            }),
        }
    }
}

/// A queued task. Missing fields in persisted blobs fall back to
/// placeholder defaults on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    /// Quota of work cycles required to complete this task.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

fn default_name() -> String {
    UNNAMED_TASK.to_string()
}
fn default_description() -> String {
    NO_DESCRIPTION.to_string()
}
fn default_cycles() -> u32 {
    1
}

impl Task {
    /// Create a validated task. The name must be non-empty; the description
    /// defaults when blank and the cycle quota is clamped to >= 1.
    pub fn new(
        name: &str,
        description: Option<&str>,
        cycles: u32,
        priority: Priority,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTaskName);
        }
        let description = match description.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => default_description(),
        };
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            cycles: cycles.max(1),
            priority,
            completed: false,
        })
    }
}

/// Partial update applied by [`TaskQueue::edit`].
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cycles: Option<u32>,
    pub priority: Option<Priority>,
}

/// Ordered list of tasks, sorted by descending priority except right after
/// a manual reorder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    /// Build a queue from loaded tasks, imposing priority order.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut queue = Self { tasks };
        queue.sort_by_priority();
        queue
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Current position of a task, by id.
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.completed)
    }

    /// Stable sort by descending priority; ties keep their relative order.
    pub fn sort_by_priority(&mut self) {
        self.tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn add(&mut self, task: Task) -> Uuid {
        let id = task.id;
        self.tasks.push(task);
        self.sort_by_priority();
        id
    }

    pub fn edit(&mut self, id: Uuid, fields: TaskFields) -> Result<(), ValidationError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))?;
        if let Some(name) = fields.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::EmptyTaskName);
            }
            task.name = name;
        }
        if let Some(description) = fields.description {
            let description = description.trim().to_string();
            task.description = if description.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                description
            };
        }
        if let Some(cycles) = fields.cycles {
            task.cycles = cycles.max(1);
        }
        if let Some(priority) = fields.priority {
            task.priority = priority;
        }
        self.sort_by_priority();
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Task, ValidationError> {
        let index = self.position(id).ok_or(ValidationError::UnknownTask(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Flip the completion flag. Returns the new flag value.
    pub fn toggle_completion(&mut self, id: Uuid) -> Result<bool, ValidationError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.sort_by_priority();
        Ok(completed)
    }

    /// Mark completion directly without re-sorting (used by the engine when
    /// a quota is met mid-transition).
    pub(crate) fn set_completed(&mut self, id: Uuid, completed: bool) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.completed = completed;
        }
    }

    /// User-directed manual placement. Does NOT re-sort: the manual order
    /// stands until the next add/edit/toggle snaps it back.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        let len = self.tasks.len();
        if from >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks",
                index: from,
                len,
            });
        }
        if to >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks",
                index: to,
                len,
            });
        }
        if from == to {
            return Ok(());
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        Ok(())
    }

    /// Find the first incomplete task scanning `[start, len)` and then
    /// wrapping over `[0, start)`. Re-imposes priority order first, so the
    /// scan always runs over the sorted queue.
    pub fn find_next_uncompleted(&mut self, start: usize) -> Option<usize> {
        self.sort_by_priority();
        let len = self.tasks.len();
        if len == 0 {
            return None;
        }
        let start = start.min(len);
        (start..len)
            .chain(0..start)
            .find(|&i| !self.tasks[i].completed)
    }
}
