//! Append-only ledger of completed tasks.
//!
//! Records are immutable snapshots taken at completion time. Unchecking a
//! task later never removes its record; the ledger only grows (until an
//! explicit, confirmed clear). Read-side views filter and sort a copy and
//! never mutate stored order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::{Priority, Task};

/// Immutable completion snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "Utc::now")]
    pub completed_at: DateTime<Utc>,
}

fn default_name() -> String {
    crate::task::UNNAMED_TASK.to_string()
}
fn default_description() -> String {
    crate::task::NO_DESCRIPTION.to_string()
}
fn default_cycles() -> u32 {
    1
}

impl CompletedTask {
    /// Snapshot a task at its moment of completion.
    pub fn snapshot(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone(),
            cycles: task.cycles,
            priority: task.priority,
            completed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    Priority(Priority),
}

impl FromStr for HistoryFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(HistoryFilter::All),
            other => Ok(HistoryFilter::Priority(other.parse().map_err(|_| {
                ValidationError::InvalidValue {
                    field: "filter".into(),
                    message: format!("expected all, high, medium or low, got '{other}'"),
                }
            })?)),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryFilter::All => f.write_str("all"),
            HistoryFilter::Priority(p) => f.write_str(p.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySort {
    DateDesc,
    DateAsc,
    PriorityDesc,
    PriorityAsc,
}

impl FromStr for HistorySort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(HistorySort::DateDesc),
            "date-asc" => Ok(HistorySort::DateAsc),
            "priority-desc" => Ok(HistorySort::PriorityDesc),
            "priority-asc" => Ok(HistorySort::PriorityAsc),
            other => Err(ValidationError::InvalidValue {
                field: "sort".into(),
                message: format!(
                    "expected date-desc, date-asc, priority-desc or priority-asc, got '{other}'"
                ),
            }),
        }
    }
}

/// Aggregate stats for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayStats {
    pub completed_tasks: u64,
    pub total_cycles: u64,
    pub high_cycles: u64,
    pub medium_cycles: u64,
    pub low_cycles: u64,
}

/// The history ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<CompletedTask>,
}

impl History {
    pub fn from_records(records: Vec<CompletedTask>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CompletedTask] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: CompletedTask) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Filtered, sorted projection of the ledger. Stored order is untouched.
    pub fn view(&self, filter: HistoryFilter, sort: HistorySort) -> Vec<CompletedTask> {
        let mut view: Vec<CompletedTask> = self
            .records
            .iter()
            .filter(|r| match filter {
                HistoryFilter::All => true,
                HistoryFilter::Priority(p) => r.priority == p,
            })
            .cloned()
            .collect();
        match sort {
            HistorySort::DateDesc => view.sort_by(|a, b| b.completed_at.cmp(&a.completed_at)),
            HistorySort::DateAsc => view.sort_by(|a, b| a.completed_at.cmp(&b.completed_at)),
            HistorySort::PriorityDesc => view.sort_by(|a, b| b.priority.cmp(&a.priority)),
            HistorySort::PriorityAsc => view.sort_by(|a, b| a.priority.cmp(&b.priority)),
        }
        view
    }

    /// Aggregate the given day's records: completed-task count, total
    /// cycles and per-priority cycle sums.
    pub fn stats_for_day(&self, day: NaiveDate) -> DayStats {
        let mut stats = DayStats::default();
        for record in self
            .records
            .iter()
            .filter(|r| r.completed_at.date_naive() == day)
        {
            stats.completed_tasks += 1;
            let cycles = u64::from(record.cycles);
            stats.total_cycles += cycles;
            match record.priority {
                Priority::High => stats.high_cycles += cycles,
                Priority::Medium => stats.medium_cycles += cycles,
                Priority::Low => stats.low_cycles += cycles,
            }
        }
        stats
    }
}
