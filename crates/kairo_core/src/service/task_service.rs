//! Task use-case service.
//!
//! # Responsibility
//! - Provide the task store contract consumed by CLI/TUI callers.
//! - Resolve loose `(week, year)` input into typed buckets.
//! - Derive week-level views (rollback target, stats, report).
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.
//! - The service holds no notion of a "current" week; callers pass it in.

use crate::model::task::{
    Bucket, NewTask, Task, TaskId, TaskPatch, TaskStatus, TaskValidationError,
};
use crate::repo::task_repo::{RepoResult, TaskListQuery, TaskRepository, WeekStats};
use crate::week::Week;
use log::{error, info};
use std::collections::BTreeMap;

/// Request model for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub project: Option<String>,
    pub estimate: Option<u32>,
    /// With `year`: target week. Both `None`: inbox.
    pub week: Option<u32>,
    pub year: Option<i32>,
}

/// Tasks of one project inside a week report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    /// `None` collects tasks without a project.
    pub project: Option<String>,
    pub tasks: Vec<Task>,
}

/// Week summary: stats plus completed/open tasks grouped by project.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekReport {
    pub week: Week,
    pub stats: WeekStats,
    pub completed: Vec<ProjectGroup>,
    pub open: Vec<ProjectGroup>,
}

/// Use-case service wrapper for task storage.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task at the end of its bucket.
    ///
    /// # Errors
    /// - Validation error for a blank title or a half-given week/year pair.
    pub fn add(&self, request: AddTaskRequest) -> RepoResult<Task> {
        let bucket = Bucket::from_parts(request.week, request.year)?;
        let new_task = NewTask {
            title: request.title,
            description: request.description,
            bucket,
            tags: request.tags,
            project: request.project,
            estimate: request.estimate,
        };
        log_outcome(
            "task_add",
            self.repo.create_task(&new_task),
            |task| format!("task_id={} bucket={} position={}", task.id, task.bucket, task.position),
        )
    }

    pub fn get(&self, id: TaskId) -> RepoResult<Task> {
        self.repo.get_task(id)
    }

    pub fn list(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    /// Updates supplied fields only.
    pub fn edit(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        log_outcome("task_edit", self.repo.update_task(id, patch), |task| {
            format!("task_id={}", task.id)
        })
    }

    /// Sets status; a no-op when the task already has it.
    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        log_outcome("task_status", self.repo.set_status(id, status), |task| {
            format!("task_id={} task_status={}", task.id, task.status.as_str())
        })
    }

    pub fn complete(&self, id: TaskId) -> RepoResult<Task> {
        self.set_status(id, TaskStatus::Completed)
    }

    pub fn reopen(&self, id: TaskId) -> RepoResult<Task> {
        self.set_status(id, TaskStatus::Open)
    }

    pub fn delete(&self, id: TaskId) -> RepoResult<()> {
        log_outcome("task_delete", self.repo.delete_task(id), |_| {
            format!("task_id={id}")
        })
    }

    /// Exchanges two positions. The caller picks the adjacent task.
    pub fn swap_positions(&self, first: TaskId, second: TaskId) -> RepoResult<()> {
        log_outcome(
            "task_swap",
            self.repo.swap_positions(first, second),
            |_| format!("task_id={first} other_task_id={second}"),
        )
    }

    /// Moves a task to `(week, year)`, or to the inbox when both are `None`.
    pub fn move_to_bucket(
        &self,
        id: TaskId,
        week: Option<u32>,
        year: Option<i32>,
    ) -> RepoResult<Task> {
        let bucket = Bucket::from_parts(week, year)?;
        log_outcome("task_move", self.repo.move_to_bucket(id, bucket), |task| {
            format!(
                "task_id={} bucket={} position={}",
                task.id, task.bucket, task.position
            )
        })
    }

    /// Moves every open task of `from` to `to`, all or nothing.
    pub fn rollover(&self, from: Week, to: Week) -> RepoResult<Vec<TaskId>> {
        log_outcome("task_rollover", self.repo.rollover(from, to), |moved| {
            format!("from={from} to={to} moved={}", moved.len())
        })
    }

    /// Rolls open tasks of `week` over to the following ISO week.
    pub fn rollover_to_next(&self, week: Week) -> RepoResult<Vec<TaskId>> {
        let to = week.next().map_err(TaskValidationError::from)?;
        self.rollover(week, to)
    }

    /// Moves open tasks of `week` back to the preceding ISO week.
    pub fn rollback(&self, week: Week) -> RepoResult<Vec<TaskId>> {
        let to = week.prev().map_err(TaskValidationError::from)?;
        self.rollover(week, to)
    }

    pub fn week_stats(&self, week: Week) -> RepoResult<WeekStats> {
        self.repo.week_stats(week)
    }

    /// Builds the week report. Groups are sorted by project name with the
    /// project-less group last; tasks keep bucket order inside a group.
    pub fn week_report(&self, week: Week) -> RepoResult<WeekReport> {
        let stats = self.repo.week_stats(week)?;
        let tasks = self.repo.list_tasks(&TaskListQuery {
            bucket: week.into(),
            ..TaskListQuery::default()
        })?;

        let (completed, open): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|task| !task.is_open());

        Ok(WeekReport {
            week,
            stats,
            completed: group_by_project(completed),
            open: group_by_project(open),
        })
    }

    pub fn list_tags(&self) -> RepoResult<Vec<String>> {
        self.repo.list_tags()
    }

    pub fn list_projects(&self) -> RepoResult<Vec<String>> {
        self.repo.list_projects()
    }
}

fn group_by_project(tasks: Vec<Task>) -> Vec<ProjectGroup> {
    let mut named: BTreeMap<String, Vec<Task>> = BTreeMap::new();
    let mut unassigned = Vec::new();
    for task in tasks {
        match task.project.clone() {
            Some(project) => named.entry(project).or_default().push(task),
            None => unassigned.push(task),
        }
    }

    let mut groups: Vec<ProjectGroup> = named
        .into_iter()
        .map(|(project, tasks)| ProjectGroup {
            project: Some(project),
            tasks,
        })
        .collect();
    if !unassigned.is_empty() {
        groups.push(ProjectGroup {
            project: None,
            tasks: unassigned,
        });
    }
    groups
}

fn log_outcome<T>(
    event: &str,
    result: RepoResult<T>,
    describe: impl FnOnce(&T) -> String,
) -> RepoResult<T> {
    match &result {
        Ok(value) => info!(
            "event={} module=service status=ok {}",
            event,
            describe(value)
        ),
        Err(err) => error!(
            "event={} module=service status=error error_kind={:?} error={}",
            event,
            err.kind(),
            err
        ),
    }
    result
}
