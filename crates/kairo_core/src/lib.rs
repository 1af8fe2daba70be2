//! Core domain logic for kairo, a weekly task tracker.
//! This crate is the single source of truth for task and week invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod week;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LoggingConfig, LoggingError,
};
pub use model::task::{
    Bucket, NewTask, Task, TaskId, TaskPatch, TaskStatus, TaskValidationError,
};
pub use repo::task_repo::{
    BucketFilter, ErrorKind, RepoError, RepoResult, SqliteTaskRepository, TaskListQuery,
    TaskRepository, WeekStats,
};
pub use service::task_service::{AddTaskRequest, ProjectGroup, TaskService, WeekReport};
pub use week::{
    adjacent_week, current_week, format_week, parse_week, parse_week_with_default_year,
    week_range, weeks_in_year, Direction, Week, WeekError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
