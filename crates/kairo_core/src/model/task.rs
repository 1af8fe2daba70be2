//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the tracker.
//! - Define the bucket a task lives in (one ISO week or the inbox).
//! - Normalize and validate caller input before it reaches storage.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `title` is never blank.
//! - A task belongs to exactly one `Bucket`; week and year are set together.
//! - `tags` are lowercase, non-empty, unique, in entry order.

use crate::week::{Week, WeekError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned task identifier.
pub type TaskId = i64;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Ordering partition for tasks.
///
/// Positions are only comparable between tasks of the same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Unscheduled tasks (`week`/`year` both NULL in storage).
    Inbox,
    /// Tasks planned for one ISO week.
    Week(Week),
}

impl Bucket {
    /// Builds a bucket from an optional `(week, year)` pair.
    ///
    /// Both absent means inbox; exactly one present is rejected.
    pub fn from_parts(week: Option<u32>, year: Option<i32>) -> Result<Self, TaskValidationError> {
        match (week, year) {
            (None, None) => Ok(Self::Inbox),
            (Some(week), Some(year)) => Ok(Self::Week(Week::new(year, week)?)),
            (week, year) => Err(TaskValidationError::PartialWeek { week, year }),
        }
    }

    /// Storage columns `(week, year)` for this bucket.
    pub fn to_parts(&self) -> (Option<u32>, Option<i32>) {
        match self {
            Self::Inbox => (None, None),
            Self::Week(week) => (Some(week.week()), Some(week.year())),
        }
    }

    pub fn week(&self) -> Option<Week> {
        match self {
            Self::Inbox => None,
            Self::Week(week) => Some(*week),
        }
    }

    pub fn is_inbox(&self) -> bool {
        matches!(self, Self::Inbox)
    }
}

impl From<Week> for Bucket {
    fn from(value: Week) -> Self {
        Self::Week(value)
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbox => write!(f, "inbox"),
            Self::Week(week) => write!(f, "{week}"),
        }
    }
}

/// Validation errors for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is blank after trim.
    EmptyTitle,
    /// Exactly one of week/year was supplied.
    PartialWeek {
        week: Option<u32>,
        year: Option<i32>,
    },
    /// Week does not parse or does not exist.
    InvalidWeek(WeekError),
    /// A tag is blank after trim.
    EmptyTag,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::PartialWeek { week, year } => write!(
                f,
                "week and year must be given together (week={}, year={})",
                week.map_or("none".to_string(), |value| value.to_string()),
                year.map_or("none".to_string(), |value| value.to_string())
            ),
            Self::InvalidWeek(err) => write!(f, "{err}"),
            Self::EmptyTag => write!(f, "tags must not be empty"),
        }
    }
}

impl Error for TaskValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidWeek(err) => Some(err),
            Self::EmptyTitle | Self::PartialWeek { .. } | Self::EmptyTag => None,
        }
    }
}

impl From<WeekError> for TaskValidationError {
    fn from(value: WeekError) -> Self {
        Self::InvalidWeek(value)
    }
}

/// Canonical persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub bucket: Bucket,
    /// Order key, unique within `bucket`.
    pub position: i64,
    pub tags: Vec<String>,
    pub project: Option<String>,
    /// Whole hours.
    pub estimate: Option<u32>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while `status == Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }
}

/// Input for creating one task. Position and timestamps are store-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub bucket: Bucket,
    pub tags: Vec<String>,
    pub project: Option<String>,
    pub estimate: Option<u32>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, bucket: Bucket) -> Self {
        Self {
            title: title.into(),
            description: None,
            bucket,
            tags: Vec::new(),
            project: None,
            estimate: None,
        }
    }

    /// Returns a normalized copy, or the first validation failure.
    pub fn normalized(&self) -> Result<Self, TaskValidationError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            description: normalize_text(self.description.as_deref()),
            bucket: self.bucket,
            tags: normalize_tags(&self.tags)?,
            project: normalize_text(self.project.as_deref()),
            estimate: self.estimate,
        })
    }
}

/// Partial update. `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub project: Option<Option<String>>,
    pub estimate: Option<Option<u32>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns a normalized copy, or the first validation failure.
    pub fn normalized(&self) -> Result<Self, TaskValidationError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            description: self
                .description
                .as_ref()
                .map(|value| normalize_text(value.as_deref())),
            tags: self.tags.as_deref().map(normalize_tags).transpose()?,
            project: self
                .project
                .as_ref()
                .map(|value| normalize_text(value.as_deref())),
            estimate: self.estimate,
            status: self.status,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, TaskValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Trims free text; blank becomes `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Lowercases and deduplicates tags, keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, TaskValidationError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let value = tag.trim().to_lowercase();
        if value.is_empty() {
            return Err(TaskValidationError::EmptyTag);
        }
        if !normalized.contains(&value) {
            normalized.push(value);
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_from_parts_requires_both_or_neither() {
        assert_eq!(Bucket::from_parts(None, None).unwrap(), Bucket::Inbox);
        assert_eq!(
            Bucket::from_parts(Some(45), Some(2025)).unwrap(),
            Bucket::Week(Week::new(2025, 45).unwrap())
        );
        assert_eq!(
            Bucket::from_parts(Some(45), None).unwrap_err(),
            TaskValidationError::PartialWeek {
                week: Some(45),
                year: None
            }
        );
        assert!(matches!(
            Bucket::from_parts(None, Some(2025)),
            Err(TaskValidationError::PartialWeek { .. })
        ));
        assert!(matches!(
            Bucket::from_parts(Some(53), Some(2025)),
            Err(TaskValidationError::InvalidWeek(_))
        ));
    }

    #[test]
    fn normalize_tags_lowercases_and_keeps_entry_order() {
        let tags = vec![
            "Work".to_string(),
            " urgent ".to_string(),
            "work".to_string(),
            "Alpha".to_string(),
        ];
        assert_eq!(
            normalize_tags(&tags).unwrap(),
            vec!["work".to_string(), "urgent".to_string(), "alpha".to_string()]
        );
        assert_eq!(
            normalize_tags(&["  ".to_string()]).unwrap_err(),
            TaskValidationError::EmptyTag
        );
    }

    #[test]
    fn new_task_normalization_rejects_blank_title() {
        let task = NewTask::new("   ", Bucket::Inbox);
        assert_eq!(task.normalized().unwrap_err(), TaskValidationError::EmptyTitle);

        let mut task = NewTask::new("  Write report ", Bucket::Inbox);
        task.description = Some("   ".to_string());
        task.project = Some(" kairo ".to_string());
        let normalized = task.normalized().unwrap();
        assert_eq!(normalized.title, "Write report");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.project.as_deref(), Some("kairo"));
    }

    #[test]
    fn patch_normalization_distinguishes_clear_from_untouched() {
        let patch = TaskPatch {
            project: Some(Some("  ".to_string())),
            ..TaskPatch::default()
        };
        let normalized = patch.normalized().unwrap();
        assert_eq!(normalized.project, Some(None));
        assert_eq!(normalized.description, None);
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn task_serializes_bucket_and_status_as_snake_case() {
        let now = Utc::now();
        let task = Task {
            id: 7,
            title: "Plan".to_string(),
            description: None,
            bucket: Bucket::Week(Week::new(2025, 45).unwrap()),
            position: 1,
            tags: Vec::new(),
            project: None,
            estimate: Some(2),
            status: TaskStatus::Completed,
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["bucket"]["week"]["year"], 2025);
        assert_eq!(value["bucket"]["week"]["week"], 45);
        assert_eq!(value["status"], "completed");

        let inbox = serde_json::to_value(Bucket::Inbox).unwrap();
        assert_eq!(inbox, "inbox");
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [TaskStatus::Open, TaskStatus::Completed] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("done"), None);
    }
}
