//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, ordering, and bucket-move APIs over `tasks` storage.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Every mutating call runs in one `IMMEDIATE` transaction; on any error
//!   the transaction is dropped and nothing is persisted.
//! - Bucket read order is `position ASC, created_at ASC, id ASC`.
//! - Tasks entering a bucket get `MAX(position) + 1` there (`1` when
//!   empty). Positions left behind are never compacted.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{applied_migrations, migration_names};
use crate::db::DbError;
use crate::model::task::{
    Bucket, NewTask, Task, TaskId, TaskPatch, TaskStatus, TaskValidationError,
};
use crate::week::Week;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    status,
    week,
    year,
    position,
    project,
    estimate,
    created_at,
    updated_at,
    completed_at
FROM tasks";

const BUCKET_ORDER_SQL: &str =
    " ORDER BY (week IS NULL) ASC, year ASC, week ASC, position ASC, created_at ASC, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from task repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input is malformed.
    Validation(TaskValidationError),
    /// No task has the given id.
    NotFound(TaskId),
    /// Request is well-formed but not allowed in the current state.
    InvalidOperation(String),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted row cannot be mapped to a valid `Task`.
    InvalidData(String),
    /// Connection has not been migrated by `ensure_schema`.
    UninitializedConnection { missing_migration: &'static str },
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Coarse error taxonomy exposed to presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidOperation,
    Storage,
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredColumn { .. } => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidOperation(message) => write!(f, "invalid operation: {message}"),
            Self::Db(err) => write!(f, "storage error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection { missing_migration } => write!(
                f,
                "task repository requires migration `{missing_migration}` to be applied"
            ),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidOperation(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Bucket selector for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketFilter {
    /// Every bucket: weeks chronologically, then the inbox.
    #[default]
    All,
    Inbox,
    Week(Week),
}

impl From<Bucket> for BucketFilter {
    fn from(value: Bucket) -> Self {
        match value {
            Bucket::Inbox => Self::Inbox,
            Bucket::Week(week) => Self::Week(week),
        }
    }
}

impl From<Week> for BucketFilter {
    fn from(value: Week) -> Self {
        Self::Week(value)
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub bucket: BucketFilter,
    /// `None` means any status.
    pub status: Option<TaskStatus>,
    /// Single tag match, case-insensitive.
    pub tag: Option<String>,
    /// Exact project match.
    pub project: Option<String>,
}

/// Aggregate counts for one week bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekStats {
    pub total: u64,
    pub open: u64,
    pub completed: u64,
    /// Sum of estimates in hours.
    pub estimate_total: u64,
    pub estimate_open: u64,
    pub estimate_completed: u64,
}

impl WeekStats {
    /// Completed share of all tasks, in percent. `0.0` for an empty week.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Repository interface for task storage.
pub trait TaskRepository {
    /// Inserts a task at the end of its bucket.
    fn create_task(&self, task: &NewTask) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Task>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Applies supplied fields only. Never touches bucket or position.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    /// Idempotent status change.
    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task>;
    /// Hard delete. Remaining positions are left as they are.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Exchanges positions of two tasks in the same bucket.
    fn swap_positions(&self, first: TaskId, second: TaskId) -> RepoResult<()>;
    /// Moves one task to the end of another bucket.
    fn move_to_bucket(&self, id: TaskId, bucket: Bucket) -> RepoResult<Task>;
    /// Moves every open task of `from` to the end of `to`, keeping their
    /// relative order. Returns moved ids in placement order.
    fn rollover(&self, from: Week, to: Week) -> RepoResult<Vec<TaskId>>;
    fn week_stats(&self, week: Week) -> RepoResult<WeekStats>;
    /// Tags attached to at least one task, sorted.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
    /// Distinct projects, sorted.
    fn list_projects(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let task = task.normalized()?;
        let (week, year) = task.bucket.to_parts();
        let now = now_text();

        let tx = self.begin()?;
        let position = next_position(&tx, task.bucket)?;
        tx.execute(
            "INSERT INTO tasks (
                title,
                description,
                status,
                week,
                year,
                position,
                project,
                estimate,
                created_at,
                updated_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, NULL);",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                TaskStatus::Open.as_str(),
                week,
                year,
                position,
                task.project.as_deref(),
                task.estimate,
                now.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_tags(&tx, id, &task.tags)?;
        let created = load_task(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        load_task(self.conn, id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.bucket {
            BucketFilter::All => {}
            BucketFilter::Inbox => sql.push_str(" AND week IS NULL AND year IS NULL"),
            BucketFilter::Week(week) => {
                sql.push_str(" AND week = ? AND year = ?");
                bind_values.push(Value::Integer(i64::from(week.week())));
                bind_values.push(Value::Integer(i64::from(week.year())));
            }
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(tag) = query.tag.as_deref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM task_tags tt
                    INNER JOIN tags t ON t.id = tt.tag_id
                    WHERE tt.task_id = tasks.id
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(tag.trim().to_lowercase()));
        }

        if let Some(project) = query.project.as_deref() {
            sql.push_str(" AND project = ?");
            bind_values.push(Value::Text(project.to_string()));
        }

        sql.push_str(BUCKET_ORDER_SQL);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(self.conn, row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        let patch = patch.normalized()?;

        let tx = self.begin()?;
        let current = load_task(&tx, id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.unwrap_or(current.description);
        let project = patch.project.unwrap_or(current.project);
        let estimate = patch.estimate.unwrap_or(current.estimate);
        let status = patch.status.unwrap_or(current.status);

        tx.execute(
            "UPDATE tasks
             SET
                title = ?2,
                description = ?3,
                project = ?4,
                estimate = ?5,
                status = ?6,
                completed_at = CASE
                    WHEN ?6 = 'completed' THEN COALESCE(completed_at, ?7)
                    ELSE NULL
                END,
                updated_at = MAX(updated_at, ?7)
             WHERE id = ?1;",
            params![
                id,
                title.as_str(),
                description.as_deref(),
                project.as_deref(),
                estimate,
                status.as_str(),
                now_text(),
            ],
        )?;
        if let Some(tags) = patch.tags.as_deref() {
            replace_tags(&tx, id, tags)?;
        }

        let updated = load_task(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let tx = self.begin()?;
        let current = load_task(&tx, id)?;
        if current.status == status {
            return Ok(current);
        }

        tx.execute(
            "UPDATE tasks
             SET
                status = ?2,
                completed_at = CASE WHEN ?2 = 'completed' THEN ?3 ELSE NULL END,
                updated_at = MAX(updated_at, ?3)
             WHERE id = ?1;",
            params![id, status.as_str(), now_text()],
        )?;

        let updated = load_task(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let tx = self.begin()?;
        tx.execute("DELETE FROM task_tags WHERE task_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn swap_positions(&self, first: TaskId, second: TaskId) -> RepoResult<()> {
        let tx = self.begin()?;
        let first_task = load_task(&tx, first)?;
        let second_task = load_task(&tx, second)?;
        if first == second {
            return Ok(());
        }
        if first_task.bucket != second_task.bucket {
            return Err(RepoError::InvalidOperation(format!(
                "cannot swap task {first} ({}) with task {second} ({}): different buckets",
                first_task.bucket, second_task.bucket
            )));
        }

        let now = now_text();
        for (id, position) in [
            (first, second_task.position),
            (second, first_task.position),
        ] {
            tx.execute(
                "UPDATE tasks
                 SET position = ?2,
                     updated_at = MAX(updated_at, ?3)
                 WHERE id = ?1;",
                params![id, position, now.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn move_to_bucket(&self, id: TaskId, bucket: Bucket) -> RepoResult<Task> {
        let tx = self.begin()?;
        let current = load_task(&tx, id)?;
        if current.bucket == bucket {
            return Ok(current);
        }

        let (week, year) = bucket.to_parts();
        let position = next_position(&tx, bucket)?;
        tx.execute(
            "UPDATE tasks
             SET week = ?2,
                 year = ?3,
                 position = ?4,
                 updated_at = MAX(updated_at, ?5)
             WHERE id = ?1;",
            params![id, week, year, position, now_text()],
        )?;

        let moved = load_task(&tx, id)?;
        tx.commit()?;
        Ok(moved)
    }

    fn rollover(&self, from: Week, to: Week) -> RepoResult<Vec<TaskId>> {
        if from == to {
            return Err(RepoError::InvalidOperation(format!(
                "cannot roll over {from} onto itself"
            )));
        }

        let tx = self.begin()?;
        let moving = list_open_ids_in_week(&tx, from)?;
        let mut running_max = next_position(&tx, Bucket::Week(to))? - 1;
        let now = now_text();

        for id in &moving {
            running_max += 1;
            tx.execute(
                "UPDATE tasks
                 SET week = ?2,
                     year = ?3,
                     position = ?4,
                     updated_at = MAX(updated_at, ?5)
                 WHERE id = ?1;",
                params![id, to.week(), to.year(), running_max, now.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(moving)
    }

    fn week_stats(&self, week: Week) -> RepoResult<WeekStats> {
        let (total, open, completed, estimate_total, estimate_open, estimate_completed) =
            self.conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'open' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(estimate), 0),
                    COALESCE(SUM(CASE WHEN status = 'open' THEN estimate ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN estimate ELSE 0 END), 0)
                 FROM tasks
                 WHERE week = ?1
                   AND year = ?2;",
                params![week.week(), week.year()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )?;

        Ok(WeekStats {
            total: non_negative(total, "week_stats.total")?,
            open: non_negative(open, "week_stats.open")?,
            completed: non_negative(completed, "week_stats.completed")?,
            estimate_total: non_negative(estimate_total, "week_stats.estimate_total")?,
            estimate_open: non_negative(estimate_open, "week_stats.estimate_open")?,
            estimate_completed: non_negative(
                estimate_completed,
                "week_stats.estimate_completed",
            )?,
        })
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.name
             FROM tags t
             INNER JOIN task_tags tt ON tt.tag_id = t.id
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get(0)?);
        }
        Ok(tags)
    }

    fn list_projects(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT project
             FROM tasks
             WHERE project IS NOT NULL
             ORDER BY project ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(row.get(0)?);
        }
        Ok(projects)
    }
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Task> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return parse_task_row(conn, row);
    }
    Err(RepoError::NotFound(id))
}

fn next_position(conn: &Connection, bucket: Bucket) -> RepoResult<i64> {
    let (week, year) = bucket.to_parts();
    let next = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1
         FROM tasks
         WHERE week IS ?1
           AND year IS ?2;",
        params![week, year],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn list_open_ids_in_week(conn: &Connection, week: Week) -> RepoResult<Vec<TaskId>> {
    let mut stmt = conn.prepare(
        "SELECT id
         FROM tasks
         WHERE week = ?1
           AND year = ?2
           AND status = 'open'
         ORDER BY position ASC, created_at ASC, id ASC;",
    )?;
    let mut rows = stmt.query(params![week.week(), week.year()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn replace_tags(conn: &Connection, task_id: TaskId, tags: &[String]) -> RepoResult<()> {
    conn.execute("DELETE FROM task_tags WHERE task_id = ?1;", [task_id])?;
    for (ordinal, tag) in tags.iter().enumerate() {
        conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag])?;
        conn.execute(
            "INSERT INTO task_tags (task_id, tag_id, ordinal)
             SELECT ?1, id, ?3
             FROM tags
             WHERE name = ?2;",
            params![task_id, tag.as_str(), ordinal as i64],
        )?;
    }
    Ok(())
}

fn load_tags(conn: &Connection, task_id: TaskId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM task_tags tt
         INNER JOIN tags t ON t.id = tt.tag_id
         WHERE tt.task_id = ?1
         ORDER BY tt.ordinal ASC, t.name ASC;",
    )?;
    let mut rows = stmt.query([task_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_task_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let title: String = row.get("title")?;
    if title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty title for task {id} in tasks.title"
        )));
    }

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` for task {id} in tasks.status"
        ))
    })?;

    let bucket = parse_bucket(
        id,
        row.get::<_, Option<i64>>("week")?,
        row.get::<_, Option<i64>>("year")?,
    )?;

    let estimate = row
        .get::<_, Option<i64>>("estimate")?
        .map(|value| {
            u32::try_from(value).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid estimate `{value}` for task {id} in tasks.estimate"
                ))
            })
        })
        .transpose()?;

    let created_at = parse_timestamp(&row.get::<_, String>("created_at")?, "tasks.created_at")?;
    let updated_at = parse_timestamp(&row.get::<_, String>("updated_at")?, "tasks.updated_at")?;
    let completed_at = row
        .get::<_, Option<String>>("completed_at")?
        .map(|value| parse_timestamp(&value, "tasks.completed_at"))
        .transpose()?;

    Ok(Task {
        id,
        title,
        description: row.get("description")?,
        bucket,
        position: row.get("position")?,
        tags: load_tags(conn, id)?,
        project: row.get("project")?,
        estimate,
        status,
        created_at,
        updated_at,
        completed_at,
    })
}

fn parse_bucket(id: TaskId, week: Option<i64>, year: Option<i64>) -> RepoResult<Bucket> {
    match (week, year) {
        (None, None) => Ok(Bucket::Inbox),
        (Some(week), Some(year)) => {
            let week = u32::try_from(week).ok();
            let year = i32::try_from(year).ok();
            week.zip(year)
                .and_then(|(week, year)| Week::new(year, week).ok())
                .map(Bucket::Week)
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "week/year out of range for task {id} in tasks.week/tasks.year"
                    ))
                })
        }
        _ => Err(RepoError::InvalidData(format!(
            "week and year must both be set or both be NULL for task {id}"
        ))),
    }
}

/// Parses stored timestamps: RFC 3339, or naive ISO text read as UTC.
///
/// Migration `0002_task_details` rewrites legacy local-time text as UTC, so
/// naive values only come from rows written outside this crate afterwards.
fn parse_timestamp(value: &str, column: &'static str) -> RepoResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn non_negative(value: i64, column: &'static str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative value `{value}` in {column}")))
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let applied = applied_migrations(conn)?;
    for name in migration_names() {
        if !applied.iter().any(|record| record.name == name) {
            return Err(RepoError::UninitializedConnection {
                missing_migration: name,
            });
        }
    }

    for column in [
        "id",
        "title",
        "description",
        "status",
        "week",
        "year",
        "position",
        "project",
        "estimate",
        "created_at",
        "updated_at",
        "completed_at",
    ] {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
