//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register named schema migrations in a fixed order.
//! - Apply each pending migration and record it in one transaction.
//!
//! # Invariants
//! - A migration name is recorded at most once, together with its changes.
//! - Every migration is guarded so re-running it on an already migrated
//!   schema changes nothing.
//! - Names in `schema_migrations` unknown to this binary abort startup.

use crate::db::{DbError, DbResult};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::time::Instant;

const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIMESTAMP_COLUMNS: [&str; 3] = ["created_at", "completed_at", "updated_at"];

const MIGRATION_LOG_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    name TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL
);";

type ApplyFn = fn(&Transaction<'_>) -> rusqlite::Result<()>;

#[derive(Clone, Copy)]
struct Migration {
    name: &'static str,
    apply: ApplyFn,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_init",
        apply: apply_init,
    },
    Migration {
        name: "0002_task_details",
        apply: apply_task_details,
    },
    Migration {
        name: "0003_task_position",
        apply: apply_task_position,
    },
    Migration {
        name: "0004_inbox_bucket",
        apply: apply_inbox_bucket,
    },
];

/// One row of the append-only migration log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    pub name: String,
    pub applied_at: String,
}

/// Names of all migrations known by this binary, in application order.
pub fn migration_names() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|migration| migration.name).collect()
}

/// Brings the schema up to date. A no-op on a current schema.
///
/// Foreign key enforcement is suspended while migrations run and restored
/// to its previous setting afterwards.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch(MIGRATION_LOG_SQL)?;
    reject_unknown_migrations(conn)?;

    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    let result = apply_pending(conn);
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    result
}

/// Lists recorded migrations in the order they were applied.
pub fn applied_migrations(conn: &Connection) -> DbResult<Vec<MigrationRecord>> {
    let mut stmt = conn.prepare(
        "SELECT name, applied_at
         FROM schema_migrations
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(MigrationRecord {
            name: row.get("name")?,
            applied_at: row.get("applied_at")?,
        });
    }
    Ok(records)
}

fn apply_pending(conn: &mut Connection) -> DbResult<()> {
    for migration in MIGRATIONS {
        let started_at = Instant::now();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if is_recorded(&tx, migration.name)? {
            continue;
        }

        if let Err(source) = (migration.apply)(&tx) {
            error!(
                "event=migration_apply module=db status=error name={} error={}",
                migration.name, source
            );
            return Err(DbError::MigrationFailed {
                name: migration.name,
                source,
            });
        }

        tx.execute(
            "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, ?2);",
            [
                migration.name.to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        tx.commit()?;

        info!(
            "event=migration_apply module=db status=ok name={} duration_ms={}",
            migration.name,
            started_at.elapsed().as_millis()
        );
    }
    Ok(())
}

fn is_recorded(conn: &Connection, name: &str) -> DbResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn reject_unknown_migrations(conn: &Connection) -> DbResult<()> {
    let known = migration_names();
    for record in applied_migrations(conn)? {
        if !known.contains(&record.name.as_str()) {
            return Err(DbError::UnknownMigration(record.name));
        }
    }
    Ok(())
}

fn apply_init(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(include_str!("0001_init.sql"))
}

fn apply_task_details(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    add_column_if_missing(tx, "tasks", "estimate", "INTEGER")?;
    add_column_if_missing(tx, "tasks", "project", "TEXT")?;
    add_column_if_missing(tx, "tasks", "updated_at", "TEXT")?;
    for column in TIMESTAMP_COLUMNS {
        convert_legacy_timestamps(tx, column)?;
    }
    tx.execute(
        "UPDATE tasks
         SET updated_at = COALESCE(completed_at, created_at)
         WHERE updated_at IS NULL;",
        [],
    )?;
    add_column_if_missing(tx, "task_tags", "ordinal", "INTEGER NOT NULL DEFAULT 0")?;
    Ok(())
}

/// Rewrites naive local wall-clock text in `tasks.<column>` as UTC RFC 3339.
fn convert_legacy_timestamps(tx: &Transaction<'_>, column: &str) -> rusqlite::Result<()> {
    let mut select = tx.prepare(&format!(
        "SELECT id, {column} FROM tasks WHERE {column} IS NOT NULL;"
    ))?;
    let values = select
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(select);

    let mut update = tx.prepare(&format!("UPDATE tasks SET {column} = ?2 WHERE id = ?1;"))?;
    for (id, value) in values {
        if let Some(converted) = legacy_local_to_utc(&value) {
            update.execute(params![id, converted])?;
        }
    }
    Ok(())
}

/// `None` for text that is already RFC 3339 or is not a timestamp at all.
fn legacy_local_to_utc(value: &str) -> Option<String> {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(value, LEGACY_TIMESTAMP_FORMAT).ok()?;
    // A wall-clock time skipped by a DST change has no local instant; keep it as UTC.
    let utc = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc());
    Some(utc.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn apply_task_position(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    add_column_if_missing(tx, "tasks", "position", "INTEGER NOT NULL DEFAULT 0")?;
    // Only buckets that still carry unassigned (<= 0) positions are renumbered.
    tx.execute_batch(include_str!("0003_task_position.sql"))
}

fn apply_inbox_bucket(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    if column_is_not_null(tx, "tasks", "week")? {
        tx.execute_batch(include_str!("0004_inbox_bucket.sql"))?;
    }
    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_tasks_bucket_position
         ON tasks (year, week, position);
         CREATE INDEX IF NOT EXISTS idx_task_tags_tag
         ON task_tags (tag_id);",
    )
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> rusqlite::Result<()> {
    if table_has_column(conn, table, column)? {
        return Ok(());
    }
    conn.execute_batch(&format!(
        "ALTER TABLE {table} ADD COLUMN {column} {definition};"
    ))
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    Ok(column_info(conn, table, column)?.is_some())
}

fn column_is_not_null(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    Ok(column_info(conn, table, column)?.is_some_and(|not_null| not_null))
}

/// Returns the `notnull` flag of `column`, or `None` when it does not exist.
fn column_info(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<Option<bool>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            let not_null: i64 = row.get(3)?;
            return Ok(Some(not_null == 1));
        }
    }
    Ok(None)
}
