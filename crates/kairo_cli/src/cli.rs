//! Command-line surface of `kairo`.
//!
//! Each subcommand translates to one or two task service calls.

use crate::config::Paths;
use crate::render;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kairo_core::{
    current_week, open_db, parse_week, AddTaskRequest, BucketFilter, SqliteTaskRepository,
    TaskId, TaskListQuery, TaskPatch, TaskService, TaskStatus, Week,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// kairo - weekly task planning from the terminal
#[derive(Parser, Debug)]
#[command(name = "kairo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task database (defaults to <KAIRO_HOME>/tasks.db)
    #[arg(long, global = true, env = "KAIRO_DB")]
    pub db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, global = true, env = "KAIRO_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task to a week (current week by default) or the inbox
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Week number or YYYY-Www
        #[arg(short, long, conflicts_with = "inbox")]
        week: Option<String>,

        /// Leave the task unscheduled
        #[arg(long)]
        inbox: bool,

        /// Tag (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,

        #[arg(short, long)]
        project: Option<String>,

        /// Estimate in whole hours
        #[arg(short, long)]
        estimate: Option<u32>,
    },

    /// List tasks (current week by default)
    List {
        /// Week number or YYYY-Www
        #[arg(short, long, conflicts_with_all = ["inbox", "all"])]
        week: Option<String>,

        /// Only unscheduled tasks
        #[arg(long, conflicts_with = "all")]
        inbox: bool,

        /// Every week and the inbox
        #[arg(short, long)]
        all: bool,

        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        project: Option<String>,

        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit task fields; omitted fields stay unchanged
    Edit {
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        /// New description; an empty value clears it
        #[arg(short, long)]
        description: Option<String>,

        /// Replacement tags (repeatable)
        #[arg(short = 't', long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        #[arg(long)]
        clear_tags: bool,

        /// New project; an empty value clears it
        #[arg(short, long)]
        project: Option<String>,

        #[arg(short, long, conflicts_with = "clear_estimate")]
        estimate: Option<u32>,

        #[arg(long)]
        clear_estimate: bool,
    },

    /// Mark a task as completed
    Complete { id: TaskId },

    /// Mark a completed task as open again
    Reopen { id: TaskId },

    /// Delete a task permanently
    Delete {
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Move a task to another week or to the inbox
    Move {
        id: TaskId,

        /// Week number or YYYY-Www
        #[arg(short, long, required_unless_present = "inbox", conflicts_with = "inbox")]
        week: Option<String>,

        #[arg(long)]
        inbox: bool,
    },

    /// Show open tasks and statistics for a week
    Plan {
        #[arg(short, long)]
        week: Option<String>,
    },

    /// Show the completion report for a week
    Report {
        #[arg(short, long)]
        week: Option<String>,
    },

    /// Move open tasks to another week (next week by default)
    Rollover {
        /// Source week (defaults to current week)
        #[arg(short, long)]
        from: Option<String>,

        /// Destination week (defaults to the week after the source)
        #[arg(short, long)]
        to: Option<String>,

        #[arg(long)]
        yes: bool,
    },

    /// Move open tasks of a week back to the previous week
    Rollback {
        #[arg(short, long)]
        week: Option<String>,

        #[arg(long)]
        yes: bool,
    },

    /// List tags in use
    Tags,

    /// List known projects
    Projects,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Open,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Open => Self::Open,
            StatusArg::Completed => Self::Completed,
        }
    }
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List { .. } => "list",
            Self::Edit { .. } => "edit",
            Self::Complete { .. } => "complete",
            Self::Reopen { .. } => "reopen",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
            Self::Plan { .. } => "plan",
            Self::Report { .. } => "report",
            Self::Rollover { .. } => "rollover",
            Self::Rollback { .. } => "rollback",
            Self::Tags => "tags",
            Self::Projects => "projects",
        }
    }
}

/// Opens the store at `paths.db` and executes `command`.
pub fn execute(command: Commands, paths: &Paths) -> Result<()> {
    let conn = open_db(&paths.db)?;
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Add {
            title,
            description,
            week,
            inbox,
            tags,
            project,
            estimate,
        } => {
            let target = if inbox {
                None
            } else {
                Some(week_or_current(week.as_deref())?)
            };
            let task = service.add(AddTaskRequest {
                title,
                description,
                tags,
                project,
                estimate,
                week: target.map(|week| week.week()),
                year: target.map(|week| week.year()),
            })?;
            writeln!(out, "Created task {}", task.id)?;
            writeln!(out, "{}", render::task_detail(&task))?;
        }
        Commands::List {
            week,
            inbox,
            all,
            status,
            tag,
            project,
            json,
        } => {
            let bucket = if all {
                BucketFilter::All
            } else if inbox {
                BucketFilter::Inbox
            } else {
                BucketFilter::Week(week_or_current(week.as_deref())?)
            };
            let tasks = service.list(&TaskListQuery {
                bucket,
                status: status.map(TaskStatus::from),
                tag,
                project,
            })?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?;
            } else if tasks.is_empty() {
                writeln!(out, "No tasks found in {}.", describe_filter(bucket))?;
            } else {
                writeln!(out, "{}", render::task_table(&tasks))?;
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            tags,
            clear_tags,
            project,
            estimate,
            clear_estimate,
        } => {
            let patch = TaskPatch {
                title,
                description: description.map(Some),
                tags: if clear_tags {
                    Some(Vec::new())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags)
                },
                project: project.map(Some),
                estimate: if clear_estimate {
                    Some(None)
                } else {
                    estimate.map(Some)
                },
                status: None,
            };
            let task = service.edit(id, &patch)?;
            writeln!(out, "Updated task {}", task.id)?;
            writeln!(out, "{}", render::task_detail(&task))?;
        }
        Commands::Complete { id } => {
            if !service.get(id)?.is_open() {
                writeln!(out, "Task {id} is already completed.")?;
            } else {
                let task = service.complete(id)?;
                writeln!(out, "Completed task {}: {}", task.id, task.title)?;
            }
        }
        Commands::Reopen { id } => {
            if service.get(id)?.is_open() {
                writeln!(out, "Task {id} is already open.")?;
            } else {
                let task = service.reopen(id)?;
                writeln!(out, "Reopened task {}: {}", task.id, task.title)?;
            }
        }
        Commands::Delete { id, yes } => {
            let task = service.get(id)?;
            let prompt = format!("Delete task {} \"{}\"?", task.id, task.title);
            if !confirm(&mut input, &mut out, &prompt, yes)? {
                bail!("aborted");
            }
            service.delete(id)?;
            writeln!(out, "Deleted task {id}")?;
        }
        Commands::Move { id, week, inbox } => {
            let target = match (inbox, week.as_deref()) {
                (true, _) => None,
                (false, Some(text)) => Some(parse_week(text)?),
                (false, None) => bail!("either --week or --inbox is required"),
            };
            let task = service.move_to_bucket(
                id,
                target.map(|week| week.week()),
                target.map(|week| week.year()),
            )?;
            writeln!(
                out,
                "Moved task {} to {} (position {})",
                task.id, task.bucket, task.position
            )?;
        }
        Commands::Plan { week } => {
            let week = week_or_current(week.as_deref())?;
            let stats = service.week_stats(week)?;
            let open = service.list(&TaskListQuery {
                bucket: week.into(),
                status: Some(TaskStatus::Open),
                ..TaskListQuery::default()
            })?;
            writeln!(out, "{}", render::plan(week, &stats, &open))?;
        }
        Commands::Report { week } => {
            let report = service.week_report(week_or_current(week.as_deref())?)?;
            writeln!(out, "{}", render::report(&report))?;
        }
        Commands::Rollover { from, to, yes } => {
            let from = week_or_current(from.as_deref())?;
            let to = match to.as_deref() {
                Some(text) => parse_week(text)?,
                None => from.next()?,
            };
            let prompt = format!("Roll over open tasks from {from} to {to}?");
            if !confirm(&mut input, &mut out, &prompt, yes)? {
                bail!("aborted");
            }
            let moved = service.rollover(from, to)?;
            report_moved(&mut out, moved.len(), from, to)?;
        }
        Commands::Rollback { week, yes } => {
            let from = week_or_current(week.as_deref())?;
            let to = from.prev()?;
            let prompt = format!("Move open tasks from {from} back to {to}?");
            if !confirm(&mut input, &mut out, &prompt, yes)? {
                bail!("aborted");
            }
            let moved = service.rollback(from)?;
            report_moved(&mut out, moved.len(), from, to)?;
        }
        Commands::Tags => {
            for tag in service.list_tags()? {
                writeln!(out, "{tag}")?;
            }
        }
        Commands::Projects => {
            for project in service.list_projects()? {
                writeln!(out, "{project}")?;
            }
        }
    }

    Ok(())
}

fn week_or_current(text: Option<&str>) -> Result<Week> {
    match text {
        Some(text) => Ok(parse_week(text)?),
        None => Ok(current_week()?),
    }
}

fn describe_filter(bucket: BucketFilter) -> String {
    match bucket {
        BucketFilter::All => "any bucket".to_string(),
        BucketFilter::Inbox => "the inbox".to_string(),
        BucketFilter::Week(week) => format!("week {week}"),
    }
}

fn report_moved(out: &mut impl Write, count: usize, from: Week, to: Week) -> Result<()> {
    if count == 0 {
        writeln!(out, "No open tasks to move from {from}.")?;
    } else {
        writeln!(out, "Moved {count} task(s) from {from} to {to}")?;
    }
    Ok(())
}

/// Asks a yes/no question; anything but `y`/`yes` declines.
fn confirm(
    input: &mut impl BufRead,
    out: &mut impl Write,
    prompt: &str,
    assume_yes: bool,
) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
