//! Plain-text rendering of tasks, plans, and reports.
//!
//! Every function returns the full text so commands print it once.

use kairo_core::{ProjectGroup, Task, TaskStatus, Week, WeekReport, WeekStats};

const MAX_TITLE_WIDTH: usize = 48;

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Open => "open",
        TaskStatus::Completed => "done",
    }
}

/// Aligned table with one row per task, in the given order.
pub fn task_table(tasks: &[Task]) -> String {
    let headers = ["ID", "STATUS", "WEEK", "TITLE", "EST", "PROJECT", "TAGS"];
    let rows: Vec<[String; 7]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.to_string(),
                status_label(task.status).to_string(),
                task.bucket.to_string(),
                truncate(&task.title, MAX_TITLE_WIDTH),
                task.estimate
                    .map(|hours| format!("{hours}h"))
                    .unwrap_or_else(|| "-".to_string()),
                task.project.clone().unwrap_or_else(|| "-".to_string()),
                if task.tags.is_empty() {
                    "-".to_string()
                } else {
                    task.tags.join(",")
                },
            ]
        })
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![format_row(&headers.map(str::to_string), &widths)];
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}

/// Multi-line summary of one task.
pub fn task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("#{} {}", task.id, task.title),
        format!("  status:   {}", status_label(task.status)),
        format!("  bucket:   {} (position {})", task.bucket, task.position),
    ];
    if let Some(description) = &task.description {
        lines.push(format!("  notes:    {description}"));
    }
    if let Some(project) = &task.project {
        lines.push(format!("  project:  {project}"));
    }
    if !task.tags.is_empty() {
        lines.push(format!("  tags:     {}", task.tags.join(", ")));
    }
    if let Some(estimate) = task.estimate {
        lines.push(format!("  estimate: {estimate}h"));
    }
    lines.join("\n")
}

pub fn plan(week: Week, stats: &WeekStats, open: &[Task]) -> String {
    let mut lines = vec![
        format!(
            "Weekly plan {week} ({} to {})",
            week.start_date(),
            week.end_date()
        ),
        String::new(),
        format!("Planned:   {}", stats.total),
        format!("Open:      {} ({}h estimated)", stats.open, stats.estimate_open),
        format!("Completed: {}", stats.completed),
        String::new(),
    ];
    if open.is_empty() {
        lines.push("No open tasks for this week.".to_string());
    } else {
        lines.push(task_table(open));
    }
    lines.join("\n")
}

pub fn report(report: &WeekReport) -> String {
    let stats = &report.stats;
    let mut lines = vec![
        format!("Weekly report {}", report.week),
        String::new(),
        format!("Total:           {}", stats.total),
        format!(
            "Completed:       {} ({}h)",
            stats.completed, stats.estimate_completed
        ),
        format!("Open:            {} ({}h)", stats.open, stats.estimate_open),
        format!("Completion rate: {:.1}%", stats.completion_rate()),
    ];

    if stats.total == 0 {
        lines.push(String::new());
        lines.push("No tasks for this week.".to_string());
        return lines.join("\n");
    }

    push_groups(&mut lines, "Completed", "x", &report.completed);
    push_groups(&mut lines, "Open", " ", &report.open);
    lines.join("\n")
}

fn push_groups(lines: &mut Vec<String>, heading: &str, marker: &str, groups: &[ProjectGroup]) {
    if groups.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(heading.to_string());
    for group in groups {
        lines.push(format!(
            "  {}",
            group.project.as_deref().unwrap_or("(no project)")
        ));
        for task in &group.tasks {
            lines.push(format!("    [{marker}] #{} {}", task.id, task.title));
        }
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
