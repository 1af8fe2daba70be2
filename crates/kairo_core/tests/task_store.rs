use kairo_core::db::open_db_in_memory;
use kairo_core::{
    AddTaskRequest, Bucket, BucketFilter, ErrorKind, NewTask, RepoError, SqliteTaskRepository,
    TaskListQuery, TaskPatch, TaskRepository, TaskService, TaskStatus, TaskValidationError, Week,
};
use rusqlite::Connection;

fn week_45() -> Week {
    Week::new(2025, 45).unwrap()
}

fn add(repo: &SqliteTaskRepository<'_>, title: &str, bucket: Bucket) -> kairo_core::Task {
    repo.create_task(&NewTask::new(title, bucket)).unwrap()
}

fn titles(tasks: &[kairo_core::Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut new_task = NewTask::new("  Write report  ", Bucket::Week(week_45()));
    new_task.description = Some("quarterly numbers".to_string());
    new_task.tags = vec!["Work".to_string(), "urgent".to_string(), "work".to_string()];
    new_task.project = Some("finance".to_string());
    new_task.estimate = Some(3);
    let created = repo.create_task(&new_task).unwrap();

    let loaded = repo.get_task(created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.title, "Write report");
    assert_eq!(loaded.description.as_deref(), Some("quarterly numbers"));
    assert_eq!(loaded.tags, vec!["work".to_string(), "urgent".to_string()]);
    assert_eq!(loaded.project.as_deref(), Some("finance"));
    assert_eq!(loaded.estimate, Some(3));
    assert_eq!(loaded.status, TaskStatus::Open);
    assert_eq!(loaded.position, 1);
    assert_eq!(loaded.created_at, loaded.updated_at);
    assert!(loaded.completed_at.is_none());
}

#[test]
fn positions_strictly_increase_within_a_bucket() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = add(&repo, "first", Bucket::Week(week_45()));
    let second = add(&repo, "second", Bucket::Week(week_45()));
    let inbox = add(&repo, "inbox", Bucket::Inbox);
    let third = add(&repo, "third", Bucket::Week(week_45()));

    assert_eq!(
        [first.position, second.position, third.position],
        [1, 2, 3]
    );
    assert_eq!(inbox.position, 1);
}

#[test]
fn create_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo
        .create_task(&NewTask::new("   ", Bucket::Inbox))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(count_tasks(&conn), 0);
}

#[test]
fn service_rejects_half_given_week() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let err = service
        .add(AddTaskRequest {
            title: "orphan".to_string(),
            week: Some(45),
            ..AddTaskRequest::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::PartialWeek {
            week: Some(45),
            year: None
        })
    ));

    let err = service
        .add(AddTaskRequest {
            title: "no such week".to_string(),
            week: Some(53),
            year: Some(2025),
            ..AddTaskRequest::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(count_tasks(&conn), 0);
}

#[test]
fn service_add_without_week_goes_to_inbox() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service
        .add(AddTaskRequest {
            title: "someday".to_string(),
            ..AddTaskRequest::default()
        })
        .unwrap();
    assert_eq!(task.bucket, Bucket::Inbox);
    assert_eq!(task.position, 1);
}

#[test]
fn missing_ids_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let existing = add(&repo, "present", Bucket::Inbox);

    assert!(matches!(repo.get_task(999), Err(RepoError::NotFound(999))));
    assert!(matches!(
        repo.update_task(999, &TaskPatch::default()),
        Err(RepoError::NotFound(999))
    ));
    assert!(matches!(
        repo.set_status(999, TaskStatus::Completed),
        Err(RepoError::NotFound(999))
    ));
    assert!(matches!(repo.delete_task(999), Err(RepoError::NotFound(999))));
    assert!(matches!(
        repo.swap_positions(existing.id, 999),
        Err(RepoError::NotFound(999))
    ));
    assert!(matches!(
        repo.move_to_bucket(999, Bucket::Inbox),
        Err(RepoError::NotFound(999))
    ));
}

#[test]
fn set_status_is_idempotent_and_tracks_completion_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = add(&repo, "ship it", Bucket::Week(week_45()));

    let completed = repo.set_status(task.id, TaskStatus::Completed).unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);
    let completed_at = completed.completed_at.expect("completion time is set");
    assert!(completed.updated_at >= task.updated_at);

    let again = repo.set_status(task.id, TaskStatus::Completed).unwrap();
    assert_eq!(again, completed);
    assert_eq!(again.completed_at, Some(completed_at));

    let reopened = repo.set_status(task.id, TaskStatus::Open).unwrap();
    assert_eq!(reopened.status, TaskStatus::Open);
    assert!(reopened.completed_at.is_none());
    assert_eq!(reopened.position, task.position);
    assert_eq!(reopened.bucket, task.bucket);
}

#[test]
fn edit_updates_supplied_fields_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut new_task = NewTask::new("draft", Bucket::Week(week_45()));
    new_task.project = Some("home".to_string());
    new_task.tags = vec!["chores".to_string()];
    new_task.estimate = Some(2);
    let first = repo.create_task(&new_task).unwrap();
    let second = add(&repo, "second", Bucket::Week(week_45()));

    let edited = repo
        .update_task(
            second.id,
            &TaskPatch {
                title: Some("second, renamed".to_string()),
                description: Some(Some("details".to_string())),
                tags: Some(vec!["Errands".to_string()]),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(edited.title, "second, renamed");
    assert_eq!(edited.description.as_deref(), Some("details"));
    assert_eq!(edited.tags, vec!["errands".to_string()]);
    assert_eq!(edited.position, second.position);
    assert_eq!(edited.bucket, second.bucket);

    let cleared = repo
        .update_task(
            first.id,
            &TaskPatch {
                project: Some(None),
                estimate: Some(None),
                tags: Some(Vec::new()),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.title, "draft");
    assert_eq!(cleared.project, None);
    assert_eq!(cleared.estimate, None);
    assert!(cleared.tags.is_empty());
    assert_eq!(cleared.position, first.position);
}

#[test]
fn edit_with_empty_patch_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = add(&repo, "stable", Bucket::Inbox);

    let unchanged = repo.update_task(task.id, &TaskPatch::default()).unwrap();
    assert_eq!(unchanged, task);

    let err = repo
        .update_task(
            task.id,
            &TaskPatch {
                title: Some(" ".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(repo.get_task(task.id).unwrap().title, "stable");
}

#[test]
fn swap_is_its_own_inverse() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let a = add(&repo, "a", Bucket::Week(week_45()));
    let b = add(&repo, "b", Bucket::Week(week_45()));
    let c = add(&repo, "c", Bucket::Week(week_45()));
    let query = TaskListQuery {
        bucket: week_45().into(),
        ..TaskListQuery::default()
    };

    repo.swap_positions(b.id, c.id).unwrap();
    let swapped = repo.list_tasks(&query).unwrap();
    assert_eq!(titles(&swapped), vec!["a", "c", "b"]);
    assert_eq!(repo.get_task(b.id).unwrap().position, c.position);
    assert_eq!(repo.get_task(c.id).unwrap().position, b.position);

    repo.swap_positions(b.id, c.id).unwrap();
    let restored = repo.list_tasks(&query).unwrap();
    assert_eq!(titles(&restored), vec!["a", "b", "c"]);
    assert_eq!(repo.get_task(a.id).unwrap().position, a.position);
}

#[test]
fn swap_with_self_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = add(&repo, "alone", Bucket::Inbox);

    repo.swap_positions(task.id, task.id).unwrap();
    assert_eq!(repo.get_task(task.id).unwrap(), task);
}

#[test]
fn swap_across_buckets_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let planned = add(&repo, "planned", Bucket::Week(week_45()));
    let inbox = add(&repo, "inbox", Bucket::Inbox);

    let err = repo.swap_positions(planned.id, inbox.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert_eq!(repo.get_task(planned.id).unwrap().position, 1);
    assert_eq!(repo.get_task(inbox.id).unwrap().position, 1);
}

#[test]
fn delete_leaves_other_positions_alone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let a = add(&repo, "a", Bucket::Week(week_45()));
    let b = add(&repo, "b", Bucket::Week(week_45()));
    let c = add(&repo, "c", Bucket::Week(week_45()));

    repo.delete_task(b.id).unwrap();

    assert!(matches!(repo.get_task(b.id), Err(RepoError::NotFound(_))));
    assert_eq!(repo.get_task(a.id).unwrap().position, 1);
    assert_eq!(repo.get_task(c.id).unwrap().position, 3);
    let d = add(&repo, "d", Bucket::Week(week_45()));
    assert_eq!(d.position, 4);
}

#[test]
fn delete_removes_tag_links() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut new_task = NewTask::new("tagged", Bucket::Inbox);
    new_task.tags = vec!["solo".to_string()];
    let task = repo.create_task(&new_task).unwrap();

    repo.delete_task(task.id).unwrap();

    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM task_tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
    assert!(repo.list_tags().unwrap().is_empty());
}

#[test]
fn move_between_inbox_and_week_appends_to_destination() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    add(&repo, "planned one", Bucket::Week(week_45()));
    add(&repo, "planned two", Bucket::Week(week_45()));
    let idea = add(&repo, "idea", Bucket::Inbox);

    let scheduled = repo
        .move_to_bucket(idea.id, Bucket::Week(week_45()))
        .unwrap();
    assert_eq!(scheduled.bucket, Bucket::Week(week_45()));
    assert_eq!(scheduled.position, 3);

    let unscheduled = repo.move_to_bucket(idea.id, Bucket::Inbox).unwrap();
    assert_eq!(unscheduled.bucket, Bucket::Inbox);
    assert_eq!(unscheduled.position, 1);

    let same = repo.move_to_bucket(idea.id, Bucket::Inbox).unwrap();
    assert_eq!(same, unscheduled);
}

#[test]
fn service_move_accepts_loose_week_and_year() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let task = service
        .add(AddTaskRequest {
            title: "flexible".to_string(),
            ..AddTaskRequest::default()
        })
        .unwrap();

    let moved = service.move_to_bucket(task.id, Some(1), Some(2026)).unwrap();
    assert_eq!(moved.bucket, Bucket::Week(Week::new(2026, 1).unwrap()));

    let err = service.move_to_bucket(task.id, None, Some(2026)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn list_filters_by_status_tag_and_project() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut report = NewTask::new("report", Bucket::Week(week_45()));
    report.tags = vec!["work".to_string()];
    report.project = Some("finance".to_string());
    let report = repo.create_task(&report).unwrap();

    let mut groceries = NewTask::new("groceries", Bucket::Week(week_45()));
    groceries.tags = vec!["home".to_string()];
    let groceries = repo.create_task(&groceries).unwrap();
    repo.set_status(groceries.id, TaskStatus::Completed).unwrap();

    let mut budget = NewTask::new("budget", Bucket::Inbox);
    budget.tags = vec!["work".to_string()];
    budget.project = Some("finance".to_string());
    repo.create_task(&budget).unwrap();

    let open_in_week = repo
        .list_tasks(&TaskListQuery {
            bucket: BucketFilter::Week(week_45()),
            status: Some(TaskStatus::Open),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&open_in_week), vec!["report"]);
    assert_eq!(open_in_week[0].id, report.id);

    let work = repo
        .list_tasks(&TaskListQuery {
            tag: Some("WORK".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&work), vec!["report", "budget"]);

    let finance_inbox = repo
        .list_tasks(&TaskListQuery {
            bucket: BucketFilter::Inbox,
            project: Some("finance".to_string()),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&finance_inbox), vec!["budget"]);

    assert_eq!(
        repo.list_tags().unwrap(),
        vec!["home".to_string(), "work".to_string()]
    );
    assert_eq!(repo.list_projects().unwrap(), vec!["finance".to_string()]);
}

#[test]
fn list_all_orders_weeks_chronologically_then_inbox() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    add(&repo, "inbox", Bucket::Inbox);
    add(&repo, "next year", Bucket::Week(Week::new(2026, 1).unwrap()));
    add(&repo, "late 2025", Bucket::Week(Week::new(2025, 52).unwrap()));
    add(&repo, "week 45 a", Bucket::Week(week_45()));
    add(&repo, "week 45 b", Bucket::Week(week_45()));

    let all = repo.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(
        titles(&all),
        vec!["week 45 a", "week 45 b", "late 2025", "next year", "inbox"]
    );
}

#[test]
fn week_stats_count_tasks_and_estimates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut first = NewTask::new("first", Bucket::Week(week_45()));
    first.estimate = Some(3);
    let first = repo.create_task(&first).unwrap();
    let mut second = NewTask::new("second", Bucket::Week(week_45()));
    second.estimate = Some(5);
    repo.create_task(&second).unwrap();
    add(&repo, "unestimated", Bucket::Week(week_45()));
    add(&repo, "elsewhere", Bucket::Inbox);
    repo.set_status(first.id, TaskStatus::Completed).unwrap();

    let stats = repo.week_stats(week_45()).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.open, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.estimate_total, 8);
    assert_eq!(stats.estimate_open, 5);
    assert_eq!(stats.estimate_completed, 3);
    assert!((stats.completion_rate() - 100.0 / 3.0).abs() < 1e-9);

    let empty = repo.week_stats(Week::new(2025, 1).unwrap()).unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.completion_rate(), 0.0);
}

#[test]
fn list_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = add(&repo, "soon broken", Bucket::Inbox);

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE tasks SET status = 'archived' WHERE id = ?1;",
        [task.id],
    )
    .unwrap();

    let err = repo.list_tasks(&TaskListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(err.kind(), ErrorKind::Storage);
}

fn count_tasks(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}
