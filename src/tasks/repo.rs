//!
//! # Task Repository
//!
//! Owner-scoped CRUD against the `tasks` table. Every statement here
//! matches on `(id, owner_id)` jointly; there is no code path that touches
//! a task by id alone, so a task owned by another user is indistinguishable
//! from one that does not exist.

use chrono::{DateTime, Utc};
use futures::try_join;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskPriority, TaskStatus};
use crate::tasks::query::{PageMeta, TaskFilter};

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, owner_id, created_at, updated_at";

/// A fully validated task ready for insertion.
#[derive(Debug)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// A validated partial update. `None` means "leave unchanged"; for
/// `due_date`, `Some(None)` clears the stored date.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Lists one page of the owner's tasks along with pagination metadata.
///
/// The page query and the total-count query share the same predicate but
/// are independent reads, so they run concurrently; if either fails the
/// whole read fails.
pub async fn list(
    pool: &PgPool,
    filter: &TaskFilter,
    owner_id: i32,
) -> Result<(Vec<Task>, PageMeta), AppError> {
    let select_sql = filter.select_sql();
    let count_sql = filter.count_sql();

    let mut page_query = sqlx::query_as::<_, Task>(&select_sql).bind(owner_id);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(owner_id);

    // Bind order must mirror TaskFilter::where_clause.
    if let Some(status) = filter.status {
        page_query = page_query.bind(status);
        count_query = count_query.bind(status);
    }
    if let Some(priority) = filter.priority {
        page_query = page_query.bind(priority);
        count_query = count_query.bind(priority);
    }
    if let Some(search) = &filter.search {
        page_query = page_query.bind(search.clone());
        count_query = count_query.bind(search.clone());
    }

    let (tasks, total) = try_join!(page_query.fetch_all(pool), count_query.fetch_one(pool))?;

    Ok((tasks, PageMeta::new(total, filter.pagination)))
}

/// Persists a new task for `owner_id` and returns the stored row.
pub async fn create(pool: &PgPool, new_task: NewTask, owner_id: i32) -> Result<Task, AppError> {
    let sql = format!(
        "INSERT INTO tasks (id, title, description, status, priority, due_date, owner_id, \
         created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {}",
        TASK_COLUMNS
    );

    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(Uuid::new_v4())
        .bind(new_task.title)
        .bind(new_task.description)
        .bind(new_task.status)
        .bind(new_task.priority)
        .bind(new_task.due_date)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    Ok(task)
}

/// Fetches a task if and only if it exists and belongs to `owner_id`.
pub async fn get_by_id(pool: &PgPool, id: Uuid, owner_id: i32) -> Result<Option<Task>, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
        TASK_COLUMNS
    );

    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

    Ok(task)
}

/// Applies the fields present in `changes` to the owner's task. Returns the
/// updated row, or `None` when no task matches `(id, owner_id)`.
///
/// An empty change set degenerates to a fetch: the row is returned
/// untouched (and `updated_at` is left alone).
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: TaskChanges,
    owner_id: i32,
) -> Result<Option<Task>, AppError> {
    if changes.is_empty() {
        return get_by_id(pool, id, owner_id).await;
    }

    let mut sets: Vec<String> = Vec::new();
    let mut param = 1;

    if changes.title.is_some() {
        sets.push(format!("title = ${}", param));
        param += 1;
    }
    if changes.description.is_some() {
        sets.push(format!("description = ${}", param));
        param += 1;
    }
    if changes.status.is_some() {
        sets.push(format!("status = ${}", param));
        param += 1;
    }
    if changes.priority.is_some() {
        sets.push(format!("priority = ${}", param));
        param += 1;
    }
    match changes.due_date {
        Some(Some(_)) => {
            sets.push(format!("due_date = ${}", param));
            param += 1;
        }
        Some(None) => sets.push("due_date = NULL".to_string()),
        None => {}
    }
    sets.push("updated_at = NOW()".to_string());

    let sql = format!(
        "UPDATE tasks SET {} WHERE id = ${} AND owner_id = ${} RETURNING {}",
        sets.join(", "),
        param,
        param + 1,
        TASK_COLUMNS
    );

    let mut query = sqlx::query_as::<_, Task>(&sql);
    if let Some(title) = changes.title {
        query = query.bind(title);
    }
    if let Some(description) = changes.description {
        query = query.bind(description);
    }
    if let Some(status) = changes.status {
        query = query.bind(status);
    }
    if let Some(priority) = changes.priority {
        query = query.bind(priority);
    }
    if let Some(Some(due_date)) = changes.due_date {
        query = query.bind(due_date);
    }

    let task = query.bind(id).bind(owner_id).fetch_optional(pool).await?;

    Ok(task)
}

/// Deletes the owner's task and returns the deleted row for confirmation,
/// or `None` when nothing matched. Deleting an already-deleted id is not an
/// error; it is simply another `None`.
pub async fn delete(pool: &PgPool, id: Uuid, owner_id: i32) -> Result<Option<Task>, AppError> {
    let sql = format!(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {}",
        TASK_COLUMNS
    );

    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

    Ok(task)
}
