use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest},
    tasks::repo,
    validate,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// A malformed id is a 400, distinct from 404: the request shape is wrong
/// before ownership even enters the picture.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid task ID".into()))
}

/// Lists the authenticated user's tasks with filtering, search, sorting,
/// and pagination.
///
/// ## Query Parameters:
/// - `q` (optional): full-text search over title and description.
/// - `status` (optional): `todo`, `in-progress`, or `done`.
/// - `priority` (optional): `low`, `med`, or `high`.
/// - `page` / `limit` (optional): clamped to `page >= 1`, `limit` 1..=100,
///   default 10 per page.
/// - `sortBy` (optional): `createdAt` (default, newest first), `dueDate`,
///   `title`, `priority`, or `status`.
///
/// Responds 200 with `{success, data, meta}` where `meta` carries
/// `{total, page, limit, pages}`.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    query: web::Query<TaskListQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let filter = validate::task_list_query(&query).map_err(AppError::Validation)?;

    let (tasks, meta) = repo::list(&pool, &filter, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": tasks,
        "meta": meta,
    })))
}

/// Creates a task owned by the authenticated user. Responds 201 with the
/// stored representation.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    payload: web::Json<CreateTaskRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let new_task = validate::create_task_request(&payload).map_err(AppError::Validation)?;

    let task = repo::create(&pool, new_task, user.id).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Task created successfully",
        "data": task,
    })))
}

/// Fetches one task by id. A task owned by someone else responds 404
/// exactly like a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;

    match repo::get_by_id(&pool, task_id, user.id).await? {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Partially updates one of the user's tasks: only fields present in the
/// body are applied, and enumerated fields are re-validated on write.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;
    let changes = validate::update_task_request(&payload).map_err(AppError::Validation)?;

    match repo::update(&pool, task_id, changes, user.id).await? {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Task updated successfully",
            "data": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes one of the user's tasks, returning the deleted record for
/// confirmation. Deletion is permanent; a second delete of the same id is
/// an ordinary 404.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;

    match repo::delete(&pool, task_id, user.id).await? {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Task deleted successfully",
            "data": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        assert!(parse_task_id("9b2f1f6e-4a5d-4c1e-9d9a-0a1b2c3d4e5f").is_ok());

        match parse_task_id("not-a-uuid") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid task ID"),
            other => panic!("expected BadRequest, got {:?}", other),
        }

        // Malformed ids must never read as "not found".
        assert!(!matches!(parse_task_id("123"), Err(AppError::NotFound(_))));
    }
}
