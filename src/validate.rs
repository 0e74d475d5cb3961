//!
//! # Request Validation
//!
//! Explicit typed checks over inbound payloads and query strings. Each
//! function takes a raw request shape, collects every field-level problem
//! (not just the first), and either returns a fully validated value for the
//! repository layer or the complete `Vec<FieldError>` for a 400 response.
//!
//! Normalization happens here too: names and titles are trimmed, emails are
//! trimmed and lowercased so the unique index on `users.email` is
//! case-insensitive in practice.

use lazy_static::lazy_static;

use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::FieldError;
use crate::models::{
    CreateTaskRequest, TaskListQuery, TaskPriority, TaskStatus, UpdateTaskRequest,
};
use crate::tasks::query::{Pagination, SortBy, TaskFilter};
use crate::tasks::repo::{NewTask, TaskChanges};

lazy_static! {
    static ref EMAIL_REGEX: regex::Regex = regex::Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_SEARCH_LEN: usize = 100;

/// Validated registration data, email already normalized.
#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated login data, email already normalized.
#[derive(Debug)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !EMAIL_REGEX.is_match(email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
}

pub fn register_request(req: &RegisterRequest) -> Result<ValidRegistration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = req.name.trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() < 2 {
        errors.push(FieldError::new("name", "Name must be at least 2 characters long"));
    } else if name.chars().count() > 50 {
        errors.push(FieldError::new("name", "Name must not exceed 50 characters"));
    }

    let email = normalize_email(&req.email);
    check_email(&email, &mut errors);

    let password = &req.password;
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters long",
        ));
    } else {
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one uppercase letter, one lowercase letter, and one number",
            ));
        }
    }

    if errors.is_empty() {
        Ok(ValidRegistration {
            name,
            email,
            password: password.clone(),
        })
    } else {
        Err(errors)
    }
}

pub fn login_request(req: &LoginRequest) -> Result<ValidLogin, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = normalize_email(&req.email);
    check_email(&email, &mut errors);

    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(ValidLogin {
            email,
            password: req.password.clone(),
        })
    } else {
        Err(errors)
    }
}

fn check_title(title: &str, required: bool, errors: &mut Vec<FieldError>) {
    if title.is_empty() {
        errors.push(FieldError::new(
            "title",
            if required { "Title is required" } else { "Title cannot be empty" },
        ));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(FieldError::new("title", "Title must not exceed 200 characters"));
    }
}

fn check_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new(
            "description",
            "Description must not exceed 1000 characters",
        ));
    }
}

fn parse_status(raw: &str, errors: &mut Vec<FieldError>) -> Option<TaskStatus> {
    match TaskStatus::parse(raw) {
        Some(status) => Some(status),
        None => {
            errors.push(FieldError::new(
                "status",
                &format!("Status must be one of: {}", TaskStatus::ALLOWED),
            ));
            None
        }
    }
}

fn parse_priority(raw: &str, errors: &mut Vec<FieldError>) -> Option<TaskPriority> {
    match TaskPriority::parse(raw) {
        Some(priority) => Some(priority),
        None => {
            errors.push(FieldError::new(
                "priority",
                &format!("Priority must be one of: {}", TaskPriority::ALLOWED),
            ));
            None
        }
    }
}

/// Checks a create payload. Description and due date are optional by
/// contract; status defaults to `todo` and priority to `med`.
pub fn create_task_request(req: &CreateTaskRequest) -> Result<NewTask, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = req.title.trim().to_string();
    check_title(&title, true, &mut errors);

    let description = req.description.as_ref().map(|d| d.trim().to_string());
    if let Some(d) = &description {
        check_description(d, &mut errors);
    }

    let status = match &req.status {
        Some(raw) => parse_status(raw, &mut errors).unwrap_or_default(),
        None => TaskStatus::default(),
    };
    let priority = match &req.priority {
        Some(raw) => parse_priority(raw, &mut errors).unwrap_or_default(),
        None => TaskPriority::default(),
    };

    if errors.is_empty() {
        Ok(NewTask {
            title,
            description,
            status,
            priority,
            due_date: req.due_date,
        })
    } else {
        Err(errors)
    }
}

/// Checks an update payload. Only recognized, present fields make it into
/// the change set; enumerated fields are re-validated on every write.
pub fn update_task_request(req: &UpdateTaskRequest) -> Result<TaskChanges, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut changes = TaskChanges::default();

    if let Some(raw) = &req.title {
        let title = raw.trim().to_string();
        check_title(&title, false, &mut errors);
        changes.title = Some(title);
    }
    if let Some(raw) = &req.description {
        let description = raw.trim().to_string();
        check_description(&description, &mut errors);
        changes.description = Some(description);
    }
    if let Some(raw) = &req.status {
        changes.status = parse_status(raw, &mut errors);
    }
    if let Some(raw) = &req.priority {
        changes.priority = parse_priority(raw, &mut errors);
    }
    changes.due_date = req.due_date;

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

/// Checks list-query parameters and assembles the typed filter. Page and
/// limit must be integers if present (they are clamped afterwards);
/// unrecognized `sortBy` values silently fall back to newest-first.
pub fn task_list_query(req: &TaskListQuery) -> Result<TaskFilter, Vec<FieldError>> {
    let mut errors = Vec::new();

    let search = req
        .q
        .as_ref()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());
    if let Some(q) = &search {
        if q.chars().count() > MAX_SEARCH_LEN {
            errors.push(FieldError::new(
                "q",
                "Search query must not exceed 100 characters",
            ));
        }
    }

    let status = match &req.status {
        Some(raw) => parse_status(raw, &mut errors),
        None => None,
    };
    let priority = match &req.priority {
        Some(raw) => parse_priority(raw, &mut errors),
        None => None,
    };

    let page = match &req.page {
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(FieldError::new("page", "Page must be an integer"));
                None
            }
        },
        None => None,
    };
    let limit = match &req.limit {
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(FieldError::new("limit", "Limit must be an integer"));
                None
            }
        },
        None => None,
    };

    if errors.is_empty() {
        Ok(TaskFilter {
            search,
            status,
            priority,
            sort: SortBy::parse(req.sort_by.as_deref()),
            pagination: Pagination::clamped(page, limit),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_register_valid() {
        let req = RegisterRequest {
            name: "  Ada Lovelace ".to_string(),
            email: "Ada@Example.COM ".to_string(),
            password: "Password1".to_string(),
        };
        let valid = register_request(&req).unwrap();
        assert_eq!(valid.name, "Ada Lovelace");
        assert_eq!(valid.email, "ada@example.com");
    }

    #[test]
    fn test_register_collects_all_errors() {
        let req = RegisterRequest {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = register_request(&req).unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "password"]);
    }

    #[test]
    fn test_register_password_complexity() {
        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "alllowercase1".to_string(),
        };
        let errors = register_request(&req).unwrap_err();
        assert_eq!(fields(&errors), vec!["password"]);
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = login_request(&LoginRequest::default()).unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "password"]);

        let ok = login_request(&LoginRequest {
            email: "USER@example.com".to_string(),
            password: "whatever".to_string(),
        })
        .unwrap();
        assert_eq!(ok.email, "user@example.com");
    }

    #[test]
    fn test_create_task_defaults() {
        let req = CreateTaskRequest {
            title: "Ship spec".to_string(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        let new_task = create_task_request(&req).unwrap();
        assert_eq!(new_task.status, TaskStatus::Todo);
        assert_eq!(new_task.priority, TaskPriority::Med);
        assert_eq!(new_task.description, None);
    }

    #[test]
    fn test_create_task_rejects_bad_fields() {
        let req = CreateTaskRequest {
            title: "   ".to_string(),
            description: Some("d".repeat(1001)),
            status: Some("archived".to_string()),
            priority: Some("urgent".to_string()),
            due_date: None,
        };
        let errors = create_task_request(&req).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["title", "description", "status", "priority"]
        );
    }

    #[test]
    fn test_create_task_title_bounds() {
        let too_long = CreateTaskRequest {
            title: "t".repeat(201),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        assert_eq!(fields(&create_task_request(&too_long).unwrap_err()), vec!["title"]);

        let at_limit = CreateTaskRequest {
            title: "t".repeat(200),
            description: Some(String::new()),
            status: None,
            priority: None,
            due_date: None,
        };
        assert!(create_task_request(&at_limit).is_ok());
    }

    #[test]
    fn test_update_task_partial() {
        let req = UpdateTaskRequest {
            status: Some("done".to_string()),
            ..UpdateTaskRequest::default()
        };
        let changes = update_task_request(&req).unwrap();
        assert_eq!(changes.status, Some(TaskStatus::Done));
        assert!(changes.title.is_none());
        assert!(changes.due_date.is_none());
    }

    #[test]
    fn test_update_task_rejects_empty_title() {
        let req = UpdateTaskRequest {
            title: Some("   ".to_string()),
            ..UpdateTaskRequest::default()
        };
        let errors = update_task_request(&req).unwrap_err();
        assert_eq!(errors[0].message, "Title cannot be empty");
    }

    #[test]
    fn test_list_query_defaults() {
        let filter = task_list_query(&TaskListQuery::default()).unwrap();
        assert!(filter.search.is_none());
        assert!(filter.status.is_none());
        assert_eq!(filter.sort, SortBy::CreatedAt);
        assert_eq!(filter.pagination, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_list_query_full() {
        let req = TaskListQuery {
            q: Some(" spec ".to_string()),
            status: Some("in-progress".to_string()),
            priority: Some("high".to_string()),
            page: Some("2".to_string()),
            limit: Some("50".to_string()),
            sort_by: Some("priority".to_string()),
        };
        let filter = task_list_query(&req).unwrap();
        assert_eq!(filter.search.as_deref(), Some("spec"));
        assert_eq!(filter.status, Some(TaskStatus::InProgress));
        assert_eq!(filter.priority, Some(TaskPriority::High));
        assert_eq!(filter.sort, SortBy::Priority);
        assert_eq!(filter.pagination, Pagination { page: 2, limit: 50 });
    }

    #[test]
    fn test_list_query_rejects_bad_values() {
        let req = TaskListQuery {
            q: Some("q".repeat(101)),
            status: Some("blocked".to_string()),
            priority: Some("critical".to_string()),
            page: Some("two".to_string()),
            limit: Some("ten".to_string()),
            sort_by: None,
        };
        let errors = task_list_query(&req).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["q", "status", "priority", "page", "limit"]
        );
    }

    #[test]
    fn test_list_query_unknown_sort_falls_back() {
        let req = TaskListQuery {
            sort_by: Some("assignee".to_string()),
            ..TaskListQuery::default()
        };
        assert_eq!(task_list_query(&req).unwrap().sort, SortBy::CreatedAt);
    }
}
