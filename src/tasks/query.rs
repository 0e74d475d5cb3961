//!
//! # Task Query Construction
//!
//! Translates a validated filter bag into the SQL fragments the repository
//! executes. Construction is deterministic: the owner predicate always comes
//! first and can never be omitted or overridden by client input; optional
//! status/priority equality and the full-text search predicate follow in a
//! fixed order so bind positions are predictable.

use serde::{Deserialize, Serialize};

use crate::models::{TaskPriority, TaskStatus};

/// Hard ceiling on page size.
pub const MAX_LIMIT: i64 = 100;
/// Page size applied when the client does not ask for one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Clamped pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamps raw values into range: `page >= 1`, `limit` in `[1, 100]`
    /// with a default of 10.
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    // Saturating: page is client-controlled and may be i64::MAX; the
    // offset must stay a valid non-negative literal rather than overflow.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

/// Pagination metadata returned alongside a task page.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl PageMeta {
    /// `pages` is `ceil(total / limit)` with a floor of 1, so an empty
    /// result set still reports one (empty) page.
    pub fn new(total: i64, pagination: Pagination) -> Self {
        let pages = ((total + pagination.limit - 1) / pagination.limit).max(1);
        Self {
            total,
            page: pagination.page,
            limit: pagination.limit,
            pages,
        }
    }
}

/// The fixed set of recognized sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Newest first. The default.
    CreatedAt,
    /// Earliest due first; tasks without a due date sort last.
    DueDate,
    /// Lexicographic ascending.
    Title,
    /// High, then med, then low.
    Priority,
    /// Lexicographic ascending (done, in-progress, todo).
    Status,
}

impl SortBy {
    /// Maps a raw `sortBy` parameter to a sort order. Unrecognized or
    /// absent values fall back to newest-first rather than erroring.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("createdAt") => SortBy::CreatedAt,
            Some("dueDate") => SortBy::DueDate,
            Some("title") => SortBy::Title,
            Some("priority") => SortBy::Priority,
            Some("status") => SortBy::Status,
            _ => SortBy::CreatedAt,
        }
    }

    /// The ORDER BY clause body for this sort. Priority is ranked
    /// explicitly because the column stores text and lexicographic order
    /// would not put high before med.
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at DESC",
            SortBy::DueDate => "due_date ASC NULLS LAST",
            SortBy::Title => "title ASC",
            SortBy::Priority => {
                "CASE priority WHEN 'high' THEN 0 WHEN 'med' THEN 1 ELSE 2 END ASC"
            }
            SortBy::Status => "status ASC",
        }
    }
}

/// A validated task-list filter, ready for SQL construction.
#[derive(Debug)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub sort: SortBy,
    pub pagination: Pagination,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            priority: None,
            sort: SortBy::CreatedAt,
            pagination: Pagination::default(),
        }
    }
}

impl TaskFilter {
    /// Builds the WHERE clause for this filter. `$1` is always the owner
    /// id; status, priority, and the search term follow in that order, and
    /// the repository must bind them in the same order.
    ///
    /// Search is a full-text match over title and description combined
    /// (OR semantics across the two fields, case-insensitive); tokenization
    /// is delegated to the Postgres text-search machinery backing the
    /// expression index.
    pub fn where_clause(&self) -> String {
        let mut sql = String::from("owner_id = $1");
        let mut param = 2;

        if self.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param));
            param += 1;
        }
        if self.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${}", param));
            param += 1;
        }
        if self.search.is_some() {
            sql.push_str(&format!(
                " AND to_tsvector('english', title || ' ' || coalesce(description, '')) \
                 @@ plainto_tsquery('english', ${})",
                param
            ));
        }

        sql
    }

    /// The page query: filtered, sorted, and sliced.
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT id, title, description, status, priority, due_date, owner_id, \
             created_at, updated_at FROM tasks WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            self.where_clause(),
            self.sort.order_clause(),
            self.pagination.limit,
            self.pagination.offset(),
        )
    }

    /// The parallel total-count query over the same predicate. Total is
    /// independent of page and limit by construction.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM tasks WHERE {}", self.where_clause())
    }
}
