pub mod query;
pub mod repo;

pub use query::{PageMeta, Pagination, SortBy, TaskFilter};
pub use repo::{NewTask, TaskChanges};
