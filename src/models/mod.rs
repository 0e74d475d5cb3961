pub mod task;
pub mod user;

pub use task::{CreateTaskRequest, Task, TaskListQuery, TaskPriority, TaskStatus, UpdateTaskRequest};
pub use user::User;
