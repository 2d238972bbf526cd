pub mod task;
pub mod user;

pub use task::{
    NewTask, SortDirection, SortKey, Task, TaskListQuery, TaskPriority, TaskSearch, TaskStatus,
    TaskUpdate,
};
pub use user::{User, UserResponse};
