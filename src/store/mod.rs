//! Persistence seams for users and tasks.
//!
//! Route handlers and the [`UserDirectory`](crate::directory::UserDirectory) only see the
//! traits below. `postgres` backs them with sqlx; `memory` keeps everything in process and is
//! used when no database is configured and throughout the test suite.

pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::task::{NewTask, Task, TaskListQuery, TaskSearch, TaskUpdate};
use crate::models::user::User;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Storage for user accounts. Implementations enforce email uniqueness at write time and
/// report a duplicate as `AppError::Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn update_email(&self, id: i32, email: &str) -> Result<User, AppError>;

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<User, AppError>;
}

/// Storage for tasks.
///
/// Listing and search are scoped by the `owner_id` the caller supplies; point operations work
/// by id alone and leave ownership checks to the caller.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, owner_id: i32, task: NewTask) -> Result<Task, AppError>;

    /// Fails with `AppError::NotFound` for an unknown id.
    async fn get(&self, id: i32) -> Result<Task, AppError>;

    async fn list(&self, owner_id: i32, query: &TaskListQuery) -> Result<Vec<Task>, AppError>;

    async fn search(&self, owner_id: i32, search: &TaskSearch) -> Result<Vec<Task>, AppError>;

    /// Refreshes `updated_at` even when `update` carries no fields.
    async fn update(&self, id: i32, update: &TaskUpdate) -> Result<Task, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}
