use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::query::{list_tasks_sql, search_tasks_sql, TASK_COLUMNS};
use super::{task_not_found, user_not_found, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::task::{NewTask, Task, TaskListQuery, TaskSearch, TaskUpdate};
use crate::models::user::User;

const USER_COLUMNS: &str = "id, email, password_hash, created_at";

/// Users stored in the `users` table. The `UNIQUE (email)` constraint is the authority on
/// duplicates; a violation surfaces as `AppError::Conflict` through `From<sqlx::Error>`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_email(&self, id: i32, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password_hash = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)
    }
}

/// Tasks stored in the `tasks` table.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the `UPDATE` for a partial task change. `updated_at` is always set, so an empty
/// update still produces a valid statement.
pub fn update_task_sql(id: i32, update: &TaskUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE tasks SET updated_at = ");
    builder.push_bind(Utc::now());

    if let Some(title) = &update.title {
        builder.push(", title = ").push_bind(title.clone());
    }
    if let Some(description) = &update.description {
        builder.push(", description = ").push_bind(description.clone());
    }
    if let Some(deadline) = update.deadline {
        builder.push(", deadline = ").push_bind(deadline);
    }
    if let Some(status) = update.status {
        builder.push(", status = ").push_bind(status);
    }
    if let Some(priority) = update.priority {
        builder.push(", priority = ").push_bind(priority);
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING ").push(TASK_COLUMNS);
    builder
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, owner_id: i32, task: NewTask) -> Result<Task, AppError> {
        let now = Utc::now();
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (owner_id, title, description, deadline, status, priority, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.deadline)
        .bind(task.status.unwrap_or_default())
        .bind(task.priority.unwrap_or_default())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn get(&self, id: i32) -> Result<Task, AppError> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(task_not_found)
    }

    async fn list(&self, owner_id: i32, query: &TaskListQuery) -> Result<Vec<Task>, AppError> {
        let tasks = list_tasks_sql(owner_id, query)
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn search(&self, owner_id: i32, search: &TaskSearch) -> Result<Vec<Task>, AppError> {
        let tasks = search_tasks_sql(owner_id, search)
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn update(&self, id: i32, update: &TaskUpdate) -> Result<Task, AppError> {
        update_task_sql(id, update)
            .build_query_as::<Task>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(task_not_found)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        Ok(())
    }
}
