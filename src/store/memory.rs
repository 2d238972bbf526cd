use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::query::apply_list_query;
use super::{task_not_found, user_not_found, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::task::{NewTask, Task, TaskListQuery, TaskSearch, TaskUpdate};
use crate::models::user::User;

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Process-local user storage. Uniqueness is checked under the write lock, so it plays the
/// role of a storage-level unique constraint.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_conflict() -> AppError {
    AppError::Conflict("Record already exists".into())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.email == email) {
            return Err(email_conflict());
        }

        let user = User {
            id: table.next_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_email(&self, id: i32, email: &str) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.id != id && u.email == email) {
            return Err(email_conflict());
        }

        let user = table.rows.get_mut(&id).ok_or_else(user_not_found)?;
        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<User, AppError> {
        let mut table = self.table.write().await;
        let user = table.rows.get_mut(&id).ok_or_else(user_not_found)?;
        user.password_hash = password_hash.to_string();
        Ok(user.clone())
    }
}

/// Process-local task storage applying the shared listing rules from [`super::query`].
#[derive(Default)]
pub struct InMemoryTaskRepository {
    table: RwLock<Table<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, owner_id: i32, task: NewTask) -> Result<Task, AppError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let task = Task {
            id: table.next_id(),
            owner_id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            status: task.status.unwrap_or_default(),
            priority: task.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: i32) -> Result<Task, AppError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn list(&self, owner_id: i32, query: &TaskListQuery) -> Result<Vec<Task>, AppError> {
        let table = self.table.read().await;
        let owned = table
            .rows
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned();
        Ok(apply_list_query(owned, query))
    }

    async fn search(&self, owner_id: i32, search: &TaskSearch) -> Result<Vec<Task>, AppError> {
        let table = self.table.read().await;
        // BTreeMap iteration is already in ascending id order.
        Ok(table
            .rows
            .values()
            .filter(|t| t.owner_id == owner_id && search.matches(t))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, update: &TaskUpdate) -> Result<Task, AppError> {
        let mut table = self.table.write().await;
        let task = table.rows.get_mut(&id).ok_or_else(task_not_found)?;
        update.apply_to(task, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(task_not_found)
    }
}
