use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::password::PasswordHasher;
use crate::auth::token::{SessionConfig, SessionIssuer};
use crate::directory::UserDirectory;
use crate::store::{
    InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};

/// Where accounts and tasks live for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Everything a request handler needs, shared behind `web::Data`.
pub struct AppState {
    pub users: UserDirectory,
    pub tasks: Arc<dyn TaskRepository>,
    pub sessions: SessionIssuer,
    pub storage: Storage,
}

impl AppState {
    pub fn new(
        storage: Storage,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        hasher: PasswordHasher,
        sessions: &SessionConfig,
    ) -> Self {
        Self {
            users: UserDirectory::new(users, hasher),
            tasks,
            sessions: SessionIssuer::new(sessions),
            storage,
        }
    }

    pub fn postgres(pool: PgPool, hasher: PasswordHasher, sessions: &SessionConfig) -> Self {
        Self::new(
            Storage::Postgres,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            hasher,
            sessions,
        )
    }

    pub fn in_memory(hasher: PasswordHasher, sessions: &SessionConfig) -> Self {
        Self::new(
            Storage::Memory,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
            hasher,
            sessions,
        )
    }
}
