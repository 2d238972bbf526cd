#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "Accounts, bearer-token sessions and per-user task lists behind an actix-web HTTP API."]
#![doc = "Storage is pluggable: Postgres through sqlx, or an in-process store used when no"]
#![doc = "database is configured and throughout the test suite. The binary (`main.rs`) only"]
#![doc = "reads configuration, picks a store and starts the server."]

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::{AppState, Storage};
