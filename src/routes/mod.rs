pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every API route. `/auth` is public; `/users` and `/tasks` sit behind
/// [`AuthMiddleware`]. Malformed bodies and query strings are reported as validation errors.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extractor_errors_json())
        .app_data(extractor_errors_query())
        .app_data(extractor_errors_form())
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::token),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::me)
                .service(users::update_email)
                .service(users::update_password),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                // Must precede `/{id}`.
                .service(tasks::search_tasks)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

fn extractor_errors_json() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn extractor_errors_query() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn extractor_errors_form() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
