use crate::{
    auth::CurrentUser,
    error::AppError,
    models::task::{NewTask, Task, TaskListQuery, TaskSearch, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Loads a task and checks that `user_id` owns it.
///
/// The store itself is owner-blind for point lookups, so every `/{id}` handler goes through here.
async fn owned_task(state: &AppState, task_id: i32, user_id: i32) -> Result<Task, AppError> {
    let task = state.tasks.get(task_id).await?;
    if task.owner_id != user_id {
        log::warn!(
            "User {} denied access to task {} owned by {}",
            user_id,
            task_id,
            task.owner_id
        );
        return Err(AppError::Forbidden(
            "Not allowed to access this task".into(),
        ));
    }
    Ok(task)
}

/// Retrieves a filtered, sorted page of the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status`, `priority` (optional): exact matches.
/// - `deadline_before`, `deadline_after` (optional): inclusive deadline bounds.
/// - `show_completed` (default `true`): when `false`, `done` tasks are dropped even if
///   `status=done` was requested.
/// - `order_by` (`created_at` | `deadline`, default `created_at`): unknown keys fall back
///   to `created_at`.
/// - `order_dir` (`asc` | `desc`, default `asc`): anything but `desc` sorts ascending.
/// - `limit` (default 100), `offset` (default 0): applied after filtering and sorting.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token, or the account no longer exists.
/// - `422 Unprocessable Entity`: unparseable parameters, e.g. an unknown status.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    query_params: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(current_user.id, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Case-insensitive substring search over the user's task titles and descriptions.
///
/// Both `title` and `description` are optional and combine with AND. No pagination.
#[get("/search")]
pub async fn search_tasks(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    search: web::Query<TaskSearch>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.search(current_user.id, &search).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 100 characters (required).
/// - `description` (optional): up to 1000 characters.
/// - `deadline` (optional): RFC 3339 timestamp.
/// - `status` (optional, default `todo`), `priority` (optional, default `none`).
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: missing or invalid token, or the account no longer exists.
/// - `422 Unprocessable Entity`: invalid input.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .tasks
        .create(current_user.id, task_data.into_inner())
        .await?;
    log::debug!("User {} created task {}", current_user.id, task.id);

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `403 Forbidden`: the task belongs to another user.
/// - `404 Not Found`: no task with that id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), current_user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates the supplied fields of a task the user owns.
///
/// Absent fields are left unchanged; `description` and `deadline` may be cleared with `null`.
/// `updated_at` always advances.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden`, `404 Not Found`: as for `GET /tasks/{id}`.
/// - `422 Unprocessable Entity`: invalid input.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_id = task_id.into_inner();

    owned_task(&state, task_id, current_user.id).await?;
    let task = state.tasks.update(task_id, &task_data).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the user owns.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `403 Forbidden`, `404 Not Found`: as for `GET /tasks/{id}`.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    owned_task(&state, task_id, current_user.id).await?;
    state.tasks.delete(task_id).await?;
    log::debug!("User {} deleted task {}", current_user.id, task_id);

    Ok(HttpResponse::NoContent().finish())
}
