use crate::{
    auth::{CurrentUser, UpdateEmailRequest, UpdatePasswordRequest},
    error::AppError,
    models::user::UserResponse,
    state::AppState,
};
use actix_web::{get, patch, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Returns the authenticated caller's account.
#[get("/me")]
pub async fn me(current_user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(current_user.into_inner())))
}

/// Changes the caller's email.
///
/// ## Responses:
/// - `200 OK`: the updated `UserResponse`.
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: malformed email.
#[patch("/email")]
pub async fn update_email(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    request: web::Json<UpdateEmailRequest>,
) -> Result<impl Responder, AppError> {
    request.validate()?;

    let updated = state
        .users
        .change_email(&current_user, &request.email)
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// Changes the caller's password after checking the old one.
///
/// ## Responses:
/// - `200 OK`: `{detail: "Password updated successfully"}`.
/// - `400 Bad Request`: `old_password` does not match.
/// - `422 Unprocessable Entity`: `new_password` breaks the policy.
#[patch("/password")]
pub async fn update_password(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    request: web::Json<UpdatePasswordRequest>,
) -> Result<impl Responder, AppError> {
    request.validate()?;

    state
        .users
        .change_password(&current_user, &request.old_password, &request.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "detail": "Password updated successfully" })))
}
