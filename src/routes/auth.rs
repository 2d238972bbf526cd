use crate::{
    auth::{RegisterRequest, TokenRequest, TokenResponse},
    error::AppError,
    models::user::UserResponse,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates an account for `{email, password}` and returns it without the password hash.
///
/// ## Responses:
/// - `201 Created`: the new `UserResponse`.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: malformed email or a password that breaks the policy.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = state
        .users
        .create(&register_data.email, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Accepts an OAuth2-style password form (`username` = email) and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: `{access_token, token_type: "bearer"}`.
/// - `404 Not Found`: no account with that email.
/// - `401 Unauthorized`: wrong password.
#[post("/token")]
pub async fn token(
    state: web::Data<AppState>,
    form: web::Form<TokenRequest>,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .await?;

    let access_token = state.sessions.issue_now(user.id)?;
    log::info!("Issued access token for user {}", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}
