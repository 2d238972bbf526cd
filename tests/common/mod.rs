#![allow(dead_code)]

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{http::header, test, web, App};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use taskdesk::auth::{PasswordHasher, SessionConfig};
use taskdesk::routes::{self, health};
use taskdesk::AppState;

pub const PASSWORD: &str = "Password123!";

pub fn session_config() -> SessionConfig {
    SessionConfig::new("test-secret", Algorithm::HS256, Duration::minutes(60))
}

/// Fresh in-memory state with a cheap bcrypt cost.
pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(PasswordHasher::new(4), &session_config()))
}

pub fn test_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(NormalizePath::trim())
        .service(health::health)
        .configure(routes::config)
}

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> ServiceResponse<impl MessageBody> {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> ServiceResponse<impl MessageBody> {
    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form(vec![("username", email), ("password", password)])
        .to_request();
    test::call_service(app, req).await
}

/// Registers `email` with [`PASSWORD`] and logs in.
pub async fn sign_up(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> TestUser {
    let resp = register(app, email, PASSWORD).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);
    let user: Value = test::read_body_json(resp).await;

    let resp = login(app, email, PASSWORD).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);
    let token: Value = test::read_body_json(resp).await;

    TestUser {
        id: user["id"].as_i64().expect("user id") as i32,
        token: token["access_token"]
            .as_str()
            .expect("access token")
            .to_string(),
    }
}

pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    user: &TestUser,
    body: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(user.bearer())
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    test::read_body_json(resp).await
}
