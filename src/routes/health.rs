use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Liveness probe. Public, outside every authenticated scope; reports which storage backend
/// the process was started with.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "storage": state.storage.as_str(),
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, SessionConfig};
    use actix_web::test;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let state = web::Data::new(AppState::in_memory(
            PasswordHasher::new(4),
            &SessionConfig::new("health", Algorithm::HS256, Duration::minutes(1)),
        ));
        let app =
            test::init_service(actix_web::App::new().app_data(state).service(health)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["storage"], "memory");
        assert!(json["timestamp"].is_string());
    }
}
