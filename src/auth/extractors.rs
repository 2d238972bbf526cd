use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::auth::load_current_user;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The user id proven by the bearer token, as recorded by `AuthMiddleware`.
///
/// Extraction fails with `AppError::Unauthorized` when the middleware did not run for this
/// route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                let err = AppError::Unauthorized("Not authenticated".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

/// The full account record of the authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<AuthenticatedUserId>().copied();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let AuthenticatedUserId(user_id) = user_id
                .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("Application state is not configured".to_string())
            })?;

            let user = load_current_user(&state.users, user_id).await?;
            Ok(CurrentUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, SessionConfig};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(
            PasswordHasher::new(4),
            &SessionConfig::new("extractor_secret", Algorithm::HS256, Duration::minutes(5)),
        ))
    }

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedUserId(123));

        let mut payload = Payload::None;
        let extracted_id = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert_eq!(extracted_id.unwrap(), AuthenticatedUserId(123));
    }

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUserId::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_loads_account() {
        let state = state();
        let alice = state
            .users
            .create("alice@example.com", "Passw0rd!")
            .await
            .unwrap();

        let req = test::TestRequest::default()
            .app_data(state.clone())
            .to_http_request();
        req.extensions_mut().insert(AuthenticatedUserId(alice.id));

        let mut payload = Payload::None;
        let current = CurrentUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(current.email, "alice@example.com");
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_unknown_user() {
        let req = test::TestRequest::default()
            .app_data(state())
            .to_http_request();
        req.extensions_mut().insert(AuthenticatedUserId(404));

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
