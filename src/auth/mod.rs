pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::models::user::User;
use crate::security::validate_password_strength;

// Re-export necessary items
pub use extractors::{AuthenticatedUserId, CurrentUser};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{parse_subject, Claims, SessionConfig, SessionError, SessionIssuer};

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// At most 100 characters, the width of `users.email`.
    #[validate(email, length(max = 100))]
    pub email: String,
    /// Must satisfy the password policy in [`crate::security`].
    #[validate(custom = "validate_password_strength")]
    pub password: String,
}

/// Form body of `POST /auth/token`. `username` carries the account email.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmailRequest {
    #[validate(email, length(max = 100))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    #[validate(custom = "validate_password_strength")]
    pub new_password: String,
}

/// First half of current-user resolution: turns a bearer token into a user id.
pub fn authenticate(
    sessions: &SessionIssuer,
    token: &str,
    now: DateTime<Utc>,
) -> Result<i32, AppError> {
    let subject = sessions.validate(token, now)?;
    Ok(parse_subject(&subject)?)
}

/// Second half: loads the account a validated token refers to.
pub async fn load_current_user(users: &UserDirectory, user_id: i32) -> Result<User, AppError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

/// Validates `token` and loads the user it names.
pub async fn resolve_current_user(
    sessions: &SessionIssuer,
    users: &UserDirectory,
    token: &str,
    now: DateTime<Utc>,
) -> Result<User, AppError> {
    let user_id = authenticate(sessions, token, now)?;
    load_current_user(users, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryUserRepository;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;
    use std::sync::Arc;

    fn sessions() -> SessionIssuer {
        SessionIssuer::new(&SessionConfig::new(
            "resolve_secret",
            Algorithm::HS256,
            Duration::minutes(60),
        ))
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "testexample.com".to_string(),
            password: "Passw0rd!".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let weak_password = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password".to_string(),
        };
        let err = weak_password.validate().unwrap_err().to_string();
        assert!(err.contains("uppercase"), "unexpected message: {}", err);
    }

    #[test]
    fn test_email_fits_column_width() {
        let email_of =
            |domain_len: usize| format!("{}@{}.com", "a".repeat(60), "b".repeat(domain_len));
        assert_eq!(email_of(35).len(), 100);

        let at_limit = UpdateEmailRequest { email: email_of(35) };
        assert!(at_limit.validate().is_ok());

        let too_long = UpdateEmailRequest { email: email_of(36) };
        assert!(too_long.validate().is_err());

        let register = RegisterRequest {
            email: email_of(45),
            password: "Passw0rd!".to_string(),
        };
        assert!(register.validate().is_err());
    }

    #[test]
    fn test_update_password_request_validation() {
        let request = UpdatePasswordRequest {
            old_password: "anything".to_string(),
            new_password: "N3w-secret".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = UpdatePasswordRequest {
            old_password: "anything".to_string(),
            new_password: "short".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_authenticate_rejects_non_numeric_subject() {
        let now = Utc::now();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Claims {
                sub: "alice".into(),
                iat: now.timestamp(),
                exp: now.timestamp() + 60,
            },
            &jsonwebtoken::EncodingKey::from_secret(b"resolve_secret"),
        )
        .unwrap();

        match authenticate(&sessions(), &token, now) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token is invalid"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_resolve_current_user() {
        let users = UserDirectory::new(
            Arc::new(InMemoryUserRepository::new()),
            PasswordHasher::new(4),
        );
        let alice = users.create("alice@example.com", "Passw0rd!").await.unwrap();
        let sessions = sessions();
        let now = Utc::now();

        let token = sessions.issue(alice.id, now, sessions.ttl()).unwrap();
        let resolved = resolve_current_user(&sessions, &users, &token, now)
            .await
            .unwrap();
        assert_eq!(resolved.id, alice.id);

        let expired_at = now + sessions.ttl() + Duration::seconds(1);
        match resolve_current_user(&sessions, &users, &token, expired_at).await {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token is expired"),
            other => panic!("unexpected result: {:?}", other),
        }

        let ghost = sessions.issue(999, now, sessions.ttl()).unwrap();
        match resolve_current_user(&sessions, &users, &ghost, now).await {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "User not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
