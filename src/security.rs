//! Password complexity rules applied at the schema boundary.

use std::borrow::Cow;

use regex::Regex;
use validator::ValidationError;

use crate::auth::password::MAX_PASSWORD_BYTES;

/// Characters that satisfy the "symbol" rule.
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()-_=+[]{};:'",.<>/?\|`~"#;

pub const PASSWORD_MIN_LENGTH: usize = 8;

lazy_static::lazy_static! {
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref LOWERCASE_REGEX: Regex = Regex::new(r"[a-z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SYMBOL_REGEX: Regex =
        Regex::new(&format!("[{}]", regex::escape(PASSWORD_SYMBOLS))).unwrap();
}

/// Returns a message for each rule `password` fails, in a fixed order.
pub fn unmet_password_rules(password: &str) -> Vec<String> {
    let mut unmet = Vec::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        unmet.push(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_LENGTH
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        unmet.push(format!(
            "Password must be at most {} bytes long",
            MAX_PASSWORD_BYTES
        ));
    }
    if !UPPERCASE_REGEX.is_match(password) {
        unmet.push("Password must contain at least one uppercase letter".to_string());
    }
    if !LOWERCASE_REGEX.is_match(password) {
        unmet.push("Password must contain at least one lowercase letter".to_string());
    }
    if !DIGIT_REGEX.is_match(password) {
        unmet.push("Password must contain at least one digit".to_string());
    }
    if !SYMBOL_REGEX.is_match(password) {
        unmet.push(format!(
            "Password must contain at least one symbol from {}",
            PASSWORD_SYMBOLS
        ));
    }

    unmet
}

/// `validator` hook for password fields.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let unmet = unmet_password_rules(password);
    if unmet.is_empty() {
        return Ok(());
    }

    let mut error = ValidationError::new("password_strength");
    error.message = Some(Cow::Owned(unmet.join("; ")));
    Err(error)
}
