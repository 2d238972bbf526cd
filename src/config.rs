use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::auth::token::SessionConfig;

const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60;
/// One year.
const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;
const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Failure to assemble a [`Config`] from the environment.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    /// Postgres connection string. When unset the server keeps its data in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let algorithm = match lookup("ALGORITHM") {
            Some(value) => match Algorithm::from_str(&value) {
                Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ALGORITHM",
                        value,
                    })
                }
            },
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = parse_or(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&access_token_expire_minutes) {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_expire_minutes.to_string(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            secret_key,
            algorithm,
            access_token_expire_minutes,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            self.secret_key.clone(),
            self.algorithm,
            Duration::minutes(self.access_token_expire_minutes),
        )
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("SECRET_KEY", "s3cret")])).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_expire_minutes, 60);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.algorithm, Algorithm::HS512);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.session_config().ttl, Duration::minutes(15));
    }

    #[test]
    fn test_config_requires_secret() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[])).err(),
            Some(ConfigError::Missing("SECRET_KEY"))
        );
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("SERVER_PORT", "eighty"),
        ]))
        .err()
        .unwrap();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );

        // Only shared-secret algorithms make sense with SECRET_KEY.
        assert!(Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "RS256"),
        ]))
        .is_err());

        assert!(Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_token_lifetime_is_bounded() {
        let year = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "525600"),
        ]))
        .unwrap();
        assert_eq!(year.session_config().ttl, Duration::days(365));

        assert_eq!(
            Config::from_lookup(lookup_from(&[
                ("SECRET_KEY", "s3cret"),
                ("ACCESS_TOKEN_EXPIRE_MINUTES", "9223372036854775807"),
            ]))
            .err(),
            Some(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: "9223372036854775807".into()
            })
        );
    }
}
