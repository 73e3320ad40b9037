//! Runtime configuration
//!
//! Everything is read from the environment (a `.env` file is loaded by the
//! binaries through `dotenv`). Only the connection settings are mandatory
//! when talking to a real warehouse.

use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "snowflake-arctic";
pub const DEFAULT_DATABASE: &str = "EDW_2_DB";
pub const DEFAULT_SCHEMA: &str = "REASONING";
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PORT: u16 = 8080;

/// Static application settings: completion model and analytics location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_name: String,
    pub db_name: String,
    pub schema_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            db_name: DEFAULT_DATABASE.to_string(),
            schema_name: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            model_name: non_empty(lookup("CORTEX_MODEL")).unwrap_or(defaults.model_name),
            db_name: non_empty(lookup("EDW_DATABASE")).unwrap_or(defaults.db_name),
            schema_name: non_empty(lookup("EDW_SCHEMA")).unwrap_or(defaults.schema_name),
        }
    }
}

/// How the bearer token sent to the SQL API was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    OAuth,
    KeyPairJwt,
    ProgrammaticAccessToken,
}

impl TokenType {
    /// Value for the `X-Snowflake-Authorization-Token-Type` header
    pub fn header_value(&self) -> &'static str {
        match self {
            TokenType::OAuth => "OAUTH",
            TokenType::KeyPairJwt => "KEYPAIR_JWT",
            TokenType::ProgrammaticAccessToken => "PROGRAMMATIC_ACCESS_TOKEN",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_uppercase().as_str() {
            "OAUTH" => Ok(TokenType::OAuth),
            "KEYPAIR_JWT" | "JWT" => Ok(TokenType::KeyPairJwt),
            "PROGRAMMATIC_ACCESS_TOKEN" | "PAT" => Ok(TokenType::ProgrammaticAccessToken),
            other => Err(AssistantError::ConfigError(format!(
                "unsupported SNOWFLAKE_TOKEN_TYPE '{}'",
                other
            ))),
        }
    }
}

/// Connection settings for the Snowflake SQL API
#[derive(Debug, Clone)]
pub struct SnowflakeConfig {
    pub account_url: String,
    pub token: String,
    pub token_type: TokenType,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    pub statement_timeout: Duration,
}

impl SnowflakeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let account_url = match non_empty(lookup("SNOWFLAKE_ACCOUNT_URL")) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let account = non_empty(lookup("SNOWFLAKE_ACCOUNT")).ok_or_else(|| {
                    AssistantError::ConfigError(
                        "SNOWFLAKE_ACCOUNT_URL or SNOWFLAKE_ACCOUNT must be set".to_string(),
                    )
                })?;
                format!("https://{}.snowflakecomputing.com", account.to_lowercase())
            }
        };

        let token = non_empty(lookup("SNOWFLAKE_TOKEN")).ok_or_else(|| {
            AssistantError::ConfigError("SNOWFLAKE_TOKEN must be set".to_string())
        })?;

        let token_type = match non_empty(lookup("SNOWFLAKE_TOKEN_TYPE")) {
            Some(raw) => TokenType::parse(&raw)?,
            None => TokenType::OAuth,
        };

        let timeout_secs = match non_empty(lookup("SNOWFLAKE_STATEMENT_TIMEOUT_SECS")) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AssistantError::ConfigError(format!(
                    "SNOWFLAKE_STATEMENT_TIMEOUT_SECS must be a whole number: {}",
                    e
                ))
            })?,
            None => DEFAULT_STATEMENT_TIMEOUT_SECS,
        };

        Ok(Self {
            account_url,
            token,
            token_type,
            warehouse: non_empty(lookup("SNOWFLAKE_WAREHOUSE")),
            role: non_empty(lookup("SNOWFLAKE_ROLE")),
            statement_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// API listen port, `PORT` taking precedence over `API_PORT`
pub fn api_port_from_env() -> Result<u16> {
    match non_empty(env::var("PORT").ok()).or_else(|| non_empty(env::var("API_PORT").ok())) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AssistantError::ConfigError(format!("invalid port '{}': {}", raw, e))),
        None => Ok(DEFAULT_PORT),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.model_name, "snowflake-arctic");
        assert_eq!(config.db_name, "EDW_2_DB");
        assert_eq!(config.schema_name, "REASONING");
    }

    #[test]
    fn test_app_config_overrides_and_blank_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CORTEX_MODEL", "mistral-large2"),
            ("EDW_SCHEMA", "   "),
        ]));
        assert_eq!(config.model_name, "mistral-large2");
        assert_eq!(config.schema_name, "REASONING");
    }

    #[test]
    fn test_snowflake_config_from_account_name() {
        let config = SnowflakeConfig::from_lookup(lookup_from(&[
            ("SNOWFLAKE_ACCOUNT", "MYORG-ACCT1"),
            ("SNOWFLAKE_TOKEN", "secret"),
            ("SNOWFLAKE_TOKEN_TYPE", "keypair_jwt"),
        ]))
        .unwrap();

        assert_eq!(config.account_url, "https://myorg-acct1.snowflakecomputing.com");
        assert_eq!(config.token_type, TokenType::KeyPairJwt);
        assert_eq!(config.statement_timeout, Duration::from_secs(120));
        assert!(config.warehouse.is_none());
    }

    #[test]
    fn test_snowflake_config_requires_token() {
        let err = SnowflakeConfig::from_lookup(lookup_from(&[(
            "SNOWFLAKE_ACCOUNT_URL",
            "https://x.snowflakecomputing.com/",
        )]))
        .unwrap_err();
        assert!(matches!(err, AssistantError::ConfigError(_)));
    }

    #[test]
    fn test_snowflake_config_rejects_unknown_token_type() {
        let result = SnowflakeConfig::from_lookup(lookup_from(&[
            ("SNOWFLAKE_ACCOUNT_URL", "https://x.snowflakecomputing.com"),
            ("SNOWFLAKE_TOKEN", "secret"),
            ("SNOWFLAKE_TOKEN_TYPE", "basic"),
        ]));
        assert!(result.is_err());
    }
}
