//! Environment-based configuration. A `.env` file in the working directory
//! is honored but not required.

use std::env;
use std::fmt;
use std::path::PathBuf;

const BOT_TOKEN: &str = "BOT_TOKEN";
const DATABASE_PATH: &str = "DATABASE_PATH";
const LOG_DIR: &str = "LOG_DIR";

const DEFAULT_DATABASE_PATH: &str = "finbot.db";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is missing or empty.
    MissingVar(&'static str),
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "required variable {name} is not set"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub bot_token: String,
    pub database_path: PathBuf,
    /// Directory for the log file; stdout-only logging when unset.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bot_token = env::var(BOT_TOKEN)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingVar(BOT_TOKEN))?;
        validate_token(&bot_token)?;

        let database_path = env::var(DATABASE_PATH)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let log_dir = env::var(LOG_DIR)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bot_token,
            database_path,
            log_dir,
        })
    }
}

// Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric.
fn validate_token(token: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 2 || parts[0].parse::<u64>().is_err() || parts[1].is_empty() {
        return Err(ConfigError::Validation(
            "BOT_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_token() {
        assert!(validate_token("123456789:ABCdefGHIjklMNOpqrsTUVwxyz").is_ok());
    }

    #[test]
    fn test_token_without_colon() {
        let err = validate_token("invalid_token_no_colon").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_token_with_non_numeric_id() {
        assert!(validate_token("notanumber:ABCdef").is_err());
    }

    #[test]
    fn test_token_with_empty_secret() {
        assert!(validate_token("123456789:").is_err());
    }

    #[test]
    fn test_missing_var_message_names_the_variable() {
        let err = ConfigError::MissingVar(BOT_TOKEN);
        assert!(err.to_string().contains("BOT_TOKEN"));
    }
}
