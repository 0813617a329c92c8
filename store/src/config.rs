use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "roster.db";
pub const DEFAULT_SHEET: &str = "players";
pub const DEFAULT_POOL_SIZE: u32 = 20;
const MEMORY_URL: &str = "sqlite::memory:";

/// Optional settings read from a YAML file.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub sheet: Option<String>,
    pub pool_size: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub sheet: String,
    pub pool_size: u32,
}

impl StoreConfig {
    pub fn from_cli_or_env_or_yaml(
        cli_arg: Option<String>,
        yaml_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let file = match yaml_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(cli_arg, std::env::var("DATABASE_URL").ok(), file))
    }

    /// Url precedence is CLI, then environment, then file, then the default.
    pub fn resolve(cli_arg: Option<String>, env: Option<String>, file: FileConfig) -> Self {
        let url = cli_arg
            .or(env)
            .or(file.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        // Every connection to an in-memory database gets its own database.
        let pool_size = if url == MEMORY_URL {
            1
        } else {
            file.pool_size.unwrap_or(DEFAULT_POOL_SIZE).max(1)
        };

        Self {
            url,
            sheet: file.sheet.unwrap_or_else(|| DEFAULT_SHEET.to_string()),
            pool_size,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url == MEMORY_URL
    }

    pub async fn create_pool(&self) -> Result<SqlitePool, sqlx::Error> {
        let options = if self.url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.url)?
        } else {
            SqliteConnectOptions::new().filename(&self.url)
        };
        let options = options.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(self.pool_size);
        if self.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        pool_options.connect_with(options).await
    }

    pub async fn connect_with_retry(&self, policy: RetryPolicy) -> Result<SqlitePool, sqlx::Error> {
        retry_with_backoff(policy, move || self.create_pool()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_wins() {
        let file = FileConfig {
            database_url: Some("file.db".to_string()),
            ..FileConfig::default()
        };

        let config = StoreConfig::resolve(
            Some("cli.db".to_string()),
            Some("env.db".to_string()),
            file,
        );

        assert_eq!(config.url, "cli.db");
    }

    #[test]
    fn test_env_beats_file() {
        let file = FileConfig {
            database_url: Some("file.db".to_string()),
            ..FileConfig::default()
        };

        let config = StoreConfig::resolve(None, Some("env.db".to_string()), file);

        assert_eq!(config.url, "env.db");
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::resolve(None, None, FileConfig::default());

        assert_eq!(config.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.sheet, DEFAULT_SHEET);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_yaml_file_settings() {
        let file = FileConfig::from_yaml(
            "database_url: world.db\nsheet: lobby\npool_size: 4\n",
        )
        .expect("Failed to parse config");

        let config = StoreConfig::resolve(None, None, file);

        assert_eq!(
            config,
            StoreConfig {
                url: "world.db".to_string(),
                sheet: "lobby".to_string(),
                pool_size: 4,
            }
        );
    }

    #[test]
    fn test_memory_database_uses_single_connection() {
        let file = FileConfig {
            pool_size: Some(8),
            ..FileConfig::default()
        };

        let config = StoreConfig::resolve(Some(MEMORY_URL.to_string()), None, file);

        assert!(config.is_in_memory());
        assert_eq!(config.pool_size, 1);
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let err = FileConfig::from_yaml("pool_size: many").unwrap_err();

        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = StoreConfig::from_cli_or_env_or_yaml(
            None,
            Some(Path::new("/nonexistent/roster.yaml")),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Io(_)));
    }
}
