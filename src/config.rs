use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
    pub migrations_path: String,
}

/// Telegram Bot API configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_key: String,
    pub api_url: String,
    pub request_timeout_secs: u64,
}

/// Sizing and pacing of the background workers
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub dispatch_workers: usize,
    pub queue_capacity: usize,
    pub rescan_interval_secs: u64,
    pub poll_interval_ms: u64,
    pub update_batch_limit: u32,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub workers: WorkerConfig,
    pub log_level: String,
    pub log_format: String,
    pub environment: String,
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = parse_var::<u32>("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let acquire_timeout_secs = parse_var::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);
        let idle_timeout_secs = parse_var::<u64>("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600); // 10 minutes
        let max_lifetime_secs = parse_var::<u64>("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800); // 30 minutes
        let test_before_acquire = parse_var::<bool>("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true);
        let migrations_path = env::var("DATABASE_MIGRATIONS_PATH")
            .unwrap_or_else(|_| "./migrations".to_string());

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
            migrations_path,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/strangerbot".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
            migrations_path: "./migrations".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self, String> {
        let bot_key = env::var("TELEGRAM_BOT_KEY")
            .map_err(|_| "TELEGRAM_BOT_KEY environment variable is required")?;

        if bot_key.trim().is_empty() {
            return Err("TELEGRAM_BOT_KEY must not be empty".to_string());
        }

        let api_url = env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());

        let request_timeout_secs = parse_var::<u64>("TELEGRAM_REQUEST_TIMEOUT_SECS").unwrap_or(30);

        Ok(Self {
            bot_key: bot_key.trim().to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_key: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let dispatch_workers =
            parse_var::<usize>("DISPATCH_WORKERS").unwrap_or(defaults.dispatch_workers);
        let queue_capacity = parse_var::<usize>("QUEUE_CAPACITY").unwrap_or(defaults.queue_capacity);
        let rescan_interval_secs =
            parse_var::<u64>("RESCAN_INTERVAL_SECS").unwrap_or(defaults.rescan_interval_secs);
        let poll_interval_ms =
            parse_var::<u64>("POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval_ms);
        let update_batch_limit =
            parse_var::<u32>("UPDATE_BATCH_LIMIT").unwrap_or(defaults.update_batch_limit);

        let config = Self {
            dispatch_workers,
            queue_capacity,
            rescan_interval_secs,
            poll_interval_ms,
            update_batch_limit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.dispatch_workers == 0 {
            return Err("DISPATCH_WORKERS must be at least 1".to_string());
        }

        if self.queue_capacity == 0 {
            return Err("QUEUE_CAPACITY must be at least 1".to_string());
        }

        if self.rescan_interval_secs == 0 {
            return Err("RESCAN_INTERVAL_SECS must be greater than 0".to_string());
        }

        // getUpdates accepts at most 100 updates per call
        if !(1..=100).contains(&self.update_batch_limit) {
            return Err(format!(
                "UPDATE_BATCH_LIMIT must be between 1 and 100, got {}",
                self.update_batch_limit
            ));
        }

        Ok(())
    }

    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            dispatch_workers: 3,
            queue_capacity: 10_000,
            rescan_interval_secs: 10,
            poll_interval_ms: 500,
            update_batch_limit: 20,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let telegram = TelegramConfig::from_env()?;
        let workers = WorkerConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_log_formats = ["text", "json"];
        if !valid_log_formats.contains(&log_format.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_FORMAT: {}. Must be one of: {:?}",
                log_format, valid_log_formats
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            telegram,
            workers,
            log_level: log_level.to_lowercase(),
            log_format: log_format.to_lowercase(),
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            telegram: TelegramConfig::default(),
            workers: WorkerConfig::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert_eq!(config.migrations_path, "./migrations");
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.dispatch_workers, 3);
        assert_eq!(config.queue_capacity, 10_000);
        assert_eq!(config.rescan_interval(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_config_rejects_zero_workers() {
        let config = WorkerConfig {
            dispatch_workers: 0,
            ..WorkerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_config_rejects_oversized_batch() {
        let config = WorkerConfig {
            update_batch_limit: 101,
            ..WorkerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
