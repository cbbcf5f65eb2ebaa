//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://testing_dashboard.db?mode=rwc";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DB_MAX_CONNECTIONS: u32 = 10;
    pub const DB_MIN_CONNECTIONS: u32 = 1;

    /// Where the Playwright JSON reporter writes by default in our CI layout.
    pub const REPORT_PATH: &str = "pw_tests/test-results/results.json";

    pub const SUITE_TITLE: &str = "Unknown Suite";
    pub const SUITE_FILE: &str = "unknown.spec.ts";
    pub const TEST_TITLE: &str = "Unknown Test";

    pub const RECENT_WINDOW_DAYS: u32 = 7;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Connection URL (`postgres://...` or `sqlite://...`)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Fallback values substituted when a report omits optional identity fields.
///
/// The file default follows Playwright's `*.spec.ts` naming; reports coming
/// from other runners can override it without touching the importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefaults {
    pub suite_title: String,
    pub suite_file: String,
    pub test_title: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            suite_title: defaults::SUITE_TITLE.to_string(),
            suite_file: defaults::SUITE_FILE.to_string(),
            test_title: defaults::TEST_TITLE.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database settings
    pub database: DatabaseSettings,
    /// Report file used when `import` is called without `--file`
    pub default_report_path: PathBuf,
    /// Defaults applied by the import pipeline
    pub import_defaults: ImportDefaults,
    /// Lookback window for "recent" aggregates, in days
    pub recent_window_days: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production), defaults to development
    /// - `DATABASE_URL`: Database connection string (required in production)
    /// - `TSD_DB_MAX_CONNECTIONS` / `TSD_DB_MIN_CONNECTIONS`: Pool bounds (default: 10 / 1)
    /// - `TSD_HOST`: Server host (default: 127.0.0.1)
    /// - `TSD_PORT`: Server port (default: 8080)
    /// - `TSD_DEFAULT_REPORT_PATH`: Report file for `import` (default: pw_tests/test-results/results.json)
    /// - `TSD_DEFAULT_SUITE_TITLE`: Suite title when a report omits it (default: Unknown Suite)
    /// - `TSD_DEFAULT_SUITE_FILE`: Suite file when a report omits it (default: unknown.spec.ts)
    /// - `TSD_DEFAULT_TEST_TITLE`: Test title when a report omits it (default: Unknown Test)
    /// - `TSD_RECENT_WINDOW_DAYS`: Lookback for "recent" counts (default: 7)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("RUST_ENV") {
            Ok(s) => Environment::parse(&s).ok_or(ConfigError::InvalidValue(
                "RUST_ENV must be 'development' or 'production'",
            ))?,
            Err(_) => Environment::Development,
        };

        let host = env::var("TSD_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("TSD_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("TSD_PORT must be a valid port number"))?;

        let url =
            env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string());

        let max_connections = env::var("TSD_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| defaults::DB_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("TSD_DB_MAX_CONNECTIONS must be a valid number")
            })?;

        let min_connections = env::var("TSD_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| defaults::DB_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("TSD_DB_MIN_CONNECTIONS must be a valid number")
            })?;

        let default_report_path = env::var("TSD_DEFAULT_REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::REPORT_PATH));

        let import_defaults = ImportDefaults {
            suite_title: env::var("TSD_DEFAULT_SUITE_TITLE")
                .unwrap_or_else(|_| defaults::SUITE_TITLE.to_string()),
            suite_file: env::var("TSD_DEFAULT_SUITE_FILE")
                .unwrap_or_else(|_| defaults::SUITE_FILE.to_string()),
            test_title: env::var("TSD_DEFAULT_TEST_TITLE")
                .unwrap_or_else(|_| defaults::TEST_TITLE.to_string()),
        };

        let recent_window_days = env::var("TSD_RECENT_WINDOW_DAYS")
            .unwrap_or_else(|_| defaults::RECENT_WINDOW_DAYS.to_string())
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue("TSD_RECENT_WINDOW_DAYS must be a valid number")
            })?;

        let config = Config {
            environment,
            host,
            port,
            database: DatabaseSettings {
                url,
                max_connections,
                min_connections,
            },
            default_report_path,
            import_defaults,
            recent_window_days,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "DATABASE_URL is using development default '{}'. Set a production database URL.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            errors.push(
                "TSD_DB_MIN_CONNECTIONS must not exceed TSD_DB_MAX_CONNECTIONS".to_string(),
            );
        }

        if self.recent_window_days == 0 {
            errors.push("TSD_RECENT_WINDOW_DAYS must be positive".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
