//! Workflow and database configuration for tracker services.

use super::adapters::postgres::TrackerPgPool;
use super::domain::UnassignmentLogging;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use thiserror::Error;
use tracing::info;

/// Workflow switches shared by the issue and sprint services.
///
/// # Examples
///
/// ```
/// use trackwell::tracker::config::WorkflowConfig;
///
/// let config = WorkflowConfig::default();
/// assert!(!config.log_unassignment);
/// assert!(config.enforce_single_active_sprint);
///
/// let strict = WorkflowConfig::strict();
/// assert!(strict.log_unassignment);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Whether clearing an assignee appends an activity entry.
    pub log_unassignment: bool,
    /// Whether starting a sprint is rejected while another is active.
    pub enforce_single_active_sprint: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            log_unassignment: false,
            enforce_single_active_sprint: true,
        }
    }
}

impl WorkflowConfig {
    /// Creates a configuration that also records unassignments.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            log_unassignment: true,
            enforce_single_active_sprint: true,
        }
    }

    /// Returns the unassignment policy handed to the issue aggregate.
    #[must_use]
    pub const fn unassignment_logging(self) -> UnassignmentLogging {
        if self.log_unassignment {
            UnassignmentLogging::Record
        } else {
            UnassignmentLogging::Skip
        }
    }
}

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_ENV: &str = "TRACKWELL_DATABASE_URL";

/// Environment variable holding the maximum pool size.
pub const POOL_SIZE_ENV: &str = "TRACKWELL_DB_POOL_SIZE";

/// Errors raised while loading configuration or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The connection pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Connection settings for [`crate::tracker::adapters::postgres::PostgresTrackerStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: u32,
}

impl DatabaseConfig {
    /// Default maximum pool size when none is configured.
    pub const DEFAULT_POOL_SIZE: u32 = 10;

    /// Creates a configuration with the default pool size.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: Self::DEFAULT_POOL_SIZE,
        }
    }

    /// Sets the maximum pool size.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Loads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the URL is unset and
    /// [`ConfigError::Invalid`] when the pool size is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_ENV))?;

        let max_pool_size = match lookup(POOL_SIZE_ENV) {
            None => Self::DEFAULT_POOL_SIZE,
            Some(raw) => parse_pool_size(&raw)?,
        };

        Ok(Self { url, max_pool_size })
    }

    /// Builds an r2d2 connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot establish its
    /// initial connections.
    pub fn build_pool(&self) -> Result<TrackerPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.url.as_str());
        let pool = Pool::builder()
            .max_size(self.max_pool_size)
            .build(manager)?;
        info!(max_pool_size = self.max_pool_size, "tracker connection pool ready");
        Ok(pool)
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: POOL_SIZE_ENV,
        value: raw.to_owned(),
    };
    let size = raw.trim().parse::<u32>().map_err(|_| invalid())?;
    if size == 0 {
        return Err(invalid());
    }
    Ok(size)
}
