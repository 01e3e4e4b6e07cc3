use diesel_async::pooled_connection::PoolError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::error::{ConstraintViolation, DatabaseErrorConverter};

/// Application-wide error type.
///
/// Store failures are carried verbatim in [`AppError::Database`]; nothing in
/// the repository layer retries, recovers from, or rewrites them. Missing
/// entities are reported as `Ok(None)`, not as an error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Store error, passed through untouched
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: diesel::result::Error,
    },

    /// Could not check a connection out of the pool
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Wraps a store error raised while performing `operation`.
    pub fn database(operation: impl Into<String>, source: diesel::result::Error) -> Self {
        AppError::Database {
            operation: operation.into(),
            source,
        }
    }

    /// The underlying Diesel error, if this is a store failure.
    pub fn diesel_error(&self) -> Option<&diesel::result::Error> {
        match self {
            AppError::Database { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Describes the constraint a store failure violated, if any.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.diesel_error().and_then(DatabaseErrorConverter::inspect)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        AppError::database("database operation", error)
    }
}

impl From<bb8::RunError<PoolError>> for AppError {
    fn from(error: bb8::RunError<PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::from(error),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
