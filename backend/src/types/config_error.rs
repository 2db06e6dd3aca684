//! Errors raised while loading process configuration

use thiserror::Error;

/// Errors that can occur while reading configuration at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown value
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A required variable is not set
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Only one half of the static key pair is set
    #[error("S3_ACCESS_KEY and S3_SECRET_KEY must be set together")]
    IncompleteCredentials,
}
