mod config_error;
mod environment;
mod error;
mod storage_config;
pub(crate) mod vars;

pub use config_error::ConfigError;
pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use storage_config::{StaticCredentials, StorageConfig};
