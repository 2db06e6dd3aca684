//! Session-related error types

use thiserror::Error;

/// Errors that can occur while opening a session
#[derive(Error, Debug)]
pub enum SessionError {
    /// No access password is configured
    #[error("Login is disabled: ACCESS_PASSWORD is not set")]
    LoginDisabled,

    /// The supplied password does not match
    #[error("Invalid password")]
    InvalidPassword,

    /// The signing secret cannot key the MAC
    #[error("Invalid session secret")]
    InvalidSecret,

    #[error("Failed to sign session marker: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
