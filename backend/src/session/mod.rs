//! Session gate
//!
//! A session is a signed marker carried in the `auth` cookie. Gallery operations
//! only ask the injected [`SessionGate`] whether a marker is present and valid.

mod error;
mod manager;

use std::convert::Infallible;

use aide::OperationIo;
use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};

pub use error::SessionError;
pub use manager::{SessionConfig, SessionManager, SESSION_TTL};

/// Name of the cookie carrying the session marker
pub const SESSION_COOKIE: &str = "auth";

/// Pass/fail check on a session marker
pub trait SessionGate: Send + Sync {
    fn is_valid(&self, marker: &str) -> bool;
}

/// The session marker a request arrived with, if any
///
/// Extraction never fails; validity is decided by the gallery's [`SessionGate`].
#[derive(Debug, Clone, Default, OperationIo)]
pub struct Session {
    marker: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn new(marker: Option<String>) -> Self {
        Self { marker }
    }

    /// A session without a marker
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { marker: None }
    }

    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Reads the session cookie from `Cookie` headers
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let marker = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim_matches('"').to_string())
            .filter(|value| !value.is_empty());

        Self { marker }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
