//! Session markers
//!
//! A marker is an HS256 JWT signed with the session secret. Its claims carry the
//! issue and expiry times in Unix seconds and a random `jti`, so two logins in the
//! same second still get distinct markers.

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use super::{SessionError, SessionGate, SESSION_COOKIE};
use crate::types::{vars, ConfigError, Environment};

type HmacSha256 = Hmac<Sha256>;

/// Sessions expire 24 hours after login
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const NONCE_BYTES: usize = 8;

/// Secrets shorter than this are rejected outside development
const MIN_SECRET_LEN: usize = 32;

/// Login and signing settings
#[derive(Clone)]
pub struct SessionConfig {
    /// Shared password; `None` disables login
    pub access_password: Option<String>,
    pub secret: Vec<u8>,
    pub secure_cookies: bool,
    pub ttl: Duration,
}

impl SessionConfig {
    /// Loads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// See [`SessionConfig::from_lookup`]
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_lookup(environment, &vars::process_env)
    }

    /// Reads `ACCESS_PASSWORD` and `SESSION_SECRET`
    ///
    /// Development generates a random secret when none is set, so sessions do not
    /// survive a restart.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` if `SESSION_SECRET` is unset outside development
    /// and `ConfigError::InvalidValue` if it is shorter than 32 bytes
    pub fn from_lookup(
        environment: Environment,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let access_password = vars::non_empty(lookup, "ACCESS_PASSWORD");
        if access_password.is_none() {
            warn!("ACCESS_PASSWORD is not set, login is disabled");
        }

        let secret = match vars::non_empty(lookup, "SESSION_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => secret.into_bytes(),
            Some(secret) => {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_SECRET",
                    value: format!("<{} bytes, need at least {MIN_SECRET_LEN}>", secret.len()),
                })
            }
            None if environment.is_deployed() => {
                return Err(ConfigError::MissingVar("SESSION_SECRET"))
            }
            None => {
                warn!("SESSION_SECRET is not set, using a random per-process secret");
                let mut secret = vec![0u8; MIN_SECRET_LEN];
                OsRng.fill_bytes(&mut secret);
                secret
            }
        };

        Ok(Self {
            access_password,
            secret,
            secure_cookies: environment.secure_cookies(),
            ttl: SESSION_TTL,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    iat: i64,
    exp: i64,
    jti: String,
}

/// Issues and verifies session markers, and checks the access password
pub struct SessionManager {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionManager {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.secret);
        let decoding_key = DecodingKey::from_secret(&config.secret);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Checks `password` and issues a new marker
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LoginDisabled` if no password is configured and
    /// `SessionError::InvalidPassword` if it does not match
    pub fn login(&self, password: &str) -> Result<String, SessionError> {
        let expected = self
            .config
            .access_password
            .as_deref()
            .ok_or(SessionError::LoginDisabled)?;

        // Compare MACs of both passwords so the check runs in constant time
        let expected_tag = self.mac(expected.as_bytes())?.finalize().into_bytes();
        self.mac(password.as_bytes())?
            .verify_slice(&expected_tag)
            .map_err(|_| SessionError::InvalidPassword)?;

        self.issue()
    }

    /// Issues a marker valid for the configured TTL
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if the marker cannot be signed
    pub fn issue(&self) -> Result<String, SessionError> {
        let ttl = i64::try_from(self.config.ttl.as_secs()).unwrap_or(i64::MAX);
        self.issue_expiring_at(Utc::now().timestamp().saturating_add(ttl))
    }

    fn issue_expiring_at(&self, expires_at: i64) -> Result<String, SessionError> {
        let mut nonce = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce);

        let claims = SessionClaims {
            iat: Utc::now().timestamp(),
            exp: expires_at,
            jti: hex::encode(nonce),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SessionError::from)
    }

    /// `Set-Cookie` value carrying `marker`
    #[must_use]
    pub fn session_cookie(&self, marker: &str) -> String {
        self.cookie(marker, self.config.ttl.as_secs())
    }

    /// `Set-Cookie` value that removes the session cookie
    #[must_use]
    pub fn cleared_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let secure = if self.config.secure_cookies {
            "; Secure"
        } else {
            ""
        };
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, SessionError> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|_| SessionError::InvalidSecret)?;
        mac.update(data);
        Ok(mac)
    }
}

impl SessionGate for SessionManager {
    fn is_valid(&self, marker: &str) -> bool {
        match decode::<SessionClaims>(marker, &self.decoding_key, &self.validation) {
            Ok(_) => true,
            Err(err) => {
                debug!("Rejected session marker: {err}");
                false
            }
        }
    }
}
