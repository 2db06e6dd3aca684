//! Object store configuration, loaded once at startup and read-only afterwards

use std::fmt;

use super::{vars, ConfigError, Environment};

/// Static access keys for the object store
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Describes the bucket and the deployment topology used to address objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Bucket holding every uploaded object
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint; `None` means the AWS regional endpoint
    pub endpoint: Option<String>,
    /// `None` falls back to the AWS default credential chain
    pub credentials: Option<StaticCredentials>,
    pub force_path_style: bool,
    /// Custom domain bound to the bucket (`R2_CUSTOM_DOMAIN`)
    pub custom_domain: Option<String>,
    /// Public or CDN domain serving the bucket (`S3_DOMAIN`)
    pub public_domain: Option<String>,
    /// Attach the `public-read` canned ACL to every write
    pub public_read_acl: bool,
}

impl StorageConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Minimal configuration for a bucket on the AWS regional endpoint
    #[must_use]
    pub fn for_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: Self::DEFAULT_REGION.to_string(),
            endpoint: None,
            credentials: None,
            force_path_style: false,
            custom_domain: None,
            public_domain: None,
            public_read_acl: false,
        }
    }

    /// Loads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// See [`StorageConfig::from_lookup`]
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        Self::from_lookup(environment, &vars::process_env)
    }

    /// Loads the configuration through `lookup`, applying the environment defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` if no bucket is configured outside development,
    /// `ConfigError::IncompleteCredentials` if only one of the access keys is set and
    /// `ConfigError::InvalidValue` for unparseable flags
    pub fn from_lookup(
        environment: Environment,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bucket = vars::non_empty(lookup, "S3_BUCKET_NAME")
            .or_else(|| environment.default_bucket().map(ToString::to_string))
            .ok_or(ConfigError::MissingVar("S3_BUCKET_NAME"))?;

        let credentials = match (
            vars::non_empty(lookup, "S3_ACCESS_KEY"),
            vars::non_empty(lookup, "S3_SECRET_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteCredentials),
        };

        Ok(Self {
            bucket,
            region: vars::non_empty(lookup, "S3_REGION")
                .unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
            endpoint: vars::non_empty(lookup, "S3_ENDPOINT")
                .or_else(|| environment.default_endpoint().map(ToString::to_string)),
            credentials,
            force_path_style: vars::flag(lookup, "S3_FORCE_PATH_STYLE")?
                .unwrap_or_else(|| environment.default_force_path_style()),
            custom_domain: vars::non_empty(lookup, "R2_CUSTOM_DOMAIN"),
            public_domain: vars::non_empty(lookup, "S3_DOMAIN"),
            public_read_acl: vars::flag(lookup, "S3_PUBLIC_READ_ACL")?.unwrap_or(false),
        })
    }

    /// Endpoint objects are addressed through, without a trailing slash
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint.as_deref().map_or_else(
            || format!("https://s3.{}.amazonaws.com", self.region),
            |endpoint| endpoint.trim_end_matches('/').to_string(),
        )
    }
}
