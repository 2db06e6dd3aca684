//! Environment configuration for different deployment stages

use std::env;
use std::str::FromStr;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use strum::{Display, EnumString};

use super::{ConfigError, StorageConfig};

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// Defaults to development when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let value = value.trim();

        Self::from_str(value).map_err(|_| ConfigError::InvalidEnvironment(value.to_string()))
    }

    /// Production and staging are deployed behind TLS and ship JSON logs
    #[must_use]
    pub const fn is_deployed(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether the session cookie must carry the `Secure` attribute
    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.is_deployed()
    }

    /// Bucket used when `S3_BUCKET_NAME` is not set
    #[must_use]
    pub const fn default_bucket(&self) -> Option<&'static str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some("images"),
        }
    }

    /// Returns the endpoint URL to use when `S3_ENDPOINT` is not set
    #[must_use]
    pub const fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// `LocalStack` only serves path-style requests
    #[must_use]
    pub const fn default_force_path_style(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Log filter applied when `RUST_LOG` is not set
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production | Self::Staging => "info",
            Self::Development => "debug",
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self, storage: &StorageConfig) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(storage.region.clone()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = &storage.endpoint {
            loader = loader.endpoint_url(endpoint_url);
        }

        // Without static keys the default provider chain applies
        if let Some(credentials) = &storage.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None,
                None,
                "image-gateway-static",
            ));
        }

        loader.load().await
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self, storage: &StorageConfig) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config(storage).await;

        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(storage.force_path_style)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        // Test development (default)
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var("APP_ENV", "development");
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env().unwrap(), Environment::Staging);

        env::set_var("APP_ENV", "PRODUCTION");
        assert_eq!(Environment::from_env().unwrap(), Environment::Production);

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    fn test_invalid_environment() {
        env::set_var("APP_ENV", "invalid");
        let err = Environment::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment(ref value) if value == "invalid"));
        env::remove_var("APP_ENV");
    }

    #[test]
    fn test_deployed_environments_harden_defaults() {
        for environment in [Environment::Production, Environment::Staging] {
            assert!(environment.secure_cookies());
            assert_eq!(environment.default_bucket(), None);
            assert_eq!(environment.default_endpoint(), None);
            assert!(!environment.default_force_path_style());
        }

        assert!(!Environment::Development.secure_cookies());
        assert!(Environment::Development.default_force_path_style());
        assert!(!Environment::Production.show_api_docs());
    }
}
