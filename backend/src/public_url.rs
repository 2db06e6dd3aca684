//! Public URL resolution
//!
//! Upload and listing never share state, so both recompute an object's address from
//! its storage key and the active [`StorageConfig`]. The addressing scheme is picked
//! once from configuration, first match wins:
//!
//! 1. custom domain (`R2_CUSTOM_DOMAIN`)
//! 2. public or CDN domain (`S3_DOMAIN`)
//! 3. virtual-host style `https://{bucket}.{endpoint host}` when path style is not
//!    forced and the endpoint can address the bucket as a subdomain
//! 4. path style `{endpoint}/{bucket}`

use strum::Display;
use url::{Host, Url};

use crate::types::StorageConfig;

/// Addressing scheme selected from configuration, holding the URL prefix
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UrlStrategy {
    CustomDomain { base: String },
    PublicDomain { base: String },
    VirtualHost { base: String },
    PathStyle { base: String },
}

impl UrlStrategy {
    /// Selects the strategy for `config`; a path-style fallback always applies
    #[must_use]
    pub fn select(config: &StorageConfig) -> Self {
        if let Some(domain) = non_blank(config.custom_domain.as_deref()) {
            return Self::CustomDomain {
                base: domain.trim_end_matches('/').to_string(),
            };
        }

        if let Some(domain) = non_blank(config.public_domain.as_deref()) {
            return Self::PublicDomain {
                base: domain.trim_end_matches('/').to_string(),
            };
        }

        let endpoint = config.endpoint_url();

        if !config.force_path_style {
            if let Some(host) = virtual_host(&endpoint, &config.bucket) {
                return Self::VirtualHost {
                    base: format!("https://{}.{host}", config.bucket),
                };
            }
        }

        Self::PathStyle {
            base: format!("{}/{}", without_credentials(&endpoint), config.bucket),
        }
    }

    /// URL prefix every key is appended to
    #[must_use]
    pub fn base(&self) -> &str {
        match self {
            Self::CustomDomain { base }
            | Self::PublicDomain { base }
            | Self::VirtualHost { base }
            | Self::PathStyle { base } => base,
        }
    }
}

/// Resolves storage keys to public URLs with a strategy fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlResolver {
    strategy: UrlStrategy,
}

impl PublicUrlResolver {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        let strategy = UrlStrategy::select(config);
        tracing::info!(strategy = %strategy, base = strategy.base(), "Public URL strategy selected");
        Self { strategy }
    }

    /// Public URL of the object stored under `storage_key`
    #[must_use]
    pub fn resolve(&self, storage_key: &str) -> String {
        format!("{}/{storage_key}", self.strategy.base())
    }
}

/// Resolves a single key against `config`
#[must_use]
pub fn resolve(storage_key: &str, config: &StorageConfig) -> String {
    format!("{}/{storage_key}", UrlStrategy::select(config).base())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Host (with port) of `endpoint` when `bucket` can be addressed as its subdomain
///
/// Rules out IP literals, `localhost`, endpoints carrying a path, query or
/// credentials, and bucket names that are not single DNS labels (names with dots
/// break TLS wildcard certificates).
fn virtual_host(endpoint: &str, bucket: &str) -> Option<String> {
    let url = Url::parse(endpoint).ok()?;

    let bare = url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && url.username().is_empty()
        && url.password().is_none();
    if !bare || !is_dns_label(bucket) {
        return None;
    }

    let host = match url.host()? {
        Host::Domain(host) if host != "localhost" && host.contains('.') => host,
        _ => return None,
    };

    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// `endpoint` with any `user:password@` removed and no trailing slash
fn without_credentials(endpoint: &str) -> String {
    let Ok(mut url) = Url::parse(endpoint) else {
        return endpoint.trim_end_matches('/').to_string();
    };
    if url.set_username("").is_err() || url.set_password(None).is_err() {
        return endpoint.trim_end_matches('/').to_string();
    }
    url.as_str().trim_end_matches('/').to_string()
}

fn is_dns_label(bucket: &str) -> bool {
    (3..=63).contains(&bucket.len())
        && bucket
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !bucket.starts_with('-')
        && !bucket.ends_with('-')
}
