//! Helpers for reading configuration variables through a lookup function
//!
//! Loading goes through `Fn(&str) -> Option<String>` so tests can feed a map
//! instead of mutating the process environment.

use std::str::FromStr;

use super::ConfigError;

/// Reads the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Returns the trimmed value, treating blank values as unset
pub fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`)
pub fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(value) = non_empty(lookup, name) else {
        return Ok(None);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

/// Parses a value with `FromStr`
pub fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    non_empty(lookup, name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
}
