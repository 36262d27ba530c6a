//! Client configuration sourced from the host environment.

use std::fmt;

pub const BASE_URL_ENV: &str = "WARREN_API_BASE_URL";
pub const API_KEY_ENV: &str = "WARREN_API_KEY";

/// Base URL and API key for an `ApiClient`.
///
/// Values are taken as-is: an unset variable becomes an empty string and the
/// resulting client fails on its first call, not here.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Read `WARREN_API_BASE_URL` and `WARREN_API_KEY`.
    ///
    /// Meant to be called once from the host's startup path.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: lookup(BASE_URL_ENV).unwrap_or_default(),
            api_key: lookup(API_KEY_ENV).unwrap_or_default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_reads_both_variables() {
        let env: HashMap<&str, &str> =
            [(BASE_URL_ENV, "https://api.warren.io"), (API_KEY_ENV, "secret")].into_iter().collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config, ClientConfig::new("https://api.warren.io", "secret"));
    }

    #[test]
    fn missing_variables_default_to_empty() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, "");
        assert_eq!(config.api_key, "");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("https://api.warren.io", "secret"));
        assert!(rendered.contains("https://api.warren.io"));
        assert!(!rendered.contains("secret"));
    }
}
