use std::env;

use reqwest::Url;

use crate::error::ConfigError;

pub const BASE_URL_VAR: &str = "CRM_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Read once at startup and handed to the API client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let raw = env::var(BASE_URL_VAR).ok();
        Self::from_base_url(raw.as_deref())
    }

    /// Blank or missing values fall back to [`DEFAULT_BASE_URL`].
    pub fn from_base_url(raw: Option<&str>) -> Result<Self, ConfigError> {
        let value = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                value: value.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: value.trim_end_matches('/').to_string(),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_value_uses_default() {
        assert_eq!(ClientConfig::from_base_url(None).unwrap(), ClientConfig::default());
        assert_eq!(
            ClientConfig::from_base_url(Some("   ")).unwrap().base_url,
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::from_base_url(Some("https://crm.example.com/api/")).unwrap();
        assert_eq!(config.base_url, "https://crm.example.com/api");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ClientConfig::from_base_url(Some("not a url")).is_err());
        assert!(matches!(
            ClientConfig::from_base_url(Some("ftp://crm.example.com")),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
