//! Runtime configuration: environment first, optional `console.yaml` overrides.

use std::env;
use std::fs;

use secrecy::SecretString;
use serde::Deserialize;

use crate::constants::{DEFAULT_BASE_URL, FETCH_TIMEOUT_SECS, HEAD_POLL_MS, PAGE_SIZE};

#[derive(Debug)]
pub struct Config {
    /// Gateway root, no trailing slash (e.g. `https://gateway.example.com`).
    pub base_url: String,
    /// Admin bearer token for the log endpoint.
    pub admin_token: SecretString,
    pub page_size: usize,
    pub head_poll_ms: u64,
    pub timeout_secs: u64,
}

/// Optional overrides loaded from `console.yaml` in the working directory.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    base_url: Option<String>,
    page_size: Option<usize>,
    head_poll_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let token = env::var("GATEWAY_ADMIN_TOKEN")
            .map_err(|_| "GATEWAY_ADMIN_TOKEN not set".to_string())?;

        let mut config = Self {
            base_url: env::var("GATEWAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            admin_token: SecretString::from(token),
            page_size: PAGE_SIZE,
            head_poll_ms: HEAD_POLL_MS,
            timeout_secs: FETCH_TIMEOUT_SECS,
        };

        if let Ok(content) = fs::read_to_string("console.yaml") {
            let overrides: FileOverrides = serde_yaml::from_str(&content)
                .map_err(|e| format!("console.yaml: {}", e))?;
            config.apply(overrides);
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn apply(&mut self, overrides: FileOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size.max(1);
        }
        if let Some(head_poll_ms) = overrides.head_poll_ms {
            self.head_poll_ms = head_poll_ms.max(250);
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_with_floors() {
        let mut config = Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_token: SecretString::from("t".to_string()),
            page_size: PAGE_SIZE,
            head_poll_ms: HEAD_POLL_MS,
            timeout_secs: FETCH_TIMEOUT_SECS,
        };
        let overrides: FileOverrides =
            serde_yaml::from_str("page_size: 0\nhead_poll_ms: 10\nbase_url: https://gw.example.com")
                .unwrap();
        config.apply(overrides);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.head_poll_ms, 250);
        assert_eq!(config.base_url, "https://gw.example.com");
        assert_eq!(config.timeout_secs, FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn empty_yaml_changes_nothing() {
        let overrides: FileOverrides = serde_yaml::from_str("{}").unwrap();
        assert!(overrides.base_url.is_none());
        assert!(overrides.page_size.is_none());
    }
}
