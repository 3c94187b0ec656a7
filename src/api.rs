//! Blocking HTTP client for the gateway's log-query endpoint.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use gc_feed::{LogEntry, LogFilter, Window};

use crate::config::Config;

/// Typed error for log fetches.
///
/// All variants are handled the same way by the feed: the in-flight window
/// is discarded, the cache keeps its last known-good value, and the message
/// surfaces as a status-line toast. No retries at this layer.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or rejected admin token
    Auth(String),
    /// Network-level failure (DNS, connection, timeout)
    Network(String),
    /// Gateway returned a non-success status or `success: false` body
    Api { status: u16, message: String },
    /// Failed to parse the response body
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(msg) => write!(f, "Auth error: {}", msg),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Api { status, message } => write!(f, "API error {}: {}", status, message),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Envelope the gateway wraps every response in.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<LogPage>,
}

#[derive(Debug, Default, Deserialize)]
struct LogPage {
    #[serde(default)]
    items: Vec<LogEntry>,
    #[serde(default)]
    total: i64,
    /// Decimal-as-string aggregate over all matching rows.
    #[serde(default)]
    total_quota: String,
}

pub struct LogApi {
    client: Client,
    base_url: String,
    admin_token: SecretString,
}

impl LogApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            admin_token: config.admin_token.clone(),
        })
    }

    /// One "list logs" call. `offset`/`limit` page through rows ordered
    /// newest-first; the filter travels as query parameters.
    pub fn list_logs(
        &self,
        filter: &LogFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Window, ApiError> {
        let request = self
            .client
            .get(format!("{}/api/log/", self.base_url))
            .bearer_auth(self.admin_token.expose_secret())
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())]);
        let request = apply_filter(request, filter);

        let response = request.send()?;
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ApiError::Auth(format!("gateway rejected token ({})", status)));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Api { status: status.as_u16(), message: error_message(&body) });
        }

        let envelope: ApiEnvelope =
            response.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Api { status: status.as_u16(), message: envelope.message });
        }

        let page = envelope.data.unwrap_or_default();
        Ok(Window {
            items: page.items,
            total: page.total,
            aggregate: parse_quota(&page.total_quota),
        })
    }
}

fn apply_filter(mut request: RequestBuilder, filter: &LogFilter) -> RequestBuilder {
    if let Some(kind) = filter.kind {
        request = request.query(&[("type", kind.to_string())]);
    }
    if !filter.model_name.is_empty() {
        request = request.query(&[("model_name", filter.model_name.as_str())]);
    }
    if !filter.token_name.is_empty() {
        request = request.query(&[("token_name", filter.token_name.as_str())]);
    }
    if !filter.username.is_empty() {
        request = request.query(&[("username", filter.username.as_str())]);
    }
    if !filter.search.is_empty() {
        request = request.query(&[("keyword", filter.search.as_str())]);
    }
    if let Some(start_ts) = filter.start_ts {
        request = request.query(&[("start_timestamp", start_ts.to_string())]);
    }
    if let Some(end_ts) = filter.end_ts {
        request = request.query(&[("end_timestamp", end_ts.to_string())]);
    }
    request
}

/// Pull the gateway's message out of an error body, falling back to the
/// raw (truncated) body when it isn't the usual envelope.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value.get("message").and_then(|m| m.as_str())
        && !message.is_empty()
    {
        return message.to_string();
    }
    let mut message = body.trim().to_string();
    if message.len() > 200 {
        message.truncate(200);
    }
    message
}

fn parse_quota(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}
