//! The HTTP path to the provider API.
//!
//! Every call is a form-encoded POST to `{base_uri}{endpoint}` answered
//! with a JSON object, which is handed to [`classify`].

use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;

use super::config::HttpOptions;
use crate::response::{classify, ApiResult};
use crate::signing::SignedPayload;
use crate::{Result, WeiboPayError};

/// Thin reqwest wrapper bound to one base URI.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client from transport settings.
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let base_url = options.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| WeiboPayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            timeout_secs: options.timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an endpoint.
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| WeiboPayError::invalid_data("endpoint", format!("'{}': {}", endpoint, e)))
    }

    /// POST a signed payload and classify the answer.
    pub async fn post(&self, endpoint: &str, payload: &SignedPayload) -> Result<ApiResult> {
        let url = self.url(endpoint)?;
        tracing::debug!(url = %url, fields = payload.fields().len(), "Weibo API requesting");

        let response = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(payload.to_form())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, &url))?;

        let raw = self.handle_response(response).await?;
        let result = classify(endpoint, raw);
        tracing::debug!(url = %url, success = result.is_success(), "Weibo API requested");
        Ok(result)
    }

    /// Check the status and decode the body as a JSON object.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Map<String, Value>> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WeiboPayError::Serialization(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(WeiboPayError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(WeiboPayError::Serialization(format!(
                "expected a JSON object from Weibo API, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(WeiboPayError::Serialization(format!(
                "Failed to parse Weibo API response: {}",
                e
            ))),
        }
    }

    /// Map reqwest errors to WeiboPayError.
    fn map_reqwest_error(&self, e: reqwest::Error, url: &Url) -> WeiboPayError {
        if e.is_timeout() {
            WeiboPayError::ConnectionTimeout {
                operation: format!("POST {}", url.path()),
                timeout_ms: self.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            WeiboPayError::ConnectionFailed {
                target: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            WeiboPayError::Transport(format!("Weibo API request failed: {}", e))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
