//! Provider response classification.
//!
//! Every API call answers with a JSON object carrying a `code`. Only
//! `100000` means the request was accepted; anything else is a business
//! failure described by `msg` (or `message`).

use serde_json::{Map, Value};

use crate::{Result, WeiboPayError};

/// Result code of an accepted request.
pub const SUCCESS_CODE: &str = "100000";

const UNKNOWN_MESSAGE: &str = "Unknown";

/// A decoded, successful provider response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    /// Wrap a decoded JSON object.
    pub fn new(raw: Map<String, Value>) -> Self {
        Self(raw)
    }

    /// Look up a value by dotted path, e.g. `data.status`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Look up a scalar by dotted path, rendered as text.
    pub fn get_str(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The `data` member, when the response carries one.
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<ApiResponse> for Value {
    fn from(response: ApiResponse) -> Self {
        Value::Object(response.0)
    }
}

/// Outcome of a call whose response decoded as JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResult {
    /// `code` was `100000`.
    Success(ApiResponse),
    /// The provider rejected the request.
    BusinessFailure {
        endpoint: String,
        code: Option<String>,
        message: String,
        raw: Map<String, Value>,
    },
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Turn a business failure into [`WeiboPayError::BusinessFailure`].
    pub fn into_result(self) -> Result<ApiResponse> {
        match self {
            Self::Success(response) => Ok(response),
            Self::BusinessFailure {
                endpoint,
                code,
                message,
                raw,
            } => Err(WeiboPayError::BusinessFailure {
                endpoint,
                code,
                message,
                raw,
            }),
        }
    }
}

/// Classify a decoded response from `endpoint`.
///
/// The code may arrive as a string or a number; both forms count.
pub fn classify(endpoint: &str, raw: Map<String, Value>) -> ApiResult {
    let code = raw.get("code").and_then(scalar_text);
    if code.as_deref() == Some(SUCCESS_CODE) {
        return ApiResult::Success(ApiResponse(raw));
    }

    let message = ["msg", "message"]
        .iter()
        .filter_map(|key| raw.get(*key).and_then(scalar_text))
        .find(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_MESSAGE.to_string());

    ApiResult::BusinessFailure {
        endpoint: endpoint.to_string(),
        code,
        message,
        raw,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
