//! HTTP utilities for resource REST calls

use crate::resource::ClientError;
use crate::resource::Params;
use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("rescall/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Error fields a response body may carry, flat or under `"error"`
///
/// Any `code` in the body is ignored: it is often an application code, and
/// the HTTP status is what classifies the failure.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    class: Option<String>,
    #[serde(default, alias = "message")]
    details: Option<String>,
}

/// `{"error": {...}}` wrapper some endpoints use
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Decode a non-success response body into a [`ClientError`]
///
/// The code is always the response status. Class and details come from the
/// wrapped or flat error shape when present; anything else is described
/// from the status line.
pub fn decode_error(status: StatusCode, body: &str) -> ClientError {
    let reason = status.canonical_reason().unwrap_or("HTTPError");
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .or_else(|_| serde_json::from_str::<ErrorBody>(body));

    match parsed {
        Ok(ErrorBody { class, details }) if class.is_some() || details.is_some() => {
            let class = class
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| reason.to_string());
            ClientError::new(status.as_u16(), class, details.unwrap_or_default())
        }
        _ => ClientError::new(status.as_u16(), reason, sanitize_for_log(body)),
    }
}

/// HTTP client wrapper for resource API calls
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Send a request and decode the JSON response
    ///
    /// Non-success statuses come back as a [`ClientError`]; failures to reach
    /// the server or read its answer are plain errors.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Params>,
    ) -> Result<Value> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("{} {} [{}]", method, url, request_id);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Request-Id", &request_id);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!(
                "API error [{}]: {} - {}",
                request_id,
                status,
                sanitize_for_log(&response_body)
            );
            let err = decode_error(status, &response_body);
            return Err(anyhow::Error::new(err).context(format!("{} {}", method, url)));
        }

        // Handle empty response
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).context("Failed to parse response JSON")
    }

    pub async fn get(&self, url: &str, token: Option<&str>) -> Result<Value> {
        self.send(Method::GET, url, token, None).await
    }

    pub async fn post(&self, url: &str, token: Option<&str>, body: &Params) -> Result<Value> {
        self.send(Method::POST, url, token, Some(body)).await
    }

    pub async fn put(&self, url: &str, token: Option<&str>, body: &Params) -> Result<Value> {
        self.send(Method::PUT, url, token, Some(body)).await
    }

    pub async fn delete(&self, url: &str, token: Option<&str>, body: Option<&Params>) -> Result<Value> {
        self.send(Method::DELETE, url, token, body).await
    }
}

/// Append `params` to `url` as a query string
///
/// Scalars are written as-is, arrays repeat the key, nested objects are sent
/// as JSON text. Nulls are skipped.
pub fn add_query_params(url: &str, params: &Params) -> String {
    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in params {
        let key = urlencoding::encode(key);
        match value {
            Value::Null => {},
            Value::Array(arr) => {
                for item in arr {
                    if let Some(item) = query_value(item) {
                        query_parts.push(format!("{}={}", key, urlencoding::encode(&item)));
                    }
                }
            },
            other => {
                if let Some(item) = query_value(other) {
                    query_parts.push(format!("{}={}", key, urlencoding::encode(&item)));
                }
            },
        }
    }

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
