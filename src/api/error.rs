use thiserror::Error;

/// Errors from talking to the recipe backend.
///
/// The taxonomy mirrors how failures are surfaced to the user: transport
/// problems, authentication problems (which invalidate the session),
/// field-level validation messages passed through verbatim, and a
/// catch-all for everything else.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP 401/403 — the session cookie is missing, expired, or rejected
    #[error("Not authenticated (status {0})")]
    Auth(u16),
    /// Other 4xx with a JSON body of field errors, surfaced verbatim
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
    /// Non-2xx response with no usable error body
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Login POST succeeded but the follow-up identity check did not.
    /// The login response body is never trusted on its own.
    #[error("Login appeared successful but session verification failed")]
    SessionUnverified,
    /// Response body could not be decoded as the expected shape
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// True for 401/403 responses, which signal that the session cookie
    /// is no longer accepted and the client must return to the login gate.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

/// Converts a non-2xx response into an [`ApiError`], consuming the body.
///
/// 401/403 map to [`ApiError::Auth`]. Other 4xx responses are expected to
/// carry a JSON object of field errors (DRF serializer style); each value
/// is flattened into a message list for [`ApiError::Validation`]. Anything
/// else, or a body that isn't a JSON object, becomes [`ApiError::HttpStatus`].
pub(crate) async fn error_for_response(response: reqwest::Response) -> ApiError {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ApiError::Auth(status.as_u16());
    }

    if status.is_client_error() {
        if let Ok(body) = response.json::<serde_json::Value>().await {
            let messages = flatten_field_errors(&body);
            if !messages.is_empty() {
                return ApiError::Validation(messages);
            }
        }
    }

    ApiError::HttpStatus(status.as_u16())
}

/// Flattens a DRF-style error body into displayable messages.
///
/// Bodies look like `{"password": ["Too short.", "Too common."],
/// "username": "Already taken."}` or `{"non_field_errors": [...]}`.
/// Values may be strings or arrays of strings; keys are dropped because
/// the backend messages already name the field where it matters.
fn flatten_field_errors(body: &serde_json::Value) -> Vec<String> {
    let mut messages = Vec::new();
    match body {
        serde_json::Value::Object(map) => {
            for value in map.values() {
                collect_messages(value, &mut messages);
            }
        }
        other => collect_messages(other, &mut messages),
    }
    messages
}

fn collect_messages(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_messages(item, out);
            }
        }
        _ => {}
    }
}
