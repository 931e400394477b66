//! Errors from the REST API layer.

/// Fallback shown when an error response carries no readable message.
const GENERIC_MESSAGE: &str = "The request could not be completed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the body, or a generic fallback.
        message: String,
    },

    /// A 2xx response whose body is not the JSON we expected.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The configured base URL cannot address collections.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build a status error from a response body.
    ///
    /// The message is taken from the body's `message` field, then its
    /// `error` field; otherwise a generic message with the status code.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("{GENERIC_MESSAGE} (status {status})"));
        ApiError::Status { status, message }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message suitable for display next to a form or list.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Request(e) if e.is_timeout() => "The server did not answer in time".into(),
            ApiError::Request(_) => "Unable to reach the server".into(),
            ApiError::Decode(_) => "The server sent an unexpected response".into(),
            ApiError::InvalidUrl(url) => format!("Invalid server address: {url}"),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn message_field_wins() {
        let err = ApiError::from_body(409, r#"{"message": "in use", "error": "CONFLICT"}"#);
        assert_matches!(err, ApiError::Status { status: 409, ref message } if message == "in use");
        assert_eq!(err.user_message(), "in use");
    }

    #[test]
    fn error_field_is_fallback() {
        let err = ApiError::from_body(400, r#"{"error": "Code already exists"}"#);
        assert_eq!(err.user_message(), "Code already exists");
    }

    #[test]
    fn missing_message_uses_generic_text_with_status() {
        let err = ApiError::from_body(500, "<html>oops</html>");
        assert_eq!(
            err.user_message(),
            "The request could not be completed (status 500)"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn not_found_detection() {
        assert!(ApiError::from_body(404, "").is_not_found());
        assert!(!ApiError::from_body(410, "").is_not_found());
        assert!(!ApiError::Decode("x".into()).is_not_found());
    }
}
