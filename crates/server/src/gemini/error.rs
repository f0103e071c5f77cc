//! Error types for the Gemini API client.

use thiserror::Error;

/// Errors that can occur when interacting with the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini API returned a structured error.
    #[error("API error ({}): {}", .error.status, .error.message)]
    Api {
        /// HTTP status code of the response.
        status_code: u16,
        /// Parsed error body.
        error: ApiError,
    },

    /// Gemini API returned an error body that could not be parsed.
    #[error("API error (HTTP {status_code}): {body}")]
    ApiRaw {
        /// HTTP status code of the response.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Tool execution failed.
    #[error("tool execution error: {0}")]
    ToolExecution(String),
}

/// Error envelope returned by the Gemini API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiError,
}

/// Error details from the Gemini API.
///
/// The `details` array carries provider-specific payloads such as
/// `google.rpc.RetryInfo`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ApiError {
    /// Numeric status code (e.g., 429).
    #[serde(default)]
    pub code: u16,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status string (e.g., "RESOURCE_EXHAUSTED").
    #[serde(default)]
    pub status: String,
    /// Structured error details.
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_error_display() {
        let err = GeminiError::Api {
            status_code: 429,
            error: ApiError {
                code: 429,
                message: "Resource has been exhausted (e.g. check quota).".to_string(),
                status: "RESOURCE_EXHAUSTED".to_string(),
                details: Vec::new(),
            },
        };
        assert_eq!(
            err.to_string(),
            "API error (RESOURCE_EXHAUSTED): Resource has been exhausted (e.g. check quota)."
        );
    }

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{
            "error": {
                "code": 429,
                "message": "Quota exceeded for quota metric 'GenerateContent requests'. Please retry in 21.5s.",
                "status": "RESOURCE_EXHAUSTED",
                "details": [
                    {
                        "@type": "type.googleapis.com/google.rpc.RetryInfo",
                        "retryDelay": "21s"
                    }
                ]
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.code, 429);
        assert_eq!(response.error.status, "RESOURCE_EXHAUSTED");
        assert_eq!(response.error.details.len(), 1);
    }

    #[test]
    fn test_api_error_tolerates_missing_fields() {
        let json = r#"{ "error": { "message": "boom" } }"#;
        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.code, 0);
        assert!(response.error.details.is_empty());
    }
}
