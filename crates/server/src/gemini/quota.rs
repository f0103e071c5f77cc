//! Quota-exceeded detection and retry-delay extraction.
//!
//! The Gemini API reports quota exhaustion in several shapes: a plain 429
//! status, a `RESOURCE_EXHAUSTED` status string, quota wording buried in a
//! message, or a `google.rpc.RetryInfo` detail carrying a `retryDelay`.
//! Transport errors can also wrap the interesting message several causes
//! deep. This module walks all of them so callers get one answer: is this a
//! quota error, and how long should the client wait?

use std::sync::LazyLock;

use regex::Regex;

use super::error::{ApiError, ApiErrorResponse, GeminiError};

static QUOTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)quota exceeded|resource_exhausted|rate limit").expect("valid quota regex")
});

static RETRY_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)retry in\s+([0-9.]+)s").expect("valid retry regex"));

static DELAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)s").expect("valid delay regex"));

const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

/// A quota-exceeded condition mapped from a provider error.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaExceeded {
    /// User-facing message including a retry hint.
    pub message: String,
    /// Suggested wait before retrying, when the provider reported one.
    pub retry_after_seconds: Option<f64>,
}

impl std::fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QuotaExceeded {}

/// Map a Gemini error to a quota condition, if it is one.
#[must_use]
pub fn map_quota_error(error: &GeminiError) -> Option<QuotaExceeded> {
    if !is_quota_error(error) {
        return None;
    }

    let retry_after_seconds = extract_retry_after_seconds(error);
    let retry_hint = retry_after_seconds.map_or_else(
        || " Please retry in a moment.".to_string(),
        |seconds| format!(" Please retry in about {} seconds.", seconds.ceil() as u64),
    );

    Some(QuotaExceeded {
        message: format!("AI quota exceeded.{retry_hint}"),
        retry_after_seconds,
    })
}

/// Whether an error reports quota exhaustion anywhere in its structure.
#[must_use]
pub fn is_quota_error(error: &GeminiError) -> bool {
    match error {
        GeminiError::Api { status_code, error } => {
            *status_code == 429 || error.code == 429 || api_error_matches_quota(error)
        }
        GeminiError::ApiRaw { status_code, body } => {
            *status_code == 429
                || QUOTA_RE.is_match(body)
                || parse_embedded(body).is_some_and(|e| e.code == 429 || api_error_matches_quota(&e))
        }
        GeminiError::Http(e) => {
            e.status().is_some_and(|s| s.as_u16() == 429)
                || cause_chain_messages(e).iter().any(|m| QUOTA_RE.is_match(m))
        }
        other => QUOTA_RE.is_match(&other.to_string()),
    }
}

/// Extract the suggested retry delay in seconds, if the provider reported
/// one.
///
/// Messages are checked for `retry in <n>s` wording first; structured
/// `RetryInfo` details are consulted after.
#[must_use]
pub fn extract_retry_after_seconds(error: &GeminiError) -> Option<f64> {
    match error {
        GeminiError::Api { error, .. } => retry_from_api_error(error),
        GeminiError::ApiRaw { body, .. } => retry_from_message(body)
            .or_else(|| parse_embedded(body).as_ref().and_then(retry_from_api_error)),
        GeminiError::Http(e) => cause_chain_messages(e)
            .iter()
            .find_map(|m| retry_from_message(m)),
        other => retry_from_message(&other.to_string()),
    }
}

fn api_error_matches_quota(error: &ApiError) -> bool {
    QUOTA_RE.is_match(&error.status)
        || QUOTA_RE.is_match(&error.message)
        || error
            .details
            .iter()
            .any(|detail| QUOTA_RE.is_match(&detail.to_string()))
}

fn retry_from_api_error(error: &ApiError) -> Option<f64> {
    retry_from_message(&error.message).or_else(|| retry_from_details(&error.details))
}

fn retry_from_message(message: &str) -> Option<f64> {
    let captures = RETRY_IN_RE.captures(message)?;
    parse_seconds(captures.get(1)?.as_str())
}

fn retry_from_details(details: &[serde_json::Value]) -> Option<f64> {
    let retry_info = details
        .iter()
        .find(|detail| detail.get("@type").and_then(|t| t.as_str()) == Some(RETRY_INFO_TYPE))?;

    let delay = retry_info.get("retryDelay")?.as_str()?;
    let captures = DELAY_RE.captures(delay)?;
    parse_seconds(captures.get(1)?.as_str())
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An error body sometimes arrives unparsed; try to recover the structure.
fn parse_embedded(body: &str) -> Option<ApiError> {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .map(|r| r.error)
}

/// Collect display messages along an error's cause chain.
fn cause_chain_messages(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        messages.push(cause.to_string());
        current = cause.source();
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status_code: u16, error: ApiError) -> GeminiError {
        GeminiError::Api { status_code, error }
    }

    #[test]
    fn test_detects_429_status_code() {
        let err = api_error(429, ApiError::default());
        assert!(is_quota_error(&err));
    }

    #[test]
    fn test_detects_resource_exhausted_status() {
        let err = api_error(
            400,
            ApiError {
                status: "RESOURCE_EXHAUSTED".to_string(),
                ..ApiError::default()
            },
        );
        assert!(is_quota_error(&err));
    }

    #[test]
    fn test_detects_quota_wording_in_message() {
        let err = api_error(
            500,
            ApiError {
                message: "Quota exceeded for quota metric 'GenerateContent requests'".to_string(),
                ..ApiError::default()
            },
        );
        assert!(is_quota_error(&err));
    }

    #[test]
    fn test_detects_rate_limit_wording_case_insensitive() {
        let err = GeminiError::Stream("upstream said: Rate Limit hit".to_string());
        assert!(is_quota_error(&err));
    }

    #[test]
    fn test_ignores_unrelated_errors() {
        let err = api_error(
            400,
            ApiError {
                status: "INVALID_ARGUMENT".to_string(),
                message: "contents must not be empty".to_string(),
                ..ApiError::default()
            },
        );
        assert!(!is_quota_error(&err));
        assert!(map_quota_error(&err).is_none());
    }

    #[test]
    fn test_extracts_retry_from_message() {
        let err = api_error(
            429,
            ApiError {
                message: "Please retry in 21.5s.".to_string(),
                ..ApiError::default()
            },
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(21.5));
    }

    #[test]
    fn test_extracts_retry_from_retry_info_detail() {
        let err = api_error(
            429,
            ApiError {
                status: "RESOURCE_EXHAUSTED".to_string(),
                details: vec![serde_json::json!({
                    "@type": "type.googleapis.com/google.rpc.RetryInfo",
                    "retryDelay": "7s"
                })],
                ..ApiError::default()
            },
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(7.0));
    }

    #[test]
    fn test_message_wins_over_detail() {
        let err = api_error(
            429,
            ApiError {
                message: "retry in 3s".to_string(),
                details: vec![serde_json::json!({
                    "@type": "type.googleapis.com/google.rpc.RetryInfo",
                    "retryDelay": "30s"
                })],
                ..ApiError::default()
            },
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(3.0));
    }

    #[test]
    fn test_ignores_foreign_details() {
        let err = api_error(
            429,
            ApiError {
                details: vec![serde_json::json!({
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "RATE_LIMIT_EXCEEDED"
                })],
                ..ApiError::default()
            },
        );
        assert_eq!(extract_retry_after_seconds(&err), None);
    }

    #[test]
    fn test_recovers_structure_from_raw_body() {
        let body = r#"{
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED",
                "details": [
                    { "@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "12s" }
                ]
            }
        }"#;
        let err = GeminiError::ApiRaw {
            status_code: 500,
            body: body.to_string(),
        };

        assert!(is_quota_error(&err));
        assert_eq!(extract_retry_after_seconds(&err), Some(12.0));
    }

    #[test]
    fn test_map_quota_error_rounds_up_hint() {
        let err = api_error(
            429,
            ApiError {
                message: "retry in 21.5s".to_string(),
                ..ApiError::default()
            },
        );

        let quota = map_quota_error(&err).expect("quota error");
        assert_eq!(quota.retry_after_seconds, Some(21.5));
        assert_eq!(
            quota.message,
            "AI quota exceeded. Please retry in about 22 seconds."
        );
    }

    #[test]
    fn test_map_quota_error_without_delay() {
        let err = api_error(429, ApiError::default());

        let quota = map_quota_error(&err).expect("quota error");
        assert_eq!(quota.retry_after_seconds, None);
        assert_eq!(quota.message, "AI quota exceeded. Please retry in a moment.");
    }

    #[test]
    fn test_malformed_delay_is_ignored() {
        let err = api_error(
            429,
            ApiError {
                details: vec![serde_json::json!({
                    "@type": "type.googleapis.com/google.rpc.RetryInfo",
                    "retryDelay": "soon"
                })],
                ..ApiError::default()
            },
        );

        let quota = map_quota_error(&err).expect("quota error");
        assert_eq!(quota.retry_after_seconds, None);
    }
}
