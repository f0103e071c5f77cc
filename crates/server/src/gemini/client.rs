//! Gemini API client for chat generation.
//!
//! Provides both streaming and non-streaming access to the Generative
//! Language API.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GeminiConfig;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, SystemInstruction,
    Tool,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Boxed stream of partial responses from `streamGenerateContent`.
pub type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, GeminiError>> + Send>>;

/// Gemini API client.
///
/// Provides methods to generate content with optional function calling,
/// synchronously or as a server-sent-event stream.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GeminiClientInner {
                client,
                base_url: GEMINI_API_BASE.to_string(),
                model: config.model.clone(),
            }),
        }
    }

    /// Model ID this client targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    fn build_request(
        contents: Vec<Content>,
        system: Option<String>,
        tools: Option<Vec<Tool>>,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents,
            system_instruction: system.map(SystemInstruction::text),
            tools,
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            }),
        }
    }

    /// Send a generation request and get a complete response.
    ///
    /// This is the non-streaming API, suitable for tool use loops where the
    /// complete response is needed before continuing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports an error.
    #[instrument(skip(self, contents, system, tools), fields(model = %self.inner.model))]
    pub async fn generate(
        &self,
        contents: Vec<Content>,
        system: Option<String>,
        tools: Option<Vec<Tool>>,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let request = Self::build_request(contents, system, tools);
        let url = format!(
            "{}/models/{}:generateContent",
            self.inner.base_url, self.inner.model
        );

        let response = self
            .inner
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Send a generation request and get a streaming response.
    ///
    /// Returns a stream of partial responses for real-time display.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial request fails; mid-stream failures
    /// surface as stream items.
    #[instrument(skip(self, contents, system, tools), fields(model = %self.inner.model))]
    pub async fn generate_stream(
        &self,
        contents: Vec<Content>,
        system: Option<String>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ResponseStream, GeminiError> {
        let request = Self::build_request(contents, system, tools);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.inner.base_url, self.inner.model
        );

        let response = self
            .inner
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        // Check for error responses before streaming
        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        // Return a stream that parses SSE events
        Ok(Box::pin(stream! {
            use futures::StreamExt;

            let mut buffer = String::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let text = match std::str::from_utf8(&chunk) {
                            Ok(t) => t,
                            Err(e) => {
                                yield Err(GeminiError::Parse(format!("Invalid UTF-8: {e}")));
                                continue;
                            }
                        };

                        buffer.push_str(text);

                        // Process complete SSE events
                        while let Some(event) = extract_sse_event(&mut buffer) {
                            if let Some(parsed) = parse_sse_event(&event) {
                                match parsed {
                                    Ok(response) => yield Ok(response),
                                    Err(e) => yield Err(e),
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(GeminiError::Stream(e.to_string()));
                    }
                }
            }
        }))
    }

    /// Handle a response, successful or not.
    async fn handle_response(
        response: reqwest::Response,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(Self::handle_error_status(status, response).await)
        }
    }

    /// Map an error status code to a typed error.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GeminiError {
        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    GeminiError::Api {
                        status_code: status.as_u16(),
                        error: api_error.error,
                    }
                } else {
                    GeminiError::ApiRaw {
                        status_code: status.as_u16(),
                        body,
                    }
                }
            }
            Err(e) => GeminiError::Http(e),
        }
    }
}

/// Extract a complete SSE event from the buffer.
///
/// Returns `Some(event)` if a complete event was found (and removes it from
/// the buffer), or `None` if no complete event is available yet.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    // SSE events are separated by double newlines
    buffer.find("\n\n").map(|idx| {
        let event = buffer[..idx].to_string();
        *buffer = buffer[idx + 2..].to_string();
        event
    })
}

/// Parse an SSE event string into a `GenerateContentResponse`.
fn parse_sse_event(event: &str) -> Option<Result<GenerateContentResponse, GeminiError>> {
    // Skip empty events
    if event.trim().is_empty() {
        return None;
    }

    // Parse SSE format: "data: <json>" (the API sends no event names)
    let mut data_line = None;

    for line in event.lines() {
        if let Some(stripped) = line.strip_prefix("data: ") {
            data_line = Some(stripped);
        }
    }

    let data = data_line?;

    // Handle [DONE] marker (not sent by Gemini but handle it anyway)
    if data == "[DONE]" {
        return None;
    }

    // Parse the JSON data
    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(response) => Some(Ok(response)),
        Err(e) => Some(Err(GeminiError::Parse(format!(
            "Failed to parse stream event: {e}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sse_event() {
        let mut buffer =
            "data: {\"candidates\":[]}\n\ndata: {\"candidates\":[]}\n\n".to_string();

        let event1 = extract_sse_event(&mut buffer);
        assert!(event1.is_some());
        assert!(event1.expect("no event").contains("candidates"));

        let event2 = extract_sse_event(&mut buffer);
        assert!(event2.is_some());

        let event3 = extract_sse_event(&mut buffer);
        assert!(event3.is_none());
    }

    #[test]
    fn test_extract_sse_event_incomplete() {
        let mut buffer = "data: {\"partial".to_string();
        let event = extract_sse_event(&mut buffer);
        assert!(event.is_none());
        assert_eq!(buffer, "data: {\"partial");
    }

    #[test]
    fn test_parse_sse_event_text_chunk() {
        let event = "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hi\"}]}}]}";
        let result = parse_sse_event(event).expect("parsed").expect("no error");
        assert_eq!(result.parts().len(), 1);
    }

    #[test]
    fn test_parse_sse_event_empty() {
        assert!(parse_sse_event("").is_none());
    }

    #[test]
    fn test_parse_sse_event_done_marker() {
        assert!(parse_sse_event("data: [DONE]").is_none());
    }

    #[test]
    fn test_gemini_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GeminiClient>();
    }

    #[test]
    fn test_gemini_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
