//! Router agent orchestration.
//!
//! Dispatches a conversation to Gemini with the support tools, executes
//! requested lookups, and loops until the model answers in text or the step
//! budget is spent. Provider errors pass through the quota classifier before
//! they surface.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{instrument, warn};

use helpdesk_core::ChatRole;

use crate::db::DbPool;
use crate::gemini::{
    Content, FunctionCall, GeminiClient, GeminiError, Part, QuotaExceeded, ToolExecutor,
    UsageMetadata, map_quota_error, support_tools,
};
use crate::models::ChatMessage;

/// System prompt for the router agent.
pub const ROUTER_SYSTEM_PROMPT: &str = "You are a Router Agent. Analyze the user's query. \
    If it's about orders, use the Order Tools. If it's about billing, use the Billing Tools. \
    If it's about FAQs or past conversations, use the Support Tools. If generic, answer directly. \
    Respond in plain text only\u{2014}no Markdown, no bullet points, no asterisks. \
    If you list multiple fields, use short sentences separated by commas.";

/// Maximum model calls per request.
///
/// Each tool round costs one extra call, so this caps a request at two tool
/// rounds plus the final answer.
const MAX_MODEL_STEPS: usize = 3;

/// Only the most recent messages are forwarded to the model.
const HISTORY_WINDOW: usize = 10;

/// Errors that can occur while running the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The provider reported quota exhaustion.
    #[error("{0}")]
    QuotaExceeded(QuotaExceeded),

    /// Any other provider failure.
    #[error("Gemini API error: {0}")]
    Gemini(GeminiError),
}

impl From<GeminiError> for AgentError {
    fn from(error: GeminiError) -> Self {
        match map_quota_error(&error) {
            Some(quota) => Self::QuotaExceeded(quota),
            None => Self::Gemini(error),
        }
    }
}

/// Accumulated token usage across all model steps of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens.
    pub prompt_tokens: u32,
    /// Generated tokens.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

impl TokenUsage {
    fn accumulate(&mut self, usage: Option<UsageMetadata>) {
        if let Some(u) = usage {
            self.prompt_tokens += u.prompt_token_count;
            self.completion_tokens += u.candidates_token_count;
            self.total_tokens += u.total_token_count;
        }
    }
}

/// Result of a synchronous agent run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutcome {
    /// Final answer text.
    pub text: String,
    /// Why generation finished (e.g., "stop", "tool-calls").
    pub finish_reason: String,
    /// Token usage across all steps.
    pub usage: TokenUsage,
}

/// The router agent.
///
/// Owns cheaply cloneable handles so streaming runs can move into a
/// `'static` response body.
pub struct RouterAgent {
    gemini: GeminiClient,
    pool: DbPool,
}

impl RouterAgent {
    /// Create a new router agent.
    #[must_use]
    pub const fn new(gemini: GeminiClient, pool: DbPool) -> Self {
        Self { gemini, pool }
    }

    /// Run the agent to completion and return the final answer.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::QuotaExceeded` for quota conditions, or
    /// `AgentError::Gemini` for any other provider failure.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn run_sync(&self, messages: &[ChatMessage]) -> Result<AgentOutcome, AgentError> {
        let (mut contents, system) = build_contents(messages);
        let tools = support_tools();
        let executor = ToolExecutor::new(&self.pool);

        let mut usage = TokenUsage::default();
        let mut text = String::new();

        for step in 1..=MAX_MODEL_STEPS {
            let response = self
                .gemini
                .generate(contents.clone(), Some(system.clone()), Some(tools.clone()))
                .await?;

            usage.accumulate(response.usage_metadata);

            let parts = response.parts().to_vec();
            let calls = function_calls(&parts);

            for part in &parts {
                if let Part::Text { text: chunk } = part {
                    text.push_str(chunk);
                }
            }

            if calls.is_empty() {
                let finish_reason = response
                    .finish_reason()
                    .map_or_else(|| "stop".to_string(), str::to_lowercase);
                return Ok(AgentOutcome {
                    text,
                    finish_reason,
                    usage,
                });
            }

            if step == MAX_MODEL_STEPS {
                warn!(step, "tool-call budget exhausted");
                return Ok(AgentOutcome {
                    text,
                    finish_reason: "tool-calls".to_string(),
                    usage,
                });
            }

            contents.push(Content::model(parts));
            execute_calls(&executor, &calls, &mut contents).await;
        }

        // The loop always returns; the budget check above is the last exit.
        unreachable!("agent loop exited without a terminal step")
    }

    /// Run the agent and stream answer text as it is generated.
    ///
    /// The first model request is issued before this returns, so quota
    /// conditions surface as an error instead of a broken body. Later
    /// failures arrive as stream items.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::QuotaExceeded` for quota conditions on the
    /// opening request, or `AgentError::Gemini` for other failures.
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn run_stream(
        self,
        messages: Vec<ChatMessage>,
    ) -> Result<impl Stream<Item = Result<String, AgentError>> + Send, AgentError> {
        let (mut contents, system) = build_contents(&messages);
        let tools = support_tools();

        let first = self
            .gemini
            .generate_stream(contents.clone(), Some(system.clone()), Some(tools.clone()))
            .await?;

        Ok(stream! {
            let executor = ToolExecutor::new(&self.pool);
            let mut pending = first;

            for step in 1..=MAX_MODEL_STEPS {
                let mut model_parts: Vec<Part> = Vec::new();

                while let Some(chunk) = pending.next().await {
                    match chunk {
                        Ok(response) => {
                            for part in response.parts() {
                                match part {
                                    Part::Text { text } => {
                                        model_parts.push(part.clone());
                                        yield Ok(text.clone());
                                    }
                                    Part::FunctionCall { .. } => {
                                        model_parts.push(part.clone());
                                    }
                                    Part::FunctionResponse { .. } => {}
                                }
                            }
                        }
                        Err(e) => {
                            yield Err(AgentError::from(e));
                            return;
                        }
                    }
                }

                let calls = function_calls(&model_parts);
                if calls.is_empty() {
                    return;
                }
                if step == MAX_MODEL_STEPS {
                    warn!(step, "tool-call budget exhausted");
                    return;
                }

                contents.push(Content::model(model_parts));
                execute_calls(&executor, &calls, &mut contents).await;

                match self
                    .gemini
                    .generate_stream(contents.clone(), Some(system.clone()), Some(tools.clone()))
                    .await
                {
                    Ok(next) => pending = next,
                    Err(e) => {
                        yield Err(AgentError::from(e));
                        return;
                    }
                }
            }
        })
    }
}

/// Execute each requested call and append its function response.
///
/// Tool failures are reported back to the model rather than aborting the
/// run, so it can apologize or try another tool.
async fn execute_calls(
    executor: &ToolExecutor<'_>,
    calls: &[FunctionCall],
    contents: &mut Vec<Content>,
) {
    for call in calls {
        let response = match executor.execute(&call.name, &call.args).await {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        contents.push(Content::function_response(call.name.clone(), response));
    }
}

fn function_calls(parts: &[Part]) -> Vec<FunctionCall> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionCall { function_call } => Some(function_call.clone()),
            _ => None,
        })
        .collect()
}

/// Convert API messages to Gemini contents.
///
/// Only the last [`HISTORY_WINDOW`] messages are kept. Gemini has no system
/// role in `contents`, so system messages are folded into the system
/// instruction.
fn build_contents(messages: &[ChatMessage]) -> (Vec<Content>, String) {
    let skip = messages.len().saturating_sub(HISTORY_WINDOW);

    let mut system = ROUTER_SYSTEM_PROMPT.to_string();
    let mut contents = Vec::new();

    for message in messages.iter().skip(skip) {
        match message.role {
            ChatRole::System => {
                system.push_str("\n\n");
                system.push_str(&message.content);
            }
            ChatRole::User => contents.push(Content::user(message.content.clone())),
            ChatRole::Assistant => contents.push(Content::model(vec![Part::Text {
                text: message.content.clone(),
            }])),
        }
    }

    (contents, system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::ApiError;

    fn message(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_build_contents_maps_roles() {
        let messages = vec![
            message(ChatRole::User, "Where is ORD-1001?"),
            message(ChatRole::Assistant, "Let me check."),
        ];

        let (contents, system) = build_contents(&messages);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert!(system.starts_with("You are a Router Agent."));
    }

    #[test]
    fn test_build_contents_folds_system_messages() {
        let messages = vec![
            message(ChatRole::System, "Answer in French."),
            message(ChatRole::User, "Bonjour"),
        ];

        let (contents, system) = build_contents(&messages);
        assert_eq!(contents.len(), 1);
        assert!(system.ends_with("Answer in French."));
    }

    #[test]
    fn test_build_contents_keeps_last_ten_messages() {
        let messages: Vec<ChatMessage> = (0..25)
            .map(|i| message(ChatRole::User, &format!("message {i}")))
            .collect();

        let (contents, _) = build_contents(&messages);
        assert_eq!(contents.len(), 10);

        match &contents[0].parts[0] {
            Part::Text { text } => assert_eq!(text, "message 15"),
            other => panic!("expected text part, got {other:?}"),
        }
    }

    #[test]
    fn test_token_usage_accumulates() {
        let mut usage = TokenUsage::default();
        usage.accumulate(Some(UsageMetadata {
            prompt_token_count: 10,
            candidates_token_count: 5,
            total_token_count: 15,
        }));
        usage.accumulate(None);
        usage.accumulate(Some(UsageMetadata {
            prompt_token_count: 20,
            candidates_token_count: 2,
            total_token_count: 22,
        }));

        assert_eq!(usage.prompt_tokens, 30);
        assert_eq!(usage.completion_tokens, 7);
        assert_eq!(usage.total_tokens, 37);
    }

    #[test]
    fn test_token_usage_serializes_camel_case() {
        let usage = TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };

        let json = serde_json::to_string(&usage).expect("serialize");
        assert_eq!(
            json,
            r#"{"promptTokens":1,"completionTokens":2,"totalTokens":3}"#
        );
    }

    #[test]
    fn test_quota_errors_are_classified() {
        let gemini_error = GeminiError::Api {
            status_code: 429,
            error: ApiError {
                status: "RESOURCE_EXHAUSTED".to_string(),
                message: "Please retry in 7s.".to_string(),
                ..ApiError::default()
            },
        };

        match AgentError::from(gemini_error) {
            AgentError::QuotaExceeded(quota) => {
                assert_eq!(quota.retry_after_seconds, Some(7.0));
            }
            other => panic!("expected quota error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_pass_through() {
        let gemini_error = GeminiError::Parse("bad json".to_string());
        assert!(matches!(
            AgentError::from(gemini_error),
            AgentError::Gemini(_)
        ));
    }
}
