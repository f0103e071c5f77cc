//! Types for the Gemini API.
//!
//! These types match the Generative Language REST API format (camelCase JSON)
//! for content generation with function calling.

use serde::{Deserialize, Serialize};

/// A content entry in a conversation with Gemini.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// The role of the content producer ("user" or "model").
    pub role: String,
    /// The content parts.
    pub parts: Vec<Part>,
}

impl Content {
    /// User text content.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Model content with arbitrary parts (text and/or function calls).
    #[must_use]
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: "model".to_string(),
            parts,
        }
    }

    /// A function response, sent back with the user role.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::FunctionResponse {
                function_response: FunctionResponse {
                    name: name.into(),
                    response,
                },
            }],
        }
    }
}

/// A part within a content entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Function call requested by the model.
    FunctionCall {
        /// The requested call.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// Result of a function invocation.
    FunctionResponse {
        /// The function result.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
}

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call.
    pub name: String,
    /// Arguments as a JSON object.
    #[serde(default)]
    pub args: serde_json::Value,
}

/// The result of a function invocation, fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Name of the function that was called.
    pub name: String,
    /// Result as a JSON object.
    pub response: serde_json::Value,
}

/// A function declaration the model may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function.
    pub name: String,
    /// Description of what the function does.
    pub description: String,
    /// JSON Schema for the function's parameters.
    pub parameters: serde_json::Value,
}

/// A tool made available to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Function declarations in this tool.
    #[serde(rename = "functionDeclarations")]
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Generation parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Request body for `generateContent` and `streamGenerateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents.
    pub contents: Vec<Content>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Available tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Generation parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// System instruction wrapper (role-less content).
#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    /// Instruction parts.
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    /// A plain-text system instruction.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// Response from `generateContent`; streaming emits a sequence of these.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates (at most one is requested).
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage information.
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, if any.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map_or(&[], |content| content.parts.as_slice())
    }

    /// Finish reason of the first candidate, if reported.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// A response candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    pub content: Option<CandidateContent>,
    /// Reason generation stopped (e.g., "STOP", "MAX_TOKENS").
    pub finish_reason: Option<String>,
}

/// Content of a response candidate.
///
/// Streaming chunks may omit `parts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Role (always "model").
    #[serde(default)]
    pub role: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of prompt tokens.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Number of generated tokens.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total token count.
    #[serde(default)]
    pub total_token_count: u32,
}
