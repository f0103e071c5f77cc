//! Gemini API integration for the support chat agent.
//!
//! # Modules
//!
//! - `client` - REST client (sync and SSE streaming generation)
//! - `types` - Wire types for the Generative Language API
//! - `error` - Typed client errors
//! - `quota` - Quota-exceeded detection and retry-delay extraction
//! - `tools` - The six lookup tools and their executor

pub mod client;
pub mod error;
pub mod quota;
pub mod tools;
pub mod types;

pub use client::{GeminiClient, ResponseStream};
pub use error::{ApiError, ApiErrorResponse, GeminiError};
pub use quota::{QuotaExceeded, extract_retry_after_seconds, is_quota_error, map_quota_error};
pub use tools::{ToolExecutor, support_function_declarations, support_tools};
pub use types::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, SystemInstruction,
    Tool, UsageMetadata,
};
