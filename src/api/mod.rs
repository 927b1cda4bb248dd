//! Request and response payloads for the provider APIs.
//!
//! Request types borrow from the provider-agnostic [`Message`] list so that
//! building a body never clones the conversation. Response types only model
//! the fields the streaming decoders read; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::core::message::Role;

// OpenAI-compatible chat completions (OpenAI, OpenRouter, NVIDIA).

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    pub temperature: f64,
}

#[derive(Deserialize, Default)]
pub struct ChatResponseDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    #[serde(default)]
    pub delta: ChatResponseDelta,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatResponseChoice>,
}

// Anthropic messages API.

#[derive(Serialize)]
pub struct AnthropicRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
}

#[derive(Deserialize)]
pub struct AnthropicDelta {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct AnthropicStreamFrame {
    pub delta: Option<AnthropicDelta>,
}

// Google Gemini streamGenerateContent.

#[derive(Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct GeminiContent<'a> {
    pub role: &'static str,
    pub parts: Vec<GeminiTextPart<'a>>,
}

#[derive(Serialize)]
pub struct GeminiTextPart<'a> {
    pub text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest<'a> {
    pub contents: Vec<GeminiContent<'a>>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Deserialize)]
pub struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
pub struct GeminiStreamResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}
