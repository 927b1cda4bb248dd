use serde_json::Value;

use super::{Decoded, RequestSettings, WireCodec};
use crate::api::{
    GeminiContent, GeminiGenerationConfig, GeminiRequest, GeminiStreamResponse, GeminiTextPart,
};
use crate::core::builtin_providers::WireFormat;
use crate::core::message::{Message, Role};

/// Gemini `streamGenerateContent` shape. Gemini has no system role in
/// `contents`; system messages are sent as `model` turns.
pub struct GoogleCodec;

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::System => "model",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

impl WireCodec for GoogleCodec {
    fn format(&self) -> WireFormat {
        WireFormat::Google
    }

    fn body(
        &self,
        settings: &RequestSettings<'_>,
        messages: &[Message],
    ) -> Result<Value, serde_json::Error> {
        let request = GeminiRequest {
            contents: messages
                .iter()
                .map(|message| GeminiContent {
                    role: gemini_role(message.role),
                    parts: vec![GeminiTextPart {
                        text: &message.content,
                    }],
                })
                .collect(),
            generation_config: GeminiGenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_tokens,
            },
        };
        serde_json::to_value(&request)
    }

    fn decode_payload(&self, payload: &str) -> Decoded {
        match serde_json::from_str::<GeminiStreamResponse>(payload) {
            Ok(response) => response
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .and_then(|content| content.parts.into_iter().next())
                .map(|part| part.text)
                .filter(|text| !text.is_empty())
                .map_or(Decoded::Skip, Decoded::Text),
            Err(err) => {
                tracing::debug!("skipping malformed gemini frame: {err}");
                Decoded::Skip
            }
        }
    }
}
