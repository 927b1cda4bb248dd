use serde_json::Value;

use super::{Decoded, RequestSettings, WireCodec};
use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::builtin_providers::WireFormat;
use crate::core::message::Message;

/// End-of-stream sentinel sent by OpenAI-compatible servers.
pub(super) const DONE_SENTINEL: &str = "[DONE]";

/// Chat-completions shape shared by OpenAI, OpenRouter and NVIDIA.
pub struct OpenAiCodec;

impl WireCodec for OpenAiCodec {
    fn format(&self) -> WireFormat {
        WireFormat::OpenAi
    }

    fn body(
        &self,
        settings: &RequestSettings<'_>,
        messages: &[Message],
    ) -> Result<Value, serde_json::Error> {
        let request = ChatRequest {
            model: settings.model,
            messages: messages
                .iter()
                .map(|message| ChatMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
            stream: true,
            temperature: settings.temperature,
        };
        serde_json::to_value(&request)
    }

    fn decode_payload(&self, payload: &str) -> Decoded {
        if payload == DONE_SENTINEL {
            return Decoded::Done;
        }

        match serde_json::from_str::<ChatResponse>(payload) {
            Ok(response) => response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty())
                .map_or(Decoded::Skip, Decoded::Text),
            Err(err) => {
                tracing::debug!("skipping malformed chat completion frame: {err}");
                Decoded::Skip
            }
        }
    }
}
