use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::{Decoded, RequestSettings, WireCodec};
use crate::api::{AnthropicRequest, AnthropicStreamFrame, ChatMessage};
use crate::core::builtin_providers::WireFormat;
use crate::core::message::{Message, Role};

pub(super) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API shape. The system prompt travels in a top-level field, and
/// the stream has no sentinel: it ends when the connection closes.
pub struct AnthropicCodec;

impl WireCodec for AnthropicCodec {
    fn format(&self) -> WireFormat {
        WireFormat::Anthropic
    }

    fn body(
        &self,
        settings: &RequestSettings<'_>,
        messages: &[Message],
    ) -> Result<Value, serde_json::Error> {
        // When several system messages are present the last one wins.
        let system = messages
            .iter()
            .filter(|message| message.role == Role::System)
            .map(|message| message.content.as_str())
            .last()
            .filter(|content| !content.is_empty());

        let request = AnthropicRequest {
            model: settings.model,
            messages: messages
                .iter()
                .filter(|message| message.role != Role::System)
                .map(|message| ChatMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
            stream: true,
            max_tokens: settings.max_tokens,
            system,
        };
        serde_json::to_value(&request)
    }

    fn shape_headers(&self, headers: &mut HeaderMap) {
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
    }

    fn decode_payload(&self, payload: &str) -> Decoded {
        match serde_json::from_str::<AnthropicStreamFrame>(payload) {
            Ok(frame) => frame
                .delta
                .and_then(|delta| delta.text)
                .filter(|text| !text.is_empty())
                .map_or(Decoded::Skip, Decoded::Text),
            Err(err) => {
                tracing::debug!("skipping malformed anthropic frame: {err}");
                Decoded::Skip
            }
        }
    }
}
