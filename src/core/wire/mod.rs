//! Per-provider request construction and stream-frame decoding.
//!
//! Each [`WireFormat`] has one [`WireCodec`] implementation. The codec for a
//! session is chosen once from its [`ProviderProfile`]; callers never branch
//! on the provider themselves.

mod anthropic;
mod error;
mod google;
mod openai;

pub use error::ExchangeError;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::core::builtin_providers::{AuthScheme, ProviderProfile, WireFormat};
use crate::core::message::Message;

/// Marker that prefixes every payload line of a server-sent event stream.
pub const DATA_PREFIX: &str = "data:";

/// Sampling settings shared by every request shape.
#[derive(Debug, Clone, Copy)]
pub struct RequestSettings<'a> {
    pub model: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A fully built HTTP request, ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Outcome of decoding one `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Text(String),
    Skip,
    Done,
}

pub trait WireCodec: Send + Sync {
    fn format(&self) -> WireFormat;

    /// Build the JSON body for the provider.
    fn body(
        &self,
        settings: &RequestSettings<'_>,
        messages: &[Message],
    ) -> Result<Value, serde_json::Error>;

    /// Add headers that belong to the request shape rather than the profile.
    fn shape_headers(&self, _headers: &mut HeaderMap) {}

    /// Decode one `data:` payload. Malformed JSON yields [`Decoded::Skip`].
    fn decode_payload(&self, payload: &str) -> Decoded;
}

static OPENAI: openai::OpenAiCodec = openai::OpenAiCodec;
static ANTHROPIC: anthropic::AnthropicCodec = anthropic::AnthropicCodec;
static GOOGLE: google::GoogleCodec = google::GoogleCodec;

pub fn codec_for(format: WireFormat) -> &'static dyn WireCodec {
    match format {
        WireFormat::OpenAi => &OPENAI,
        WireFormat::Anthropic => &ANTHROPIC,
        WireFormat::Google => &GOOGLE,
    }
}

/// Build the URL, headers and body for one exchange.
///
/// Fails with [`ExchangeError::MissingApiKey`] before anything else when the
/// key is absent or blank, so no request is ever issued without credentials.
pub fn build_request(
    profile: &ProviderProfile,
    settings: &RequestSettings<'_>,
    api_key: Option<&str>,
    messages: &[Message],
) -> Result<WireRequest, ExchangeError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ExchangeError::MissingApiKey {
            provider: profile.id.clone(),
        })?;

    let codec = profile.codec();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    add_auth_header(&mut headers, profile, api_key)?;
    for (name, value) in &profile.extra_headers {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            tracing::warn!(provider = %profile.id, header = %name, "skipping invalid profile header");
            continue;
        };
        headers.insert(name, value);
    }
    codec.shape_headers(&mut headers);

    let body = codec.body(settings, messages).map_err(ExchangeError::Encode)?;

    Ok(WireRequest {
        url: profile.endpoint_for(settings.model),
        headers,
        body,
    })
}

fn add_auth_header(
    headers: &mut HeaderMap,
    profile: &ProviderProfile,
    api_key: &str,
) -> Result<(), ExchangeError> {
    let invalid = || ExchangeError::InvalidApiKey {
        provider: profile.id.clone(),
    };

    match profile.auth {
        AuthScheme::Bearer => {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| invalid())?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        AuthScheme::ApiKeyHeader => {
            let mut value = HeaderValue::from_str(api_key).map_err(|_| invalid())?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }
    }
    Ok(())
}

/// Strip the data marker from an SSE line, returning the payload.
pub fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(str::trim_start)
}

#[cfg(test)]
mod tests;
