use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use memchr::memchr;

use crate::core::builtin_providers::ProviderProfile;
use crate::core::message::Message;
use crate::core::wire::{
    build_request, extract_data_payload, Decoded, ExchangeError, RequestSettings, WireCodec,
};

#[derive(Debug)]
pub enum StreamEvent {
    TextDelta(String),
    Done,
    Failed(ExchangeError),
}

/// Incremental line decoder for a server-sent event body.
///
/// Bytes are buffered until a newline arrives; each complete line is trimmed
/// and, if it carries the data marker, handed to the codec. Lines that are
/// not valid UTF-8 are dropped.
pub struct SseDecoder<'c> {
    codec: &'c dyn WireCodec,
    buffer: Vec<u8>,
    finished: bool,
}

impl<'c> SseDecoder<'c> {
    pub fn new(codec: &'c dyn WireCodec) -> Self {
        Self {
            codec,
            buffer: Vec::new(),
            finished: false,
        }
    }

    /// Feed one chunk of body bytes. Returns `true` once the stream sentinel
    /// has been seen; [`StreamEvent::Done`] has then already been emitted and
    /// further input is ignored.
    pub fn feed(&mut self, chunk: &[u8], sink: &mut impl FnMut(StreamEvent)) -> bool {
        if self.finished {
            return true;
        }

        self.buffer.extend_from_slice(chunk);
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let reached_end = decode_line(self.codec, &self.buffer[..newline_pos], sink);
            self.buffer.drain(..=newline_pos);
            if reached_end {
                self.finished = true;
                sink(StreamEvent::Done);
                return true;
            }
        }
        false
    }

    /// Flush a trailing unterminated line and emit [`StreamEvent::Done`]
    /// unless the sentinel already did.
    pub fn finish(mut self, sink: &mut impl FnMut(StreamEvent)) {
        if self.finished {
            return;
        }
        if !self.buffer.is_empty() {
            let tail = std::mem::take(&mut self.buffer);
            decode_line(self.codec, &tail, sink);
        }
        self.finished = true;
        sink(StreamEvent::Done);
    }
}

fn decode_line(codec: &dyn WireCodec, line: &[u8], sink: &mut impl FnMut(StreamEvent)) -> bool {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line.trim(),
        Err(err) => {
            tracing::debug!("skipping stream line with invalid UTF-8: {err}");
            return false;
        }
    };

    let Some(payload) = extract_data_payload(line) else {
        return false;
    };

    match codec.decode_payload(payload) {
        Decoded::Text(text) => {
            sink(StreamEvent::TextDelta(text));
            false
        }
        Decoded::Skip => false,
        Decoded::Done => true,
    }
}

/// Decode a streamed body into events. Exactly one terminal event
/// ([`StreamEvent::Done`] or [`StreamEvent::Failed`]) is emitted last.
pub async fn decode_body<S, B>(codec: &dyn WireCodec, body: S, mut sink: impl FnMut(StreamEvent))
where
    S: Stream<Item = Result<B, reqwest::Error>>,
    B: AsRef<[u8]>,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = SseDecoder::new(codec);

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                if decoder.feed(bytes.as_ref(), &mut sink) {
                    return;
                }
            }
            Err(err) => {
                sink(StreamEvent::Failed(ExchangeError::Transport(err)));
                return;
            }
        }
    }

    decoder.finish(&mut sink);
}

/// Decode an HTTP response. A non-2xx status short-circuits into
/// [`ExchangeError::Protocol`] carrying the whole body.
pub async fn decode_response(
    codec: &dyn WireCodec,
    response: reqwest::Response,
    mut sink: impl FnMut(StreamEvent),
) {
    let status = response.status();
    if !status.is_success() {
        let event = match response.text().await {
            Ok(body) => StreamEvent::Failed(ExchangeError::Protocol {
                status: status.as_u16(),
                body,
            }),
            Err(err) => StreamEvent::Failed(ExchangeError::Transport(err)),
        };
        sink(event);
        return;
    }

    decode_body(codec, response.bytes_stream(), sink).await;
}

/// Everything needed to run one exchange, owned so it can move onto a worker
/// task.
#[derive(Clone)]
pub struct ExchangeRequest {
    pub profile: ProviderProfile,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl ExchangeRequest {
    pub fn settings(&self) -> RequestSettings<'_> {
        RequestSettings {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Run one exchange to completion, calling `on_delta` for every text
/// fragment in arrival order. Returns the concatenated text.
///
/// No request is issued when the API key is missing. Without a `timeout` a
/// stalled response blocks until the server closes the connection.
pub async fn send(
    client: &reqwest::Client,
    request: &ExchangeRequest,
    timeout: Option<Duration>,
    mut on_delta: impl FnMut(&str),
) -> Result<String, ExchangeError> {
    let wire = build_request(
        &request.profile,
        &request.settings(),
        request.api_key.as_deref(),
        &request.messages,
    )?;

    tracing::debug!(
        provider = %request.profile.id,
        model = %request.model,
        url = %wire.url,
        "starting exchange"
    );

    let mut builder = client.post(&wire.url).headers(wire.headers).json(&wire.body);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let response = builder.send().await.map_err(ExchangeError::Transport)?;

    let mut accumulated = String::new();
    let mut failure = None;
    decode_response(request.profile.codec(), response, |event| match event {
        StreamEvent::TextDelta(text) => {
            on_delta(&text);
            accumulated.push_str(&text);
        }
        StreamEvent::Done => {}
        StreamEvent::Failed(err) => {
            failure.get_or_insert(err);
        }
    })
    .await;

    match failure {
        Some(err) => {
            tracing::debug!(provider = %request.profile.id, "exchange failed: {err}");
            Err(err)
        }
        None => {
            tracing::debug!(
                provider = %request.profile.id,
                chars = accumulated.chars().count(),
                "exchange completed"
            );
            Ok(accumulated)
        }
    }
}

/// Seam between the event loop and the network.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn exchange(
        &self,
        request: ExchangeRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String, ExchangeError>;
}

/// The reqwest-backed [`ChatBackend`].
#[derive(Clone, Debug, Default)]
pub struct HttpBackend {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpBackend {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn exchange(
        &self,
        request: ExchangeRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<String, ExchangeError> {
        send(&self.client, &request, self.timeout, |text| on_delta(text)).await
    }
}
