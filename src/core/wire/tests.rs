use super::*;
use crate::core::builtin_providers::find_builtin_provider;
use serde_json::json;

fn settings(model: &str) -> RequestSettings<'_> {
    RequestSettings {
        model,
        temperature: 0.7,
        max_tokens: 4096,
    }
}

fn system_and_user() -> Vec<Message> {
    vec![
        Message::system("You are Nexly."),
        Message::user("Explain lifetimes"),
    ]
}

fn header<'a>(request: &'a WireRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
}

fn build(provider: &str, model: &str) -> WireRequest {
    let profile = find_builtin_provider(provider).expect("provider exists");
    build_request(profile, &settings(model), Some("secret"), &system_and_user())
        .expect("request builds")
}

#[test]
fn openai_request_keeps_system_message_inline() {
    let request = build("openai", "gpt-4o");

    assert_eq!(request.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(header(&request, "authorization"), Some("Bearer secret"));
    assert_eq!(header(&request, "content-type"), Some("application/json"));
    assert!(request.headers.get("x-api-key").is_none());
    assert!(request.headers.get("http-referer").is_none());

    assert_eq!(
        request.body,
        json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "You are Nexly."},
                {"role": "user", "content": "Explain lifetimes"}
            ],
            "stream": true,
            "temperature": 0.7
        })
    );
}

#[test]
fn openrouter_request_adds_identification_headers() {
    let request = build("openrouter", "openai/gpt-4o");

    assert_eq!(request.url, "https://openrouter.ai/api/v1/chat/completions");
    assert_eq!(header(&request, "authorization"), Some("Bearer secret"));
    assert_eq!(
        header(&request, "http-referer"),
        Some("https://nexlycode.vercel.app")
    );
    assert_eq!(header(&request, "x-title"), Some("Nexly"));
    assert_eq!(request.body["messages"][0]["role"], "system");
}

#[test]
fn nvidia_request_is_openai_shaped() {
    let request = build("nvidia", "nvidia/llama-3.1-nemotron-70b-instruct");

    assert_eq!(
        request.url,
        "https://integrate.api.nvidia.com/v1/chat/completions"
    );
    assert_eq!(header(&request, "authorization"), Some("Bearer secret"));
    assert!(request.headers.get("x-title").is_none());
    assert_eq!(request.body["stream"], true);
    assert_eq!(request.body["messages"][0]["content"], "You are Nexly.");
}

#[test]
fn anthropic_request_lifts_system_prompt() {
    let request = build("anthropic", "claude-3-5-sonnet-20241022");

    assert_eq!(request.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(header(&request, "x-api-key"), Some("secret"));
    assert_eq!(header(&request, "anthropic-version"), Some("2023-06-01"));
    assert!(request.headers.get("authorization").is_none());

    assert_eq!(
        request.body,
        json!({
            "model": "claude-3-5-sonnet-20241022",
            "messages": [
                {"role": "user", "content": "Explain lifetimes"}
            ],
            "stream": true,
            "max_tokens": 4096,
            "system": "You are Nexly."
        })
    );
}

#[test]
fn anthropic_request_omits_system_when_absent() {
    let profile = find_builtin_provider("anthropic").expect("anthropic exists");
    let request = build_request(
        profile,
        &settings("claude-3-opus-20240229"),
        Some("secret"),
        &[Message::user("hi")],
    )
    .expect("request builds");

    assert!(request.body.get("system").is_none());
    assert_eq!(request.body["messages"].as_array().map(Vec::len), Some(1));
}

#[test]
fn google_request_maps_system_to_model_role() {
    let request = build("google", "gemini-1.5-pro");

    assert_eq!(
        request.url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:streamGenerateContent?alt=sse"
    );
    assert_eq!(header(&request, "authorization"), Some("Bearer secret"));

    assert_eq!(
        request.body,
        json!({
            "contents": [
                {"role": "model", "parts": [{"text": "You are Nexly."}]},
                {"role": "user", "parts": [{"text": "Explain lifetimes"}]}
            ],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 4096
            }
        })
    );
}

#[test]
fn missing_api_key_fails_before_building() {
    let profile = find_builtin_provider("openai").expect("openai exists");

    for key in [None, Some(""), Some("   ")] {
        let err = build_request(profile, &settings("gpt-4"), key, &system_and_user())
            .expect_err("missing key must fail");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "API key not set for provider: openai");
    }
}

#[test]
fn api_key_with_control_characters_is_rejected() {
    let profile = find_builtin_provider("anthropic").expect("anthropic exists");
    let err = build_request(profile, &settings("m"), Some("bad\nkey"), &system_and_user())
        .expect_err("newline cannot be sent in a header");
    assert!(matches!(err, ExchangeError::InvalidApiKey { .. }));
}

#[test]
fn auth_headers_are_marked_sensitive() {
    let request = build("openai", "gpt-4");
    let value = request
        .headers
        .get("authorization")
        .expect("authorization header");
    assert!(value.is_sensitive());
}

#[test]
fn openai_decoder_extracts_content_and_stops_on_sentinel() {
    let codec = codec_for(WireFormat::OpenAi);
    assert_eq!(
        codec.decode_payload(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#),
        Decoded::Text("Hel".into())
    );
    assert_eq!(
        codec.decode_payload(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
        Decoded::Skip
    );
    assert_eq!(
        codec.decode_payload(r#"{"choices":[{"delta":{"content":""}}]}"#),
        Decoded::Skip
    );
    assert_eq!(codec.decode_payload(r#"{"choices":[]}"#), Decoded::Skip);
    assert_eq!(codec.decode_payload("{not json"), Decoded::Skip);
    assert_eq!(codec.decode_payload("[DONE]"), Decoded::Done);
}

#[test]
fn anthropic_decoder_reads_delta_text_only() {
    let codec = codec_for(WireFormat::Anthropic);
    assert_eq!(
        codec.decode_payload(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#
        ),
        Decoded::Text("Hi".into())
    );
    assert_eq!(
        codec.decode_payload(r#"{"type":"message_start","message":{"id":"msg_1"}}"#),
        Decoded::Skip
    );
    assert_eq!(
        codec.decode_payload(r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"}}"#),
        Decoded::Skip
    );
    // Anthropic has no sentinel; a literal [DONE] is just malformed JSON.
    assert_eq!(codec.decode_payload("[DONE]"), Decoded::Skip);
}

#[test]
fn google_decoder_reads_first_candidate_part() {
    let codec = codec_for(WireFormat::Google);
    assert_eq!(
        codec.decode_payload(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Gem"},{"text":"ignored"}]}}]}"#
        ),
        Decoded::Text("Gem".into())
    );
    assert_eq!(
        codec.decode_payload(r#"{"candidates":[{"content":{"parts":[]}}]}"#),
        Decoded::Skip
    );
    assert_eq!(
        codec.decode_payload(r#"{"usageMetadata":{"totalTokenCount":3}}"#),
        Decoded::Skip
    );
}

#[test]
fn codec_for_matches_requested_format() {
    for format in [WireFormat::OpenAi, WireFormat::Anthropic, WireFormat::Google] {
        assert_eq!(codec_for(format).format(), format);
    }
}

#[test]
fn extract_data_payload_handles_spacing_variants() {
    assert_eq!(extract_data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
    assert_eq!(extract_data_payload("data:{\"a\":1}"), Some("{\"a\":1}"));
    assert_eq!(extract_data_payload("event: ping"), None);
    assert_eq!(extract_data_payload(": keep-alive"), None);
    assert_eq!(extract_data_payload(""), None);
}

#[test]
fn temperature_is_sent_exactly_as_configured() {
    for provider in ["openai", "google"] {
        let request = build(provider, "gpt-4o");
        let text = serde_json::to_string(&request.body).expect("serialize body");
        assert!(
            text.contains("\"temperature\":0.7"),
            "{provider}: {text}"
        );
        assert!(!text.contains("0.699"), "{provider}: {text}");
    }
}
