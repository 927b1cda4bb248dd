//! Built-in provider profiles
//!
//! Profiles are loaded from the `builtin_providers.toml` file embedded at
//! build time. A profile carries everything the wire codecs need to talk to a
//! provider: the endpoint template, how the key is sent, which request and
//! response shape to use, and the static identification headers.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::core::wire::{codec_for, WireCodec};

/// Placeholder in an endpoint template that is replaced by the model name.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Request/response shape spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    OpenAi,
    Anthropic,
    Google,
}

/// How the API key travels with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AuthScheme {
    #[serde(rename = "bearer")]
    Bearer,
    #[serde(rename = "x-api-key")]
    ApiKeyHeader,
}

#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub id: String,
    pub display_name: String,
    pub endpoint: String,
    pub wire: WireFormat,
    pub auth: AuthScheme,
    /// Environment variable consulted when the config file has no key.
    pub env_key: Option<String>,
    pub extra_headers: Vec<(String, String)>,
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    id: String,
    display_name: String,
    endpoint: String,
    wire: WireFormat,
    auth: AuthScheme,
    env_key: Option<String>,
    #[serde(default)]
    extra_headers: toml::Table,
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinProvidersConfig {
    providers: Vec<RawProvider>,
}

impl From<RawProvider> for ProviderProfile {
    fn from(raw: RawProvider) -> Self {
        let extra_headers = raw
            .extra_headers
            .into_iter()
            .filter_map(|(name, value)| value.as_str().map(|value| (name, value.to_string())))
            .collect();

        Self {
            id: raw.id,
            display_name: raw.display_name,
            endpoint: raw.endpoint,
            wire: raw.wire,
            auth: raw.auth,
            env_key: raw.env_key,
            extra_headers,
            models: raw.models,
        }
    }
}

impl ProviderProfile {
    /// Resolve the endpoint template for a model.
    pub fn endpoint_for(&self, model: &str) -> String {
        self.endpoint.replace(MODEL_PLACEHOLDER, model)
    }

    /// The codec that builds requests and decodes responses for this profile.
    pub fn codec(&self) -> &'static dyn WireCodec {
        codec_for(self.wire)
    }

    /// Look up the API key in the environment variable named by the profile.
    pub fn env_api_key(&self) -> Option<String> {
        self.env_key
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

static BUILTIN_PROVIDERS: LazyLock<Vec<ProviderProfile>> = LazyLock::new(|| {
    const CONFIG_CONTENT: &str = include_str!("../builtin_providers.toml");

    match toml::from_str::<BuiltinProvidersConfig>(CONFIG_CONTENT) {
        Ok(config) => config.providers.into_iter().map(Into::into).collect(),
        Err(err) => {
            tracing::error!("failed to parse builtin_providers.toml: {err}");
            Vec::new()
        }
    }
});

/// All built-in provider profiles, in display order.
pub fn builtin_providers() -> &'static [ProviderProfile] {
    &BUILTIN_PROVIDERS
}

/// Find a built-in provider by ID (case-insensitive)
pub fn find_builtin_provider(id: &str) -> Option<&'static ProviderProfile> {
    builtin_providers()
        .iter()
        .find(|provider| provider.id.eq_ignore_ascii_case(id))
}

/// IDs of the built-in providers, in display order.
pub fn provider_ids() -> Vec<&'static str> {
    builtin_providers().iter().map(|p| p.id.as_str()).collect()
}

/// Models offered for a provider; unknown providers fall back to `gpt-4`.
pub fn models_for(provider_id: &str) -> Vec<&'static str> {
    match find_builtin_provider(provider_id) {
        Some(provider) => provider.models.iter().map(String::as_str).collect(),
        None => vec!["gpt-4"],
    }
}
