//! Generation provider boundary.
//!
//! The core only depends on the [`GenerationClient`] trait: one attempt per call, no retry, and
//! the raw provider payload handed back untouched for the normaliser to probe. Two HTTP
//! implementations are provided, selected by [`ProviderKind`].

pub mod chat;
pub mod v0;

pub use chat::ChatCompletionsClient;
pub use v0::V0Client;

use crate::config::{ProviderConfig, ProviderKind};
use crate::{EraError, EraResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque provider payload.
///
/// JSON bodies are kept as parsed values. Bodies that are not JSON are wrapped as a JSON string
/// so that the normaliser can still treat them as candidate markup.
#[derive(Clone, Debug, PartialEq)]
pub struct RawProviderResponse(serde_json::Value);

impl RawProviderResponse {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => Self(value),
            Err(_) => Self(serde_json::Value::String(body.to_string())),
        }
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Outbound image-to-code service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Ask the provider to recreate the screenshot as a webpage.
    ///
    /// # Errors
    /// - [`EraError::Configuration`] when no credential is configured.
    /// - [`EraError::Provider`] when the upstream status is not a success.
    /// - [`EraError::ProviderTransport`] / [`EraError::ProviderBody`] on network failures.
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> EraResult<RawProviderResponse>;

    /// Ask the provider to rewrite component-framework code as plain HTML.
    ///
    /// Same error contract as [`GenerationClient::generate`].
    async fn convert_to_markup(&self, code: &str) -> EraResult<RawProviderResponse>;
}

/// Build the configured HTTP generation client.
pub fn client_from_config(cfg: &ProviderConfig) -> EraResult<Arc<dyn GenerationClient>> {
    let http = reqwest::Client::builder()
        .timeout(cfg.timeout())
        .build()
        .map_err(|e| EraError::Configuration(format!("failed to build HTTP client: {e}")))?;

    let client: Arc<dyn GenerationClient> = match cfg.kind() {
        ProviderKind::V0 => Arc::new(V0Client::new(http, cfg)),
        ProviderKind::ChatCompletions => Arc::new(ChatCompletionsClient::new(http, cfg)),
    };
    Ok(client)
}

/// Turn an upstream response into a payload, or a provider error carrying status and body.
pub(crate) async fn read_provider_response(
    response: reqwest::Response,
) -> EraResult<RawProviderResponse> {
    let status = response.status();
    let body = response.text().await.map_err(EraError::ProviderBody)?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "generation provider returned an error");
        return Err(EraError::Provider {
            status: status.as_u16(),
            body,
        });
    }

    Ok(RawProviderResponse::from_body(&body))
}

pub(crate) fn require_api_key<'a>(
    api_key: Option<&'a str>,
    kind: ProviderKind,
) -> EraResult<&'a str> {
    api_key.ok_or_else(|| {
        EraError::Configuration(format!(
            "{} is not set; cannot call the generation provider",
            kind.credential_env_var()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn json_bodies_are_parsed() {
        let raw = RawProviderResponse::from_body(r#"{"html":"<html></html>"}"#);
        assert_eq!(raw.value(), &json!({"html": "<html></html>"}));
    }

    #[test]
    fn non_json_bodies_are_wrapped_as_strings() {
        let raw = RawProviderResponse::from_body("<!DOCTYPE html><html></html>");
        assert_eq!(raw.value(), &json!("<!DOCTYPE html><html></html>"));
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = require_api_key(None, ProviderKind::V0).unwrap_err();
        assert!(matches!(err, EraError::Configuration(ref m) if m.contains("V0_API_KEY")));
        assert_eq!(
            require_api_key(Some("k"), ProviderKind::ChatCompletions).unwrap(),
            "k"
        );
    }

    #[test]
    fn client_builds_for_each_provider() {
        for kind in [ProviderKind::V0, ProviderKind::ChatCompletions] {
            let cfg = ProviderConfig::new(kind, None, None, None, Duration::from_secs(1));
            assert!(client_from_config(&cfg).is_ok());
        }
    }
}
