//! Chat-completions image-to-code API.
//!
//! The screenshot travels inline as a base64 `data:` URL next to the prompt text; the generated
//! page comes back in `choices[0].message.content`.

use super::{read_provider_response, require_api_key, GenerationClient, RawProviderResponse};
use crate::config::{ProviderConfig, ProviderKind};
use crate::constants::CHAT_MAX_TOKENS;
use crate::{EraError, EraResult};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;

const SYSTEM_MESSAGE: &str = "You are an expert front-end developer. Reply with a single, \
complete HTML document with all CSS and JavaScript inline.";

const CONVERT_INSTRUCTION: &str = "Convert the following component code into a single, \
self-contained HTML document using plain HTML, inline CSS and vanilla JavaScript. Keep every \
tracking script and redirect behaviour intact. Reply with the HTML document only.";

pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(http: reqwest::Client, cfg: &ProviderConfig) -> Self {
        Self {
            http,
            base_url: cfg.base_url().to_string(),
            api_key: cfg.api_key().map(str::to_string),
            model: cfg.model().to_string(),
        }
    }

    async fn complete(&self, body: serde_json::Value) -> EraResult<RawProviderResponse> {
        let api_key = require_api_key(self.api_key.as_deref(), ProviderKind::ChatCompletions)?;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(EraError::ProviderTransport)?;

        read_provider_response(response).await
    }
}

#[async_trait]
impl GenerationClient for ChatCompletionsClient {
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> EraResult<RawProviderResponse> {
        tracing::info!(model = %self.model, bytes = image.len(), "requesting webpage from chat provider");
        self.complete(generation_body(&self.model, image, mime_type, prompt))
            .await
    }

    async fn convert_to_markup(&self, code: &str) -> EraResult<RawProviderResponse> {
        tracing::info!(model = %self.model, "asking chat provider to convert component code to HTML");
        self.complete(conversion_body(&self.model, code)).await
    }
}

fn image_data_url(image: &[u8], mime_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(image)
    )
}

fn generation_body(model: &str, image: &[u8], mime_type: &str, prompt: &str) -> serde_json::Value {
    json!({
        "model": model,
        "max_tokens": CHAT_MAX_TOKENS,
        "messages": [
            { "role": "system", "content": SYSTEM_MESSAGE },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_data_url(image, mime_type) } }
                ]
            }
        ]
    })
}

fn conversion_body(model: &str, code: &str) -> serde_json::Value {
    json!({
        "model": model,
        "max_tokens": CHAT_MAX_TOKENS,
        "messages": [
            { "role": "system", "content": SYSTEM_MESSAGE },
            { "role": "user", "content": format!("{CONVERT_INSTRUCTION}\n\n{code}") }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn image_is_sent_as_data_url() {
        assert_eq!(image_data_url(b"abc", "image/png"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn generation_body_carries_prompt_and_image() {
        let body = generation_body("gpt-4o", b"abc", "image/jpeg", "recreate this");
        assert_eq!(body["model"], "gpt-4o");
        let user = &body["messages"][1];
        assert_eq!(user["role"], "user");
        assert_eq!(user["content"][0]["text"], "recreate this");
        assert_eq!(
            user["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,YWJj"
        );
    }

    #[test]
    fn conversion_body_embeds_code() {
        let body = conversion_body("gpt-4o", "import React from 'react';");
        let content = body["messages"][1]["content"].as_str().unwrap();
        assert!(content.starts_with(CONVERT_INSTRUCTION));
        assert!(content.ends_with("import React from 'react';"));
    }

    #[tokio::test]
    async fn convert_without_key_is_a_configuration_error() {
        let cfg = ProviderConfig::new(
            ProviderKind::ChatCompletions,
            None,
            Some("http://127.0.0.1:9".into()),
            None,
            Duration::from_secs(1),
        );
        let client = ChatCompletionsClient::new(reqwest::Client::new(), &cfg);
        let err = client.convert_to_markup("export default 1").await.unwrap_err();
        assert!(matches!(err, EraError::Configuration(_)));
    }
}
