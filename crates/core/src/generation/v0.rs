//! v0 image-to-code API.
//!
//! `POST {base}/generate` takes a multipart form with the screenshot and prompt and answers with
//! a JSON object carrying the code under `code`, `html` or `content`. `POST {base}/convert`
//! rewrites component code as vanilla HTML.

use super::{read_provider_response, require_api_key, GenerationClient, RawProviderResponse};
use crate::config::{ProviderConfig, ProviderKind};
use crate::{EraError, EraResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::json;

pub struct V0Client {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl V0Client {
    pub fn new(http: reqwest::Client, cfg: &ProviderConfig) -> Self {
        Self {
            http,
            base_url: cfg.base_url().to_string(),
            api_key: cfg.api_key().map(str::to_string),
        }
    }

    fn api_key(&self) -> EraResult<&str> {
        require_api_key(self.api_key.as_deref(), ProviderKind::V0)
    }
}

#[async_trait]
impl GenerationClient for V0Client {
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> EraResult<RawProviderResponse> {
        let api_key = self.api_key()?;

        let image_part = Part::bytes(image.to_vec())
            .file_name(screenshot_filename(mime_type))
            .mime_str(mime_type)
            .map_err(|e| EraError::InvalidInput(format!("unusable image type {mime_type:?}: {e}")))?;

        let form = Form::new()
            .part("image", image_part)
            .text("prompt", prompt.to_string())
            .text("framework", "html")
            .text("style", "tailwind")
            .text("typescript", "false");

        tracing::info!(bytes = image.len(), "requesting webpage from v0");
        let response = self
            .http
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(EraError::ProviderTransport)?;

        read_provider_response(response).await
    }

    async fn convert_to_markup(&self, code: &str) -> EraResult<RawProviderResponse> {
        let api_key = self.api_key()?;

        tracing::info!("asking v0 to convert component code to HTML");
        let response = self
            .http
            .post(format!("{}/convert", self.base_url))
            .bearer_auth(api_key)
            .json(&conversion_body(code))
            .send()
            .await
            .map_err(EraError::ProviderTransport)?;

        read_provider_response(response).await
    }
}

fn conversion_body(code: &str) -> serde_json::Value {
    json!({
        "code": code,
        "target": "html",
        "framework": "vanilla",
    })
}

/// Upload filename for the screenshot part, derived from its MIME type.
fn screenshot_filename(mime_type: &str) -> String {
    let subtype = mime_type
        .split_once('/')
        .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim())
        .unwrap_or("");
    let ext = match subtype {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        "" => "png",
        other if other.bytes().all(|b| b.is_ascii_alphanumeric()) => other,
        _ => "png",
    };
    format!("screenshot.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn screenshot_filename_follows_mime_type() {
        assert_eq!(screenshot_filename("image/png"), "screenshot.png");
        assert_eq!(screenshot_filename("image/jpeg"), "screenshot.jpg");
        assert_eq!(screenshot_filename("image/webp"), "screenshot.webp");
        assert_eq!(screenshot_filename("image/svg+xml"), "screenshot.svg");
        assert_eq!(screenshot_filename("image/png; charset=binary"), "screenshot.png");
        assert_eq!(screenshot_filename("garbage"), "screenshot.png");
    }

    #[test]
    fn conversion_requests_vanilla_html() {
        let body = conversion_body("export default function App() {}");
        assert_eq!(body["target"], "html");
        assert_eq!(body["framework"], "vanilla");
        assert_eq!(body["code"], "export default function App() {}");
    }

    #[tokio::test]
    async fn generate_without_key_fails_before_any_request() {
        let cfg = ProviderConfig::new(
            ProviderKind::V0,
            None,
            Some("http://127.0.0.1:9".into()),
            None,
            Duration::from_secs(1),
        );
        let client = V0Client::new(reqwest::Client::new(), &cfg);
        let err = client.generate(b"png", "image/png", "prompt").await.unwrap_err();
        assert!(matches!(err, EraError::Configuration(_)));
    }
}
