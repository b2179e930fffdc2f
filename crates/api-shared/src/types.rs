//! JSON bodies and multipart form descriptions.
//!
//! Field names are camelCase on the wire to match the form page and existing clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart body of `POST /api/generate-webpage`.
///
/// Only used for the OpenAPI document; the handler reads the fields from the multipart stream.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWebpageForm {
    /// Screenshot to recreate (image/*, at most 10 MiB).
    #[schema(value_type = String, format = Binary)]
    pub screenshot: Vec<u8>,
    pub email: Option<String>,
    /// What the participant does that triggers the survey redirect.
    pub redirect: Option<String>,
    /// Repeatable: `choice`, `allClicks`, `decisionTime`, `maxScroll`.
    pub data_points: Vec<String>,
    pub modifications: Option<String>,
    /// `"Yes"` when several experiment versions are needed.
    pub multiple_versions: Option<String>,
    pub version_difference: Option<String>,
    /// Survey URL the generated page redirects to.
    pub qualtrics_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWebpageRes {
    pub success: bool,
    pub generated_code: String,
    pub prompt: String,
}

/// Error envelope of `POST /api/generate-webpage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateWebpageErrorRes {
    pub success: bool,
    pub error: String,
}

impl GenerateWebpageErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Multipart body of `POST /api/share-example`.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareExampleForm {
    /// Any file; the first file part in the form is used.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub your_email: Option<String>,
    pub example_desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShareExampleRes {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShareExampleErrorRes {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    /// Always `"OK"` when the process is serving.
    pub status: String,
    pub service: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_response_uses_camel_case() {
        let res = GenerateWebpageRes {
            success: true,
            generated_code: "<html></html>".into(),
            prompt: "p".into(),
        };
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({"success": true, "generatedCode": "<html></html>", "prompt": "p"})
        );
    }

    #[test]
    fn error_envelope_is_unsuccessful() {
        assert_eq!(
            serde_json::to_value(GenerateWebpageErrorRes::new("Screenshot is required")).unwrap(),
            json!({"success": false, "error": "Screenshot is required"})
        );
    }
}
