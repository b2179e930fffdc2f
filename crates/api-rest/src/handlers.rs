//! Request handlers and multipart form parsing.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use api_shared::{
    GenerateWebpageErrorRes, GenerateWebpageForm, GenerateWebpageRes, HealthRes, HealthService,
    ShareExampleErrorRes, ShareExampleForm, ShareExampleRes,
};
use era_core::{EraError, EraResult, Screenshot, SharedExample, WebpageRequest};

use crate::AppState;

/// A file part read from a multipart form.
struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Returns `{status: "OK", service, timestamp}` while the process is serving.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/generate-webpage",
    request_body(content = GenerateWebpageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Webpage generated", body = GenerateWebpageRes),
        (status = 400, description = "Screenshot missing", body = GenerateWebpageErrorRes),
        (status = 500, description = "Generation failed", body = GenerateWebpageErrorRes)
    )
)]
/// Generate a tracking webpage from a screenshot
///
/// Builds the generation prompt from the experiment fields, asks the provider to recreate the
/// screenshot, normalises the result and emails it to the submitter and the observer.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - no screenshot was uploaded.
///
/// Returns `500 Internal Server Error` if:
/// - the upload is not an image or exceeds the size ceiling,
/// - the generation provider is not configured or fails,
/// - the upload cannot be staged on disk.
#[axum::debug_handler]
pub(crate) async fn generate_webpage(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run_generate_webpage(&state, multipart).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => {
            let status = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::error!("Error generating webpage: {}", e);
            (status, Json(GenerateWebpageErrorRes::new(e.to_string()))).into_response()
        }
    }
}

async fn run_generate_webpage(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> EraResult<GenerateWebpageRes> {
    let multipart = multipart.map_err(|rej| {
        EraError::Validation(format!("Screenshot is required ({})", rej.body_text()))
    })?;
    let (request, screenshot) = read_generate_form(multipart, state.max_upload_bytes).await?;
    let screenshot =
        screenshot.ok_or_else(|| EraError::Validation("Screenshot is required".into()))?;

    let staged = state
        .uploads
        .stage(&screenshot.filename, &screenshot.bytes)
        .await?;

    let result = async {
        let bytes = staged.read().await?;
        state
            .service
            .generate_webpage(
                &request,
                &Screenshot {
                    bytes,
                    mime_type: screenshot.content_type.clone(),
                },
            )
            .await
    }
    .await;

    staged.discard().await;

    let outcome = result?;
    Ok(GenerateWebpageRes {
        success: true,
        generated_code: outcome.document.into_string(),
        prompt: outcome.prompt,
    })
}

#[utoipa::path(
    post,
    path = "/api/share-example",
    request_body(content = ShareExampleForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Example forwarded", body = ShareExampleRes),
        (status = 500, description = "Example could not be processed", body = ShareExampleErrorRes)
    )
)]
/// Share an example file with the ERA team
///
/// Forwards the uploaded file and description to the notification address by email.
///
/// # Errors
/// Returns `500 Internal Server Error` if:
/// - no file was uploaded or it exceeds the size ceiling,
/// - the form cannot be parsed,
/// - the upload cannot be staged on disk.
#[axum::debug_handler]
pub(crate) async fn share_example(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run_share_example(&state, multipart).await {
        Ok(()) => (StatusCode::OK, Json(ShareExampleRes { success: true })).into_response(),
        Err(e) => {
            tracing::error!("Error sharing example: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ShareExampleErrorRes {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn run_share_example(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> EraResult<()> {
    let mut multipart = multipart
        .map_err(|rej| EraError::InvalidInput(format!("expected a multipart form: {}", rej.body_text())))?;

    let mut your_email = None;
    let mut description = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if field.file_name().is_some() {
            let uploaded = read_file_field(field, state.max_upload_bytes).await?;
            if file.is_none() {
                file = uploaded;
            }
            continue;
        }
        match name.as_str() {
            "yourEmail" => your_email = Some(field.text().await.map_err(multipart_error)?),
            "exampleDesc" => description = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!("ignoring form field {:?}", other),
        }
    }

    let file =
        file.ok_or_else(|| EraError::InvalidInput("An example file is required".into()))?;
    let staged = state.uploads.stage(&file.filename, &file.bytes).await?;

    let result = async {
        let content = staged.read().await?;
        state
            .service
            .share_example(SharedExample {
                submitter_email: your_email,
                description,
                filename: file.filename.clone(),
                content_type: file.content_type.clone(),
                content,
            })
            .await
    }
    .await;

    staged.discard().await;
    result
}

/// Collect the generation form fields and the screenshot part.
async fn read_generate_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> EraResult<(WebpageRequest, Option<UploadedFile>)> {
    let mut request = WebpageRequest::default();
    let mut screenshot = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "screenshot" {
            if let Some(file) = read_file_field(field, max_upload_bytes).await? {
                if !file.content_type.starts_with("image/") {
                    return Err(EraError::InvalidInput(
                        "Only image files are allowed!".into(),
                    ));
                }
                screenshot = Some(file);
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "email" => request.email = Some(value),
            "redirect" => request.redirect = Some(value),
            "dataPoints" | "dataPoints[]" => request.data_points.push(value),
            "modifications" => request.modifications = Some(value),
            "multipleVersions" => request.multiple_versions = Some(value),
            "versionDifference" => request.version_difference = Some(value),
            "qualtricsUrl" => request.qualtrics_url = Some(value),
            other => tracing::debug!("ignoring form field {:?}", other),
        }
    }

    Ok((request, screenshot))
}

/// Read a file part. An empty part with no filename (no file chosen in the browser) is `None`.
async fn read_file_field(
    field: axum::extract::multipart::Field<'_>,
    max_upload_bytes: usize,
) -> EraResult<Option<UploadedFile>> {
    let filename = field.file_name().unwrap_or("").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if bytes.is_empty() && filename.is_empty() {
        return Ok(None);
    }
    if bytes.len() > max_upload_bytes {
        return Err(EraError::InvalidInput(format!(
            "File too large (maximum {} MiB)",
            max_upload_bytes / (1024 * 1024)
        )));
    }

    Ok(Some(UploadedFile {
        filename: if filename.is_empty() {
            "upload".to_string()
        } else {
            filename
        },
        content_type,
        bytes: bytes.to_vec(),
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> EraError {
    EraError::InvalidInput(format!("invalid multipart body: {}", e.body_text()))
}
