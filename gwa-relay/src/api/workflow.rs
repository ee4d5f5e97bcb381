//! Workflow step handlers
//!
//! POST /api/analyze, POST /api/extract, POST /api/report: one handler per
//! forward transition of the assessment workflow. Each handler validates
//! its input before touching the network, holds the single-permit
//! transition guard for the duration of its upstream call, and only
//! advances the session on a usable result. Failures hold the current step
//! so the client can resubmit.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{ImageAnalysisRecord, UploadedFile, WorkflowState};
use crate::services::{
    gemini_client::{IMAGE_ANALYSIS_MODEL, VERDICT_MODEL},
    parse_analysis_reply, prompts, GeminiClient,
};
use crate::AppState;

/// Multipart field name for ad images (1-2 files)
const IMAGE_FIELD: &str = "image";

/// Multipart field name for the report document
const REPORT_FIELD: &str = "pdf";

/// MIME type assumed for image parts that carry none
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// POST /api/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: ImageAnalysisRecord,
}

/// POST /api/extract response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReportResponse {
    pub extracted_text: String,
}

/// POST /api/report request
///
/// Both fields are optional; the session's accumulated results are used
/// when the body omits them. `analysis` accepts either the analysis text
/// or the full record object, matching what existing clients send.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    #[serde(default)]
    pub report_data: Option<String>,
}

/// POST /api/report response
#[derive(Debug, Serialize)]
pub struct VerdictResponse {
    pub verdict: String,
}

/// POST /api/analyze
///
/// Step 1: accept 1-2 ad images, submit them to the model with the
/// image-analysis prompt, parse the fenced-JSON reply. Advances the
/// session to AwaitingReport only when the reply parsed.
pub async fn analyze_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let images = collect_uploads(multipart, IMAGE_FIELD, DEFAULT_IMAGE_MIME).await?;
    if images.is_empty() {
        return Err(ApiError::InputMissing(
            "At least one image must be uploaded".to_string(),
        ));
    }
    if images.len() > 2 {
        return Err(ApiError::BadRequest(
            "At most two images may be uploaded".to_string(),
        ));
    }

    let _guard = state.acquire_transition_guard()?;
    state.require_step(WorkflowState::AwaitingImage).await?;

    let mut parts: Vec<_> = images
        .iter()
        .map(|img| GeminiClient::inline_image_part(&img.mime_type, &img.bytes))
        .collect();
    parts.push(GeminiClient::text_part(prompts::image_analysis_prompt(
        images.len(),
    )));

    let reply = state.gemini.generate(IMAGE_ANALYSIS_MODEL, parts).await?;
    let record = parse_analysis_reply(&reply).map_err(|e| {
        tracing::warn!(error = %e, "Image analysis reply did not parse; step held");
        e
    })?;

    let transition = state
        .session
        .write()
        .await
        .record_image_analysis(record.clone())?;
    tracing::info!(
        session_id = %transition.session_id,
        company = %record.company_name,
        image_count = images.len(),
        "Image analysis recorded; workflow advanced to step 2"
    );

    Ok(Json(AnalyzeResponse { analysis: record }))
}

/// POST /api/extract
///
/// Step 2: accept exactly one PDF, forward it to the extraction
/// collaborator, store the extracted text verbatim. Advances the session
/// to AwaitingVerdict.
pub async fn extract_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ExtractReportResponse>> {
    let mut documents = collect_uploads(multipart, REPORT_FIELD, "application/pdf").await?;
    if documents.is_empty() {
        return Err(ApiError::InputMissing(
            "A report PDF must be uploaded".to_string(),
        ));
    }
    if documents.len() > 1 {
        return Err(ApiError::BadRequest(
            "Exactly one report document may be uploaded".to_string(),
        ));
    }
    let document = documents.remove(0);
    if document.mime_type != "application/pdf" {
        return Err(ApiError::BadRequest(format!(
            "Report must be a PDF (got {})",
            document.mime_type
        )));
    }

    let _guard = state.acquire_transition_guard()?;
    state.require_step(WorkflowState::AwaitingReport).await?;

    let text = state.extractor.extract(&document).await?;

    let transition = state.session.write().await.record_report_text(text.clone())?;
    tracing::info!(
        session_id = %transition.session_id,
        text_len = text.len(),
        "Report text recorded; workflow advanced to step 3"
    );

    Ok(Json(ExtractReportResponse {
        extracted_text: text,
    }))
}

/// POST /api/report
///
/// Step 3: synthesize the final verdict from the accumulated analysis and
/// report text. The reply is stored and returned verbatim; the session
/// reaches Done and no further transition is possible.
pub async fn synthesize_verdict(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<Json<VerdictResponse>> {
    let _guard = state.acquire_transition_guard()?;
    state.require_step(WorkflowState::AwaitingVerdict).await?;

    let (analysis, report_text) = {
        let session = state.session.read().await;

        let analysis = request
            .analysis
            .as_ref()
            .and_then(analysis_text_from_value)
            .or_else(|| session.image_analysis.as_ref().map(|r| r.analysis.clone()))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::InputMissing("No image analysis available for the verdict".to_string())
            })?;

        let report_text = request
            .report_data
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| session.report_text.clone());
        if report_text.is_empty() {
            return Err(ApiError::InputMissing(
                "No report text available for the verdict".to_string(),
            ));
        }

        (analysis, report_text)
    };

    let prompt = prompts::verdict_prompt(&analysis, &report_text);
    let verdict = state
        .gemini
        .generate(VERDICT_MODEL, vec![GeminiClient::text_part(prompt)])
        .await?;

    let transition = state.session.write().await.record_verdict(verdict.clone())?;
    tracing::info!(
        session_id = %transition.session_id,
        "Verdict recorded; workflow complete"
    );

    Ok(Json(VerdictResponse { verdict }))
}

/// Read all parts named `field` into memory.
///
/// Parts under other names are ignored; a part without a content type is
/// assumed to be `default_mime`.
async fn collect_uploads(
    mut multipart: Multipart,
    field: &str,
    default_mime: &str,
) -> ApiResult<Vec<UploadedFile>> {
    let mut uploads = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().map(str::to_string);
        let mime_type = part
            .content_type()
            .unwrap_or(default_mime)
            .to_string();
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            continue;
        }
        uploads.push(UploadedFile {
            file_name,
            mime_type,
            bytes,
        });
    }

    Ok(uploads)
}

/// Extract usable analysis text from a request body value.
///
/// Accepts a plain string or a `{ companyName, analysis }` object.
fn analysis_text_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("analysis")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Build workflow step routes
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze_images))
        .route("/api/extract", post(extract_report))
        .route("/api/report", post(synthesize_verdict))
}
