//! Upload and job-status handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::ingestion::sanitize_filename;
use crate::jobs::JobState;
use crate::processing::ProcessOutcome;

use super::AppState;

/// Fields accepted by both upload endpoints.
struct UploadForm {
    content: Vec<u8>,
    filename: String,
    replace_document_id: Option<String>,
}

/// Authenticated user identity, stamped upstream as `x-user-id`.
/// Authentication itself happens before requests reach this service.
fn owner_user_id(headers: &HeaderMap) -> ServiceResult<i64> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ServiceError::InvalidRequest {
            message: "Missing or invalid x-user-id header".to_string(),
        })
}

async fn read_upload_form(multipart: &mut Multipart) -> ServiceResult<UploadForm> {
    let mut file_data: Option<(Vec<u8>, String)> = None;
    let mut replace_document_id: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let raw_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| ServiceError::InvalidRequest {
                    message: e.to_string(),
                })?;
                file_data = Some((data.to_vec(), raw_name));
            }
            "document_id" => {
                let id = field.text().await.map_err(|e| ServiceError::InvalidRequest {
                    message: e.to_string(),
                })?;
                if !id.is_empty() {
                    replace_document_id = Some(id);
                }
            }
            _ => {}
        }
    }

    let (content, raw_name) = file_data.ok_or_else(|| ServiceError::InvalidRequest {
        message: "No file part".to_string(),
    })?;
    let filename = sanitize_filename(&raw_name)?;

    Ok(UploadForm {
        content,
        filename,
        replace_document_id,
    })
}

/// Response for a completed synchronous upload
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub document_id: String,
    pub chunks_stored: usize,
    pub images_stored: usize,
}

/// Upload a document and process it inline; the caller blocks until done
pub async fn upload_sync_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServiceError> {
    let owner_user_id = owner_user_id(&headers)?;
    let form = read_upload_form(&mut multipart).await?;

    let outcome = state.service.upload_sync(
        owner_user_id,
        &form.filename,
        &form.content,
        form.replace_document_id,
    )?;

    Ok(Json(UploadResponse {
        message: format!("{} processed successfully!", form.filename),
        filename: form.filename,
        document_id: outcome.document_id,
        chunks_stored: outcome.text_chunks,
        images_stored: outcome.image_chunks,
    }))
}

/// Response for an accepted asynchronous upload
#[derive(Serialize)]
pub struct UploadAcceptedResponse {
    pub message: String,
    pub job_id: String,
    pub filename: String,
    pub status_url: String,
}

/// Upload a document for background processing; returns a pollable job id
pub async fn upload_async_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadAcceptedResponse>), ServiceError> {
    let owner_user_id = owner_user_id(&headers)?;
    let form = read_upload_form(&mut multipart).await?;

    let job_id = state.service.upload_async(
        owner_user_id,
        &form.filename,
        &form.content,
        form.replace_document_id,
    )?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAcceptedResponse {
            message: format!("Accepted {} for background processing", form.filename),
            status_url: format!("/api/jobs/{job_id}"),
            job_id,
            filename: form.filename,
        }),
    ))
}

/// Client-visible job status
#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub state: JobState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessOutcome>,
}

/// Poll a background job by id
pub async fn job_status_handler(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Response {
    match state.service.job_status(&job_id) {
        Some(view) => Json(JobStatusResponse {
            job_id,
            state: view.state,
            message: view.message,
            result: view.result,
        })
        .into_response(),
        // Unknown id: distinct from a job that ran and failed
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "job_id": job_id,
                "state": "not_found",
                "message": "Job not found",
            })),
        )
            .into_response(),
    }
}
