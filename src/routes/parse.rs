//! Document-parse endpoint.

use crate::auth::middleware::AppState;
use crate::docparse::{self, DocumentUpload};
use crate::error::AppError;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::json;

/// POST /doc-parse/parse — Parse an uploaded document into markdown segments
///
/// Always answers 200 with a success-flag envelope so the client can parse
/// the body uniformly: `{success: true, content: [{text, meta}]}` or
/// `{success: false, error}`. Every failure mode, from a malformed form to
/// an upstream fault, lands in the error arm.
pub async fn parse_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Json<serde_json::Value> {
    match parse_inner(&state, multipart).await {
        Ok(segments) => Json(json!({
            "success": true,
            "content": segments,
        })),
        Err(err) => {
            tracing::warn!(action = "parse_failed", error = %err, "Document parse failed");
            Json(json!({
                "success": false,
                "error": err.to_string(),
            }))
        }
    }
}

async fn parse_inner(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Vec<docparse::ParsedSegment>, AppError> {
    let mut upload: Option<DocumentUpload> = None;
    let mut language = "en".to_string();
    let mut target_pages: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart: {}", e)))?
    {
        let name = field
            .name()
            .ok_or_else(|| AppError::BadRequest("Field missing name".to_string()))?
            .to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                upload = Some(DocumentUpload { filename, bytes });
            }
            "language" => {
                language = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read language: {}", e)))?;
            }
            "target_pages" => {
                target_pages = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read target_pages: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    docparse::parse_document(state, upload, &language, target_pages.as_deref()).await
}
