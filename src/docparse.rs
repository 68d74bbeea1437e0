//! Client for the external document-parsing service.
//!
//! The service accepts a multipart upload and returns the document as
//! markdown segments, one per page. This module owns the wire types and
//! normalizes the response into `(text, meta)` pairs; the route layer wraps
//! the result in the `{success, content | error}` envelope.

use crate::auth::middleware::AppState;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// One parsed segment, as returned to the client.
#[derive(Debug, Serialize)]
pub struct ParsedSegment {
    pub text: String,
    pub meta: serde_json::Value,
}

/// A file taken from the inbound multipart form.
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ParseServiceResponse {
    pages: Vec<ParseServicePage>,
}

#[derive(Debug, Deserialize)]
struct ParseServicePage {
    text: String,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// Upload a document to the parsing service and normalize its response.
///
/// One outbound call, no retry. Any failure (unconfigured service,
/// transport, non-success upstream status, undecodable payload) comes back
/// as an error for the route layer to fold into the success-flag envelope.
pub async fn parse_document(
    state: &AppState,
    upload: DocumentUpload,
    language: &str,
    target_pages: Option<&str>,
) -> Result<Vec<ParsedSegment>, AppError> {
    let base_url = state
        .config
        .doc_parse_url
        .as_deref()
        .ok_or_else(|| AppError::BadGateway("DOC_PARSE_URL not configured".to_string()))?;

    let file_part = reqwest::multipart::Part::bytes(upload.bytes)
        .file_name(upload.filename.clone())
        .mime_str("application/octet-stream")
        .map_err(|e| AppError::Internal(format!("Invalid upload part: {}", e)))?;

    let mut form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("language", language.to_string())
        .text("result_type", "markdown");

    if let Some(pages) = target_pages {
        form = form.text("target_pages", pages.to_string());
    }

    let mut request = state.http.post(base_url).multipart(form);
    if let Some(api_key) = &state.config.doc_parse_api_key {
        request = request.bearer_auth(api_key);
    }

    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Internal(format!(
            "Parse service returned {}: {}",
            status, detail
        )));
    }

    let parsed: ParseServiceResponse = response
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("Undecodable parse response: {}", e)))?;

    tracing::info!(
        action = "document_parsed",
        file = %upload.filename,
        segments = parsed.pages.len(),
        "Document parsed"
    );

    Ok(parsed
        .pages
        .into_iter()
        .map(|page| ParsedSegment {
            text: page.text,
            meta: page.metadata,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_normalization() {
        let raw = serde_json::json!({
            "pages": [
                {"text": "# Title", "metadata": {"page": 1}},
                {"text": "Body"}
            ]
        });

        let parsed: ParseServiceResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.pages.len(), 2);
        assert_eq!(parsed.pages[0].text, "# Title");
        assert_eq!(parsed.pages[0].metadata["page"], 1);
        // Missing metadata defaults to null
        assert!(parsed.pages[1].metadata.is_null());
    }

    #[test]
    fn test_segment_serialization_shape() {
        let segment = ParsedSegment {
            text: "hello".to_string(),
            meta: serde_json::json!({"page": 3}),
        };
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["text"], "hello");
        assert_eq!(value["meta"]["page"], 3);
    }
}
