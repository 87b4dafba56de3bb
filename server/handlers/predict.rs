use std::io::Read;

use tiny_http::Request;

use mushroom_classifier::validate::UPLOAD_FIELD;
use mushroom_classifier::{PredictError, RawUpload};

use crate::routes::{error_response, json_response, JsonResponse};
use crate::state::SharedState;
use crate::util::multipart::{extract_boundary, find_file_part};

/// `POST /predict`
///
/// Expects `multipart/form-data` with the image under the `file` field. An
/// unavailable service answers before the body is looked at.
pub fn handle(request: &mut Request, state: &SharedState) -> JsonResponse {
    if !state.service.is_ready() {
        return predict_error(&PredictError::ServiceUnavailable);
    }

    let limit = state.max_upload_bytes;
    if request.body_length().is_some_and(|len| len > limit) {
        return too_large(limit);
    }
    let body = match read_capped(request.as_reader(), limit) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    respond_to_upload(state, &content_type, &body)
}

/// Reads at most `limit` bytes; anything longer is rejected with 413.
fn read_capped<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, JsonResponse> {
    let mut body = Vec::new();
    if let Err(e) = reader.take(limit as u64 + 1).read_to_end(&mut body) {
        tracing::warn!(error = %e, "Could not read request body");
        return Err(error_response(400, "Could not read request body"));
    }
    if body.len() > limit {
        return Err(too_large(limit));
    }
    Ok(body)
}

fn respond_to_upload(state: &SharedState, content_type: &str, body: &[u8]) -> JsonResponse {
    let upload = extract_upload(content_type, body);
    match state.service.predict(upload.as_ref()) {
        Ok(response) => json_response(200, &response),
        Err(e) => predict_error(&e),
    }
}

/// Pulls the `file` part out of a multipart body. Anything else (wrong
/// content type, missing boundary, no such part) counts as no upload.
fn extract_upload(content_type: &str, body: &[u8]) -> Option<RawUpload> {
    let is_multipart = content_type
        .get(..19)
        .is_some_and(|p| p.eq_ignore_ascii_case("multipart/form-data"));
    if !is_multipart {
        return None;
    }

    let boundary = extract_boundary(content_type)?;
    let part = find_file_part(body, &boundary, UPLOAD_FIELD)?;
    Some(RawUpload {
        filename: part.filename.unwrap_or_default(),
        content_type: part.content_type.unwrap_or_default(),
        bytes: part.data,
    })
}

fn predict_error(e: &PredictError) -> JsonResponse {
    error_response(e.status_code(), &e.to_string())
}

fn too_large(limit: usize) -> JsonResponse {
    error_response(413, &format!("Upload exceeds the {} byte limit", limit))
}
