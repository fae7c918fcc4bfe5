use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{ErrorResponse, PreviewResponse, PublishResponse, SubmissionBody};
use crate::services::publish::PublishRequest;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = match authorized_request(&state, &headers, &body) {
        Ok(request) => request,
        Err(rejection) => return rejection,
    };

    match state.service.preview(&request).await {
        Ok(preview) => Json(PreviewResponse::from(preview)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = match authorized_request(&state, &headers, &body) {
        Ok(request) => request,
        Err(rejection) => return rejection,
    };

    match state.service.publish(&request).await {
        Ok(receipt) => Json(PublishResponse::from(receipt)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Authorization runs before the body is parsed
fn authorized_request(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<PublishRequest, Response> {
    state.authorize(headers)?;

    let submission: SubmissionBody = serde_json::from_slice(body).map_err(|e| {
        let body = ErrorResponse {
            error: format!("invalid submission: {}", e),
            published: false,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    })?;
    Ok(PublishRequest::from(submission))
}
