use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};

use crate::api::models::ErrorResponse;
use crate::errors::PublishError;
use crate::notify::NotifierBackend;
use crate::services::publish::PublishService;
use crate::store::StoreBackend;

pub mod publish;

pub struct AppState {
    pub service: PublishService<StoreBackend, NotifierBackend>,
}

impl AppState {
    /// Bearer check against the admin password; open when none is configured
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let Some(password) = self.service.config().publish.admin_password.as_deref() else {
            return Ok(());
        };

        let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok());
        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if token == password => Ok(()),
            _ => {
                warn!("Rejected request with missing or wrong admin password");
                Err(StatusCode::UNAUTHORIZED.into_response())
            }
        }
    }
}

pub fn error_response(err: PublishError) -> Response {
    let status = match &err {
        PublishError::EmptyBatch(_) | PublishError::InvalidTag(_) => StatusCode::BAD_REQUEST,
        PublishError::Storage { .. } | PublishError::Notification { .. } => StatusCode::BAD_GATEWAY,
        PublishError::CorruptState { .. } | PublishError::Render(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status != StatusCode::BAD_REQUEST {
        error!("Request failed: {:?}", err);
    }

    let body = ErrorResponse {
        published: matches!(err, PublishError::Notification { .. }),
        error: err.to_string(),
    };
    (status, Json(body)).into_response()
}
