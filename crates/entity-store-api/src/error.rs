//! Maps a failed [`entity_store_types::EntityStoreError`] report onto an
//! HTTP response, grounded on the teacher's `rest::status::report_to_response`
//! idiom: log the full report, answer the caller with the status code and
//! message the domain error already knows how to produce.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entity_store_types::EntityStoreError;
use error_stack::Report;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError(Report<EntityStoreError>);

impl From<Report<EntityStoreError>> for ApiError {
    fn from(report: Report<EntityStoreError>) -> Self {
        Self(report)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.0.current_context().status_code();
        let message = self.0.current_context().to_string();

        tracing::error!(error = ?self.0, status = status_code, "request failed");

        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
