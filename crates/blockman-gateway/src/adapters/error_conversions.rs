//! HTTP rendering of `ApiError`.
//!
//! The conversion involves axum response types and belongs in the adapters
//! layer.

use crate::domain::ApiError;
use axum::response::{IntoResponse, Response};
use axum::Json;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
