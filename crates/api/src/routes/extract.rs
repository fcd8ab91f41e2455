//! Extractors whose rejections are reported as `AppError::Validation`.
//!
//! Axum's stock `Json`, `Form` and `Path` reject with plain-text bodies and a
//! mix of 400/415/422 statuses. These wrappers route every rejection through
//! [`AppError`] so clients always get a 422 with a JSON `detail`.
//!
//! The only path parameter is an integer id, and path rejections name Rust
//! types, so they are reported with a fixed message.

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// URL-encoded form body.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);

/// Path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Path rejected");
        Self::Validation(INVALID_ID.to_string())
    }
}

const INVALID_ID: &str = "id: must be an integer";
