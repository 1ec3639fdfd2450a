use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// `Json` whose rejection renders as `VALIDATION_ERROR`.
///
/// Also usable as a response body, in which case it behaves exactly like
/// [`axum::Json`].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `Path` whose rejection renders as `VALIDATION_ERROR`
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `Query` whose rejection renders as `VALIDATION_ERROR`
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
