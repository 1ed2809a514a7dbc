use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::RelayError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub RelayError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use RelayError::*;
        let status = match &self.0 {
            Conflict | InvalidCredential | AlreadyLoggedIn => StatusCode::BAD_REQUEST,
            NotFound => StatusCode::NOT_FOUND,
            StoreUnavailable(err) => {
                tracing::error!("store fault: {err}");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        (
            status,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<RelayError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub fn success() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}
