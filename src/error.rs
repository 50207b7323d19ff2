use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::mcp::{CallToolResult, CatalogError};

/// Everything a handler can fail with, mapped onto HTTP at the edge.
///
/// Faults raised by submitted code are not errors here; they are reported as
/// data with a 2xx status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }

            AppError::Catalog(CatalogError::InvalidArguments(text)) => {
                (StatusCode::BAD_REQUEST, Json(CallToolResult::text(text))).into_response()
            }

            AppError::Catalog(e) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
            }

            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }

            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": e.to_string(),
                        "traceback": format!("{:?}", e),
                    })),
                )
                    .into_response()
            }
        }
    }
}
