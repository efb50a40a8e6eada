use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taskhub_core::ErrorKind;
use taskhub_infra::LifecycleError;

/// | ErrorKind | Status |
/// |-----------|--------|
/// | `InvalidInput` | 400 |
/// | `Unauthenticated` | 401 |
/// | `NotFound` | 404 |
/// | `Conflict` | 409 |
/// | `Internal` | 500 |
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    let kind = err.kind();
    let message = match kind {
        ErrorKind::Internal => {
            tracing::error!(error = %err, "request failed");
            "internal error".to_string()
        }
        _ => err.to_string(),
    };
    json_error(status_for(kind), kind.as_str(), message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
