use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use serde::Serialize;

use taskhub_core::Page;
use taskhub_infra::LifecycleError;

use crate::app::{dto, errors};

pub mod auth;
pub mod contacts;
pub mod roles;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/users", axum::routing::post(users::register))
        .route("/api/auth/login", axum::routing::post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .merge(roles::router())
        .merge(users::router())
        .merge(contacts::router())
}

/// Wrap a single result in the `{data}` envelope.
pub(crate) fn reply<T, U: Serialize>(
    status: StatusCode,
    result: Result<T, LifecycleError>,
    f: impl FnOnce(T) -> U,
) -> Response {
    match result {
        Ok(value) => dto::respond(status, f(value)),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

/// Wrap a search result in the `{data, paging}` envelope.
pub(crate) fn reply_page<T, U: Serialize>(
    result: Result<Page<T>, LifecycleError>,
    f: impl Fn(T) -> U,
) -> Response {
    match result {
        Ok(page) => dto::respond_page(page, f),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

/// `204 No Content` on success.
pub(crate) fn reply_empty(result: Result<(), LifecycleError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}
