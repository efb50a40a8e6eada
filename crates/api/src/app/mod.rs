//! Router assembly.
//!
//! Handlers reach the use-cases through an `Extension<Arc<AppServices>>`.
//! Routes that act on behalf of a user sit behind [`middleware::auth_middleware`],
//! which resolves the bearer token to a live session before the handler runs.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

pub fn build_app(services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        users: services.users.clone(),
    };
    let services = Arc::new(services);

    let public = routes::public_router().layer(Extension(services.clone()));
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
}
