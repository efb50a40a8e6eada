use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, middleware::Next, response::Response};

use taskhub_infra::{LifecycleError, UserService};

use crate::app::errors;
use crate::context::{self, PrincipalContext};

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserService>,
}

/// Resolve the bearer token to the live principal or answer 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = match authorization(req.headers()) {
        Ok(header) => header,
        Err(e) => return errors::lifecycle_error_to_response(e),
    };

    let principal = match state.users.verify(&context::anonymous(), header).await {
        Ok(principal) => principal,
        Err(e) => return errors::lifecycle_error_to_response(e),
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn authorization(headers: &HeaderMap) -> Result<Option<String>, LifecycleError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| LifecycleError::unauthenticated("authorization header is not ASCII"))
        })
        .transpose()
}
