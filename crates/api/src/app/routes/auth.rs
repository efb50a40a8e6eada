use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};

use taskhub_infra::usecase::user::{LoginUser, UpdateUser};

use super::reply;
use crate::app::dto::{TokenResponse, UserResponse};
use crate::app::services::AppServices;
use crate::context::{self, PrincipalContext};

/// Session and profile endpoints of the signed-in user. Login is public.
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/logout", delete(logout))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/profile", get(current).patch(update_profile))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginUser>,
) -> Response {
    let result = services.users.login(&context::anonymous(), body).await;
    reply(StatusCode::OK, result, |outcome| TokenResponse::from(outcome.token))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    let result = services
        .users
        .logout(&principal.request_context(), principal.user_id())
        .await;
    reply(StatusCode::OK, result, |()| true)
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    let result = services
        .users
        .refresh(&principal.request_context(), principal.user_id())
        .await;
    reply(StatusCode::OK, result, |outcome| TokenResponse::from(outcome.token))
}

pub async fn current(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    let result = services
        .users
        .current(&principal.request_context(), principal.user_id())
        .await;
    reply(StatusCode::OK, result, UserResponse::from)
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<UpdateUser>,
) -> Response {
    let result = services
        .users
        .update(&principal.request_context(), principal.user_id(), body)
        .await;
    reply(StatusCode::OK, result, UserResponse::from)
}
