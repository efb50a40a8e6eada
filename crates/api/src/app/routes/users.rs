use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get, patch},
    Json, Router,
};

use taskhub_infra::usecase::user::{RegisterUser, SearchUsers};

use super::{reply, reply_empty, reply_page};
use crate::app::dto::UserResponse;
use crate::app::services::AppServices;
use crate::context::{self, PrincipalContext};

/// Administrative user endpoints. Registration is public (see `public_router`).
pub fn router() -> Router {
    Router::new()
        .route("/api/users", get(search_users))
        .route("/api/users/trash", get(trashed_users))
        .route("/api/users/:id", delete(delete_user))
        .route("/api/users/:id/restore", patch(restore_user))
        .route("/api/users/:id/force", delete(purge_user))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUser>,
) -> Response {
    let result = services.users.register(&context::anonymous(), body).await;
    reply(StatusCode::CREATED, result, UserResponse::from)
}

pub async fn search_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchUsers>,
) -> Response {
    let result = services.users.search(&principal.request_context(), query).await;
    reply_page(result, UserResponse::from)
}

pub async fn trashed_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchUsers>,
) -> Response {
    let result = services.users.recycle_bin(&principal.request_context(), query).await;
    reply_page(result, UserResponse::from)
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services.users.soft_delete(&principal.request_context(), &id).await;
    reply(StatusCode::OK, result, UserResponse::from)
}

pub async fn restore_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services.users.restore(&principal.request_context(), &id).await;
    reply(StatusCode::OK, result, UserResponse::from)
}

pub async fn purge_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    reply_empty(services.users.force_delete(&principal.request_context(), &id).await)
}
