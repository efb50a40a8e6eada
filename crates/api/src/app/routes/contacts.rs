use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get, patch},
    Json, Router,
};

use taskhub_infra::usecase::contact::{ContactFields, SearchContacts, UpdateContact};

use super::{reply, reply_empty, reply_page};
use crate::app::dto::ContactResponse;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Contacts of the signed-in user.
pub fn router() -> Router {
    Router::new()
        .route("/api/contacts", get(search_contacts).post(create_contact))
        .route("/api/contacts/trash", get(trashed_contacts))
        .route(
            "/api/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/api/contacts/:id/restore", patch(restore_contact))
        .route("/api/contacts/:id/force", delete(purge_contact))
}

pub async fn create_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ContactFields>,
) -> Response {
    let result = services
        .contacts
        .create(&principal.request_context(), principal.user_id(), body)
        .await;
    reply(StatusCode::CREATED, result, ContactResponse::from)
}

pub async fn get_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services
        .contacts
        .get(&principal.request_context(), principal.user_id(), &id)
        .await;
    reply(StatusCode::OK, result, ContactResponse::from)
}

pub async fn update_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(fields): Json<ContactFields>,
) -> Response {
    let request = UpdateContact { id, fields };
    let result = services
        .contacts
        .update(&principal.request_context(), principal.user_id(), request)
        .await;
    reply(StatusCode::OK, result, ContactResponse::from)
}

pub async fn delete_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services
        .contacts
        .soft_delete(&principal.request_context(), principal.user_id(), &id)
        .await;
    reply(StatusCode::OK, result, ContactResponse::from)
}

pub async fn restore_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services
        .contacts
        .restore(&principal.request_context(), principal.user_id(), &id)
        .await;
    reply(StatusCode::OK, result, ContactResponse::from)
}

pub async fn purge_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services
        .contacts
        .force_delete(&principal.request_context(), principal.user_id(), &id)
        .await;
    reply_empty(result)
}

pub async fn search_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchContacts>,
) -> Response {
    let result = services
        .contacts
        .search(&principal.request_context(), principal.user_id(), query)
        .await;
    reply_page(result, ContactResponse::from)
}

pub async fn trashed_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchContacts>,
) -> Response {
    let result = services
        .contacts
        .recycle_bin(&principal.request_context(), principal.user_id(), query)
        .await;
    reply_page(result, ContactResponse::from)
}
