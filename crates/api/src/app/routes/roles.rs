use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{delete, get, patch},
    Json, Router,
};

use taskhub_infra::usecase::role::{CreateRole, SearchRoles, UpdateRole};

use super::{reply, reply_empty, reply_page};
use crate::app::dto::RoleResponse;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/api/roles", get(search_roles).post(create_role))
        .route("/api/roles/trash", get(trashed_roles))
        .route(
            "/api/roles/:id",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/api/roles/:id/restore", patch(restore_role))
        .route("/api/roles/:id/force", delete(purge_role))
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateRole>,
) -> Response {
    let result = services.roles.create(&principal.request_context(), body).await;
    reply(StatusCode::CREATED, result, RoleResponse::from)
}

pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services.roles.get(&principal.request_context(), &id).await;
    reply(StatusCode::OK, result, RoleResponse::from)
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRole>,
) -> Response {
    let request = UpdateRole { id, ..body };
    let result = services.roles.update(&principal.request_context(), request).await;
    reply(StatusCode::OK, result, RoleResponse::from)
}

pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services.roles.soft_delete(&principal.request_context(), &id).await;
    reply(StatusCode::OK, result, RoleResponse::from)
}

pub async fn restore_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let result = services.roles.restore(&principal.request_context(), &id).await;
    reply(StatusCode::OK, result, RoleResponse::from)
}

pub async fn purge_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    reply_empty(services.roles.force_delete(&principal.request_context(), &id).await)
}

pub async fn search_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchRoles>,
) -> Response {
    let result = services.roles.search(&principal.request_context(), query).await;
    reply_page(result, RoleResponse::from)
}

pub async fn trashed_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<SearchRoles>,
) -> Response {
    let result = services.roles.recycle_bin(&principal.request_context(), query).await;
    reply_page(result, RoleResponse::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    use taskhub_auth::Principal;
    use taskhub_core::{Page, PageRequest, Timestamps};
    use taskhub_infra::usecase::contact::MockContactService;
    use taskhub_infra::usecase::role::MockRoleService;
    use taskhub_infra::usecase::user::MockUserService;
    use taskhub_infra::{LifecycleError, Role};

    use crate::app::{build_app, AppServices};

    const ROLE_ID: &str = "0191e0b4-7b8e-7cc1-a5d4-2f6c0e1b9a10";

    fn signed_in_users() -> MockUserService {
        let mut users = MockUserService::new();
        users.expect_verify().returning(|_, header| match header.as_deref() {
            Some("Bearer good") => Ok(Principal {
                id: "user-1".into(),
                email: "dana@todo.app".into(),
                role_id: None,
                department_id: None,
                is_active: true,
            }),
            _ => Err(LifecycleError::unauthenticated("bad token")),
        });
        users
    }

    fn app(roles: MockRoleService) -> axum::Router {
        build_app(AppServices {
            roles: Arc::new(roles),
            users: Arc::new(signed_in_users()),
            contacts: Arc::new(MockContactService::new()),
        })
    }

    fn admin() -> Role {
        Role {
            id: ROLE_ID.into(),
            name: "Admin".into(),
            timestamps: Timestamps::new(Utc::now()),
        }
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_answers_201_with_the_role() {
        let mut roles = MockRoleService::new();
        roles
            .expect_create()
            .withf(|_, request| request.name == "Admin")
            .returning(|_, _| Ok(admin()));

        let res = app(roles)
            .oneshot(
                Request::post("/api/roles")
                    .header("authorization", "Bearer good")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Admin"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_json(res).await;
        assert_eq!(body["data"]["id"], ROLE_ID);
        assert!(body.get("paging").is_none());
    }

    #[tokio::test]
    async fn update_takes_the_id_from_the_path() {
        let mut roles = MockRoleService::new();
        roles
            .expect_update()
            .withf(|_, request| request.id == ROLE_ID && request.name == "Root")
            .returning(|_, _| Ok(admin()));

        let res = app(roles)
            .oneshot(
                Request::put(format!("/api/roles/{ROLE_ID}"))
                    .header("authorization", "Bearer good")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"id":"ignored","name":"Root"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_answers_with_paging() {
        let mut roles = MockRoleService::new();
        roles
            .expect_search()
            .withf(|_, query| query.name.as_deref() == Some("adm") && query.page == 2)
            .returning(|_, _| Ok(Page::new(vec![admin()], 11, PageRequest::new(2, 10))));

        let res = app(roles)
            .oneshot(
                Request::get("/api/roles?name=adm&page=2")
                    .header("authorization", "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["paging"]["total_item"], 11);
        assert_eq!(body["paging"]["total_page"], 2);
    }

    #[tokio::test]
    async fn lifecycle_errors_map_to_status_codes() {
        let mut roles = MockRoleService::new();
        roles
            .expect_get()
            .returning(|_, _| Err(LifecycleError::not_found("role")));
        roles
            .expect_force_delete()
            .returning(|_, _| Err(LifecycleError::Conflict("roles_pkey".into())));

        let app = app(roles);
        let res = app
            .clone()
            .oneshot(
                Request::get(format!("/api/roles/{ROLE_ID}"))
                    .header("authorization", "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await["error"], "not_found");

        let res = app
            .oneshot(
                Request::delete(format!("/api/roles/{ROLE_ID}/force"))
                    .header("authorization", "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn purge_answers_204() {
        let mut roles = MockRoleService::new();
        roles.expect_force_delete().returning(|_, _| Ok(()));

        let res = app(roles)
            .oneshot(
                Request::delete(format!("/api/roles/{ROLE_ID}/force"))
                    .header("authorization", "Bearer good")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn missing_or_bad_token_never_reaches_the_service() {
        let mut roles = MockRoleService::new();
        roles.expect_search().never();
        let app = app(roles);

        for auth in [None, Some("Bearer bad")] {
            let mut req = Request::get("/api/roles");
            if let Some(auth) = auth {
                req = req.header("authorization", auth);
            }
            let res = app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(res).await["error"], "unauthenticated");
        }
    }
}
