use axum::extract::{Path, State};
use axum::{Extension, Json};
use models::user::{self, Role};
use serde::Deserialize;
use uuid::Uuid;

use service::auth::domain::Principal;
use service::user_service;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::{actor_id, ServerState};

#[derive(Debug, Deserialize)]
pub struct RoleInput {
    pub role: Role,
}

#[utoipa::path(get, path = "/admin/users", tag = "users", responses((status = 200, description = "All accounts"), (status = 401, description = "Unauthorized")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<user::Model>>, JsonApiError> {
    Ok(Json(user_service::list_users(&state.db).await?))
}

#[utoipa::path(
    put, path = "/admin/users/{id}/role", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = crate::openapi::RoleRequestDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn set_role(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<RoleInput>,
) -> Result<Json<user::Model>, JsonApiError> {
    let actor = actor_id(&principal)?;
    Ok(Json(user_service::set_role(&state.db, actor, id, input.role).await?))
}
