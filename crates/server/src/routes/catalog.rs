use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use models::{service as service_entity, sub_service};
use uuid::Uuid;

use service::catalog_service::{self, CatalogEntry, NewService, NewSubService, ServiceUpdate, SubServiceUpdate};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::ServerState;

/// Services with their active options, for the booking form.
#[utoipa::path(get, path = "/services", tag = "catalog", responses((status = 200, description = "Public catalog")))]
pub async fn public_catalog(State(state): State<ServerState>) -> Result<Json<Vec<CatalogEntry>>, JsonApiError> {
    Ok(Json(catalog_service::public_catalog(&state.db).await?))
}

#[utoipa::path(
    post, path = "/admin/services", tag = "catalog",
    request_body = crate::openapi::ServiceRequestDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Conflict"))
)]
pub async fn create_service(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<NewService>,
) -> Result<(StatusCode, Json<service_entity::Model>), JsonApiError> {
    let created = catalog_service::create_service(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/admin/services", tag = "catalog", responses((status = 200, description = "List OK")))]
pub async fn list_services(State(state): State<ServerState>) -> Result<Json<Vec<service_entity::Model>>, JsonApiError> {
    Ok(Json(catalog_service::list_services(&state.db).await?))
}

#[utoipa::path(get, path = "/admin/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_service(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<service_entity::Model>, JsonApiError> {
    Ok(Json(catalog_service::get_service(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/admin/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ServiceRequestDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict"))
)]
pub async fn update_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<ServiceUpdate>,
) -> Result<Json<service_entity::Model>, JsonApiError> {
    Ok(Json(catalog_service::update_service(&state.db, id, input).await?))
}

/// Removes the service and every sub-service under it.
#[utoipa::path(delete, path = "/admin/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_service(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_service(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/admin/services/{id}/sub-services", tag = "catalog",
    params(("id" = Uuid, Path, description = "Parent service id")),
    request_body = crate::openapi::SubServiceRequestDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Parent Not Found"))
)]
pub async fn create_sub_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<NewSubService>,
) -> Result<(StatusCode, Json<sub_service::Model>), JsonApiError> {
    let created = catalog_service::create_sub_service(&state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/admin/services/{id}/sub-services", tag = "catalog", params(("id" = Uuid, Path, description = "Parent service id")), responses((status = 200, description = "List OK"), (status = 404, description = "Parent Not Found")))]
pub async fn list_sub_services(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<Vec<sub_service::Model>>, JsonApiError> {
    Ok(Json(catalog_service::list_sub_services(&state.db, id).await?))
}

#[utoipa::path(get, path = "/admin/services/{id}/sub-services/{sub_id}", tag = "catalog", params(("id" = Uuid, Path, description = "Parent service id"), ("sub_id" = Uuid, Path, description = "Sub-service id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_sub_service(
    State(state): State<ServerState>,
    Path((id, sub_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<sub_service::Model>, JsonApiError> {
    Ok(Json(catalog_service::get_sub_service(&state.db, id, sub_id).await?))
}

#[utoipa::path(
    put, path = "/admin/services/{id}/sub-services/{sub_id}", tag = "catalog",
    params(("id" = Uuid, Path, description = "Parent service id"), ("sub_id" = Uuid, Path, description = "Sub-service id")),
    request_body = crate::openapi::SubServiceRequestDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update_sub_service(
    State(state): State<ServerState>,
    Path((id, sub_id)): Path<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<SubServiceUpdate>,
) -> Result<Json<sub_service::Model>, JsonApiError> {
    Ok(Json(catalog_service::update_sub_service(&state.db, id, sub_id, input).await?))
}

#[utoipa::path(delete, path = "/admin/services/{id}/sub-services/{sub_id}", tag = "catalog", params(("id" = Uuid, Path, description = "Parent service id"), ("sub_id" = Uuid, Path, description = "Sub-service id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_sub_service(
    State(state): State<ServerState>,
    Path((id, sub_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_sub_service(&state.db, id, sub_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
