use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use models::contact;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use service::contact_service::{self, NewContact};
use service::pagination::{Page, Pagination};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, Default, utoipa::IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[utoipa::path(
    post, path = "/contact", tag = "contacts",
    request_body = crate::openapi::ContactRequestDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<NewContact>,
) -> Result<(StatusCode, Json<contact::Model>), JsonApiError> {
    let created = contact_service::create_contact(&state.db, input).await?;
    let notifier = state.notifier.clone();
    let record = created.clone();
    tokio::spawn(async move {
        let report = notifier.contact_created(&record).await;
        info!(contact_id = %record.id, sent = report.sent, failed = report.failed, "contact notifications dispatched");
    });
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/admin/contacts", tag = "contacts", params(PageQuery), responses((status = 200, description = "List OK"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(q): ApiQuery<PageQuery>,
) -> Result<Json<Page<contact::Model>>, JsonApiError> {
    Ok(Json(contact_service::list_contacts(&state.db, Pagination::from_query(q.page, q.per_page)).await?))
}

#[utoipa::path(get, path = "/admin/contacts/{id}", tag = "contacts", params(("id" = Uuid, Path, description = "Contact id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<contact::Model>, JsonApiError> {
    Ok(Json(contact_service::get_contact(&state.db, id).await?))
}

#[utoipa::path(delete, path = "/admin/contacts/{id}", tag = "contacts", params(("id" = Uuid, Path, description = "Contact id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    contact_service::delete_contact(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
