use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use models::booking::{self, BookingStatus};
use serde::Deserialize;
use tracing::info;

use service::booking_service::{self, BookingFilter, BookingStats, BookingUpdate, NewBooking};
use service::pagination::{Page, Pagination};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, Default, utoipa::IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Public booking form. The notification emails go out in the background
/// once the record is stored.
#[utoipa::path(
    post, path = "/booking", tag = "bookings",
    request_body = crate::openapi::BookingRequestDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<NewBooking>,
) -> Result<(StatusCode, Json<booking::Model>), JsonApiError> {
    let created = booking_service::create_booking(&state.db, input).await?;
    let notifier = state.notifier.clone();
    let record = created.clone();
    tokio::spawn(async move {
        let report = notifier.booking_created(&record).await;
        info!(booking_id = %record.booking_id, sent = report.sent, failed = report.failed, "booking notifications dispatched");
    });
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/bookings", tag = "bookings", params(BookingListQuery), responses((status = 200, description = "List OK"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(q): ApiQuery<BookingListQuery>,
) -> Result<Json<Page<booking::Model>>, JsonApiError> {
    let filter = BookingFilter { status: q.status, search: q.search, date_from: q.date_from, date_to: q.date_to };
    let page = booking_service::list_bookings(&state.db, filter, Pagination::from_query(q.page, q.per_page)).await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/bookings/stats", tag = "bookings", responses((status = 200, description = "Dashboard figures"), (status = 401, description = "Unauthorized")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<BookingStats>, JsonApiError> {
    Ok(Json(booking_service::booking_stats(&state.db).await?))
}

#[utoipa::path(get, path = "/booking/{booking_id}", tag = "bookings", params(("booking_id" = String, Path, description = "Public booking reference")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(booking_id): Path<String>) -> Result<Json<booking::Model>, JsonApiError> {
    Ok(Json(booking_service::get_booking(&state.db, &booking_id).await?))
}

#[utoipa::path(
    put, path = "/booking/{booking_id}", tag = "bookings",
    params(("booking_id" = String, Path, description = "Public booking reference")),
    request_body = crate::openapi::BookingUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(booking_id): Path<String>,
    ApiJson(input): ApiJson<BookingUpdate>,
) -> Result<Json<booking::Model>, JsonApiError> {
    Ok(Json(booking_service::update_booking(&state.db, &booking_id, input).await?))
}

#[utoipa::path(delete, path = "/booking/{booking_id}", tag = "bookings", params(("booking_id" = String, Path, description = "Public booking reference")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(booking_id): Path<String>) -> Result<StatusCode, JsonApiError> {
    booking_service::delete_booking(&state.db, &booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
