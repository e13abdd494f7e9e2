use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::blog;

use service::auth::domain::Principal;
use service::blog_service::{self, NewPost, PostUpdate, Visibility};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::{actor_id, ServerState};

/// Published posts, newest publication first.
#[utoipa::path(get, path = "/blog", tag = "blog", responses((status = 200, description = "Published posts")))]
pub async fn list_published(State(state): State<ServerState>) -> Result<Json<Vec<blog::Model>>, JsonApiError> {
    Ok(Json(blog_service::list_posts(&state.db, Visibility::PublishedOnly).await?))
}

#[utoipa::path(get, path = "/blog/{slug}", tag = "blog", params(("slug" = String, Path, description = "Post slug")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_published(State(state): State<ServerState>, Path(slug): Path<String>) -> Result<Json<blog::Model>, JsonApiError> {
    Ok(Json(blog_service::get_post(&state.db, &slug, Visibility::PublishedOnly).await?))
}

#[utoipa::path(get, path = "/admin/blog", tag = "blog", responses((status = 200, description = "All posts including drafts"), (status = 401, description = "Unauthorized")))]
pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<blog::Model>>, JsonApiError> {
    Ok(Json(blog_service::list_posts(&state.db, Visibility::All).await?))
}

#[utoipa::path(get, path = "/admin/blog/{slug}", tag = "blog", params(("slug" = String, Path, description = "Post slug")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get_any(State(state): State<ServerState>, Path(slug): Path<String>) -> Result<Json<blog::Model>, JsonApiError> {
    Ok(Json(blog_service::get_post(&state.db, &slug, Visibility::All).await?))
}

/// The signed-in admin becomes the author.
#[utoipa::path(
    post, path = "/blog", tag = "blog",
    request_body = crate::openapi::PostRequestDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Conflict"))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewPost>,
) -> Result<(StatusCode, Json<blog::Model>), JsonApiError> {
    let author = actor_id(&principal)?;
    let created = blog_service::create_post(&state.db, author, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/blog/{slug}", tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    request_body = crate::openapi::PostRequestDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict"))
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    ApiJson(input): ApiJson<PostUpdate>,
) -> Result<Json<blog::Model>, JsonApiError> {
    Ok(Json(blog_service::update_post(&state.db, &slug, input).await?))
}

#[utoipa::path(delete, path = "/blog/{slug}", tag = "blog", params(("slug" = String, Path, description = "Post slug")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<ServerState>, Path(slug): Path<String>) -> Result<StatusCode, JsonApiError> {
    blog_service::delete_post(&state.db, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
