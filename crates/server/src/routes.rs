pub mod auth;
pub mod blog;
pub mod bookings;
pub mod catalog;
pub mod contacts;
pub mod users;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

/// Liveness plus a database ping. Stays 200 while the database is down so
/// load balancers can tell the process apart from its dependency.
#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, body = crate::openapi::HealthResponse)))]
pub async fn health(axum::extract::State(state): axum::extract::State<ServerState>) -> Json<Health> {
    let database = match state.db_handle.health_check().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(err = %e, "database health check failed");
            "down"
        }
    };
    Json(Health { status: "ok", database })
}

pub async fn metrics() -> impl IntoResponse {
    match common::metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, [(header::CONTENT_TYPE, "text/plain")], e),
    }
}

/// Build the full application router: public site endpoints, the admin
/// area behind the access gate, and the API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), auth::require_admin);

    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/booking", post(bookings::create))
        .route("/contact", post(contacts::create))
        .route("/services", get(catalog::public_catalog))
        .route("/auth/session", post(auth::sign_in).delete(auth::sign_out))
        .route("/auth/me", get(auth::me));

    // Blog paths are shared: reads are public, writes are admin only
    let blog_routes = Router::new()
        .route("/blog", get(blog::list_published).merge(post(blog::create).route_layer(gate.clone())))
        .route(
            "/blog/:slug",
            get(blog::get_published).merge(put(blog::update).delete(blog::delete).route_layer(gate.clone())),
        );

    // Admin routes
    let admin_routes = Router::new()
        .route("/bookings", get(bookings::list))
        .route("/bookings/stats", get(bookings::stats))
        .route("/booking/:booking_id", get(bookings::get).put(bookings::update).delete(bookings::delete))
        .route("/admin/contacts", get(contacts::list))
        .route("/admin/contacts/:id", get(contacts::get).delete(contacts::delete))
        .route("/admin/services", get(catalog::list_services).post(catalog::create_service))
        .route(
            "/admin/services/:id",
            get(catalog::get_service).put(catalog::update_service).delete(catalog::delete_service),
        )
        .route(
            "/admin/services/:id/sub-services",
            get(catalog::list_sub_services).post(catalog::create_sub_service),
        )
        .route(
            "/admin/services/:id/sub-services/:sub_id",
            get(catalog::get_sub_service).put(catalog::update_sub_service).delete(catalog::delete_sub_service),
        )
        .route("/admin/blog", get(blog::list_all))
        .route("/admin/blog/:slug", get(blog::get_any))
        .route("/admin/users", get(users::list))
        .route("/admin/users/:id/role", put(users::set_role))
        .route_layer(gate);

    public
        .merge(blog_routes)
        .merge(admin_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request at INFO, headers left out
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
