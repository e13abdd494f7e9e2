use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use models::db::DbHandle;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::warn;

use service::auth::domain::{Account, Principal};
use service::auth::repo::seaorm::SeaOrmUserDirectory;
use service::auth::AccessGate;
use service::notify::Notifier;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

pub const SESSION_COOKIE: &str = "session_token";

pub type Gate = AccessGate<SeaOrmUserDirectory>;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub db_handle: Arc<DbHandle>,
    pub gate: Arc<Gate>,
    pub notifier: Notifier,
}

impl ServerState {
    pub fn new(db_handle: Arc<DbHandle>, db: DatabaseConnection, auth: &configs::AuthConfig, notifier: Notifier) -> Self {
        let repo = Arc::new(SeaOrmUserDirectory { db: db.clone() });
        Self { db, db_handle, gate: Arc::new(AccessGate::new(repo, auth)), notifier }
    }
}

/// `Authorization: Bearer <token>` first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return value.strip_prefix("Bearer ").map(|t| t.trim().to_string());
    }
    CookieJar::from_headers(headers).get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Admin gate for every privileged route. Runs before any body extraction,
/// so unauthorised callers get 401 regardless of what they sent. The
/// resolved principal is handed to the handler as a request extension.
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = session_token(req.headers());
    let principal = state.gate.require_admin(token.as_deref()).await.map_err(|e| {
        warn!(path = %req.uri().path(), method = %req.method(), code = e.code(), "admin gate refused request");
        JsonApiError::from(e)
    })?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SessionInput {
    pub token: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Verify the identity token (body `token`, or the usual header/cookie) and
/// upsert the matching user. The token is echoed back as the session cookie.
#[utoipa::path(post, path = "/auth/session", tag = "auth", request_body = crate::openapi::SessionRequest, responses((status = 200, description = "Signed in"), (status = 401, description = "Unauthorized")))]
pub async fn sign_in(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Option<ApiJson<SessionInput>>,
) -> Result<(CookieJar, Json<Account>), JsonApiError> {
    let token = body
        .and_then(|ApiJson(b)| b.token)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| session_token(&headers))
        .ok_or_else(JsonApiError::unauthorized)?;
    let account = state.gate.sign_in(&token).await?;
    Ok((jar.add(session_cookie(token)), Json(account)))
}

pub async fn sign_out(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current principal"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<Principal>, JsonApiError> {
    let token = session_token(&headers);
    let principal = state.gate.resolve(token.as_deref()).await?;
    Ok(Json(principal))
}

/// Id of the admin making the request.
pub(crate) fn actor_id(principal: &Principal) -> Result<uuid::Uuid, JsonApiError> {
    principal.user_id.ok_or_else(JsonApiError::unauthorized)
}
