use std::net::SocketAddr;

use configs::{AppConfig, AuthConfig, DatabaseConfig};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = AppConfig {
        database: DatabaseConfig { url: "sqlite::memory:".into(), max_connections: 1, min_connections: 1, ..Default::default() },
        auth: AuthConfig { client_secret: "test-secret".into(), admin_emails: vec!["owner@example.com".into()], ..Default::default() },
        ..Default::default()
    };
    let (app, _db) = server::build_app(&cfg).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

fn id_token(email: &str, exp: i64) -> String {
    let claims = json!({"sub": email, "email": email, "exp": exp});
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).expect("sign token")
}

#[tokio::test]
async fn e2e_public_health_and_docs() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");

    let res = client().get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/bookings/stats"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_sign_in_sets_session_cookie() -> anyhow::Result<()> {
    let app = start_server().await?;
    let now = chrono::Utc::now().timestamp();
    let res = client()
        .post(format!("{}/auth/session", app.base_url))
        .json(&json!({"token": id_token("owner@example.com", now + 600)}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let set_cookie = res.headers().get("set-cookie").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(set_cookie.contains("session_token="));
    assert!(set_cookie.contains("HttpOnly"));
    let account = res.json::<Value>().await?;
    assert_eq!(account["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn e2e_expired_token_is_unauthorized() -> anyhow::Result<()> {
    let app = start_server().await?;
    let now = chrono::Utc::now().timestamp();
    let res = reqwest::Client::new()
        .get(format!("{}/bookings", app.base_url))
        .header("Authorization", format!("Bearer {}", id_token("owner@example.com", now - 600)))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_public_booking_is_visible_to_admin() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let token = id_token("owner@example.com", chrono::Utc::now().timestamp() + 600);
    c.post(format!("{}/auth/session", app.base_url)).bearer_auth(&token).send().await?;

    let res = c
        .post(format!("{}/booking", app.base_url))
        .json(&json!({
            "fullName": "Alex Tenant",
            "email": "alex@example.com",
            "phone": "07700 900456",
            "serviceId": uuid::Uuid::new_v4(),
            "serviceName": "Man and Van",
            "notes": "Studio flat, third floor, no lift"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    let booking_id = created["bookingId"].as_str().unwrap_or_default().to_string();
    assert!(booking_id.starts_with("BK-"));

    let res = c.get(format!("{}/booking/{}", app.base_url, booking_id)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["fullName"], "Alex Tenant");
    Ok(())
}
