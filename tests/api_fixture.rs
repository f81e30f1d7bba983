//! End-to-end tests of the API client and dashboard cache against a local
//! fixture server.

use arbilo::Error;
use arbilo::api::{ApiClient, ApiClientBuilder};
use arbilo::auth::{AuthContext, RecordId, SessionKind};
use arbilo::dashboard::{DashboardCache, RefreshOutcome};
use arbilo::storage::{Persistence, TokenStore};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "tok-1";

#[derive(Clone, Default)]
struct Fixture {
    inner: Arc<Mutex<FixtureState>>,
}

#[derive(Default)]
struct FixtureState {
    pairs_status: Option<StatusCode>,
    reject_track: bool,
    toggled: Vec<String>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn pairs(State(fixture): State<Fixture>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = fixture.inner.lock().pairs_status {
        return (status, "upstream exploded").into_response();
    }
    Json(json!({
        "results": [
            {
                "pair": "BTC/USDT",
                "coin1": "BTC",
                "coin2": "USDT",
                "minExchange": "Kraken",
                "minPrice1": "64000.5",
                "minPrice2": 1,
                "maxExchange": "Binance",
                "maxPrice1": 64500,
                "maxPrice2": 1,
                "profitPercentage": 0.78
            },
            {
                "pair": "ETH/USDT",
                "minExchange": "OKX",
                "maxExchange": "Bybit",
                "profitPercentage": "1.2"
            }
        ]
    }))
    .into_response()
}

async fn track(State(fixture): State<Fixture>, headers: HeaderMap) -> Response {
    if !authorized(&headers) || fixture.inner.lock().reject_track {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" })))
            .into_response();
    }
    Json(json!({
        "BTC": {
            "lowestExchange": "A",
            "lowestPrice": 100,
            "highestExchange": "B",
            "highestPrice": 110,
            "profitPercentage": 9.99
        }
    }))
    .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("admin@arbilo.com"), Some("secret")) => Json(json!({
            "token": "admin-tok",
            "user": { "_id": "a1", "name": "Root", "email": "admin@arbilo.com", "role": "admin" }
        }))
        .into_response(),
        (Some("ada@arbilo.com"), Some("secret")) => Json(json!({
            "token": TOKEN,
            "user": { "id": 7, "name": "Ada", "email": "ada@arbilo.com" }
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn signup() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Email already registered" })),
    )
        .into_response()
}

async fn users(headers: HeaderMap) -> Response {
    if headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        != Some("Bearer admin-tok")
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "users": [
            { "_id": "u1", "name": "Ada", "email": "ada@arbilo.com", "isActive": true },
            { "_id": "u2", "name": "Bob", "email": "bob@arbilo.com", "isActive": false },
            "not a user"
        ]
    }))
    .into_response()
}

async fn toggle_user(State(fixture): State<Fixture>, Path(id): Path<String>) -> Response {
    fixture.inner.lock().toggled.push(id);
    Json(json!({ "message": "User status updated" })).into_response()
}

async fn spawn_server(fixture: Fixture) -> String {
    let router = Router::new()
        .route("/api/arbitrage", get(pairs))
        .route("/api/arbitrage/arbitrack", get(track))
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/admin/users", get(users))
        .route("/api/admin/users/:id/toggle-active", put(toggle_user))
        .with_state(fixture);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClientBuilder::new().base_url(base_url).build().unwrap()
}

fn signed_in_store() -> TokenStore {
    let store = TokenStore::in_memory();
    store
        .save_session(
            SessionKind::User,
            TOKEN,
            r#"{"name":"Ada","email":"ada@arbilo.com"}"#,
            Persistence::Durable,
        )
        .unwrap();
    store
}

fn cache(base_url: &str, tokens: TokenStore) -> DashboardCache {
    DashboardCache::new(
        Arc::new(client(base_url)),
        tokens,
        Duration::from_secs(300),
    )
}

#[tokio::test]
async fn test_refresh_commits_both_datasets() {
    let base_url = spawn_server(Fixture::default()).await;
    let cache = cache(&base_url, signed_in_store());

    let outcome = cache.refresh().await;
    assert_eq!(
        outcome,
        RefreshOutcome::Committed {
            pairs: 2,
            track: 1,
            partial: false
        }
    );

    let state = cache.snapshot();
    assert!(state.initialized);
    assert_eq!(state.error, None);
    assert_eq!(state.pair_rows[0].pair, "BTC/USDT");
    assert_eq!(state.pair_rows[0].min_price1.to_string(), "64000.5");
    assert_eq!(state.pair_rows[1].profit_percentage.to_string(), "1.2");

    let btc = &state.track_rows[0];
    assert_eq!(btc.coin1, "BTC");
    assert_eq!(btc.min_price1, "100.00");
    assert_eq!(btc.max_price1, "110.00");
    assert_eq!(btc.profit_percentage, "9.99");
}

#[tokio::test]
async fn test_failing_endpoint_is_isolated() {
    let fixture = Fixture::default();
    fixture.inner.lock().pairs_status = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let base_url = spawn_server(fixture).await;
    let cache = cache(&base_url, signed_in_store());

    let outcome = cache.refresh().await;
    assert_eq!(
        outcome,
        RefreshOutcome::Committed {
            pairs: 0,
            track: 1,
            partial: true
        }
    );
    assert_eq!(cache.snapshot().error, None);
}

#[tokio::test]
async fn test_rejected_token_signs_user_out() {
    let fixture = Fixture::default();
    fixture.inner.lock().reject_track = true;
    let base_url = spawn_server(fixture).await;
    let tokens = signed_in_store();
    let cache = cache(&base_url, tokens.clone());

    assert_eq!(cache.refresh().await, RefreshOutcome::Unauthenticated);
    assert_eq!(tokens.token(SessionKind::User), None);
    assert!(!cache.snapshot().initialized);

    let mut context = AuthContext::new(SessionKind::User, tokens);
    context.hydrate();
    assert!(!context.is_authenticated());
}

#[tokio::test]
async fn test_unreachable_server_keeps_stale_data() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cache = cache(&format!("http://{}", addr), signed_in_store());
    let outcome = cache.refresh().await;

    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    let state = cache.snapshot();
    assert!(state.initialized);
    assert!(state.error.is_some());
    assert!(state.pair_rows.is_empty());
}

#[tokio::test]
async fn test_login_and_error_mapping() {
    let base_url = spawn_server(Fixture::default()).await;
    let api = client(&base_url);

    let admin = api.login("admin@arbilo.com", "secret").await.unwrap();
    assert_eq!(admin.token, "admin-tok");
    assert_eq!(admin.user.id, RecordId::Text("a1".to_string()));
    assert!(admin.user.has_admin_role());

    let user = api.login("ada@arbilo.com", "secret").await.unwrap();
    assert_eq!(user.user.id, RecordId::Number(7));
    assert!(!user.user.has_admin_role());

    let denied = api.login("ada@arbilo.com", "wrong").await.unwrap_err();
    assert!(denied.is_unauthorized());

    let request = arbilo::api::models::SignupRequest {
        name: "Ada".to_string(),
        email: "ada@arbilo.com".to_string(),
        password: "secret".to_string(),
    };
    match api.signup(&request).await.unwrap_err() {
        Error::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email already registered");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_user_list_and_toggle() {
    let fixture = Fixture::default();
    let base_url = spawn_server(fixture.clone()).await;
    let api = client(&base_url);

    let users = api.list_users("admin-tok").await.unwrap();
    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["ada@arbilo.com", "bob@arbilo.com"]);
    assert_eq!(users[1].is_active, Some(false));

    assert!(api.list_users("bogus").await.unwrap_err().is_unauthorized());

    let response = api
        .toggle_user_active("admin-tok", &users[1].id)
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("User status updated"));
    assert_eq!(fixture.inner.lock().toggled, vec!["u2".to_string()]);
}
