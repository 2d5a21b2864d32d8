use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Query, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const RESTLI_HEADER: &str = "x-restli-protocol-version";

/// Credentials and fixtures the mock provider accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// The authorization code handed out by `/oauth/v2/authorization`.
    pub code: String,
    pub expires_in: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            client_id: "mock-client".to_string(),
            client_secret: "mock-secret".to_string(),
            redirect_uri: "http://localhost/callback".to_string(),
            code: "mock-code".to_string(),
            expires_in: 5_184_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(rename = "localizedFirstName")]
    pub first_name: String,
    #[serde(rename = "localizedLastName")]
    pub last_name: String,
}

#[derive(Debug, Default)]
pub struct Provider {
    pub config: MockConfig,
    pub tokens: HashSet<String>,
    /// Calls to the token endpoint, accepted or not.
    pub token_requests: usize,
    /// Bodies of the shares created so far.
    pub posts: Vec<Value>,
}

pub type Db = Arc<RwLock<Provider>>;

/// Fresh provider state. Tests keep a handle to inspect what was received.
pub fn provider(config: MockConfig) -> Db {
    Arc::new(RwLock::new(Provider {
        config,
        ..Provider::default()
    }))
}

pub fn app(config: MockConfig) -> Router {
    router(provider(config))
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/oauth/v2/authorization", get(authorize))
        .route("/oauth/v2/accessToken", get(access_token))
        .route("/v2/me", get(me))
        .route("/v2/ugcPosts", post(create_post))
        .route("/v2/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    serve(listener, provider(config)).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

fn oauth_error(status: StatusCode, description: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"error": "invalid_request", "error_description": description})),
    )
}

fn api_error(status: StatusCode, code: u32, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"serviceErrorCode": code, "message": message, "status": status.as_u16()})),
    )
}

async fn authorize(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let provider = db.read().await;
    let config = &provider.config;

    if params.get("response_type").map(String::as_str) != Some("code") {
        return oauth_error(StatusCode::BAD_REQUEST, "response_type must be code");
    }
    if params.get("client_id") != Some(&config.client_id) {
        return oauth_error(StatusCode::UNAUTHORIZED, "unknown client_id");
    }
    if params.get("redirect_uri") != Some(&config.redirect_uri) {
        return oauth_error(StatusCode::BAD_REQUEST, "redirect_uri does not match");
    }

    let state = params.get("state").cloned().unwrap_or_default();
    let redirect = format!("{}?code={}&state={}", config.redirect_uri, config.code, state);
    (StatusCode::OK, Json(json!({"redirect": redirect})))
}

async fn access_token(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut provider = db.write().await;
    provider.token_requests += 1;
    let config = provider.config.clone();

    if params.get("grant_type").map(String::as_str) != Some("authorization_code") {
        return oauth_error(StatusCode::BAD_REQUEST, "grant_type must be authorization_code");
    }
    if params.get("client_id") != Some(&config.client_id)
        || params.get("client_secret") != Some(&config.client_secret)
    {
        return oauth_error(StatusCode::UNAUTHORIZED, "invalid client credentials");
    }
    if params.get("redirect_uri") != Some(&config.redirect_uri)
        || params.get("code") != Some(&config.code)
    {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "Unable to retrieve access token: appid/redirect uri/code verifier does not match authorization code",
        );
    }

    let token = format!("AQ{}", Uuid::new_v4().simple());
    provider.tokens.insert(token.clone());
    info!(client_id = %config.client_id, "issued access token");
    let body = TokenResponse {
        access_token: token,
        expires_in: config.expires_in,
    };
    (StatusCode::OK, Json(json!(body)))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authorized(db: &Db, headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    let provider = db.read().await;
    match bearer(headers) {
        Some(token) if provider.tokens.contains(token) => Ok(token.to_string()),
        _ => Err(api_error(StatusCode::UNAUTHORIZED, 65600, "Invalid access token")),
    }
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Err(err) = authorized(&db, &headers).await {
        return err;
    }
    let profile = Profile {
        id: "mock-member".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    };
    (StatusCode::OK, Json(json!(profile)))
}

async fn create_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(err) = authorized(&db, &headers).await {
        return err;
    }
    let version = headers.get(RESTLI_HEADER).and_then(|v| v.to_str().ok());
    if version != Some("2.0.0") {
        return api_error(
            StatusCode::BAD_REQUEST,
            100,
            "X-Restli-Protocol-Version 2.0.0 is required",
        );
    }
    if body.get("author").and_then(Value::as_str).is_none() {
        return api_error(StatusCode::UNPROCESSABLE_ENTITY, 100, "author is required");
    }

    let id = format!("urn:li:share:{}", Uuid::new_v4().as_u128() % 10_000_000_000);
    db.write().await.posts.push(body);
    (StatusCode::CREATED, Json(json!({"id": id})))
}

/// Reflects the request back so clients can assert on what they sent.
async fn echo(
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: String,
) -> Json<Value> {
    let echoed: BTreeMap<&str, &str> =
        ["authorization", "cache-control", "content-type", RESTLI_HEADER]
            .into_iter()
            .filter_map(|name| Some((name, headers.get(name)?.to_str().ok()?)))
            .collect();

    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": echoed,
        "body": body,
    }))
}
