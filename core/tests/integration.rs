//! Full OAuth and resource flow against the live mock provider.
//!
//! # Design
//! Starts the mock server on a random port, then drives `LinkedInClient`
//! over real HTTP with the default ureq transport: consent URL, code
//! exchange, and authenticated resource calls.

use std::net::SocketAddr;
use std::time::Duration;

use linkedin_core::{
    AccessToken, ClientConfig, ClientOptions, ErrorKind, HttpMethod, LinkedInClient,
    OutboundRequest, Payload,
};
use mock_server::{Db, MockConfig};
use serde_json::{json, Value};

fn start_server() -> (SocketAddr, Db) {
    let db = mock_server::provider(MockConfig::default());
    let served = db.clone();
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, served).await
        })
        .unwrap();
    });

    (addr, db)
}

fn client_for(addr: SocketAddr) -> LinkedInClient {
    let mock = MockConfig::default();
    let config = ClientConfig::new(mock.client_id, mock.client_secret, mock.redirect_uri);
    let options = ClientOptions::default()
        .with_oauth_base_url(format!("http://{addr}/oauth/v2"))
        .with_api_base_url(format!("http://{addr}/v2"))
        .with_timeout(Duration::from_secs(5));
    LinkedInClient::with_options(config, options)
}

fn payload(value: Value) -> Payload {
    value.as_object().unwrap().clone()
}

/// Follow the consent URL the way a browser would and pull the code out of
/// the redirect.
fn consent(url: &str) -> (String, String) {
    let mut response = ureq::get(url).call().unwrap();
    let body: Value = serde_json::from_str(&response.body_mut().read_to_string().unwrap()).unwrap();
    let redirect = url::Url::parse(body["redirect"].as_str().unwrap()).unwrap();
    let find = |key: &str| {
        redirect
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .unwrap()
    };
    (find("code"), find("state"))
}

#[test]
fn oauth_and_resource_lifecycle() {
    let (addr, db) = start_server();
    let client = client_for(addr);

    // Step 1: resources are rejected before a token exists.
    let denied = client.get("me", Payload::new());
    assert_eq!(denied.status_code(), 401);
    assert_eq!(denied.http_status(), Some(401));
    assert_eq!(denied.error_message(), Some("Invalid access token"));
    assert_eq!(denied.error_kind(), Some(ErrorKind::Api));

    // Step 2: consent and pick up the code.
    let url = client.authorization_url_with_state(&["r_liteprofile", "w_member_social"], "777");
    let (code, state) = consent(&url);
    assert_eq!(code, "mock-code");
    assert_eq!(state, "777");

    // Step 3: exchange the code.
    let exchanged = client.exchange_code(&code);
    assert_eq!(exchanged.status_code(), 200, "{:?}", exchanged.error_message());
    let token = client.access_token().expect("token stored after exchange");
    assert!(token.value.starts_with("AQ"));
    assert_eq!(token.expires_in_seconds, 5_184_000);
    let last = client.last_request().unwrap();
    assert!(last.url.contains("/oauth/v2/accessToken?grant_type=authorization_code"));

    // Step 4: a second exchange returns the cached token.
    let again = client.exchange_code("another-code");
    assert_eq!(again.payload().unwrap()["access_token"], token.value.as_str());
    assert!(again.http_status().is_none());
    assert_eq!(db.blocking_read().token_requests, 1);

    // Step 5: profile with the bearer token.
    let me = client.get("me", Payload::new());
    assert!(me.is_success(), "{:?}", me.error_message());
    assert_eq!(me.payload().unwrap()["localizedFirstName"], "Ada");
    assert!(me
        .headers()
        .iter()
        .any(|h| h.to_ascii_lowercase().starts_with("content-type: application/json")));

    // Step 6: create a share; the provider's 201 is kept as the HTTP status.
    let share = client.post(
        "ugcPosts",
        payload(json!({"author": "urn:li:person:mock-member", "lifecycleState": "PUBLISHED"})),
    );
    assert_eq!(share.status_code(), 200);
    assert_eq!(share.http_status(), Some(201));
    assert!(share.payload().unwrap()["id"]
        .as_str()
        .unwrap()
        .starts_with("urn:li:share:"));
    {
        let provider = db.blocking_read();
        assert_eq!(provider.posts.len(), 1);
        assert_eq!(provider.posts[0]["author"], "urn:li:person:mock-member");
        assert_eq!(provider.posts[0]["lifecycleState"], "PUBLISHED");
    }

    // Step 7: a share without an author surfaces the provider's error.
    let invalid = client.post("ugcPosts", Payload::new());
    assert_eq!(invalid.status_code(), 422);
    assert_eq!(invalid.error_message(), Some("author is required"));
    assert_eq!(db.blocking_read().posts.len(), 1);
}

#[test]
fn requests_reach_the_wire_as_built() {
    let (addr, _) = start_server();
    let client = client_for(addr);
    client.set_access_token(AccessToken::new("wire-token", 60));

    let echoed = client.get("echo", payload(json!({"q": "rust engineer", "start": 0})));
    let body = echoed.payload().unwrap();
    assert_eq!(body["method"], "GET");
    assert_eq!(body["query"], "q=rust+engineer&start=0");
    assert_eq!(body["body"], "");
    assert_eq!(body["headers"]["authorization"], "Bearer wire-token");
    assert_eq!(body["headers"]["cache-control"], "no-cache");
    assert_eq!(body["headers"]["content-type"], "application/json");
    assert_eq!(body["headers"]["x-restli-protocol-version"], "2.0.0");

    let echoed = client.put("echo", payload(json!({"text": "edited"})));
    let body = echoed.payload().unwrap();
    assert_eq!(body["method"], "PUT");
    assert!(body["query"].is_null());
    assert_eq!(body["body"], r#"{"text":"edited"}"#);

    let echoed = client.delete("echo", Payload::new());
    let body = echoed.payload().unwrap();
    assert_eq!(body["method"], "DELETE");
    assert!(body["query"].is_null());

    let echoed = client.request(
        OutboundRequest::new(HttpMethod::Get, "echo").with_base_url(format!("http://{addr}/v2/")),
    );
    assert_eq!(echoed.payload().unwrap()["method"], "GET");
}

#[test]
fn wrong_code_is_reported_and_nothing_is_stored() {
    let (addr, db) = start_server();
    let client = client_for(addr);

    let result = client.exchange_code("stale-code");
    assert_eq!(result.status_code(), 403);
    assert_eq!(result.http_status(), Some(400));
    assert!(result
        .error_message()
        .unwrap()
        .starts_with("Unable to retrieve access token"));
    assert!(client.access_token().is_none());

    client.exchange_code("stale-code");
    assert_eq!(db.blocking_read().token_requests, 2);
}

#[test]
fn unreachable_provider_yields_transport_result() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let result = client.exchange_code("mock-code");

    assert_eq!(result.error_kind(), Some(ErrorKind::Transport));
    assert!(result.error_message().is_some());
    assert_eq!(result.payload().unwrap()["error"], "transport_error");
    assert!(client.access_token().is_none());
}
