//! LinkedIn API client facade.
//!
//! # Design
//! `LinkedInClient` owns the immutable credentials, the current access token
//! and a `RequestExecutor`. Every call goes through the same path: build the
//! `HttpRequest`, record it as the last request, dispatch it, and hand back
//! the parsed `ApiResult`. Nothing on that path returns `Err`; callers
//! inspect the result's status and error message instead.
//!
//! Token exchange is serialized by its own lock, so concurrent callers with
//! the same authorization code produce a single network call and the later
//! ones receive the cached token.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::config::{ClientConfig, ClientOptions};
use crate::http::{HttpMethod, Transport};
use crate::request::RequestExecutor;
use crate::response::{ApiResult, OK_STATUS};
use crate::transport::UreqTransport;
use crate::types::{AccessToken, LastRequest, OutboundRequest, Payload};

/// Client for LinkedIn's OAuth and resource endpoints.
#[derive(Debug)]
pub struct LinkedInClient {
    config: ClientConfig,
    oauth_base: String,
    executor: RequestExecutor,
    token: Mutex<Option<AccessToken>>,
    last_request: Mutex<Option<LastRequest>>,
    exchange_lock: Mutex<()>,
}

impl LinkedInClient {
    /// Client against the production endpoints using a ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_options(config, ClientOptions::default())
    }

    pub fn with_options(config: ClientConfig, options: ClientOptions) -> Self {
        let transport = Arc::new(UreqTransport::new(options.timeout));
        Self::assemble(config, &options, transport)
    }

    /// Client with a caller-supplied transport. Only the base URLs of
    /// `options` apply; the transport owns its timeouts.
    pub fn with_transport(
        config: ClientConfig,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        if let Some(timeout) = options.timeout {
            debug!(?timeout, "custom transport in use, ignoring configured timeout");
        }
        Self::assemble(config, &options, transport)
    }

    fn assemble(
        config: ClientConfig,
        options: &ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            oauth_base: options.oauth_base_url.trim_end_matches('/').to_string(),
            executor: RequestExecutor::new(&options.api_base_url, transport),
            token: Mutex::new(None),
            last_request: Mutex::new(None),
            exchange_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL to send the user to for consent, using the current unix time as
    /// the `state` marker.
    pub fn authorization_url(&self, scopes: &[&str]) -> String {
        self.authorization_url_with_state(scopes, &Utc::now().timestamp().to_string())
    }

    /// URL to send the user to for consent. `scope` is omitted when `scopes`
    /// is empty.
    pub fn authorization_url_with_state(&self, scopes: &[&str], state: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", self.config.redirect_uri())
            .append_pair("state", state);
        if !scopes.is_empty() {
            query.append_pair("scope", &scopes.join(" "));
        }
        format!("{}/authorization?{}", self.oauth_base, query.finish())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// When a token is already held it is returned without a network call.
    /// On a 200 result the returned payload becomes the client's token.
    pub fn exchange_code(&self, code: &str) -> ApiResult {
        let _guard = self.exchange_lock.lock();

        if let Some(token) = self.access_token() {
            return ApiResult::from_token(&token);
        }

        let payload: Payload = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri()),
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::from(value)))
        .collect();

        let request = OutboundRequest::new(HttpMethod::Get, "accessToken")
            .with_payload(payload)
            .with_base_url(self.oauth_base.as_str());
        let result = self.request(request);

        if result.status_code() == OK_STATUS {
            match result.deserialize_payload::<AccessToken>() {
                Ok(token) => {
                    info!(expires_in = token.expires_in_seconds, "stored access token");
                    *self.token.lock() = Some(token);
                }
                Err(err) => warn!(error = %err, "token endpoint returned an unusable payload"),
            }
        }
        result
    }

    /// The current token, if one has been obtained or set.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.token.lock().clone().filter(|token| !token.is_empty())
    }

    /// Replace the current token without validation.
    pub fn set_access_token(&self, token: AccessToken) {
        *self.token.lock() = Some(token);
    }

    pub fn last_request(&self) -> Option<LastRequest> {
        self.last_request.lock().clone()
    }

    pub fn get(&self, endpoint: &str, payload: Payload) -> ApiResult {
        self.request(OutboundRequest::new(HttpMethod::Get, endpoint).with_payload(payload))
    }

    pub fn post(&self, endpoint: &str, payload: Payload) -> ApiResult {
        self.request(OutboundRequest::new(HttpMethod::Post, endpoint).with_payload(payload))
    }

    pub fn put(&self, endpoint: &str, payload: Payload) -> ApiResult {
        self.request(OutboundRequest::new(HttpMethod::Put, endpoint).with_payload(payload))
    }

    pub fn delete(&self, endpoint: &str, payload: Payload) -> ApiResult {
        self.request(OutboundRequest::new(HttpMethod::Delete, endpoint).with_payload(payload))
    }

    /// Issue an arbitrary request with the current token.
    pub fn request(&self, request: OutboundRequest) -> ApiResult {
        let token = self.token.lock().clone().unwrap_or_default();
        let http = self.executor.build(&request, &token);
        *self.last_request.lock() = Some(LastRequest {
            method: http.method,
            url: http.url.clone(),
            payload: request.payload,
            headers: http.headers.clone(),
        });
        self.executor.dispatch(&http)
    }
}
