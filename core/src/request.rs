//! Request building and dispatch.
//!
//! # Design
//! Building and dispatching are separate steps, so the facade can record the
//! exact request before it goes out and tests can inspect a built request
//! without any I/O. `dispatch` never fails: a transport error is folded into
//! the returned `ApiResult`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::http::{HttpRequest, Transport};
use crate::response::{parse_response, ApiResult};
use crate::types::{AccessToken, OutboundRequest, Payload};

/// Value of the `X-Restli-Protocol-Version` header sent with every request.
pub const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

/// Builds requests against a default API base and sends them through a
/// `Transport`.
#[derive(Clone)]
pub struct RequestExecutor {
    api_base: String,
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    pub fn new(api_base: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn build(&self, request: &OutboundRequest, token: &AccessToken) -> HttpRequest {
        let base = request
            .base_url_override
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(&self.api_base);
        let mut url = format!("{base}/{}", request.endpoint.trim_start_matches('/'));

        let body = if request.method.uses_query_string() {
            if !request.payload.is_empty() {
                url.push('?');
                url.push_str(&build_query(&request.payload));
            }
            None
        } else {
            Some(Value::Object(request.payload.clone()).to_string())
        };

        HttpRequest {
            method: request.method,
            url,
            headers: default_headers(token),
            body,
        }
    }

    pub fn dispatch(&self, request: &HttpRequest) -> ApiResult {
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.transport.send(request) {
            Ok(response) => parse_response(&response),
            Err(err) => {
                warn!(method = %request.method, url = %request.url, error = %err, "transport failure");
                ApiResult::from_transport_error(&err)
            }
        }
    }

    pub fn execute(&self, request: &OutboundRequest, token: &AccessToken) -> ApiResult {
        self.dispatch(&self.build(request, token))
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

fn default_headers(token: &AccessToken) -> Vec<(String, String)> {
    vec![
        ("Authorization".to_string(), format!("Bearer {}", token.value)),
        ("Cache-Control".to_string(), "no-cache".to_string()),
        (
            "X-Restli-Protocol-Version".to_string(),
            RESTLI_PROTOCOL_VERSION.to_string(),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]
}

/// Serialize a payload the way PHP's `http_build_query` does: nulls are
/// dropped, booleans become `1`/`0`, and nested arrays and objects expand to
/// bracketed keys (`ids[0]=a&ids[1]=b`).
pub fn build_query(payload: &Payload) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        append_value(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_value(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            serializer.append_pair(key, if *flag { "1" } else { "0" });
        }
        Value::Number(number) => {
            serializer.append_pair(key, &number.to_string());
        }
        Value::String(text) => {
            serializer.append_pair(key, text);
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_value(serializer, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                append_value(serializer, &format!("{key}[{field}]"), item);
            }
        }
    }
}
