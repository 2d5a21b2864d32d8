//! Data carried between the facade, executor and caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::HttpMethod;

/// Request parameters: a JSON object, serialized as a query string for
/// GET/DELETE and as a JSON body otherwise.
pub type Payload = Map<String, Value>;

/// OAuth2 access token as returned by the token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    pub value: String,
    #[serde(rename = "expires_in", default)]
    pub expires_in_seconds: u64,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in_seconds: u64) -> Self {
        Self {
            value: value.into(),
            expires_in_seconds,
        }
    }

    /// A token with an empty value is treated as no token at all.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// A single API call, before URL and header resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    pub payload: Payload,
    /// Replaces the client's default API base for this call only.
    pub base_url_override: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            payload: Payload::new(),
            base_url_override: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }
}

/// Snapshot of the most recent request issued by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRequest {
    pub method: HttpMethod,
    pub url: String,
    pub payload: Payload,
    pub headers: Vec<(String, String)>,
}
