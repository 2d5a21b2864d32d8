//! Response parsing into a uniform `ApiResult`.
//!
//! # Design
//! LinkedIn reports errors in several shapes: the OAuth endpoints use
//! `{"error", "error_description"}`, the v1 API used `{"errorCode",
//! "message"}` and the v2 API uses `{"serviceErrorCode", "message",
//! "status"}`. All of them collapse into the same result: a status code, the
//! decoded payload, and an error message when one is present.
//!
//! The status code is derived from the payload rather than the HTTP status
//! line, since several endpoints report their status inline. The real HTTP
//! status is still kept for diagnostics when a structured response is
//! available.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::error::{ErrorKind, PayloadError, TransportError};
use crate::http::HttpResponse;
use crate::types::AccessToken;

/// Status used when the body carries neither a payload nor an error signal.
pub const SENTINEL_STATUS: u16 = 400;
/// Status used for error payloads that do not embed their own status.
pub const ERROR_STATUS: u16 = 403;
pub const OK_STATUS: u16 = 200;

const UNKNOWN_ERROR: &str = "Unknown Error";
const ERROR_FIELDS: [&str; 3] = ["error", "errorCode", "serviceErrorCode"];

/// Normalized outcome of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    status_code: u16,
    payload: Option<Value>,
    raw_body: String,
    error_message: Option<String>,
    error_kind: Option<ErrorKind>,
    headers: Vec<String>,
    http_status: Option<u16>,
}

impl ApiResult {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Status from the HTTP status line, when the response came from a
    /// structured transport.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// True when the payload reports success and the HTTP status line, if
    /// known, is 2xx.
    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
            && self.status_code == OK_STATUS
            && self
                .http_status
                .map_or(true, |status| (200..300).contains(&status))
    }

    /// Deserialize the payload into a typed value.
    pub fn deserialize_payload<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        let payload = self.payload.clone().ok_or(PayloadError::Missing)?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Result for a request that never reached the provider.
    pub fn from_transport_error(err: &TransportError) -> Self {
        let body = json!({
            "error": ErrorKind::Transport.as_str(),
            "error_description": err.to_string(),
        })
        .to_string();
        let mut result = parse_body(Vec::new(), &body);
        result.error_kind = Some(ErrorKind::Transport);
        result
    }

    /// Successful result carrying an already-held token.
    pub fn from_token(token: &AccessToken) -> Self {
        let payload = json!({
            "access_token": token.value,
            "expires_in": token.expires_in_seconds,
        });
        Self {
            status_code: OK_STATUS,
            raw_body: payload.to_string(),
            payload: Some(payload),
            error_message: None,
            error_kind: None,
            headers: Vec::new(),
            http_status: None,
        }
    }
}

/// Parse a structured transport response.
pub fn parse_response(response: &HttpResponse) -> ApiResult {
    let headers = response
        .headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();
    let mut result = parse_body(headers, &response.body);
    result.http_status = Some(response.status);
    debug!(
        http_status = response.status,
        status_code = result.status_code,
        error = result.error_message.as_deref(),
        "parsed response"
    );
    result
}

/// Parse combined header and body text.
///
/// Compatibility mode for transports that hand back the whole response as
/// one string. Text starting with an `HTTP/` status line is split at the
/// first blank line; anything else is treated as headers followed by a
/// single-line body on the last line.
pub fn parse_raw(raw: &str) -> ApiResult {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    trace!(lines = ?lines, "split raw response");

    let (headers, body) = if raw.starts_with("HTTP/") {
        match lines.iter().position(|line| line.is_empty()) {
            Some(blank) => (&lines[..blank], lines[blank + 1..].join("\n")),
            None => (&lines[..], String::new()),
        }
    } else {
        let end = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1);
        match lines[..end].split_last() {
            Some((body, headers)) => (headers, (*body).to_string()),
            None => (&lines[..0], String::new()),
        }
    };

    let headers = headers.iter().map(|line| (*line).to_string()).collect();
    parse_body(headers, body.trim_end_matches(['\r', '\n']))
}

fn parse_body(headers: Vec<String>, body: &str) -> ApiResult {
    let mut result = ApiResult {
        status_code: SENTINEL_STATUS,
        payload: None,
        raw_body: body.to_string(),
        error_message: None,
        error_kind: None,
        headers,
        http_status: None,
    };

    if body.trim().is_empty() {
        return result;
    }

    let payload = match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => return result,
        Ok(value) => value,
        Err(err) => {
            result.error_message = Some(format!("failed to decode response body: {err}"));
            result.error_kind = Some(ErrorKind::Decode);
            return result;
        }
    };

    let embedded_status = embedded_status(&payload);

    if has_error_signal(&payload) {
        result.status_code = embedded_status.unwrap_or(ERROR_STATUS);
        result.error_message = Some(error_message(&payload));
        result.error_kind = Some(ErrorKind::Api);
    } else {
        result.status_code = embedded_status.unwrap_or(OK_STATUS);
    }
    result.payload = Some(payload);
    result
}

/// Inline `status`, given either as a number or a numeric string.
fn embedded_status(payload: &Value) -> Option<u16> {
    match payload.get("status")? {
        Value::Number(status) => status.as_u64().and_then(|s| u16::try_from(s).ok()),
        Value::String(status) => status.trim().parse().ok(),
        _ => None,
    }
}

fn has_error_signal(payload: &Value) -> bool {
    payload
        .as_object()
        .is_some_and(|obj| ERROR_FIELDS.iter().any(|field| obj.contains_key(*field)))
}

fn error_message(payload: &Value) -> String {
    ["error_description", "message"]
        .iter()
        .find_map(|field| payload.get(*field).and_then(Value::as_str))
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
