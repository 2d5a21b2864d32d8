//! Error types for the LinkedIn client.
//!
//! # Design
//! Request execution never returns `Err`: transport, decode and provider
//! failures all end up inside an `ApiResult`, classified by `ErrorKind`.
//! The `Err`-returning types here cover the edges around that boundary:
//! the transport seam itself, environment configuration, and typed payload
//! extraction.

use std::io;

use thiserror::Error;

/// Failure below the HTTP layer. Converted into an `ApiResult` by the
/// executor and never propagated to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Host unreachable, DNS failure, or connection refused.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("i/o error: {0}")]
    Io(String),

    /// TLS, protocol, or anything else the transport reports.
    #[error("transport failure: {0}")]
    Other(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match &err {
            ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportError::Connect(err.to_string())
            }
            ureq::Error::Io(io_err) => match io_err.kind() {
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable => TransportError::Connect(err.to_string()),
                io::ErrorKind::TimedOut => TransportError::Timeout(err.to_string()),
                _ => TransportError::Io(err.to_string()),
            },
            _ => TransportError::Other(err.to_string()),
        }
    }
}

/// Classification of a failed `ApiResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The response body was not valid JSON.
    Decode,
    /// The provider answered with an error payload.
    Api,
}

impl ErrorKind {
    /// Stable category string, matching the `error` code used in synthesized
    /// transport failure bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport_error",
            ErrorKind::Decode => "decode_error",
            ErrorKind::Api => "api_error",
        }
    }
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Errors from `ApiResult::deserialize_payload`.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response carried no payload")]
    Missing,

    #[error("payload did not match the expected shape: {0}")]
    Json(#[from] serde_json::Error),
}
