//! Blocking client for LinkedIn's OAuth2 and resource APIs.
//!
//! # Overview
//! Builds the authorization-code consent URL, exchanges codes for access
//! tokens, and issues bearer-authenticated requests whose responses are
//! normalized into a single `ApiResult` shape.
//!
//! # Design
//! - `LinkedInClient` is the facade: credentials, token state, last-request
//!   diagnostics.
//! - `RequestExecutor` splits each call into `build` (pure) and `dispatch`
//!   (I/O through a `Transport`).
//! - The response parser never fails. Transport errors, undecodable bodies
//!   and provider errors are all reported through `ApiResult`.
//! - `Transport` is the I/O seam; `UreqTransport` is the default.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

pub use client::LinkedInClient;
pub use config::{ClientConfig, ClientOptions};
pub use error::{ConfigError, ErrorKind, PayloadError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::RequestExecutor;
pub use response::{parse_raw, parse_response, ApiResult};
pub use transport::UreqTransport;
pub use types::{AccessToken, LastRequest, OutboundRequest, Payload};
