//! Blocking client core for JSON HTTP APIs.
//!
//! # Overview
//! A call goes through two steps. The builder turns an `Endpoint`, a verb, a
//! path and an optional payload into an `HttpRequest`; the resolver executes
//! it through a `Transport` and classifies the result into a
//! `ResolvedResponse`: a decoded value, raw diagnostic text, or a transport
//! failure with no response at all.
//!
//! # Design
//! - Requests and responses are plain data; only the `Transport` does I/O.
//!   `UreqTransport` is the default, tests script their own.
//! - Outcomes are values (`Outcome`), not errors. `into_result` converts for
//!   callers who want `?`.
//! - `ApiClient` is stateless apart from its configuration and can retry
//!   transport failures according to a `ConnectionPolicy`.

pub mod builder;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod resolver;
pub mod status;

pub use client::ApiClient;
pub use config::ConnectionPolicy;
pub use endpoint::{Endpoint, HeaderScheme};
pub use error::{ApiError, TransportError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use resolver::{resolve, resolve_response, Outcome, ResolvedResponse};
pub use status::{is_success, StatusClass, TRANSPORT_FAILURE_STATUS};
