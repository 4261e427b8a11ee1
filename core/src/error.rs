//! Error types for the JSON API client.
//!
//! # Design
//! `TransportError` is what a `Transport` reports when no response exists at
//! all. `ApiError` is the crate-wide error: building failures (bad endpoint,
//! unserializable payload) and, via `ResolvedResponse::into_result`, the
//! non-success outcomes of a call. `NotFound` gets a dedicated variant
//! because callers frequently distinguish "the resource does not exist" from
//! "the server returned an unexpected status."

use thiserror::Error;

/// Broad class of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The connection was refused, reset or could not be established.
    Connect,
    /// The host name did not resolve.
    Dns,
    Timeout,
    /// Reading or writing the connection failed mid-call.
    Io,
    /// The status line arrived but the body could not be read in full.
    Body,
    Other,
}

/// A call that failed at the transport level.
///
/// `status` is `None` when no response was obtained at all, and holds the
/// received status when the failure happened while reading the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Body read failure on a response whose status was already received.
    pub fn after_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Body,
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Errors returned by the request builder and by `ResolvedResponse::into_result`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint base address is not an absolute http(s) URL.
    #[error("invalid endpoint address {address:?}: {reason}")]
    InvalidEndpoint { address: String, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No response was obtained.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The status was successful but the body did not decode into the
    /// expected type.
    #[error("deserialization failed: {message}")]
    Decode { message: String, body: String },
}
