//! Response resolver: executes a request and classifies what came back.
//!
//! # Design
//! Every call ends in exactly one `Outcome`. Nothing here returns `Err`:
//! transport failures, error statuses and undecodable bodies are all values
//! the caller can match on, and `into_result` is there for callers who prefer
//! `?`. The response is moved into `resolve` and dropped on every path.

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::status::{is_success, NO_CONTENT, NOT_FOUND, TRANSPORT_FAILURE_STATUS};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How a single call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 2xx. `None` for 204 or an empty body.
    Success(Option<T>),
    /// Non-2xx response; `body` is the raw response text.
    ProtocolError { body: String },
    /// 2xx response whose body did not decode into `T`.
    ParseError { body: String, message: String },
    /// No response was obtained.
    TransportFailure(TransportError),
    /// A status was received but the body could not be read in full.
    IncompleteBody(TransportError),
}

/// Result of one call: the status code and its `Outcome`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponse<T> {
    pub status: u16,
    pub outcome: Outcome<T>,
}

impl<T> ResolvedResponse<T> {
    /// True only when the status was 2xx and the body (if any) decoded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(value) => value.as_ref(),
            _ => None,
        }
    }

    /// Diagnostic text: the error body, the undecodable body, or the
    /// transport's message. `None` on success.
    pub fn raw_text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::ProtocolError { body } | Outcome::ParseError { body, .. } => Some(body),
            Outcome::TransportFailure(err) | Outcome::IncompleteBody(err) => Some(&err.message),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(value) => value,
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::ProtocolError { .. } if self.status == NOT_FOUND => Err(ApiError::NotFound),
            Outcome::ProtocolError { body } => Err(ApiError::Http {
                status: self.status,
                body,
            }),
            Outcome::ParseError { body, message } => Err(ApiError::Decode { message, body }),
            Outcome::TransportFailure(err) | Outcome::IncompleteBody(err) => {
                Err(ApiError::Transport(err))
            }
        }
    }

    pub(crate) fn from_transport_error(err: TransportError) -> Self {
        match err.status {
            Some(status) => Self {
                status,
                outcome: Outcome::IncompleteBody(err),
            },
            None => Self {
                status: TRANSPORT_FAILURE_STATUS,
                outcome: Outcome::TransportFailure(err),
            },
        }
    }
}

/// Execute `request` once and classify the result.
pub fn resolve<T, X>(transport: &X, request: &HttpRequest) -> ResolvedResponse<T>
where
    T: DeserializeOwned,
    X: Transport + ?Sized,
{
    match transport.execute(request) {
        Ok(response) => resolve_response(response),
        Err(err) => {
            match err.status {
                Some(status) => warn!(
                    "{} {} got status {status} but the body failed: {err}",
                    request.method, request.path
                ),
                None => warn!(
                    "{} {} failed before a response: {err}",
                    request.method, request.path
                ),
            }
            ResolvedResponse::from_transport_error(err)
        }
    }
}

/// Classify a response that was already obtained.
pub fn resolve_response<T: DeserializeOwned>(response: HttpResponse) -> ResolvedResponse<T> {
    let status = response.status;
    debug!("resolving response with status {status}");

    if status == NO_CONTENT {
        return ResolvedResponse {
            status,
            outcome: Outcome::Success(None),
        };
    }

    let body = response.body.strip_prefix(UTF8_BOM).unwrap_or(&response.body[..]);
    let outcome = if !is_success(status) {
        Outcome::ProtocolError {
            body: String::from_utf8_lossy(body).into_owned(),
        }
    } else if body.iter().all(u8::is_ascii_whitespace) {
        Outcome::Success(None)
    } else {
        match serde_json::from_slice(body) {
            Ok(value) => Outcome::Success(Some(value)),
            Err(err) => {
                warn!("status {status} body did not decode: {err}");
                Outcome::ParseError {
                    body: String::from_utf8_lossy(body).into_owned(),
                    message: err.to_string(),
                }
            }
        }
    };

    ResolvedResponse { status, outcome }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde::Deserialize;

    use super::*;
    use crate::error::TransportErrorKind;
    use crate::http::HttpMethod;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        id: i64,
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost:3000/items/1".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    struct Fixed(Result<HttpResponse, TransportError>, Cell<u32>);

    impl Fixed {
        fn new(result: Result<HttpResponse, TransportError>) -> Self {
            Self(result, Cell::new(0))
        }
    }

    impl Transport for Fixed {
        fn execute(&self, _: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.1.set(self.1.get() + 1);
            self.0.clone()
        }
    }

    #[test]
    fn ok_with_json_body_decodes() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(200, r#"{"id":1}"#));
        assert!(resolved.is_success());
        assert_eq!(resolved.status, 200);
        assert_eq!(resolved.value(), Some(&Item { id: 1 }));
        assert_eq!(resolved.raw_text(), None);
    }

    #[test]
    fn no_content_is_success_without_value() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(204, ""));
        assert!(resolved.is_success());
        assert_eq!(resolved.status, 204);
        assert!(resolved.value().is_none());
        assert!(resolved.raw_text().is_none());
    }

    #[test]
    fn no_content_ignores_a_stray_body() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(204, "garbage"));
        assert_eq!(resolved.outcome, Outcome::Success(None));
    }

    #[test]
    fn empty_success_body_has_no_value() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(200, " \n"));
        assert_eq!(resolved.outcome, Outcome::Success(None));
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(200, "\u{feff}{\"id\":1}"));
        assert_eq!(resolved.value(), Some(&Item { id: 1 }));

        let resolved: ResolvedResponse<Item> = resolve_response(response(400, "\u{feff}bad input"));
        assert_eq!(resolved.raw_text(), Some("bad input"));

        let resolved: ResolvedResponse<Item> = resolve_response(response(200, "\u{feff}"));
        assert_eq!(resolved.outcome, Outcome::Success(None));
    }

    #[test]
    fn not_found_keeps_raw_text() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(404, "not found"));
        assert!(!resolved.is_success());
        assert_eq!(resolved.status, 404);
        assert_eq!(resolved.raw_text(), Some("not found"));
        assert!(resolved.value().is_none());
    }

    #[test]
    fn error_body_is_never_decoded() {
        // A JSON body that happens to fit `Item` still stays raw on 500.
        let resolved: ResolvedResponse<Item> = resolve_response(response(500, r#"{"id":7}"#));
        assert_eq!(
            resolved.outcome,
            Outcome::ProtocolError {
                body: r#"{"id":7}"#.to_string()
            }
        );
    }

    #[test]
    fn redirect_status_is_a_protocol_error() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(302, ""));
        assert_eq!(
            resolved.outcome,
            Outcome::ProtocolError {
                body: String::new()
            }
        );
    }

    #[test]
    fn malformed_success_body_is_a_parse_error() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(200, "not json"));
        assert!(!resolved.is_success());
        assert_eq!(resolved.status, 200);
        assert_eq!(resolved.raw_text(), Some("not json"));
        assert!(matches!(resolved.outcome, Outcome::ParseError { .. }));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let resolved: ResolvedResponse<Item> = resolve_response(response(201, r#"{"name":"x"}"#));
        match resolved.outcome {
            Outcome::ParseError { message, .. } => assert!(message.contains("id")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_error_body_is_lossy() {
        let resolved: ResolvedResponse<Item> = resolve_response(HttpResponse {
            status: 400,
            headers: Vec::new(),
            body: vec![b'b', b'a', b'd', 0xff],
        });
        assert_eq!(resolved.raw_text(), Some("bad\u{fffd}"));
    }

    #[test]
    fn transport_failure_reports_sentinel_and_message() {
        let transport = Fixed::new(Err(TransportError::new(
            TransportErrorKind::Connect,
            "connection refused",
        )));
        let resolved: ResolvedResponse<Item> = resolve(&transport, &request());
        assert!(!resolved.is_success());
        assert_eq!(resolved.status, TRANSPORT_FAILURE_STATUS);
        assert_eq!(resolved.raw_text(), Some("connection refused"));
        assert!(resolved.value().is_none());
        assert_eq!(transport.1.get(), 1);
    }

    #[test]
    fn body_failure_keeps_the_received_status() {
        let transport = Fixed::new(Err(TransportError::after_status(
            200,
            "the response body is larger than request limit: 1024",
        )));
        let resolved: ResolvedResponse<Vec<u8>> = resolve(&transport, &request());
        assert_eq!(resolved.status, 200);
        assert_ne!(resolved.status, TRANSPORT_FAILURE_STATUS);
        assert!(!resolved.is_success());
        assert!(matches!(resolved.outcome, Outcome::IncompleteBody(_)));
        assert_eq!(
            resolved.raw_text(),
            Some("the response body is larger than request limit: 1024")
        );
        assert!(matches!(resolved.into_result(), Err(ApiError::Transport(_))));
    }

    #[test]
    fn identical_requests_resolve_identically() {
        let transport = Fixed::new(Ok(response(200, r#"{"id":3}"#)));
        let first: ResolvedResponse<Item> = resolve(&transport, &request());
        let second: ResolvedResponse<Item> = resolve(&transport, &request());
        assert_eq!(first, second);
    }

    #[test]
    fn into_result_maps_each_outcome() {
        let ok: ResolvedResponse<Item> = resolve_response(response(200, r#"{"id":1}"#));
        assert_eq!(ok.into_result().unwrap(), Some(Item { id: 1 }));

        let missing: ResolvedResponse<Item> = resolve_response(response(404, ""));
        assert!(matches!(missing.into_result(), Err(ApiError::NotFound)));

        let server: ResolvedResponse<Item> = resolve_response(response(503, "busy"));
        match server.into_result() {
            Err(ApiError::Http { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected: {other:?}"),
        }

        let garbled: ResolvedResponse<Item> = resolve_response(response(200, "{"));
        assert!(matches!(garbled.into_result(), Err(ApiError::Decode { .. })));

        let down: ResolvedResponse<Item> = ResolvedResponse::from_transport_error(
            TransportError::new(TransportErrorKind::Timeout, "timed out"),
        );
        assert!(matches!(down.into_result(), Err(ApiError::Transport(_))));
    }
}
