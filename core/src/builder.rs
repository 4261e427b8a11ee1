//! Request builder: turns an endpoint, a verb, a path and an optional payload
//! into a ready-to-send `HttpRequest`.

use serde::Serialize;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const JSON_ACCEPT: &str = "application/json";

/// Build a JSON request.
///
/// `credential` overrides the endpoint's default credential and is sent in
/// the header chosen by the endpoint's `HeaderScheme`. The payload is
/// serialized here, so a payload that cannot be encoded fails before any I/O.
pub fn build<P>(
    endpoint: &Endpoint,
    method: HttpMethod,
    path: &str,
    payload: Option<&P>,
    credential: Option<&str>,
) -> Result<HttpRequest, ApiError>
where
    P: Serialize + ?Sized,
{
    let body = payload.map(serde_json::to_vec).transpose()?;
    let mut request = build_bodiless(endpoint, method, path, credential);
    request.body = body;
    Ok(request)
}

/// Build a JSON request that carries no body. Cannot fail.
pub fn build_bodiless(
    endpoint: &Endpoint,
    method: HttpMethod,
    path: &str,
    credential: Option<&str>,
) -> HttpRequest {
    let mut headers = vec![
        ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
        ("Accept".to_string(), JSON_ACCEPT.to_string()),
    ];
    if let Some(user_agent) = endpoint.user_agent() {
        headers.push(("User-Agent".to_string(), user_agent.to_string()));
    }
    if let Some(credential) = credential.or(endpoint.credential()) {
        headers.push((
            endpoint.scheme().header_name().to_string(),
            credential.to_string(),
        ));
    }

    HttpRequest {
        method,
        path: endpoint.url_for(path),
        headers,
        body: None,
    }
}
