//! Remote API address and the default headers sent with every call.

use url::Url;

use crate::error::ApiError;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const SESSION_ID_HEADER: &str = "Session-Id";

/// Which header carries the caller's credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderScheme {
    /// `Authorization: <credential>`
    #[default]
    Authorization,
    /// `Session-Id: <credential>`, used by older services.
    SessionId,
}

impl HeaderScheme {
    pub fn header_name(&self) -> &'static str {
        match self {
            HeaderScheme::Authorization => AUTHORIZATION_HEADER,
            HeaderScheme::SessionId => SESSION_ID_HEADER,
        }
    }
}

/// Base address of a JSON API plus the fixed headers attached to every call.
///
/// Immutable once built; clone it or share it by reference across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    user_agent: Option<String>,
    credential: Option<String>,
    scheme: HeaderScheme,
}

impl Endpoint {
    /// Validate `base_url` as an absolute http(s) URL without a query or
    /// fragment. A trailing `/` is dropped so paths can be appended verbatim.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidEndpoint {
            address: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("query or fragment in base address".to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: None,
            credential: None,
            scheme: HeaderScheme::default(),
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Default credential, used when a call does not supply its own.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_scheme(mut self, scheme: HeaderScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn scheme(&self) -> HeaderScheme {
        self.scheme
    }

    /// Absolute URL for `path`.
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let endpoint = Endpoint::new("http://localhost:3000/").unwrap();
        assert_eq!(endpoint.base_url(), "http://localhost:3000");
        assert_eq!(endpoint.url_for("/items"), "http://localhost:3000/items");
    }

    #[test]
    fn missing_leading_slash_is_inserted() {
        let endpoint = Endpoint::new("http://localhost:3000/api").unwrap();
        assert_eq!(endpoint.url_for("items/1"), "http://localhost:3000/api/items/1");
        assert_eq!(endpoint.url_for(""), "http://localhost:3000/api");
    }

    #[test]
    fn rejects_query_and_fragment_in_base_address() {
        for address in ["http://h/api?k=v", "http://h/api#x", "http://h/api?"] {
            assert!(
                matches!(Endpoint::new(address), Err(ApiError::InvalidEndpoint { .. })),
                "{address}"
            );
        }
        assert!(Endpoint::new("http://h/api/").is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http_addresses() {
        assert!(matches!(
            Endpoint::new("localhost:3000/api"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            Endpoint::new("not a url"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            Endpoint::new("ftp://example.com"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn defaults_to_authorization_scheme() {
        let endpoint = Endpoint::new("https://api.example.com").unwrap();
        assert_eq!(endpoint.scheme(), HeaderScheme::Authorization);
        assert!(endpoint.user_agent().is_none());
        assert!(endpoint.credential().is_none());
    }

    #[test]
    fn scheme_header_names() {
        assert_eq!(HeaderScheme::Authorization.header_name(), "Authorization");
        assert_eq!(HeaderScheme::SessionId.header_name(), "Session-Id");
    }
}
