//! Blocking JSON API client.
//!
//! # Design
//! `ApiClient` pairs an `Endpoint` with a `Transport` and carries no mutable
//! state between calls. Each call builds a fresh `HttpRequest`, hands it to
//! the transport and resolves the response. With a `ConnectionPolicy`
//! attached, calls that obtain no response at all are retried; anything that
//! produced a response (error statuses, undecodable bodies) is final.

use std::thread;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder;
use crate::config::ConnectionPolicy;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport, UreqTransport};
use crate::resolver::{self, Outcome, ResolvedResponse};

#[derive(Debug, Clone)]
pub struct ApiClient<X = UreqTransport> {
    endpoint: Endpoint,
    transport: X,
    policy: Option<ConnectionPolicy>,
}

impl ApiClient<UreqTransport> {
    /// Client over a default `ureq` transport.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_transport(endpoint, UreqTransport::new())
    }

    /// Client for `policy.address`, retrying transport failures per `policy`.
    pub fn from_policy(policy: ConnectionPolicy) -> Result<Self, ApiError> {
        let endpoint = Endpoint::new(&policy.address)?;
        Ok(Self::new(endpoint).with_policy(policy))
    }
}

impl<X: Transport> ApiClient<X> {
    pub fn with_transport(endpoint: Endpoint, transport: X) -> Self {
        Self {
            endpoint,
            transport,
            policy: None,
        }
    }

    pub fn with_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    pub fn policy(&self) -> Option<&ConnectionPolicy> {
        self.policy.as_ref()
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str) -> ResolvedResponse<R> {
        self.dispatch(HttpMethod::Get, path)
    }

    pub fn post<B, R>(&self, path: &str, body: &B) -> Result<ResolvedResponse<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(HttpMethod::Post, path, Some(body), None)
    }

    pub fn post_empty<R: DeserializeOwned>(&self, path: &str) -> ResolvedResponse<R> {
        self.dispatch(HttpMethod::Post, path)
    }

    pub fn put<B, R>(&self, path: &str, body: &B) -> Result<ResolvedResponse<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(HttpMethod::Put, path, Some(body), None)
    }

    pub fn put_empty<R: DeserializeOwned>(&self, path: &str) -> ResolvedResponse<R> {
        self.dispatch(HttpMethod::Put, path)
    }

    pub fn delete<R: DeserializeOwned>(&self, path: &str) -> ResolvedResponse<R> {
        self.dispatch(HttpMethod::Delete, path)
    }

    pub fn delete_with_body<B, R>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ResolvedResponse<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(HttpMethod::Delete, path, Some(body), None)
    }

    /// General form of every convenience method. `credential` overrides the
    /// endpoint's default credential for this call only.
    ///
    /// Returns `Err` only when the payload cannot be serialized; every
    /// outcome after that is reported through the `ResolvedResponse`.
    pub fn send<B, R>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&B>,
        credential: Option<&str>,
    ) -> Result<ResolvedResponse<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = builder::build(&self.endpoint, method, path, payload, credential)?;
        Ok(self.execute(&request))
    }

    /// Resolve an already built request, retrying transport failures when a
    /// policy is attached. Once a status has arrived the request is never
    /// re-sent, even if its body then fails (`Outcome::IncompleteBody`).
    pub fn execute<R: DeserializeOwned>(&self, request: &HttpRequest) -> ResolvedResponse<R> {
        let Some(policy) = &self.policy else {
            return resolver::resolve(&self.transport, request);
        };

        let attempts = policy.max_attempts();
        let mut attempt = 1;
        loop {
            let resolved = resolver::resolve(&self.transport, request);
            if !matches!(resolved.outcome, Outcome::TransportFailure(_)) || attempt >= attempts {
                if attempt > 1 {
                    debug!("{} {} settled after {attempt} attempts", request.method, request.path);
                }
                return resolved;
            }
            warn!(
                "{} {} attempt {attempt}/{attempts} got no response, retrying in {:?}",
                request.method, request.path, policy.retry_interval
            );
            if !policy.retry_interval.is_zero() {
                thread::sleep(policy.retry_interval);
            }
            attempt += 1;
        }
    }

    fn dispatch<R: DeserializeOwned>(&self, method: HttpMethod, path: &str) -> ResolvedResponse<R> {
        let request = builder::build_bodiless(&self.endpoint, method, path, None);
        self.execute(&request)
    }
}
