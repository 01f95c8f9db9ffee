#![deny(clippy::all, clippy::cargo)]
#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions)]

//! A small HTTP/1.1 transport client for talking to a Lambda-style
//! Runtime API: a local control plane that hands out invocations over
//! GET and accepts their results over POST.
//!
//! This crate only knows about request/response exchanges and timeouts;
//! it has no notion of invocations, handlers, or the reporting
//! lifecycle built on top of it in `lambda_runtime`.

use bytes::Bytes;
use http::{
    uri::{PathAndQuery, Scheme},
    HeaderMap, Method, Request, StatusCode, Uri,
};
use http_body_util::BodyExt;
use hyper_util::client::legacy::connect::HttpConnector;
use std::{convert::TryInto, time::Duration};

mod error;
pub use error::{BoxError, TransportError};
pub mod body;

#[cfg(feature = "tracing")]
pub mod tracing;

use body::Body;

const USER_AGENT_HEADER: &str = "User-Agent";
const DEFAULT_USER_AGENT: &str = concat!("lambda-runtime-rust/", env!("CARGO_PKG_VERSION"));
const CUSTOM_USER_AGENT: Option<&str> = option_env!("LAMBDA_RUNTIME_USER_AGENT");

/// The default per-call timeout used when none is configured, matching
/// the Runtime API's own long-poll budget for `next invocation`.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// An HTTP response from the Runtime API.
///
/// `body` is `None` only when the exchange produced no body at all,
/// which is distinct from a zero-length body (`Some(Bytes::new())`).
/// Real HTTP responses collected off the wire always carry `Some`,
/// even when empty; `None` is reserved for responses constructed
/// directly in tests that need to exercise the Invocation Parser's
/// `no_body` failure path.
#[derive(Debug, Clone)]
pub struct Response {
    /// The response status code.
    pub status: StatusCode,
    /// Response headers. Case-insensitive; multi-valued headers are
    /// returned in the order they were inserted.
    pub headers: HeaderMap,
    /// The response body, if any.
    pub body: Option<Bytes>,
}

impl Response {
    /// Look up a header by name and return it as a `&str`, ignoring a
    /// value that isn't valid UTF-8 (such a header is treated as
    /// absent by the Invocation Parser).
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// HTTP/1.1 transport client for the Runtime API.
#[derive(Debug)]
pub struct Client {
    base: Uri,
    request_timeout: Duration,
    inner: hyper_util::client::legacy::Client<HttpConnector, Body>,
}

impl Client {
    /// Create a builder to configure the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder {
            connector: HttpConnector::new(),
            uri: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// `GET path HTTP/1.1` against the Runtime API, with no body.
    pub async fn get(&self, path: &str) -> Result<Response, TransportError> {
        let req = build_request()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("static GET request is always valid");
        self.call(req).await
    }

    /// `POST path HTTP/1.1` against the Runtime API with the given body
    /// (which may be empty).
    pub async fn post(&self, path: &str, body: impl Into<Bytes>) -> Result<Response, TransportError> {
        let bytes: Bytes = body.into();
        let req = build_request()
            .method(Method::POST)
            .uri(path)
            .header(http::header::CONTENT_LENGTH, bytes.len())
            .body(Body::from(bytes))
            .expect("POST request with a byte body is always valid");
        self.call(req).await
    }

    async fn call(&self, req: Request<Body>) -> Result<Response, TransportError> {
        let req = self.set_origin(req);
        let fut = self.inner.request(req);
        let res = match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(Ok(res)) => res,
            Ok(Err(err)) => return Err(TransportError::from_hyper(Box::new(err))),
            Err(_elapsed) => return Err(TransportError::Timeout),
        };

        let (parts, incoming) = res.into_parts();
        let collected = incoming
            .collect()
            .await
            .map_err(|err| TransportError::from_hyper(Box::new(err)))?;
        let body = collected.to_bytes();

        Ok(Response {
            status: parts.status,
            headers: parts.headers,
            body: Some(body),
        })
    }

    fn set_origin(&self, req: Request<Body>) -> Request<Body> {
        let (mut parts, body) = req.into_parts();
        let scheme = self.base.scheme().unwrap_or(&Scheme::HTTP);
        let authority = self.base.authority().expect("Runtime API base URI has no authority");
        let base_path = self.base.path().trim_end_matches('/');
        let path = parts.uri.path_and_query().expect("request URI has no path");
        let pq: PathAndQuery = format!("{base_path}{path}").parse().expect("joined path is a valid PathAndQuery");

        parts.uri = Uri::builder()
            .scheme(scheme.as_ref())
            .authority(authority.as_ref())
            .path_and_query(pq)
            .build()
            .expect("scheme, authority and path_and_query always build a valid URI");

        Request::from_parts(parts, body)
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    connector: HttpConnector,
    uri: Option<Uri>,
    request_timeout: Duration,
}

impl ClientBuilder {
    /// Use a specific HTTP connector instead of the default one.
    pub fn with_connector(self, connector: HttpConnector) -> Self {
        Self { connector, ..self }
    }

    /// Set the Runtime API base URI. Defaults to `AWS_LAMBDA_RUNTIME_API`.
    pub fn with_endpoint(self, uri: Uri) -> Self {
        Self { uri: Some(uri), ..self }
    }

    /// Set the per-call request timeout. Defaults to [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn with_request_timeout(self, timeout: Duration) -> Self {
        Self {
            request_timeout: timeout,
            ..self
        }
    }

    /// Build the client.
    pub fn build(self) -> Result<Client, BoxError> {
        let uri = match self.uri {
            Some(uri) => uri,
            None => {
                let endpoint = std::env::var("AWS_LAMBDA_RUNTIME_API")?;
                endpoint.try_into()?
            }
        };
        let inner = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .http1_max_buf_size(1024 * 1024)
            .build(self.connector);
        Ok(Client {
            base: uri,
            request_timeout: self.request_timeout,
            inner,
        })
    }
}

/// A request builder pre-populated with this runtime's `User-Agent`.
/// Configure `LAMBDA_RUNTIME_USER_AGENT` at compile time to override it.
pub fn build_request() -> http::request::Builder {
    const USER_AGENT: &str = match CUSTOM_USER_AGENT {
        Some(value) => value,
        None => DEFAULT_USER_AGENT,
    };
    Request::builder().header(USER_AGENT_HEADER, USER_AGENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_origin_joins_base_path() {
        let base = "http://localhost:9001";
        let client = Client::builder().with_endpoint(base.parse().unwrap()).build().unwrap();
        let req = build_request()
            .uri("/2018-06-01/runtime/invocation/next")
            .body(Body::empty())
            .unwrap();
        let req = client.set_origin(req);
        assert_eq!(
            "http://localhost:9001/2018-06-01/runtime/invocation/next",
            &req.uri().to_string()
        );
    }

    #[test]
    fn set_origin_with_base_path() {
        for base in ["http://localhost:9001/foo", "http://localhost:9001/foo/"] {
            let client = Client::builder().with_endpoint(base.parse().unwrap()).build().unwrap();
            let req = build_request()
                .uri("/2018-06-01/runtime/invocation/next")
                .body(Body::empty())
                .unwrap();
            let req = client.set_origin(req);
            assert_eq!(
                "http://localhost:9001/foo/2018-06-01/runtime/invocation/next",
                &req.uri().to_string()
            );
        }
    }

    #[test]
    fn build_request_carries_user_agent() {
        let req = build_request().uri("/x").body(Body::empty()).unwrap();
        let ua = req.headers().get(USER_AGENT_HEADER).unwrap().to_str().unwrap();
        assert!(ua.starts_with("lambda-runtime-rust/"));
    }
}
