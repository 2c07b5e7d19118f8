//! Request metadata handling.
//!
//! The surrounding server parses the request head and hands the result over
//! as a [`RequestMeta`]: the method, target, protocol version and headers,
//! plus the listener-level facts the wire does not carry (URL scheme, peer
//! address). This module wraps the standard `http::Request` type the same way
//! the rest of the crate leans on the `http` vocabulary types.

use std::net::SocketAddr;

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version, header};

/// URL scheme of the listener the request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// The per-request environment record handed in when headers are parsed.
#[derive(Debug)]
pub struct RequestMeta {
    inner: Request<()>,
    scheme: Scheme,
    peer_addr: Option<SocketAddr>,
}

impl RequestMeta {
    pub fn new(inner: Request<()>) -> Self {
        Self { inner, scheme: Scheme::default(), peer_addr: None }
    }

    /// Sets the URL scheme, fixed by the listener's TLS configuration.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_peer_addr(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.uri().query()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Whether the TCP connection should stay open after this response.
    ///
    /// HTTP/1.1 requests are persistent unless the client sent
    /// `Connection: close`; HTTP/1.0 requests are persistent only when the
    /// client sent `Connection: keep-alive`; any other protocol version is
    /// not kept alive.
    pub fn keep_alive(&self) -> bool {
        let connection = self
            .headers()
            .get(header::CONNECTION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase);

        if self.version() == Version::HTTP_11 {
            connection.as_deref() != Some("close")
        } else if self.version() == Version::HTTP_10 {
            connection.as_deref() == Some("keep-alive")
        } else {
            false
        }
    }
}

impl From<Parts> for RequestMeta {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self::new(Request::from_parts(parts, ()))
    }
}

impl From<Request<()>> for RequestMeta {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(version: Version, connection: Option<&str>) -> RequestMeta {
        let mut builder = Request::builder().method("GET").uri("/").version(version);
        if let Some(value) = connection {
            builder = builder.header(header::CONNECTION, value);
        }
        builder.body(()).unwrap().into()
    }

    #[test]
    fn http11_defaults_to_keep_alive() {
        assert!(meta(Version::HTTP_11, None).keep_alive());
        assert!(meta(Version::HTTP_11, Some("keep-alive")).keep_alive());
    }

    #[test]
    fn http11_close_disables_keep_alive() {
        assert!(!meta(Version::HTTP_11, Some("close")).keep_alive());
        assert!(!meta(Version::HTTP_11, Some("Close")).keep_alive());
    }

    #[test]
    fn http10_defaults_to_close() {
        assert!(!meta(Version::HTTP_10, None).keep_alive());
        assert!(meta(Version::HTTP_10, Some("Keep-Alive")).keep_alive());
    }

    #[test]
    fn unrecognized_version_is_never_kept_alive() {
        assert!(!meta(Version::HTTP_09, None).keep_alive());
        assert!(!meta(Version::HTTP_2, Some("keep-alive")).keep_alive());
    }

    #[test]
    fn exposes_request_line_parts() {
        let meta: RequestMeta = Request::builder()
            .method("POST")
            .uri("/upload?part=2")
            .version(Version::HTTP_11)
            .body(())
            .unwrap()
            .into();

        assert_eq!(meta.method(), &Method::POST);
        assert_eq!(meta.path(), "/upload");
        assert_eq!(meta.query(), Some("part=2"));
        assert_eq!(meta.scheme(), Scheme::Http);
        assert_eq!(meta.with_scheme(Scheme::Https).scheme(), Scheme::Https);
    }
}
