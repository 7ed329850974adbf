//! Responders
//!
//! Every responder turns one request into one complete response. They are
//! built once at startup, hold no per-request state, and are shared between
//! connections behind an `Arc`.

pub mod error;
pub mod not_found;
pub mod static_content;
pub mod template;

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, IF_MODIFIED_SINCE, RANGE};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

pub use error::ErrorResponder;
pub use not_found::NotFoundResponder;
pub use static_content::StaticContentResponder;
pub use template::TemplateResponder;

/// The parts of a request the responders look at
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Request path, without the query string. Percent-decoded when built
    /// by the router; `from_request` alone leaves it as sent.
    pub path: &'a str,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Extract the context from an incoming request
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: header_str(req, &IF_MODIFIED_SINCE),
            range: header_str(req, &RANGE),
        }
    }

    /// A plain GET for `path`
    pub const fn get(path: &'a str) -> Self {
        Self {
            path,
            is_head: false,
            if_modified_since: None,
            range: None,
        }
    }
}

/// Percent-decode a request path.
///
/// Returns `None` when the decoded bytes are not valid UTF-8.
pub fn decode_path(raw: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(raw).decode_utf8().ok()
}

fn header_str<'a, B>(req: &'a Request<B>, name: &HeaderName) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Accept a request, produce a full response
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, ctx: &RequestContext<'_>) -> Response<Full<Bytes>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_request() {
        let req = Request::head("/files/a.txt?x=1")
            .header("range", "bytes=0-1")
            .header("if-modified-since", "Sun, 06 Nov 1994 08:49:37 GMT")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/files/a.txt");
        assert!(ctx.is_head);
        assert_eq!(ctx.range, Some("bytes=0-1"));
        assert_eq!(
            ctx.if_modified_since,
            Some("Sun, 06 Nov 1994 08:49:37 GMT")
        );
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/a/my%20file.html").unwrap(), "/a/my file.html");
        assert_eq!(decode_path("/not%2Dindex.html").unwrap(), "/not-index.html");
        assert_eq!(decode_path("/%2e%2e/x").unwrap(), "/../x");
        assert_eq!(decode_path("/caf%C3%A9").unwrap(), "/café");
        assert!(matches!(decode_path("/plain").unwrap(), Cow::Borrowed("/plain")));
        assert!(decode_path("/bad%FF").is_none());
    }

    #[test]
    fn test_plain_get() {
        let ctx = RequestContext::get("/");
        assert_eq!(ctx.path, "/");
        assert!(!ctx.is_head);
        assert!(ctx.range.is_none());
    }
}
