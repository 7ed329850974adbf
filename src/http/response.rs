//! HTTP response building module
//!
//! Builders for every response the responders and router emit. Builder
//! failures never panic: they are logged and replaced with a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED, LOCATION,
};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build a rendered page response from a fully rendered buffer
pub fn build_page_response(status: StatusCode, page: Vec<u8>) -> Response<Full<Bytes>> {
    let content_length = page.len();

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(Bytes::from(page)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            bare_response(status)
        })
}

/// Build a minimal plain-text error response.
///
/// This is the fallback used when a page template cannot be rendered, so it
/// must not depend on any template.
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = format!("{message}\n");

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .header("X-Content-Type-Options", "nosniff")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            bare_response(status)
        })
}

/// Build 302 Found redirect response
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    let body = format!("<a href=\"{}\">Found</a>.\n", escape_attribute(target));

    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::FOUND, &e);
            bare_response(StatusCode::FOUND)
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .header(ALLOW, "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::METHOD_NOT_ALLOWED, &e);
            bare_response(StatusCode::METHOD_NOT_ALLOWED)
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::NO_CONTENT, &e);
            bare_response(StatusCode::NO_CONTENT)
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::NOT_MODIFIED, &e);
            bare_response(StatusCode::NOT_MODIFIED)
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::RANGE_NOT_SATISFIABLE, &e);
            bare_response(StatusCode::RANGE_NOT_SATISFIABLE)
        })
}

/// Build 200 OK file response
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes");
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(StatusCode::OK, &e);
        bare_response(StatusCode::OK)
    })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    last_modified: Option<&str>,
    range: ByteRange,
    total: usize,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let ByteRange { start, end } = range;
    let content_length = range.byte_count();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(CONTENT_RANGE, format!("bytes {start}-{end}/{total}"))
        .header(ACCEPT_RANGES, "bytes");
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(StatusCode::PARTIAL_CONTENT, &e);
        bare_response(StatusCode::PARTIAL_CONTENT)
    })
}

fn bare_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        status.as_u16()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_CONTENT_TYPE);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(body_string(response).await, "boom\n");
    }

    #[tokio::test]
    async fn test_redirect_response() {
        let response = build_redirect_response("/docs/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/docs/");
        assert_eq!(body_string(response).await, "<a href=\"/docs/\">Found</a>.\n");
    }

    #[tokio::test]
    async fn test_page_response() {
        let response = build_page_response(StatusCode::NOT_FOUND, b"gone".to_vec());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
        assert_eq!(body_string(response).await, "gone");
    }

    #[tokio::test]
    async fn test_head_file_response_keeps_length() {
        let response =
            build_file_response(Bytes::from_static(b"12345"), "text/plain", None, true);
        assert_eq!(response.headers()[CONTENT_LENGTH], "5");
        assert_eq!(body_string(response).await, "");
    }
}
