//! File serving primitive
//!
//! Streams one regular file back to the client with its Content-Type,
//! `Last-Modified` validation and single-range support. Callers resolve and
//! vet the path first; this module never lists directories.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::mime;
use super::range::{parse_range_header, RangeParseResult};
use super::response::{
    build_304_response, build_416_response, build_error_response, build_file_response,
    build_partial_response,
};
use crate::responders::RequestContext;

/// HTTP-date layout used by `Last-Modified` (RFC 7231 IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Serve the file at `path`
pub async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> Response<Full<Bytes>> {
    let (content, modified) = match read_file(path).await {
        Ok(loaded) => loaded,
        Err(e) => return io_error_response(&e),
    };

    let last_modified = modified.map(format_http_date);
    if let (Some(modified), Some(stamp), Some(since)) =
        (modified, last_modified.as_deref(), ctx.if_modified_since)
    {
        if not_modified_since(modified, since) {
            return build_304_response(stamp);
        }
    }

    let content_type = mime::content_type_for(path);
    let total_size = content.len();

    match parse_range_header(ctx.range, total_size) {
        RangeParseResult::Valid(range) => build_partial_response(
            content.slice(range.start..=range.end),
            content_type,
            last_modified.as_deref(),
            range,
            total_size,
            ctx.is_head,
        ),
        RangeParseResult::NotSatisfiable => build_416_response(total_size),
        RangeParseResult::None => build_file_response(
            content,
            content_type,
            last_modified.as_deref(),
            ctx.is_head,
        ),
    }
}

async fn read_file(path: &Path) -> io::Result<(Bytes, Option<SystemTime>)> {
    let mut file = File::open(path).await?;
    let metadata = file.metadata().await?;

    let capacity = usize::try_from(metadata.len()).unwrap_or(0);
    let mut content = Vec::with_capacity(capacity);
    file.read_to_end(&mut content).await?;

    Ok((Bytes::from(content), metadata.modified().ok()))
}

fn io_error_response(error: &io::Error) -> Response<Full<Bytes>> {
    match error.kind() {
        io::ErrorKind::NotFound => {
            build_error_response(StatusCode::NOT_FOUND, "404 page not found")
        }
        io::ErrorKind::PermissionDenied => {
            build_error_response(StatusCode::FORBIDDEN, "403 Forbidden")
        }
        _ => build_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "500 Internal Server Error",
        ),
    }
}

pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// True when the client's copy (dated `since`) is at least as new as `modified`.
/// Comparison is at whole-second precision; unparsable dates never match.
fn not_modified_since(modified: SystemTime, since: &str) -> bool {
    let Ok(since) = DateTime::parse_from_rfc2822(since.trim()) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED};
    use std::path::PathBuf;
    use std::time::Duration;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_whole_file() {
        let ctx = RequestContext::get("/index.html");
        let response = serve_file(&ctx, &fixture("index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
        assert!(response.headers().contains_key(LAST_MODIFIED));
        assert_eq!(body_string(response).await, "Test");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let ctx = RequestContext {
            is_head: true,
            ..RequestContext::get("/index.html")
        };
        let response = serve_file(&ctx, &fixture("index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_range_request() {
        let ctx = RequestContext {
            range: Some("bytes=1-2"),
            ..RequestContext::get("/index.html")
        };
        let response = serve_file(&ctx, &fixture("index.html")).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 1-2/4");
        assert_eq!(body_string(response).await, "es");
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let ctx = RequestContext {
            range: Some("bytes=10-"),
            ..RequestContext::get("/index.html")
        };
        let response = serve_file(&ctx, &fixture("index.html")).await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */4");
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let path = fixture("index.html");
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let fresh = format_http_date(modified + Duration::from_secs(60));
        let ctx = RequestContext {
            if_modified_since: Some(fresh.as_str()),
            ..RequestContext::get("/index.html")
        };
        let response = serve_file(&ctx, &path).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(body_string(response).await, "");

        let stale = format_http_date(modified - Duration::from_secs(60));
        let ctx = RequestContext {
            if_modified_since: Some(stale.as_str()),
            ..RequestContext::get("/index.html")
        };
        let response = serve_file(&ctx, &path).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let ctx = RequestContext::get("/gone.html");
        let response = serve_file(&ctx, &fixture("gone.html")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_http_date_format() {
        let epoch = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(format_http_date(epoch), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(not_modified_since(epoch, "Sun, 06 Nov 1994 08:49:37 GMT"));
        assert!(!not_modified_since(epoch, "Sun, 06 Nov 1994 08:49:36 GMT"));
        assert!(!not_modified_since(epoch, "yesterday"));
    }
}
