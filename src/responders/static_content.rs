//! Static file responder
//!
//! Maps request paths under a URL prefix onto a directory. Regular files are
//! served, directories requested without a trailing slash are redirected to
//! the slashed form, and everything else goes to the configured not-found
//! responder. Directory listings are never produced: a trailing-slash request
//! only ever looks for that directory's `index.html`.
//!
//! Paths reaching the responder are already percent-decoded. Any `..` segment
//! is refused with 400 before the filesystem is touched.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use super::{RequestContext, Responder};
use crate::http::{build_error_response, build_redirect_response, serve_file};

const INDEX_PAGE: &str = "index.html";

pub struct StaticContentResponder {
    url_prefix: String,
    directory: String,
    not_found: Arc<dyn Responder>,
}

impl StaticContentResponder {
    /// `url_prefix` must match the path the responder is mounted under,
    /// including its trailing slash (e.g. `/static/`).
    pub fn new(
        url_prefix: impl Into<String>,
        directory: impl Into<String>,
        not_found: Arc<dyn Responder>,
    ) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            directory: directory.into(),
            not_found,
        }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Filesystem path a request path maps to.
    ///
    /// The prefix minus its trailing slash is cut from the front of the path,
    /// leaving a root-relative remainder that is appended to the directory.
    /// Paths ending in `/` map to the `index.html` inside them. Returns `None`
    /// when the path is too short to hold the prefix.
    pub fn resolve_target(&self, request_path: &str) -> Option<PathBuf> {
        let cut = self.url_prefix.len().saturating_sub(1);
        let relative = request_path.get(cut..)?;

        let mut target = String::with_capacity(self.directory.len() + relative.len() + 10);
        target.push_str(&self.directory);
        target.push_str(relative);
        if request_path.ends_with('/') {
            target.push_str(INDEX_PAGE);
        }

        Some(PathBuf::from(target))
    }
}

/// True when any segment of `path`, split on slashes or backslashes, is `..`
fn has_parent_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

#[async_trait]
impl Responder for StaticContentResponder {
    async fn respond(&self, ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
        if has_parent_segment(ctx.path) {
            return build_error_response(StatusCode::BAD_REQUEST, "invalid URL path");
        }

        let Some(target) = self.resolve_target(ctx.path) else {
            return self.not_found.respond(ctx).await;
        };

        // Any stat failure counts as not found, permission errors included
        let Ok(metadata) = fs::metadata(&target).await else {
            return self.not_found.respond(ctx).await;
        };

        if metadata.is_dir() {
            build_redirect_response(&format!("{}/", ctx.path))
        } else if metadata.is_file() {
            serve_file(ctx, &target).await
        } else {
            self.not_found.respond(ctx).await
        }
    }
}

impl std::fmt::Debug for StaticContentResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticContentResponder")
            .field("url_prefix", &self.url_prefix)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
