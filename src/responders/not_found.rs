//! 404 page responder

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::path::Path;

use super::template::TemplateResponder;
use super::{RequestContext, Responder};
use crate::template::{Template, TemplateError};

/// Data handed to the not-found template as `{{ path }}`
#[derive(Debug, Serialize)]
pub struct NotFoundReport<'a> {
    pub path: &'a str,
}

/// Serves a 404 page naming the requested path
#[derive(Debug, Clone)]
pub struct NotFoundResponder {
    inner: TemplateResponder,
}

impl NotFoundResponder {
    /// The template must display `{{ path }}`
    pub const fn new(template: Template) -> Self {
        Self {
            inner: TemplateResponder::new(template),
        }
    }

    /// Load the template file at `template_path` and build the responder
    pub fn load(template_path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        Template::load(template_path).map(Self::new)
    }

    /// Render the 404 page for `path`, the original request path
    pub fn serve(&self, path: &str) -> Response<Full<Bytes>> {
        self.inner
            .render(StatusCode::NOT_FOUND, &NotFoundReport { path })
    }
}

#[async_trait]
impl Responder for NotFoundResponder {
    async fn respond(&self, ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
        self.serve(ctx.path)
    }
}
