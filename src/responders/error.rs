//! 500 page responder
//!
//! Application code calls `serve_error` when its own work fails. Whether the
//! caller's message reaches the client is decided once, at construction:
//! detailed messages in development, the fixed default message in production.
//! `always_serve_error` bypasses that policy for operator-chosen messages.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::path::Path;

use super::template::TemplateResponder;
use super::{RequestContext, Responder};
use crate::template::{Template, TemplateError};

/// Data handed to the error template as `{{ message }}`
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone)]
pub struct ErrorResponder {
    inner: TemplateResponder,
    default_message: String,
    display_errors: bool,
}

impl ErrorResponder {
    /// The template must display `{{ message }}`.
    ///
    /// With `display_errors` off, `serve_error` always shows `default_message`.
    pub fn new(template: Template, default_message: impl Into<String>, display_errors: bool) -> Self {
        Self {
            inner: TemplateResponder::new(template),
            default_message: default_message.into(),
            display_errors,
        }
    }

    /// Load the template file at `template_path` and build the responder
    pub fn load(
        template_path: impl AsRef<Path>,
        default_message: impl Into<String>,
        display_errors: bool,
    ) -> Result<Self, TemplateError> {
        let template = Template::load(template_path)?;
        Ok(Self::new(template, default_message, display_errors))
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    pub const fn displays_errors(&self) -> bool {
        self.display_errors
    }

    /// Serve `message`, or the default message when errors are hidden
    pub fn serve_error(&self, message: &str) -> Response<Full<Bytes>> {
        if self.display_errors {
            self.render(message)
        } else {
            self.serve_default()
        }
    }

    /// Serve `message` regardless of the display policy
    pub fn always_serve_error(&self, message: &str) -> Response<Full<Bytes>> {
        self.render(message)
    }

    /// Serve the default message
    pub fn serve_default(&self) -> Response<Full<Bytes>> {
        self.render(&self.default_message)
    }

    fn render(&self, message: &str) -> Response<Full<Bytes>> {
        self.inner
            .render(StatusCode::INTERNAL_SERVER_ERROR, &ErrorReport { message })
    }
}

#[async_trait]
impl Responder for ErrorResponder {
    async fn respond(&self, _ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
        self.serve_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    const DEFAULT_MESSAGE: &str = "Default error message";
    const CUSTOM_MESSAGE: &str = "Test ServeError";

    fn responder(display_errors: bool) -> ErrorResponder {
        ErrorResponder::load(
            concat!(env!("CARGO_MANIFEST_DIR"), "/templates/error.html"),
            DEFAULT_MESSAGE,
            display_errors,
        )
        .unwrap()
    }

    async fn assert_page(response: Response<Full<Bytes>>, message: &str) {
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, format!("Error: {message}").as_bytes());
    }

    #[tokio::test]
    async fn test_displayed_errors() {
        let responder = responder(true);
        assert!(responder.displays_errors());
        assert_page(responder.serve_error(CUSTOM_MESSAGE), CUSTOM_MESSAGE).await;
        assert_page(responder.always_serve_error(CUSTOM_MESSAGE), CUSTOM_MESSAGE).await;
    }

    #[tokio::test]
    async fn test_hidden_errors() {
        let responder = responder(false);
        assert_page(responder.serve_error(CUSTOM_MESSAGE), DEFAULT_MESSAGE).await;
        assert_page(responder.always_serve_error(CUSTOM_MESSAGE), CUSTOM_MESSAGE).await;
    }

    #[tokio::test]
    async fn test_default_message() {
        for display_errors in [true, false] {
            let responder = responder(display_errors);
            assert_eq!(responder.default_message(), DEFAULT_MESSAGE);
            assert_page(responder.serve_default(), DEFAULT_MESSAGE).await;
            assert_page(
                responder.respond(&RequestContext::get("/anything")).await,
                DEFAULT_MESSAGE,
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_broken_template_falls_back() {
        let template = Template::from_source("error.html", "Error: {{ msg }}").unwrap();
        let responder = ErrorResponder::new(template, DEFAULT_MESSAGE, true);

        let response = responder.serve_error(CUSTOM_MESSAGE);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.starts_with("Error: "), "{body}");
        assert!(body.ends_with('\n'));
    }
}
