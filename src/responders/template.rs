//! Buffered template rendering shared by the page responders
//!
//! A page is rendered completely into memory before anything is handed to
//! the transport. The status line is only chosen once the body exists, so a
//! broken template can never produce a 404/500 header followed by half a page.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::http::{build_error_response, build_page_response};
use crate::template::Template;

/// Renders data into one owned template and commits it with a status code
#[derive(Debug, Clone)]
pub struct TemplateResponder {
    template: Template,
}

impl TemplateResponder {
    pub const fn new(template: Template) -> Self {
        Self { template }
    }

    pub const fn template(&self) -> &Template {
        &self.template
    }

    /// Render `data` and respond with `status`.
    ///
    /// If rendering fails the buffer is dropped and a plain-text 500 carrying
    /// the render error is returned instead.
    pub fn render<T: Serialize>(&self, status: StatusCode, data: &T) -> Response<Full<Bytes>> {
        let mut buffer = Vec::new();

        match self.template.render_into(data, &mut buffer) {
            Ok(()) => build_page_response(status, buffer),
            Err(e) => build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.chain()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;

    #[derive(Serialize)]
    struct Greeting {
        name: &'static str,
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_commits_status_and_body() {
        let template = Template::from_source("hello.html", "Hello {{ name }}").unwrap();
        let responder = TemplateResponder::new(template);

        let response = responder.render(StatusCode::ACCEPTED, &Greeting { name: "there" });
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body_string(response).await, "Hello there");
    }

    #[tokio::test]
    async fn test_render_failure_falls_back_to_plain_500() {
        // renders some text before hitting the undefined variable
        let template =
            Template::from_source("broken.html", "partial page {{ undefined_field }}").unwrap();
        let responder = TemplateResponder::new(template);

        let response = responder.render(StatusCode::NOT_FOUND, &Greeting { name: "x" });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");

        let body = body_string(response).await;
        assert!(body.contains("broken.html"), "{body}");
        assert!(!body.contains("partial page"), "{body}");
    }

    #[tokio::test]
    async fn test_render_is_repeatable() {
        let template = Template::from_source("hello.html", "Hello {{ name }}").unwrap();
        let responder = TemplateResponder::new(template);

        let first = responder.render(StatusCode::OK, &Greeting { name: "a" });
        let second = responder.render(StatusCode::OK, &Greeting { name: "a" });
        assert_eq!(body_string(first).await, body_string(second).await);
    }
}
