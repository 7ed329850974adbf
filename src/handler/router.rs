//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! mount matching, dispatching to a responder and access logging.

use crate::config::Config;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::responders::{
    decode_path, ErrorResponder, NotFoundResponder, RequestContext, Responder,
    StaticContentResponder,
};
use crate::template::TemplateError;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Every responder the server can dispatch to, built once at startup
pub struct Router {
    /// Sorted longest prefix first
    mounts: Vec<Arc<StaticContentResponder>>,
    error_route: Option<(String, Arc<ErrorResponder>)>,
    not_found: Arc<NotFoundResponder>,
    access_log: bool,
    access_log_format: String,
}

impl Router {
    /// Load the page templates and build one responder per mount.
    ///
    /// All mounts share a single not-found responder.
    pub fn from_config(config: &Config) -> Result<Self, TemplateError> {
        let pages = &config.pages;
        let not_found = Arc::new(NotFoundResponder::load(&pages.not_found_template)?);
        let error = Arc::new(ErrorResponder::load(
            &pages.error_template,
            pages.default_message.as_str(),
            pages.display_errors,
        )?);

        let mut mounts: Vec<Arc<StaticContentResponder>> = config
            .mounts
            .iter()
            .map(|mount| {
                if !Path::new(&mount.directory).is_dir() {
                    logger::log_warning(&format!(
                        "Mount {} points at missing directory {}",
                        mount.url_prefix, mount.directory
                    ));
                }
                Arc::new(StaticContentResponder::new(
                    mount.url_prefix.as_str(),
                    mount.directory.as_str(),
                    not_found.clone(),
                ))
            })
            .collect();
        mounts.sort_by_key(|mount| std::cmp::Reverse(mount.url_prefix().len()));

        Ok(Self {
            mounts,
            error_route: config.error_path().map(|path| (path.to_string(), error)),
            not_found,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        })
    }

    /// The mount responsible for `path`, if any
    pub fn find_mount(&self, path: &str) -> Option<&Arc<StaticContentResponder>> {
        self.mounts.iter().find(|mount| {
            let prefix = mount.url_prefix();
            path.starts_with(prefix) || path == prefix.trim_end_matches('/')
        })
    }

    /// Produce the response for a GET or HEAD request
    pub async fn dispatch(&self, ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
        if let Some((path, error)) = &self.error_route {
            if ctx.path == path {
                return error.serve_default();
            }
        }

        match self.find_mount(ctx.path) {
            Some(mount) => mount.respond(ctx).await,
            None => self.not_found.respond(ctx).await,
        }
    }

    fn log_access<B>(
        &self,
        req: &Request<B>,
        response: &Response<Full<Bytes>>,
        remote_addr: SocketAddr,
        elapsed: Duration,
    ) {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header(REFERER);
        entry.user_agent = header(USER_AGENT);
        entry.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        logger::log_access(&entry, &self.access_log_format);
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("mounts", &self.mounts)
            .field("error_path", &self.error_route.as_ref().map(|(p, _)| p))
            .field("access_log", &self.access_log)
            .finish_non_exhaustive()
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    router: Arc<Router>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let response = match *req.method() {
        Method::GET | Method::HEAD => match decode_path(req.uri().path()) {
            Some(path) => {
                let ctx = RequestContext {
                    path: &path,
                    ..RequestContext::from_request(&req)
                };
                router.dispatch(&ctx).await
            }
            // Undecodable paths cannot name a file
            None => router.not_found.serve(req.uri().path()),
        },
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method()));
            http::build_405_response()
        }
    };

    if router.access_log {
        router.log_access(&req, &response, remote_addr, started.elapsed());
    }
    Ok(response)
}
