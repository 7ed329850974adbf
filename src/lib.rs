//! pagekit: a static-site server with templated not-found and error pages.
//!
//! Each configured mount maps a URL prefix onto a directory. Requests that
//! match no file are answered by a not-found page rendered from a template,
//! and the error page is rendered from a second template.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod responders;
pub mod server;
pub mod template;
