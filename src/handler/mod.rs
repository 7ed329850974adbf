//! Request handler module
//!
//! Owns the router that maps each request onto a responder.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, Router};
