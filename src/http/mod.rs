//! HTTP protocol layer module
//!
//! Response builders and the file-serving primitive shared by the responders.
//! Nothing in here knows about templates or mount points.

pub mod file;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use file::serve_file;
pub use range::parse_range_header;
pub use response::{
    build_405_response, build_error_response, build_options_response, build_page_response,
    build_redirect_response,
};
