//! MIME type detection module
//!
//! Maps a served file's extension to its Content-Type.

use std::path::Path;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content-Type for the file at `path`, decided by extension only
///
/// # Examples
/// ```
/// use pagekit::http::mime::content_type_for;
/// use std::path::Path;
///
/// assert_eq!(content_type_for(Path::new("site/index.html")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("site/LOGO.PNG")), "image/png");
/// assert_eq!(content_type_for(Path::new("site/README")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(DEFAULT_CONTENT_TYPE, |ext| {
            by_extension(&ext.to_ascii_lowercase())
        })
}

fn by_extension(extension: &str) -> &'static str {
    match extension {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",

        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",

        _ => DEFAULT_CONTENT_TYPE,
    }
}
