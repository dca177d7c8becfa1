//! Content-Type inference from file extensions.

use std::path::Path;

/// Used when the extension is missing or unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns the `Content-Type` value for a file.
///
/// Textual types get `; charset=utf-8` appended, binary types are returned
/// as-is.
///
/// ```
/// # use quay::http::mime::content_type;
/// assert_eq!(content_type("index.html"), "text/html; charset=utf-8");
/// assert_eq!(content_type("logo.png"), "image/png");
/// ```
pub fn content_type(path: impl AsRef<Path>) -> String {
    let Some(mime) = mime_guess::from_path(path.as_ref()).first() else {
        return FALLBACK_CONTENT_TYPE.to_string();
    };

    let essence = mime.essence_str();
    if is_textual(essence) {
        format!("{}; charset=utf-8", essence)
    } else {
        essence.to_string()
    }
}

fn is_textual(essence: &str) -> bool {
    essence.starts_with("text/") || essence == "application/javascript"
}
