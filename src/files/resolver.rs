//! Maps decoded request paths onto files under the document root.

use std::path::{Path, PathBuf};

use crate::http::response::StatusCode;

/// Appended to any path that ends in `/`.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Outcome of path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A regular file that lies inside the document root
    File(PathBuf),
    /// Nothing servable; the status to answer with
    Error(StatusCode),
}

impl ResolvedTarget {
    fn not_found() -> Self {
        ResolvedTarget::Error(StatusCode::NotFound)
    }
}

/// Appends `index.html` to paths naming a directory (trailing `/`).
pub fn with_default_document(path: &str) -> String {
    let mut path = path.to_string();
    if path.ends_with('/') {
        path.push_str(DEFAULT_DOCUMENT);
    }
    path
}

/// Resolves `path` (already percent-decoded, query removed) against
/// `document_root`.
///
/// `document_root` must be canonical. The joined path is canonicalized too,
/// so `..` segments and symlinks are followed before the containment check;
/// anything that ends up outside the root, or is not a regular file, is
/// reported as 404 so existence outside the root is never revealed.
pub async fn resolve(document_root: &Path, path: &str) -> ResolvedTarget {
    if path.contains('\0') {
        return ResolvedTarget::not_found();
    }

    let path = with_default_document(path);

    let relative = path.strip_prefix('/').unwrap_or(&path);
    let joined = document_root.join(relative);

    let Ok(canonical) = tokio::fs::canonicalize(&joined).await else {
        return ResolvedTarget::not_found();
    };

    if !canonical.starts_with(document_root) {
        tracing::debug!(path = %path, resolved = %canonical.display(), "path escapes document root");
        return ResolvedTarget::not_found();
    }

    match tokio::fs::metadata(&canonical).await {
        Ok(meta) if meta.is_file() => ResolvedTarget::File(canonical),
        _ => ResolvedTarget::not_found(),
    }
}
