//! Turns a parsed request into a response.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;

use crate::config::Config;
use crate::files::resolver::{self, ResolvedTarget};
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Routes GET and HEAD to files under the document root; everything else
/// is answered with 405.
///
/// Cheap to clone; all clones share one read-only `Config`.
#[derive(Debug, Clone)]
pub struct Router {
    config: Arc<Config>,
}

impl Router {
    /// `config.document_root` must already be canonical.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document_root(&self) -> &Path {
        &self.config.document_root
    }

    /// Produces the response for `request`. Never fails: I/O problems after
    /// resolution turn into 404 or 500.
    pub async fn route(&self, request: &Request) -> Response {
        let server = self.config.server_name.as_str();

        let head_only = match request.method {
            Method::GET => false,
            Method::HEAD => true,
            _ => return Response::error(StatusCode::MethodNotAllowed, server, false),
        };

        match resolver::resolve(self.document_root(), &request.path).await {
            ResolvedTarget::Error(status) => Response::error(status, server, head_only),
            ResolvedTarget::File(path) => {
                // Typed by the name the client asked for, not a symlink target.
                let content_type = mime::content_type(resolver::with_default_document(&request.path));

                match self.serve_file(&path, content_type, head_only).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to open resolved file");
                        self.open_error_response(&e, head_only)
                    }
                }
            }
        }
    }

    /// Maps a failure to open or stat an already resolved file: a file that
    /// vanished is 404, anything else is 500.
    pub fn open_error_response(&self, e: &io::Error, head_only: bool) -> Response {
        let server = self.config.server_name.as_str();

        match e.kind() {
            io::ErrorKind::NotFound => Response::not_found(server, head_only),
            _ => Response::internal_error(server, head_only),
        }
    }

    async fn serve_file(&self, path: &Path, content_type: String, head_only: bool) -> io::Result<Response> {
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();

        let builder = ResponseBuilder::new(StatusCode::Ok)
            .server(self.config.server_name.as_str())
            .content_type(content_type)
            .content_length(len);

        // The handle is dropped right away for HEAD.
        Ok(if head_only {
            builder.build()
        } else {
            builder.file(file).build()
        })
    }
}
