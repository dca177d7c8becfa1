//! Static file serving
//!
//! Path resolution against the document root and the request router that
//! picks between a file and an error response.

pub mod resolver;
pub mod router;

pub use resolver::{ResolvedTarget, resolve};
pub use router::Router;
