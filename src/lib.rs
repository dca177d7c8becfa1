//! Quay - Static File Server
//!
//! Serves files from a document root over a minimal HTTP/1.1: GET and HEAD,
//! one request per connection, every connection on its own task.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
