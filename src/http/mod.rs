//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the file server speaks: one
//! GET or HEAD request per connection, answered and then closed.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine driving parse, route and write
//! - **`parser`**: Frames the header section and parses the request line
//! - **`uri`**: Query-string removal and percent-decoding of the request-target
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes, the fixed header set and response bodies
//! - **`writer`**: Serializes responses and streams file bodies in chunks
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the full header section
//!        └──────┬──────┘
//!               │ Request parsed      (EOF / malformed / too large → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route to a file or an error
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send head, stream body
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quay::{config::Config, files::Router, http::connection::Connection};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let router = Router::new(Arc::new(Config::default()));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = router.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, router);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
pub mod uri;
