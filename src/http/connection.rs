use std::time::Duration;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::files::Router;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

/// Failures that end a connection without a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("malformed request: {0}")]
    Parse(#[from] ParseError),
    #[error("timed out waiting for request data")]
    ReadTimeout,
    #[error("timed out writing response")]
    WriteTimeout,
}

/// One client connection, handling exactly one request-response cycle.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    router: Router,
    max_header_bytes: usize,
    idle_timeout: Option<Duration>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Router) -> Self {
        let config = router.config();
        let max_header_bytes = config.max_header_bytes;
        let idle_timeout = config.idle_timeout();

        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            router,
            max_header_bytes,
            idle_timeout,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let response = self.router.route(req).await;

                    tracing::info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        "request served"
                    );

                    let writer = ResponseWriter::new(response).idle_timeout(self.idle_timeout);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    // One response per connection; the peer sees EOF next.
                    let _ = self.stream.shutdown().await;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until a complete header section is buffered.
    ///
    /// Returns `Ok(None)` when the peer closes first.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match parse_http_request(&self.buffer, self.max_header_bytes) {
                Ok((request, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => return Err(ConnectionError::Parse(e).into()),
            }

            let n = match self.idle_timeout {
                Some(limit) => tokio::time::timeout(limit, self.stream.read_buf(&mut self.buffer))
                    .await
                    .map_err(|_| ConnectionError::ReadTimeout)??,
                None => self.stream.read_buf(&mut self.buffer).await?,
            };

            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::debug!(buffered = self.buffer.len(), "peer closed before headers were complete");
                }
                return Ok(None);
            }
        }
    }
}
