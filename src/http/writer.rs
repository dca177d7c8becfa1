use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::connection::ConnectionError;
use crate::http::response::{Body, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Largest slice of a file read into memory at once.
pub const CHUNK_SIZE: usize = 1024;

/// Serializes the status line, the headers and the blank separator line.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers.pairs() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response to a stream: head first, then the body.
///
/// File bodies are streamed in `CHUNK_SIZE` pieces and capped at the
/// advertised Content-Length. The writer never closes the stream.
pub struct ResponseWriter {
    head: Vec<u8>,
    written: usize,
    body: Body,
    content_length: u64,
    idle_timeout: Option<Duration>,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: serialize_head(&response),
            written: 0,
            content_length: response.headers.content_length,
            body: response.body,
            idle_timeout: None,
        }
    }

    /// Fails any single write that makes no progress for `timeout`.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Writes the response and returns how many body bytes were sent.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.head.len() {
            let n = idle(self.idle_timeout, stream.write(&self.head[self.written..])).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        let sent = match std::mem::replace(&mut self.body, Body::Empty) {
            Body::Empty => 0,
            Body::Bytes(bytes) => {
                idle(self.idle_timeout, stream.write_all(&bytes)).await?;
                bytes.len() as u64
            }
            Body::File(mut file) => {
                stream_chunks(&mut file, stream, self.content_length, self.idle_timeout).await?
            }
        };

        idle(self.idle_timeout, stream.flush()).await?;
        Ok(sent)
    }
}

async fn stream_chunks<R, W>(
    source: &mut R,
    stream: &mut W,
    len: u64,
    timeout: Option<Duration>,
) -> anyhow::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut remaining = len;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let n = source.read(&mut chunk[..want]).await?;

        if n == 0 {
            anyhow::bail!("file ended {} bytes short of its Content-Length", remaining);
        }

        idle(timeout, stream.write_all(&chunk[..n])).await?;
        remaining -= n as u64;
    }

    Ok(len)
}

async fn idle<T, F>(timeout: Option<Duration>, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(ConnectionError::WriteTimeout.into()),
        },
        None => Ok(fut.await?),
    }
}
