use std::time::SystemTime;

use tokio::fs::File;

/// Content type of every error body.
pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): file found
/// - `NotFound` (404): no such file under the document root
/// - `MethodNotAllowed` (405): anything but GET and HEAD
/// - `InternalServerError` (500): the resolved file could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use quay::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use quay::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// The fixed set of response headers, serialized in declaration order:
/// `Date`, `Server`, `Content-Type`, `Content-Length`, `Connection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// RFC 1123 date in GMT
    pub date: String,
    pub server: String,
    pub content_type: String,
    /// Byte length of the body a GET would carry
    pub content_length: u64,
    pub connection: String,
}

impl ResponseHeaders {
    /// Header name/value pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, String); 5] {
        [
            ("Date", self.date.clone()),
            ("Server", self.server.clone()),
            ("Content-Type", self.content_type.clone()),
            ("Content-Length", self.content_length.to_string()),
            ("Connection", self.connection.clone()),
        ]
    }
}

/// What follows the header section on the wire.
#[derive(Debug)]
pub enum Body {
    /// No body, e.g. any response to HEAD
    Empty,
    /// An in-memory body such as an error message
    Bytes(Vec<u8>),
    /// An open file, streamed in chunks by the writer
    File(File),
}

/// A complete HTTP response ready to be handed to the writer.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    pub headers: ResponseHeaders,
    pub body: Body,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use quay::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .server("quay")
///     .content_type("text/plain; charset=utf-8")
///     .bytes(b"hi".to_vec())
///     .build();
/// assert_eq!(response.headers.content_length, 2);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    server: String,
    content_type: String,
    content_length: Option<u64>,
    body: Body,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            server: String::new(),
            content_type: PLAIN_TEXT.to_string(),
            content_length: None,
            body: Body::Empty,
        }
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Overrides the length derived from the body.
    ///
    /// Required for file bodies and for HEAD responses, where the body
    /// itself carries no length.
    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Sets an in-memory body.
    pub fn bytes(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Sets a file body.
    pub fn file(mut self, file: File) -> Self {
        self.body = Body::File(file);
        self
    }

    /// Builds the final Response, stamping the current date.
    ///
    /// Content-Length falls back to the in-memory body size, or 0.
    pub fn build(self) -> Response {
        let content_length = self.content_length.unwrap_or(match &self.body {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::Empty | Body::File(_) => 0,
        });

        Response {
            status: self.status,
            headers: ResponseHeaders {
                date: httpdate::fmt_http_date(SystemTime::now()),
                server: self.server,
                content_type: self.content_type,
                content_length,
                connection: "close".to_string(),
            },
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a plain-text error response whose body is the reason phrase.
    ///
    /// With `head_only` the body is dropped but Content-Length still
    /// reports its size.
    pub fn error(status: StatusCode, server: &str, head_only: bool) -> Self {
        let message = status.reason_phrase().as_bytes().to_vec();
        let builder = ResponseBuilder::new(status)
            .server(server)
            .content_type(PLAIN_TEXT)
            .content_length(message.len() as u64);

        if head_only {
            builder.build()
        } else {
            builder.bytes(message).build()
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(server: &str, head_only: bool) -> Self {
        Self::error(StatusCode::NotFound, server, head_only)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error(server: &str, head_only: bool) -> Self {
        Self::error(StatusCode::InternalServerError, server, head_only)
    }
}
