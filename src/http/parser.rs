use std::collections::HashMap;

use thiserror::Error;

use crate::http::request::{Method, Request};
use crate::http::uri;

/// Marks the end of the header section.
pub const HEADERS_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("header section is not complete yet")]
    Incomplete,
    #[error("header section exceeds {limit} bytes")]
    HeadersTooLarge { limit: usize },
    #[error("request head is not valid UTF-8")]
    InvalidRequest,
    #[error("request line must have exactly three tokens")]
    MalformedRequestLine,
    #[error("header line without a colon")]
    InvalidHeader,
}

/// Parses one request head out of `buf`.
///
/// On success returns the request and the number of bytes consumed, which
/// covers the header section up to and including `\r\n\r\n`. The header
/// section may be at most `max_header_bytes` long; anything bigger is
/// rejected even if a terminator shows up later.
pub fn parse_http_request(buf: &[u8], max_header_bytes: usize) -> Result<(Request, usize), ParseError> {
    let window = &buf[..buf.len().min(max_header_bytes)];

    let headers_end = match find_headers_end(window) {
        Some(end) => end,
        None if buf.len() >= max_header_bytes => {
            return Err(ParseError::HeadersTooLarge { limit: max_header_bytes });
        }
        None => return Err(ParseError::Incomplete),
    };

    let headers_str = std::str::from_utf8(&buf[..headers_end])
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
    let parts: Vec<&str> = request_line.split_whitespace().collect();

    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        headers.insert(
            key.trim().to_string(),
            value.trim().to_string(),
        );
    }

    let request = Request {
        method: Method::parse(method),
        target: target.to_string(),
        path: uri::decode_path(target),
        version: version.to_string(),
        headers,
    };

    Ok((request, headers_end + HEADERS_TERMINATOR.len()))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_TERMINATOR.len())
        .position(|w| w == HEADERS_TERMINATOR)
}
