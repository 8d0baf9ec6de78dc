//! Minimal HTTP/1.1 framing
//!
//! Just enough HTTP for the control UI: parse a request line, pull query
//! parameters out of it and frame a response. Every connection carries one
//! request and is closed after the response.

use core::fmt::{self, Write};

use heapless::String;
use serde::Serialize;

use crate::system::assets::Asset;

/// Largest request head read from a connection
pub const MAX_REQUEST_HEAD: usize = 1024;

/// Capacity of a decoded query parameter value
pub const MAX_PARAM_LEN: usize = 32;

/// Capacity of a generated text or JSON body
pub const MAX_TEXT_BODY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Head is not UTF-8
    Encoding,
    /// Request line lacks a method or target
    Malformed,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Encoding => f.write_str("request head is not UTF-8"),
            RequestError::Malformed => f.write_str("malformed request line"),
        }
    }
}

/// Parsed request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: &'a str,
    pub path: &'a str,
    /// Raw query string without the `?`, empty when absent
    pub query: &'a str,
}

impl<'a> Request<'a> {
    /// Parses the request line of `head`; headers are ignored
    pub fn parse(head: &'a [u8]) -> Result<Self, RequestError> {
        let line_end = head
            .windows(2)
            .position(|w| w == b"\r\n")
            .unwrap_or(head.len());
        let line = core::str::from_utf8(&head[..line_end]).map_err(|_| RequestError::Encoding)?;

        let mut parts = line.split_ascii_whitespace();
        let method = parts.next().ok_or(RequestError::Malformed)?;
        let target = parts.next().ok_or(RequestError::Malformed)?;
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        Ok(Self {
            method,
            path,
            query,
        })
    }

    /// Decoded value of the first query parameter named `key`
    ///
    /// `None` if the parameter is absent, its value does not decode, or it is
    /// longer than [`MAX_PARAM_LEN`].
    pub fn param(&self, key: &str) -> Option<String<MAX_PARAM_LEN>> {
        self.query
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(k, _)| *k == key)
            .and_then(|(_, value)| decode(value))
    }
}

/// Decodes `+` and `%XX` escapes
fn decode(raw: &str) -> Option<String<MAX_PARAM_LEN>> {
    let mut bytes: heapless::Vec<u8, MAX_PARAM_LEN> = heapless::Vec::new();
    let mut input = raw.bytes();
    while let Some(b) = input.next() {
        let decoded = match b {
            b'+' => b' ',
            b'%' => {
                let hi = hex_value(input.next()?)?;
                let lo = hex_value(input.next()?)?;
                (hi << 4) | lo
            }
            other => other,
        };
        bytes.push(decoded).ok()?;
    }
    String::from_utf8(bytes).ok()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Bytes living in flash
    Static(&'static [u8]),
    /// Generated text
    Text(String<MAX_TEXT_BODY>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: &'static str,
    body: Body,
}

impl Response {
    pub fn text(status: Status, text: &'static str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Body::Static(text.as_bytes()),
        }
    }

    /// Plain text built from format arguments, a 500 if it does not fit
    pub fn text_fmt(status: Status, args: fmt::Arguments<'_>) -> Self {
        let mut body = String::new();
        if body.write_fmt(args).is_err() {
            warn!("text body exceeds {} bytes", MAX_TEXT_BODY);
            return Self::text(Status::InternalServerError, "Response too large");
        }
        Self {
            status,
            content_type: "text/plain",
            body: Body::Text(body),
        }
    }

    /// 200 with `value` serialized as JSON, a 500 if it does not fit
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json_core::to_string::<_, MAX_TEXT_BODY>(value) {
            Ok(body) => Self {
                status: Status::Ok,
                content_type: "application/json",
                body: Body::Text(body),
            },
            Err(_) => {
                warn!("JSON body exceeds {} bytes", MAX_TEXT_BODY);
                Self::text(Status::InternalServerError, "Response too large")
            }
        }
    }

    pub fn asset(asset: &Asset) -> Self {
        Self {
            status: Status::Ok,
            content_type: asset.content_type,
            body: Body::Static(asset.body),
        }
    }

    pub fn body(&self) -> &[u8] {
        match &self.body {
            Body::Static(bytes) => bytes,
            Body::Text(text) => text.as_bytes(),
        }
    }

    /// Status line and headers, including the blank line
    pub fn head(&self) -> String<192> {
        let mut head = String::new();
        // Longest possible head is well under the capacity
        let _ = write!(
            head,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body().len()
        );
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line() {
        let request =
            Request::parse(b"GET /square?size=40 HTTP/1.1\r\nHost: 169.254.1.1\r\n\r\n").unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/square");
        assert_eq!(request.query, "size=40");
    }

    #[test]
    fn path_without_query() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path, "/");
        assert_eq!(request.query, "");
        assert_eq!(request.param("val"), None);
    }

    #[test]
    fn rejects_incomplete_request_line() {
        assert_eq!(Request::parse(b"GET\r\n\r\n"), Err(RequestError::Malformed));
        assert_eq!(Request::parse(b"\r\n"), Err(RequestError::Malformed));
        assert_eq!(
            Request::parse(b"GET /\xff HTTP/1.1\r\n"),
            Err(RequestError::Encoding)
        );
    }

    #[test]
    fn params_are_decoded() {
        let request = Request::parse(b"GET /x?a=1&msg=hi+there%21&b=%zz HTTP/1.1\r\n").unwrap();
        assert_eq!(request.param("a").as_deref(), Some("1"));
        assert_eq!(request.param("msg").as_deref(), Some("hi there!"));
        assert_eq!(request.param("b"), None);
        assert_eq!(request.param("c"), None);
    }

    #[test]
    fn first_matching_param_wins() {
        let request = Request::parse(b"GET /cmd?val=F&val=S HTTP/1.1\r\n").unwrap();
        assert_eq!(request.param("val").as_deref(), Some("F"));
    }

    #[test]
    fn key_without_value_is_empty() {
        let request = Request::parse(b"GET /cmd?val HTTP/1.1\r\n").unwrap();
        assert_eq!(request.param("val").as_deref(), Some(""));
    }

    #[test]
    fn head_carries_length_and_close() {
        let response = Response::text(Status::NotFound, "File Not Found");
        let head = response.head();
        assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(head.contains("Content-Type: text/plain\r\n"));
        assert!(head.contains("Content-Length: 14\r\n"));
        assert!(head.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn oversized_text_becomes_server_error() {
        let long = [b'x'; MAX_TEXT_BODY + 1];
        let long = core::str::from_utf8(&long).unwrap();
        let response = Response::text_fmt(Status::Ok, format_args!("{long}"));
        assert_eq!(response.status, Status::InternalServerError);
    }
}
