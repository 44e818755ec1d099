//! HTTP/1.x wire framing of a request head, for size measurement only.
//!
//! ```text
//! <METHOD> SP <path-and-query> SP <version> CRLF
//! [Host: <authority> CRLF]          (uri has an authority, no Host header)
//! (<name> ": " <value> CRLF)*       (HeaderMap iteration order)
//! CRLF
//! ```
//! The body follows the blank line unchanged, so a request's wire size is
//! `head_len + body_len`.

use std::io::{self, Write};

use axum::http::{header, request, HeaderMap, Method, Uri, Version};
use httpmeter_core::SizeCounter;

/// Owned copy of the request head, movable into a measuring task.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub fn from_parts(parts: &request::Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let target = self.uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        write!(w, "{} {} {}\r\n", self.method, target, version_str(self.version))?;

        if !self.headers.contains_key(header::HOST) {
            if let Some(authority) = self.uri.authority() {
                write!(w, "Host: {}\r\n", authority)?;
            }
        }
        for (name, value) in &self.headers {
            w.write_all(name.as_str().as_bytes())?;
            w.write_all(b": ")?;
            w.write_all(value.as_bytes())?;
            w.write_all(b"\r\n")?;
        }
        w.write_all(b"\r\n")
    }

    /// Serialized head length in bytes. Nothing is buffered.
    pub fn wire_len(&self) -> io::Result<u64> {
        let mut c = SizeCounter::new();
        self.write_to(&mut c)?;
        Ok(c.size())
    }
}

fn version_str(v: Version) -> &'static str {
    match v {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
