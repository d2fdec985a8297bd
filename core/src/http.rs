//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network — the caller (host) is responsible for executing
//! the actual I/O. This keeps the core deterministic and lets the host pick
//! any transport, blocking or async.
//!
//! Response bodies are raw bytes because one endpoint (`/gen-pdf/{id}/`)
//! returns a binary document; JSON and text endpoints go through [`HttpResponse::text`].

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Whether the method changes server state. State-changing requests carry
    /// the CSRF token header.
    pub fn is_state_changing(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Patch | HttpMethod::Delete)
    }
}

/// An HTTP request described as plain data.
///
/// Built by the `build_*` methods of the client types. `path` is the full
/// URL including any query string. The caller executes the request and feeds
/// the resulting [`HttpResponse`] back into the matching `parse_*` method.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an [`HttpRequest`]. Header names
/// are matched case-insensitively by the accessors below.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// All values of the header `name`, case-insensitive. A header that
    /// appears several times (`set-cookie`) yields several values.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
