//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network — the host (the view layer's event loop) is
//! responsible for executing the actual I/O. This keeps the façade and the
//! controllers deterministic: the in-flight states the UI cares about
//! (loading flags, disabled buttons, stale responses) are ordinary state
//! transitions instead of scheduler behavior.
//!
//! All fields use owned types (`String`, `Vec`) so values can be handed to
//! whatever transport the host runs without lifetime concerns.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Header names are emitted lowercase; lookups are case-insensitive.
pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";

/// Bytes escaped when a value is embedded in a query component. Matches what
/// the browser's `encodeURIComponent` escapes for the characters that can
/// occur in a list name.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?');

/// Percent-encode a value for use as a query-string component.
pub fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_*` methods with the credential already
/// attached. The host executes it and feeds the corresponding
/// `HttpResponse` (or a transport error) back into the matching `parse_*`
/// or controller `finish_*` method.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an `HttpRequest`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Bodyless response with the given status, mostly for tests.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }
}
