//! Requests, responses, and the network seam.
//!
//! The engine never talks to a socket. The host hands in a
//! [`NetworkBackend`] with every event that may fetch; transport failures
//! come back as [`FetchError`] values and the strategies turn them into
//! cache fallbacks or a synthetic 503. A non-2xx status is not a transport
//! failure: it is returned to the page, just never cached.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

// ── Request ─────────────────────────────────────────────────

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl Default for RequestMethod {
    fn default() -> Self {
        Self::Get
    }
}

impl RequestMethod {
    /// Wire form of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
        }
    }
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request URL, absolute or origin-relative.
    pub url: String,
    /// HTTP method.
    pub method: RequestMethod,
    /// Request headers (name → value).
    pub headers: BTreeMap<String, String>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// A GET request for a URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// A POST request carrying a body.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Post,
            headers: BTreeMap::new(),
            body: Some(body),
        }
    }

    /// Add a header, builder style.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// The pathname portion of the URL: scheme and host stripped, query and
    /// fragment cut off. `"https://a.example/api/girls?page=2"` and
    /// `"/api/girls"` both yield `"/api/girls"`.
    pub fn path(&self) -> &str {
        let after_scheme = match self.url.find("://") {
            Some(idx) => {
                let rest = &self.url[idx + 3..];
                match rest.find('/') {
                    Some(slash) => &rest[slash..],
                    None => "/",
                }
            }
            None => self.url.as_str(),
        };
        let end = after_scheme
            .find(|c: char| c == '?' || c == '#')
            .unwrap_or(after_scheme.len());
        &after_scheme[..end]
    }
}

// ── Response ────────────────────────────────────────────────

/// A response heading back to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was produced for.
    pub url: String,
    /// Status code.
    pub status: u16,
    /// Status text.
    pub status_text: String,
    /// Response headers (name → value).
    pub headers: BTreeMap<String, String>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with the standard status text and empty body.
    pub fn new(status: u16) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Attach a body, builder style.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a header, builder style.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Record the request URL this response answers.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The synthetic response strategies fall back to when both network and
    /// cache come up empty.
    pub fn service_unavailable() -> Self {
        Self::new(503)
    }

    /// Whether the status is in the success range.
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Standard status text for a status code.
pub fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

// ── Network seam ────────────────────────────────────────────

/// Transport-level fetch failure. Distinct from a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No connectivity.
    Offline,
    /// The host transport gave up on a deadline.
    TimedOut,
    /// Connection broke mid-flight.
    Interrupted(String),
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::Offline => write!(f, "offline"),
            FetchError::TimedOut => write!(f, "fetch timed out"),
            FetchError::Interrupted(reason) => write!(f, "fetch interrupted: {}", reason),
        }
    }
}

/// The host's network transport.
pub trait NetworkBackend {
    /// Perform a network fetch.
    fn fetch(&mut self, request: &Request) -> Result<Response, FetchError>;
}

// ── Outcome ─────────────────────────────────────────────────

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Served from a cache partition.
    Cache,
    /// Served from the network backend.
    Network,
    /// Synthesized by the engine (degraded 503).
    Synthetic,
}

/// What the engine decided for an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The engine produced a response for the page.
    Respond {
        response: Response,
        source: FetchSource,
    },
    /// Not intercepted; the host sends the request to network untouched.
    Passthrough,
    /// Cache-only lookup found nothing; no network was attempted.
    Miss,
}

impl FetchOutcome {
    /// The response, when one was produced.
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The provenance, when a response was produced.
    pub fn source(&self) -> Option<FetchSource> {
        match self {
            FetchOutcome::Respond { source, .. } => Some(*source),
            _ => None,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────
