//! Scripted network backends.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use outpost_worker::fetch::{FetchError, NetworkBackend, Request, RequestMethod, Response};

/// A transport with canned GET responses and scripted POST verdicts.
///
/// GETs are answered from the `serves` table (404 when absent). POSTs are
/// accepted with 200 unless their body is on the refuse list, which earns
/// a 500. Flipping `offline` makes every fetch fail at the transport
/// level. All requests are recorded for inspection.
pub struct ScriptedBackend {
    online: bool,
    serves: BTreeMap<String, Response>,
    refused_bodies: Vec<Vec<u8>>,
    /// Every request seen, in order.
    pub requests: Vec<Request>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            online: true,
            serves: BTreeMap::new(),
            refused_bodies: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Serve `body` with a 200 for GETs on `url`.
    pub fn serve_ok(mut self, url: &str, body: &[u8]) -> Self {
        self.serves
            .insert(url.to_string(), Response::new(200).with_body(body.to_vec()));
        self
    }

    /// Serve an arbitrary status for GETs on `url`.
    pub fn serve_status(mut self, url: &str, status: u16) -> Self {
        self.serves.insert(url.to_string(), Response::new(status));
        self
    }

    /// Refuse POSTs carrying exactly this body with a 500.
    pub fn refuse_body(mut self, body: &[u8]) -> Self {
        self.refused_bodies.push(body.to_vec());
        self
    }

    /// Serve every URL in `urls` with a 200 and a small distinct body.
    pub fn serving_shell(urls: &[&str]) -> Self {
        let mut backend = Self::new();
        for url in urls {
            backend = backend.serve_ok(url, alloc::format!("asset {}", url).as_bytes());
        }
        backend
    }

    /// Drop the connection for subsequent fetches.
    pub fn go_offline(&mut self) {
        self.online = false;
    }

    /// Restore the connection.
    pub fn go_online(&mut self) {
        self.online = true;
    }

    /// Replace what a URL serves, simulating a deploy.
    pub fn update(&mut self, url: &str, body: &[u8]) {
        self.serves
            .insert(url.to_string(), Response::new(200).with_body(body.to_vec()));
    }

    /// Stop refusing POST bodies.
    pub fn accept_everything(&mut self) {
        self.refused_bodies.clear();
    }

    /// How many requests hit `url`.
    pub fn hits(&self, url: &str) -> usize {
        self.requests.iter().filter(|r| r.url == url).count()
    }

    /// Bodies of every POST to `url`, in order.
    pub fn posted_bodies(&self, url: &str) -> Vec<Vec<u8>> {
        self.requests
            .iter()
            .filter(|r| r.url == url && r.method == RequestMethod::Post)
            .filter_map(|r| r.body.clone())
            .collect()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBackend for ScriptedBackend {
    fn fetch(&mut self, request: &Request) -> Result<Response, FetchError> {
        self.requests.push(request.clone());
        if !self.online {
            return Err(FetchError::Offline);
        }
        match request.method {
            RequestMethod::Post => {
                let body = request.body.clone().unwrap_or_default();
                if self.refused_bodies.contains(&body) {
                    Ok(Response::new(500))
                } else {
                    Ok(Response::new(200))
                }
            }
            _ => match self.serves.get(&request.url) {
                Some(response) => Ok(response.clone().with_url(request.url.as_str())),
                None => Ok(Response::new(404)),
            },
        }
    }
}
