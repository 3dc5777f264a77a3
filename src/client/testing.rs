//! In-memory transport for tests
//!
//! [`RecordingTransport`] answers from a table of canned routes and records
//! every request it receives, so tests can assert both on results and on the
//! exact calls that were issued.

use super::{ClientError, RawResponse, Result, Transport};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Mutex;

/// One request seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"METHOD /path"`, handy for asserting call sequences.
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

enum Reply {
    Response(RawResponse),
    Fail(String),
}

struct Route {
    method: Method,
    path: String,
    reply: Reply,
}

impl Route {
    /// Exact match, or a query-less route matching the request path with
    /// its query string removed.
    fn matches(&self, method: &Method, path: &str) -> bool {
        if &self.method != method {
            return false;
        }
        if self.path == path {
            return true;
        }
        !self.path.contains('?') && path.split('?').next() == Some(self.path.as_str())
    }
}

/// Transport returning canned responses. Unmatched requests answer 404.
///
/// # Example
/// ```
/// use searchctl::client::testing::RecordingTransport;
/// use searchctl::client::Transport;
///
/// # async fn example() -> searchctl::client::Result<()> {
/// let transport = RecordingTransport::new().on("GET", "/", 200, r#"{"version":{}}"#);
/// let response = transport.get("/").await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.lines(), vec!["GET /"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct RecordingTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `status` and a text body.
    pub fn on(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            method: parse_method(method),
            path: path.to_string(),
            reply: Reply::Response(RawResponse::new(status, body.as_bytes().to_vec())),
        });
        self
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn on_json(self, method: &str, path: &str, status: u16, body: Value) -> Self {
        let text = body.to_string();
        self.on(method, path, status, &text)
    }

    /// Fail `method path` with a transport error.
    pub fn fail(mut self, method: &str, path: &str, message: &str) -> Self {
        self.routes.push(Route {
            method: parse_method(method),
            path: path.to_string(),
            reply: Reply::Fail(message.to_string()),
        });
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Requests as `"METHOD /path"` lines.
    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    /// Requests with a mutating method (PUT, POST, DELETE).
    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::GET && r.method != Method::HEAD)
            .collect()
    }
}

fn parse_method(method: &str) -> Method {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes()).unwrap_or(Method::GET)
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method: method.clone(),
                path: path.to_string(),
                body: body.cloned(),
            });

        match self.routes.iter().find(|r| r.matches(&method, path)) {
            Some(Route {
                reply: Reply::Response(response),
                ..
            }) => Ok(response.clone()),
            Some(Route {
                reply: Reply::Fail(message),
                ..
            }) => Err(ClientError::Transport(message.clone())),
            None => Ok(RawResponse::new(404, r#"{"error":"no route"}"#)),
        }
    }
}
