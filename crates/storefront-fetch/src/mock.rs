//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{FetchError, Method, Request, Response, Transport};

type Route = (Method, String);

/// Transport that records every request and answers from scripted routes.
///
/// Each route (method + exact path) holds a queue of replies. Replies are
/// consumed in order; the last one keeps answering once the queue is down
/// to a single entry. Requests with no route fail with
/// [`FetchError::RequestError`].
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<Route, VecDeque<Result<Response, FetchError>>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.push(method, path, Ok(Response::json_body(status, &body)));
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, error: FetchError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: Method, path: &str, reply: Result<Response, FetchError>) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests sent to `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.method() == method && r.path() == path)
            .count()
    }

    /// Most recent request sent to `method path`.
    pub fn last(&self, method: Method, path: &str) -> Option<Request> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|r| r.method() == method && r.path() == path)
            .cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let key = (request.method(), request.path().to_string());
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let queue = routes.get_mut(&key).ok_or_else(|| {
            FetchError::RequestError(format!("no mock response for {} {}", key.0, key.1))
        })?;

        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.unwrap_or_else(|| {
            Err(FetchError::RequestError(format!(
                "no mock response for {} {}",
                key.0, key.1
            )))
        })
    }
}
