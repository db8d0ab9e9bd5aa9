//! HTTP client utilities for the storefront client.
//!
//! Provides a small builder API over a pluggable [`Transport`] with automatic
//! JSON handling and bearer-token injection.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_fetch::FetchClient;
//!
//! let client = FetchClient::new().with_base_url("https://shop.example.com/api");
//!
//! let stats: serde_json::Value = client
//!     .get("/reviews/42/stats")
//!     .send_json()
//!     .await?;
//! ```

mod error;
pub mod mock;
mod request;
mod response;
mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use error::FetchError;
pub use request::{encode_component, Method, Request};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

/// Supplies the bearer token for authenticated requests.
///
/// Consulted on every request, so a login or logout takes effect for
/// requests issued afterwards.
pub trait TokenProvider: Send + Sync {
    /// The current token, if a session exists.
    fn bearer_token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// HTTP client for making outbound requests.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a new HTTP client using the `reqwest` transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a specific transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: None,
            default_headers: BTreeMap::new(),
            transport,
            tokens: None,
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Attach bearer tokens from `provider` to every request.
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(provider);
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url
                } else {
                    format!("{}{}", base.trim_end_matches('/'), url)
                }
            }
            None => url,
        };

        let mut request = Request::new(method, full_url);
        for (key, value) in &self.default_headers {
            request = request.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            request,
            transport: self.transport.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    request: Request,
    transport: Arc<dyn Transport>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.request = self.request.json(value)?;
        Ok(self)
    }

    /// Add an explicit bearer token, overriding the client's provider.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_auth(token);
        self
    }

    /// Send the request and return the response, whatever its status.
    pub async fn send(self) -> Result<Response, FetchError> {
        let mut request = self.request;
        if request.header_value("Authorization").is_none() {
            if let Some(token) = self.tokens.as_ref().and_then(|p| p.bearer_token()) {
                request = request.bearer_auth(token);
            }
        }

        let method = request.method();
        let path = request.path().to_string();
        tracing::debug!(%method, %path, "sending request");

        match self.transport.send(request).await {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status, "received response");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(%method, %path, error = %e, "request failed");
                Err(e)
            }
        }
    }

    /// Send, fail on non-2xx, and parse the JSON body.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.error_for_status()?.json()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Request, Response, Transport};
}
