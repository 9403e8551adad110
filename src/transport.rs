//! HTTP seam between the dispatcher and the network.
//!
//! [`Transport`] performs exactly one request per call and never retries.
//! [`ReqwestTransport`] is the production implementation; tests swap in a
//! scripted transport to observe or fake traffic.

use async_trait::async_trait;
use thiserror::Error;

use crate::request::FormattedRequest;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, timeout or body-read failure.
    #[error("{0}")]
    Network(String),
    /// The request could not be built or was otherwise rejected locally.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Other(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Performs one outbound HTTP call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `request.body` as JSON with `request.headers`.
    async fn post_json(&self, request: &FormattedRequest) -> Result<HttpResponse, TransportError>;

    /// Plain GET, used for model discovery.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
///
/// Uses the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: &FormattedRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.json(&request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-memory transport for tests.

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::{HttpResponse, Transport, TransportError};
    use crate::request::FormattedRequest;

    type PostHandler = Box<dyn Fn(&Value) -> Result<HttpResponse, TransportError> + Send + Sync>;
    type DelayFn = Box<dyn Fn(&Value) -> Duration + Send + Sync>;

    /// Answers POSTs from a closure over the JSON body and records every call.
    pub struct MockTransport {
        post: PostHandler,
        delay: Option<DelayFn>,
        get_reply: Option<Result<HttpResponse, TransportError>>,
        posts: Mutex<Vec<FormattedRequest>>,
        gets: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub fn new(
            post: impl Fn(&Value) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                post: Box::new(post),
                delay: None,
                get_reply: None,
                posts: Mutex::new(Vec::new()),
                gets: Mutex::new(Vec::new()),
            }
        }

        /// Always answers `status` with `body`.
        pub fn replying(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self::new(move |_| {
                Ok(HttpResponse {
                    status,
                    body: body.clone(),
                })
            })
        }

        pub fn with_delay(
            mut self,
            delay: impl Fn(&Value) -> Duration + Send + Sync + 'static,
        ) -> Self {
            self.delay = Some(Box::new(delay));
            self
        }

        pub fn with_get_reply(mut self, reply: Result<HttpResponse, TransportError>) -> Self {
            self.get_reply = Some(reply);
            self
        }

        pub fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }

        pub fn posts(&self) -> Vec<FormattedRequest> {
            self.posts.lock().unwrap().clone()
        }

        pub fn get_count(&self) -> usize {
            self.gets.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_json(
            &self,
            request: &FormattedRequest,
        ) -> Result<HttpResponse, TransportError> {
            self.posts.lock().unwrap().push(request.clone());
            let body = serde_json::to_value(&request.body).unwrap();
            if let Some(delay) = &self.delay {
                tokio::time::sleep(delay(&body)).await;
            }
            (self.post)(&body)
        }

        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.gets.lock().unwrap().push(url.to_string());
            self.get_reply
                .clone()
                .unwrap_or_else(|| Err(TransportError::Network("connection refused".into())))
        }
    }
}
