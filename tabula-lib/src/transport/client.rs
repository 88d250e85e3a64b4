//! HTTP client with retry, coalescing and error reporting

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use serde_json::Value as Json;
use url::Url;

use super::Envelope;
use super::HttpMethod;
use super::HttpRequest;
use super::RetryConfig;
use crate::error::ApiError;

/// Sends a single request and decodes the JSON body.
///
/// This is the seam between the retry/coalescing logic and the actual
/// network. [`ReqwestSender`] is the production implementation.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<Json, ApiError>;
}

/// Receives transport failures that exhausted their retries.
///
/// A UI would show a modal error dialog here.
pub trait ErrorSink: Send + Sync {
    fn report(&self, request: &HttpRequest, error: &ApiError);
}

/// Default sink: logs the failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, request: &HttpRequest, error: &ApiError) {
        log::error!("{} {} failed: {}", request.method, request.url, error);
    }
}

/// [`HttpSend`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestSender {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: &HttpRequest) -> Result<Json, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => {
                let mut url = Url::parse(&request.url)?;
                if !request.params.is_empty() {
                    url.query_pairs_mut().extend_pairs(request.query_pairs());
                }
                self.client.get(url)
            }
            HttpMethod::Post => self
                .client
                .post(&request.url)
                .json(&Json::Object(request.params.clone())),
        };

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout.unwrap_or_default())
            } else {
                ApiError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), body));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
    }
}

type InFlight = Shared<BoxFuture<'static, Envelope>>;

struct HttpClientInner {
    sender: Arc<dyn HttpSend>,
    retry: RetryConfig,
    error_sink: Arc<dyn ErrorSink>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// JSON client used by remote stores.
///
/// - Retries transient failures per [`RetryConfig`].
/// - Identical requests (same method, URL and params) that overlap share
///   one underlying call.
/// - Failures that exhaust their retries go to the [`ErrorSink`] and come
///   back as `Envelope { success: false, .. }`.
///
/// This client is cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ReqwestSender::default())
    }
}

impl HttpClient {
    /// Creates a client over the given sender with default retry settings.
    pub fn new(sender: impl HttpSend + 'static) -> Self {
        Self::with_parts(Arc::new(sender), RetryConfig::default(), Arc::new(LogErrorSink))
    }

    fn with_parts(sender: Arc<dyn HttpSend>, retry: RetryConfig, error_sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            inner: Arc::new(HttpClientInner {
                sender,
                retry,
                error_sink,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Replaces the retry configuration.
    pub fn retry(self, retry: RetryConfig) -> Self {
        Self::with_parts(Arc::clone(&self.inner.sender), retry, Arc::clone(&self.inner.error_sink))
    }

    /// Replaces the error sink.
    pub fn error_sink(self, sink: impl ErrorSink + 'static) -> Self {
        Self::with_parts(Arc::clone(&self.inner.sender), self.inner.retry.clone(), Arc::new(sink))
    }

    /// Sends a request, joining an identical one already in flight.
    pub async fn request(&self, request: HttpRequest) -> Envelope {
        let signature = request.signature();
        let call = {
            let mut in_flight = match self.inner.in_flight.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match in_flight.get(&signature) {
                Some(existing) => {
                    log::debug!("joining in-flight request {}", signature);
                    existing.clone()
                }
                None => {
                    let call = execute(Arc::clone(&self.inner), request, signature.clone())
                        .boxed()
                        .shared();
                    in_flight.insert(signature, call.clone());
                    call
                }
            }
        };
        call.await
    }
}

/// Runs one request with retries and settles it into an envelope.
async fn execute(inner: Arc<HttpClientInner>, request: HttpRequest, signature: String) -> Envelope {
    let retry = &inner.retry;
    let mut attempts = 0;

    let outcome = loop {
        match inner.sender.send(&request).await {
            Ok(body) => break Ok(body),
            Err(e) if retry.allows(&e) && attempts < retry.attempts => {
                log::debug!(
                    "{} {} failed ({}), retry {}/{}",
                    request.method,
                    request.url,
                    e,
                    attempts + 1,
                    retry.attempts
                );
                tokio::time::sleep(retry.delay(attempts)).await;
                attempts += 1;
            }
            Err(e) => break Err(e),
        }
    };

    match inner.in_flight.lock() {
        Ok(mut guard) => guard.remove(&signature),
        Err(poisoned) => poisoned.into_inner().remove(&signature),
    };

    match outcome {
        Ok(body) => Envelope::from_body(body),
        Err(e) => {
            inner.error_sink.report(&request, &e);
            Envelope::failure(e.to_string())
        }
    }
}
