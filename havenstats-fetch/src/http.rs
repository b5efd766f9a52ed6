//! HTTP client with tracing, deadlines, cancellation and retries.
//!
//! Every call takes a timeout and a [`CancellationToken`]. Whichever fires
//! first aborts the request; nothing partial is returned. Retries are
//! opt-in through [`HttpClient::with_retry`] and share the one deadline.

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::retry::RetryStrategy;

/// User agent string for `HavenStats`.
const USER_AGENT: &str = concat!("HavenStats/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper returning typed [`FetchError`]s.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry: RetryStrategy,
}

impl HttpClient {
    /// Creates a client that makes exactly one attempt per call.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Configuration`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, FetchError> {
        let inner = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            inner,
            retry: RetryStrategy::no_retry(),
        })
    }

    /// Replaces the retry strategy.
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Performs a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// See [`FetchError`] for the failure kinds.
    #[instrument(skip(self, url, headers, cancel), fields(url = %url.path()))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        headers: HeaderMap,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError> {
        debug!("GET request");
        self.execute(|| self.inner.get(url.clone()).headers(headers.clone()), timeout, cancel)
            .await
    }

    /// Performs a POST request with a JSON body and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`FetchError`] for the failure kinds.
    #[instrument(skip(self, url, body, cancel), fields(url = %url.path()))]
    pub async fn post_json<B, T>(
        &self,
        url: &Url,
        body: &B,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST request with JSON");
        self.execute(|| self.inner.post(url.clone()).json(body), timeout, cancel)
            .await
    }

    /// Runs `build` until it succeeds, fails for good, or the deadline
    /// passes. The deadline covers every attempt and every backoff sleep.
    async fn execute<T, F>(
        &self,
        build: F,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        if timeout.is_zero() {
            return Err(FetchError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        let attempts = async {
            let mut attempt = 1;
            loop {
                match Self::send(build()).await {
                    Err(err) if attempt < self.retry.max_attempts && self.retry.should_retry(&err) => {
                        let delay = self.retry.delay_for_attempt(attempt);
                        warn!(attempt, ?delay, error = %err, "Transient failure, retrying");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    other => return other,
                }
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Request cancelled");
                Err(FetchError::Cancelled)
            }
            result = tokio::time::timeout(timeout, attempts) => {
                result.unwrap_or(Err(FetchError::Timeout(timeout)))
            }
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_transport(&e))?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if !status.is_success() {
            return Err(FetchError::http_status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(&e))?;
        Ok(serde_json::from_slice::<T>(&body)?)
    }
}
