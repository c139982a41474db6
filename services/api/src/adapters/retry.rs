//! services/api/src/adapters/retry.rs
//!
//! Timeout and retry policy shared by the model adapters.

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use backoff::ExponentialBackoffBuilder;
use docqa_core::ports::{PortError, PortResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How a single failed model call should be treated.
#[derive(Debug)]
pub enum ModelCallError {
    /// Worth retrying: transport failures, rate limits, server-side errors.
    Transient(String),
    /// Retrying would not help: bad request, bad credentials, malformed response.
    Fatal(String),
}

impl From<OpenAIError> for ModelCallError {
    fn from(err: OpenAIError) -> Self {
        match &err {
            OpenAIError::Reqwest(_) => ModelCallError::Transient(err.to_string()),
            OpenAIError::ApiError(api) => {
                // 5xx bodies are not parsed by the client and arrive without a type.
                let kind = api.r#type.as_deref();
                let code = api.code.as_deref().unwrap_or_default();
                if matches!(kind, None | Some("server_error") | Some("requests"))
                    || code == "rate_limit_exceeded"
                {
                    ModelCallError::Transient(err.to_string())
                } else {
                    ModelCallError::Fatal(err.to_string())
                }
            }
            _ => ModelCallError::Fatal(err.to_string()),
        }
    }
}

/// Builds an OpenAI client that makes exactly one HTTP attempt per call.
///
/// The client's own backoff would otherwise retry 5xx and 429 responses for
/// up to fifteen minutes, hiding them from `RetryPolicy`.
pub fn single_attempt_client(config: OpenAIConfig) -> Client<OpenAIConfig> {
    let no_retries = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();
    Client::with_config(config).with_backoff(no_retries)
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
            timeout,
        }
    }

    /// Runs `call` until it succeeds, fails fatally, or the retries are used up.
    ///
    /// A timed-out attempt is not retried and yields `PortError::ModelTimeout`;
    /// exhausted transient failures yield `PortError::ModelUnavailable`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> PortResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelCallError>>,
    {
        let mut attempt = 0u32;
        loop {
            let outcome = tokio::time::timeout(self.timeout, call()).await;
            match outcome {
                Err(_) => {
                    warn!("{} timed out after {:?}", operation, self.timeout);
                    return Err(PortError::ModelTimeout(self.timeout.as_secs()));
                }
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(ModelCallError::Fatal(msg))) => {
                    return Err(PortError::Unexpected(format!("{} failed: {}", operation, msg)));
                }
                Ok(Err(ModelCallError::Transient(msg))) => {
                    if attempt >= self.max_retries {
                        return Err(PortError::ModelUnavailable(format!(
                            "{} failed after {} attempts: {}",
                            operation,
                            attempt + 1,
                            msg
                        )));
                    }
                    let delay = self.base_delay * 2u32.saturating_pow(attempt);
                    warn!(
                        "{} failed (attempt {}), retrying in {:?}: {}",
                        operation,
                        attempt + 1,
                        delay,
                        msg
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = fast_policy(2)
            .run("embedding", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ModelCallError::Transient("429".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_model_unavailable() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: PortResult<()> = fast_policy(1)
            .run("generation", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ModelCallError::Transient("503".to_string()))
            })
            .await;

        assert!(matches!(result, Err(PortError::ModelUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_failures_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: PortResult<()> = fast_policy(5)
            .run("generation", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ModelCallError::Fatal("invalid api key".to_string()))
            })
            .await;

        assert!(matches!(result, Err(PortError::Unexpected(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_calls_time_out() {
        let result: PortResult<()> = fast_policy(3)
            .run("generation", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(PortError::ModelTimeout(_))));
    }

    fn api_error(kind: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "upstream said no".to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_error_classification() {
        let err = ModelCallError::from(OpenAIError::InvalidArgument("bad model".to_string()));
        assert!(matches!(err, ModelCallError::Fatal(_)));

        // untyped errors are what the client reports for 5xx responses
        for transient in [
            api_error(None, None),
            api_error(Some("server_error"), None),
            api_error(Some("requests"), None),
            api_error(Some("tokens"), Some("rate_limit_exceeded")),
        ] {
            assert!(matches!(ModelCallError::from(transient), ModelCallError::Transient(_)));
        }
        for fatal in [
            api_error(Some("invalid_request_error"), Some("model_not_found")),
            api_error(Some("insufficient_quota"), Some("insufficient_quota")),
        ] {
            assert!(matches!(ModelCallError::from(fatal), ModelCallError::Fatal(_)));
        }
    }
}
