use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::ai::breaker::{CircuitBreaker, CircuitState};
use crate::error::ApiError;

mod anthropic;
mod local;
mod openai;

pub use anthropic::AnthropicProvider;
pub use local::{LocalMode, LocalProvider};
pub use openai::OpenAiProvider;

/// Short system persona used by chat-shaped providers. The full task prompt
/// arrives as the user message.
pub(crate) const SYSTEM_PERSONA: &str =
    "You are NEXUS, a helpful academic and career mentor.";

/// Options forwarded to a provider for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct TaskOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

/// Trait implemented by concrete LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable name used in logs and breaker health reporting.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, options: &TaskOptions) -> Result<String, ApiError>;
}

/// Wraps a provider with the call discipline every backend gets: a
/// wall-clock timeout and a dedicated circuit breaker. The timeout abandons
/// the in-flight future; the remote side may still finish on its own.
pub struct ManagedProvider {
    inner: Arc<dyn LlmProvider>,
    breaker: CircuitBreaker,
    timeout: Duration,
}

impl fmt::Debug for ManagedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedProvider")
            .field("name", &self.inner.name())
            .field("circuit", &self.breaker.state())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ManagedProvider {
    pub fn new(
        inner: Arc<dyn LlmProvider>,
        timeout: Duration,
        max_failures: u32,
        half_open_after: Duration,
    ) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(max_failures, half_open_after),
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn failures(&self) -> u32 {
        self.breaker.failures()
    }

    pub async fn generate(&self, prompt: &str, options: &TaskOptions) -> Result<String, ApiError> {
        if !self.breaker.can_proceed() {
            return Err(ApiError::CircuitOpen(self.inner.name().to_string()));
        }

        match tokio::time::timeout(self.timeout, self.inner.generate(prompt, options)).await {
            Ok(Ok(text)) => {
                self.breaker.succeed();
                Ok(text)
            }
            Ok(Err(err)) => {
                self.breaker.fail();
                Err(err)
            }
            Err(_) => {
                self.breaker.fail();
                warn!(
                    provider = self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "provider call abandoned after timeout"
                );
                Err(ApiError::UpstreamTimeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct FlakyProvider {
        responses: Mutex<Vec<Result<String, ApiError>>>,
    }

    impl FlakyProvider {
        fn new(responses: Vec<Result<String, ApiError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, _prompt: &str, _options: &TaskOptions) -> Result<String, ApiError> {
            self.responses
                .lock()
                .remove(0)
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _prompt: &str, _options: &TaskOptions) -> Result<String, ApiError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn repeated_failures_trip_the_breaker() {
        let responses = (0..4)
            .map(|_| Err(ApiError::Upstream("boom".into())))
            .collect();
        let managed = ManagedProvider::new(
            Arc::new(FlakyProvider::new(responses)),
            Duration::from_secs(1),
            4,
            Duration::from_secs(10),
        );

        for _ in 0..4 {
            let err = managed.generate("p", &TaskOptions::default()).await.unwrap_err();
            assert!(matches!(err, ApiError::Upstream(_)));
        }

        // fifth call is rejected without touching the provider
        let err = managed.generate("p", &TaskOptions::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::CircuitOpen(_)));
    }

    #[tokio::test]
    async fn success_resets_the_breaker() {
        let responses = vec![
            Err(ApiError::Upstream("boom".into())),
            Ok("recovered".to_string()),
        ];
        let managed = ManagedProvider::new(
            Arc::new(FlakyProvider::new(responses)),
            Duration::from_secs(1),
            2,
            Duration::from_secs(10),
        );

        assert!(managed.generate("p", &TaskOptions::default()).await.is_err());
        let out = managed.generate("p", &TaskOptions::default()).await.unwrap();
        assert_eq!(out, "recovered");
        assert_eq!(managed.circuit_state(), CircuitState::Closed);
        assert_eq!(managed.failures(), 0);
    }

    #[tokio::test]
    async fn stalled_call_times_out_and_counts_as_a_failure() {
        let managed = ManagedProvider::new(
            Arc::new(SlowProvider),
            Duration::from_millis(10),
            4,
            Duration::from_secs(10),
        );

        let err = managed.generate("p", &TaskOptions::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamTimeout(_)));
        assert_eq!(managed.failures(), 1);
    }
}
