//! AI delegate: turns a free-form question into a short answer from the
//! configured text provider.

use super::providers::{ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on a single provider call.
pub const AI_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers are cut to this many whitespace-separated words.
pub const MAX_ANSWER_WORDS: usize = 3;

/// Failures of the AI delegate. All of them map to 503.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("AI service not configured")]
    ServiceUnconfigured,

    #[error("AI service rate limit exceeded")]
    RateLimited,

    #[error("AI service timeout")]
    Timeout,

    #[error("AI service unavailable")]
    ServiceUnavailable,
}

impl AiError {
    pub fn kind(&self) -> &'static str {
        match self {
            AiError::ServiceUnconfigured => "ServiceUnconfigured",
            AiError::RateLimited => "RateLimited",
            AiError::Timeout => "Timeout",
            AiError::ServiceUnavailable => "ServiceUnavailable",
        }
    }
}

impl From<ProviderError> for AiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => AiError::ServiceUnconfigured,
            ProviderError::RateLimited => AiError::RateLimited,
            ProviderError::Timeout => AiError::Timeout,
            ProviderError::ApiError(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::NetworkError(_) => AiError::ServiceUnavailable,
        }
    }
}

pub fn build_prompt(question: &str) -> String {
    format!(
        "Answer the following question with a single word or very short phrase (maximum {} words): {}",
        MAX_ANSWER_WORDS, question
    )
}

/// First `MAX_ANSWER_WORDS` words of `text`, joined by single spaces.
pub fn truncate_answer(text: &str) -> String {
    text.split_whitespace()
        .take(MAX_ANSWER_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone)]
pub struct AiDelegate {
    provider: Arc<dyn TextProvider>,
    timeout: Duration,
}

impl AiDelegate {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            timeout: AI_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn answer(&self, question: &str) -> Result<String, AiError> {
        let prompt = build_prompt(question);

        let response = tokio::time::timeout(self.timeout, self.provider.generate(&prompt))
            .await
            .map_err(|_| {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "AI provider call timed out"
                );
                AiError::Timeout
            })?
            .map_err(|e| {
                tracing::warn!(provider = self.provider.name(), error = %e, "AI provider call failed");
                AiError::from(e)
            })?;

        tracing::debug!(
            provider = self.provider.name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "AI provider replied"
        );

        let answer = response.text.as_deref().map(truncate_answer).unwrap_or_default();
        if answer.is_empty() {
            tracing::warn!(provider = self.provider.name(), "AI provider returned no text");
            return Err(AiError::ServiceUnavailable);
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::{MockBehavior, MockTextProvider};

    fn delegate(behavior: MockBehavior) -> AiDelegate {
        AiDelegate::new(Arc::new(MockTextProvider::new(behavior)))
    }

    #[test]
    fn test_prompt_embeds_question() {
        assert_eq!(
            build_prompt("What is the capital of France?"),
            "Answer the following question with a single word or very short phrase (maximum 3 words): What is the capital of France?"
        );
    }

    #[test]
    fn test_truncate_answer() {
        assert_eq!(truncate_answer("  Paris  "), "Paris");
        assert_eq!(truncate_answer("New\nYork City, USA"), "New York City,");
        assert_eq!(truncate_answer("   "), "");
    }

    #[tokio::test]
    async fn test_answer_is_truncated() {
        let answer = delegate(MockBehavior::Reply(
            "Paris is the capital of France".to_string(),
        ))
        .answer("capital of France?")
        .await
        .unwrap();
        assert_eq!(answer, "Paris is the");
    }

    #[tokio::test]
    async fn test_provider_errors_are_classified() {
        let cases = [
            (
                ProviderError::NotConfigured("no key".to_string()),
                AiError::ServiceUnconfigured,
            ),
            (ProviderError::RateLimited, AiError::RateLimited),
            (ProviderError::Timeout, AiError::Timeout),
            (
                ProviderError::ApiError("500".to_string()),
                AiError::ServiceUnavailable,
            ),
            (
                ProviderError::NetworkError("reset".to_string()),
                AiError::ServiceUnavailable,
            ),
            (
                ProviderError::InvalidResponse("bad json".to_string()),
                AiError::ServiceUnavailable,
            ),
        ];

        for (provider_error, expected) in cases {
            let err = delegate(MockBehavior::Fail(provider_error))
                .answer("q")
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_unavailable() {
        let err = delegate(MockBehavior::Empty).answer("q").await.unwrap_err();
        assert_eq!(err, AiError::ServiceUnavailable);

        let err = delegate(MockBehavior::Reply("  \n ".to_string()))
            .answer("q")
            .await
            .unwrap_err();
        assert_eq!(err, AiError::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let err = delegate(MockBehavior::Delay(
            Duration::from_secs(5),
            "late".to_string(),
        ))
        .with_timeout(Duration::from_millis(20))
        .answer("q")
        .await
        .unwrap_err();
        assert_eq!(err, AiError::Timeout);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AiError::ServiceUnconfigured.to_string(), "AI service not configured");
        assert_eq!(AiError::RateLimited.to_string(), "AI service rate limit exceeded");
        assert_eq!(AiError::Timeout.to_string(), "AI service timeout");
        assert_eq!(AiError::ServiceUnavailable.to_string(), "AI service unavailable");
    }
}
