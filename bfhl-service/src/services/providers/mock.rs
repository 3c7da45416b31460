//! Mock provider implementation for testing.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::time::Duration;

/// What the mock does when asked to generate.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this text as the first candidate.
    Reply(String),
    /// Return a response with no candidate text.
    Empty,
    /// Fail with this error.
    Fail(ProviderError),
    /// Sleep, then reply.
    Delay(Duration, String),
}

/// Mock text provider for testing.
pub struct MockTextProvider {
    behavior: MockBehavior,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self { behavior }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }
}

fn reply(prompt: &str, text: &str) -> ProviderResponse {
    ProviderResponse {
        text: Some(text.to_string()),
        input_tokens: prompt.len() as i32 / 4,
        output_tokens: text.split_whitespace().count() as i32,
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(reply(prompt, text)),
            MockBehavior::Empty => Ok(ProviderResponse::default()),
            MockBehavior::Fail(err) => Err(err.clone()),
            MockBehavior::Delay(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(reply(prompt, text))
            }
        }
    }
}
