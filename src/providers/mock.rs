/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the prompt text
 * - `MockProvider::scripted(..)` - Replies with canned responses in order
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Every prompt received is recorded so tests can assert on what was sent.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{Prompt, Provider};

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The reply text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, echoing the prompt
    Working,
    /// Pops the next canned reply; fails once the script runs out
    Scripted,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: NonZeroUsize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
}

/// Mock provider for testing generation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&Prompt) -> String>,
    /// Canned replies for `Scripted`
    script: Arc<Mutex<VecDeque<String>>>,
    /// Prompts received so far
    requests: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that answers with the given replies, in order
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(MockBehavior::Scripted);
        provider.script.lock().extend(replies.into_iter().map(Into::into));
        provider
    }

    /// Create a mock that fails every `fail_every`-th request.
    ///
    /// A period of zero never fails, so the mock behaves like `working()`.
    pub fn intermittent(fail_every: usize) -> Self {
        match NonZeroUsize::new(fail_every) {
            Some(fail_every) => Self::new(MockBehavior::Intermittent { fail_every }),
            None => Self::working(),
        }
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&Prompt) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of every prompt received, in order
    pub fn requests(&self) -> Vec<Prompt> {
        self.requests.lock().clone()
    }

    /// Replies still queued for a scripted mock
    pub fn remaining_replies(&self) -> usize {
        self.script.lock().len()
    }

    fn reply(&self, text: String) -> MockResponse {
        MockResponse { text }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            script: Arc::clone(&self.script),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = Prompt;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => {
                let text = if let Some(generator) = self.custom_response {
                    generator(&request)
                } else {
                    format!("[MOCK {}] {}", request.model, request.user_text())
                };
                Ok(self.reply(text))
            }

            MockBehavior::Scripted => {
                let next = self.script.lock().pop_front();
                match next {
                    Some(text) => Ok(self.reply(text)),
                    None => Err(ProviderError::RequestFailed(format!(
                        "Mock script exhausted at request #{}",
                        count + 1
                    ))),
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                let fail_every = fail_every.get();
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.reply(format!("[MOCK] {}", request.user_text())))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(self.reply(String::new())),
        }
    }

    fn build_request(&self, prompt: &Prompt) -> Prompt {
        prompt.clone()
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
