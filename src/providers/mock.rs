/*!
 * Mock chat client for testing.
 *
 * This module provides a scripted `ChatClient` that simulates different behaviors:
 * - `MockChatClient::working()` - Always succeeds with an empty JSON object
 * - `MockChatClient::intermittent(n)` - Fails every nth request
 * - `MockChatClient::failing()` - Always fails with an error
 * - `MockChatClient::truncated()` - Reports usage at the requested output ceiling
 * - `MockChatClient::slow(ms)` - Sleeps before answering (deadline tests)
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ChatClient, ChatRequest, ChatResponse, TokenUsage};

/// Produces the reply text, or an error, for a request
pub type Responder = Arc<dyn Fn(&ChatRequest) -> Result<String, ProviderError> + Send + Sync>;

/// Behavior mode for the mock client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds but uses the whole output budget
    Truncated,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Scripted chat client recording every request it receives
#[derive(Clone)]
pub struct MockChatClient {
    behavior: MockBehavior,
    /// Request counter shared by clones
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    responder: Option<Responder>,
}

impl MockChatClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn truncated() -> Self {
        Self::new(MockBehavior::Truncated)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Reply with the text produced by `generator`
    pub fn with_custom_response<F>(self, generator: F) -> Self
    where
        F: Fn(&ChatRequest) -> String + Send + Sync + 'static,
    {
        self.with_responder(move |request| Ok(generator(request)))
    }

    /// Reply with the result of `responder`, which may also fail
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    fn reply(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        match &self.responder {
            Some(responder) => responder(request),
            None => Ok("{}".to_string()),
        }
    }

    fn response(text: String, completion_tokens: u32) -> ChatResponse {
        ChatResponse {
            raw: text.clone(),
            text,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens,
                total_tokens: 10 + completion_tokens,
            },
        }
    }
}

impl std::fmt::Debug for MockChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockChatClient")
            .field("behavior", &self.behavior)
            .field("request_count", &self.request_count())
            .finish()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::response(self.reply(&request)?, 10)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::response(self.reply(&request)?, 10))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Truncated => {
                let limit = request.sampling.max_tokens;
                Ok(Self::response(self.reply(&request)?, limit))
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::response(self.reply(&request)?, 10))
            }
        }
    }
}
