//! Shared test helpers for reasoning-loop tests.

use async_trait::async_trait;
use std::sync::Mutex;
use webpilot_core::error::ProviderError;
use webpilot_core::provider::{ModelRequest, ModelResponse, ModelToolCall, Provider, Usage};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request for assertions. Panics if more calls are made than
/// responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ModelResponse>>,
    requests: Mutex<Vec<ModelRequest>>,
    call_count: Mutex<usize>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

/// Create a plain text response (no tool calls).
pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        content: text.into(),
        tool_calls: vec![],
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Create a response carrying one native tool call.
pub fn tool_call_response(name: &str, args: serde_json::Value) -> ModelResponse {
    ModelResponse {
        content: String::new(),
        tool_calls: vec![ModelToolCall {
            name: name.into(),
            arguments: args.to_string(),
        }],
        model: "mock-model".into(),
        usage: None,
    }
}
