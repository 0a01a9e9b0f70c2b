//! Provider trait — the abstraction over LLM inference backends.
//!
//! A Provider knows how to send a conversation to a model and get a response
//! back. The reasoning loop calls `complete()` with an injected provider
//! handle — there is no global client, so independent agent instances and
//! test doubles coexist freely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// A single model inference request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The model to use (e.g., "gpt-4-0125-preview")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Tool schemas offered to the model (only for native-tool-call models)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool choice directive (e.g. "auto"), if tools are offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// A structured tool-call payload returned by the model.
///
/// `arguments` is the raw JSON-encoded string as delivered on the wire; the
/// selection resolver owns parsing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelToolCall {
    pub name: String,
    pub arguments: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A complete (non-streaming) model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Free-text content (may be empty when the model answered via tool call)
    #[serde(default)]
    pub content: String,

    /// Native structured tool calls, if the model produced any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ModelToolCall>,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The core Provider trait.
///
/// Every inference backend implements this; the loop calls `complete()`
/// without knowing which one is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ModelRequest,
    ) -> std::result::Result<ModelResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Models that cannot emit native structured tool calls and must be steered
/// through the fenced-JSON text convention instead.
const TEXT_ONLY_TOOL_MODELS: &[&str] = &["gpt-4-vision-preview"];

/// Whether the given model supports native structured tool calls.
///
/// A static deny rule keyed on the model identifier; the core never
/// validates identifiers beyond this.
pub fn supports_native_tool_calls(model: &str) -> bool {
    !TEXT_ONLY_TOOL_MODELS.contains(&model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_model_is_text_only() {
        assert!(!supports_native_tool_calls("gpt-4-vision-preview"));
        assert!(supports_native_tool_calls("gpt-4-0125-preview"));
        assert!(supports_native_tool_calls("gpt-4-turbo-2024-04-09"));
    }

    #[test]
    fn request_serialization_skips_empty_tools() {
        let req = ModelRequest {
            model: "gpt-4-0125-preview".into(),
            messages: vec![Message::system("hi")],
            max_tokens: 1000,
            temperature: 0.3,
            tools: vec![],
            tool_choice: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("\"tools\""));
        assert!(!json.contains("tool_choice"));
    }

    #[test]
    fn response_defaults() {
        let resp: ModelResponse =
            serde_json::from_str(r#"{"model": "gpt-4-0125-preview"}"#).unwrap();
        assert!(resp.content.is_empty());
        assert!(resp.tool_calls.is_empty());
        assert!(resp.usage.is_none());
    }
}
