//! Content extraction — read the page with a vision model, then summarize.
//!
//! Pages through full-page screenshots, asks a vision model for the
//! relevant facts on each page (as a JSON array of strings), then has a
//! second model condense the collected chunks into one summary that is
//! folded into the agent's history.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use webpilot_core::browser::BrowserDriver;
use webpilot_core::error::ToolError;
use webpilot_core::fence::extract_json_block;
use webpilot_core::message::{ContentPart, Message};
use webpilot_core::prompt::PromptTree;
use webpilot_core::provider::{ModelRequest, Provider};
use webpilot_core::tool::{Tool, ToolDefinition, ToolOutcome, ToolParams};
use webpilot_core::StepContext;

const EXTRACTION_MAX_TOKENS: u32 = 1000;
const EXTRACTION_TEMPERATURE: f32 = 0.3;

pub struct ContentExtractionTool {
    driver: Arc<dyn BrowserDriver>,
    provider: Arc<dyn Provider>,
    vision_model: String,
    summary_model: String,
}

impl ContentExtractionTool {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        provider: Arc<dyn Provider>,
        vision_model: impl Into<String>,
        summary_model: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            provider,
            vision_model: vision_model.into(),
            summary_model: summary_model.into(),
        }
    }

    fn extraction_prompt(topic: &str) -> String {
        PromptTree::new()
            .text(
                "Role",
                "You are an AI agent who's job is to extract relevant information from screenshots.",
            )
            .text(
                "Response Format",
                "You only speak JSON, and you must provide an array of text strings that \
                 represent the relevant information extracted from the content. If you can't \
                 find the information, you should provide an empty array.",
            )
            .text(
                "Example response",
                "```json\n[\n    \"The ingredients needed to make a cake are: flour, sugar, eggs.\",\n    \"The steps to make a cake are: 1. Mix the ingredients. 2. Bake the mixture.\"\n]\n```",
            )
            .text("Task", format!("Extract the relevant information about: {topic}"))
            .compile()
    }

    fn summary_prompt(topic: &str) -> String {
        PromptTree::new()
            .text(
                "Role",
                "You are an AI agent who's job is to summarize the extracted information from the screenshots.",
            )
            .text(
                "Data subject",
                format!("The extracted information is about: {topic}"),
            )
            .text(
                "Expected response",
                "You should provide a summary of the extracted information in a single text string.",
            )
            .compile()
    }

    /// Parse one page's extraction response into text chunks.
    ///
    /// Accepts a JSON array of strings, or any JSON array (items are
    /// stringified). Anything else is dropped with a warning — one
    /// unreadable page must not sink the whole extraction.
    fn parse_chunks(content: &str) -> Option<Vec<String>> {
        let payload = extract_json_block(content);
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(serde_json::Value::Array(items)) => Some(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    fn failure(reason: impl std::fmt::Display) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "extract_relevant_information".into(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Tool for ContentExtractionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "extract_relevant_information".into(),
            description: "Extract relevant information from the page".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Description of the topic to extract information about"
                    }
                },
                "required": ["topic"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let topic = params
            .get("topic")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'topic'".into()))?;

        let screenshots = self
            .driver
            .full_page_screenshots()
            .await
            .map_err(Self::failure)?;

        debug!(pages = screenshots.len(), topic, "Extracting page content");

        let system = Self::extraction_prompt(topic);
        let mut chunks: Vec<String> = Vec::new();

        for (page, base64) in screenshots.iter().enumerate() {
            let request = ModelRequest {
                model: self.vision_model.clone(),
                messages: vec![
                    Message::system(&system),
                    Message::user_parts(vec![ContentPart::image(format!(
                        "data:image/png;base64,{base64}"
                    ))]),
                ],
                max_tokens: EXTRACTION_MAX_TOKENS,
                temperature: EXTRACTION_TEMPERATURE,
                tools: vec![],
                tool_choice: None,
            };

            let response = self.provider.complete(request).await.map_err(Self::failure)?;

            match Self::parse_chunks(&response.content) {
                Some(page_chunks) => chunks.extend(page_chunks),
                None => warn!(page, "Discarding unparseable extraction payload"),
            }
        }

        let request = ModelRequest {
            model: self.summary_model.clone(),
            messages: vec![
                Message::system(Self::summary_prompt(topic)),
                Message::user(chunks.join("\n")),
            ],
            max_tokens: EXTRACTION_MAX_TOKENS,
            temperature: EXTRACTION_TEMPERATURE,
            tools: vec![],
            tool_choice: None,
        };

        let response = self.provider.complete(request).await.map_err(Self::failure)?;
        let summary = if response.content.trim().is_empty() {
            "No data found".to_string()
        } else {
            response.content
        };

        ctx.history.push(Message::assistant(format!(
            "content extraction result: {summary}"
        )));

        Ok(ToolOutcome::Text(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubDriver;
    use std::sync::Mutex;
    use webpilot_core::context::Records;
    use webpilot_core::error::ProviderError;
    use webpilot_core::message::History;
    use webpilot_core::provider::ModelResponse;

    /// Scripted provider: returns queued responses in order.
    struct ScriptedProvider {
        responses: Mutex<Vec<ModelResponse>>,
    }

    impl ScriptedProvider {
        fn new(contents: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(
                    contents
                        .into_iter()
                        .rev()
                        .map(|c| ModelResponse {
                            content: c.to_string(),
                            tool_calls: vec![],
                            model: "mock-model".into(),
                            usage: None,
                        })
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse, ProviderError> {
            self.responses
                .lock()
                .ok()
                .and_then(|mut q| q.pop())
                .ok_or_else(|| ProviderError::NotConfigured("out of scripted responses".into()))
        }
    }

    #[test]
    fn parse_chunks_accepts_fenced_array() {
        let chunks =
            ContentExtractionTool::parse_chunks("```json\n[\"fact one\", \"fact two\"]\n```")
                .unwrap();
        assert_eq!(chunks, vec!["fact one", "fact two"]);
    }

    #[test]
    fn parse_chunks_rejects_non_array() {
        assert!(ContentExtractionTool::parse_chunks("no json here").is_none());
        assert!(ContentExtractionTool::parse_chunks("{\"not\":\"array\"}").is_none());
    }

    #[tokio::test]
    async fn extraction_summarizes_and_folds_into_history() {
        let driver = Arc::new(StubDriver::new());
        driver.navigate("https://example.com").await.unwrap();

        // two pages then a summary call
        let provider = Arc::new(ScriptedProvider::new(vec![
            "```json\n[\"price is 10 EUR\"]\n```",
            "```json\n[\"free shipping over 50 EUR\"]\n```",
            "The product costs 10 EUR and ships free over 50 EUR.",
        ]));

        let tool = ContentExtractionTool::new(
            driver,
            provider,
            "gpt-4-vision-preview",
            "gpt-4-turbo-2024-04-09",
        );

        let mut history = History::new();
        let mut records = Records::new();
        let mut feedback = Vec::new();
        let mut ctx = StepContext {
            task: "find the price",
            history: &mut history,
            records: &mut records,
            feedback: &mut feedback,
        };

        let mut params = ToolParams::new();
        params.insert("topic".into(), serde_json::json!("product pricing"));

        let outcome = tool.invoke(&params, &mut ctx).await.unwrap();
        match outcome {
            ToolOutcome::Text(summary) => assert!(summary.contains("10 EUR")),
            other => panic!("Expected text outcome, got {other:?}"),
        }
        assert_eq!(history.len(), 1);
        assert!(history.entries()[0]
            .content
            .as_text()
            .starts_with("content extraction result:"));
    }

    #[tokio::test]
    async fn unparseable_page_is_skipped() {
        let driver = Arc::new(StubDriver::new());
        driver.navigate("https://example.com").await.unwrap();

        let provider = Arc::new(ScriptedProvider::new(vec![
            "I could not read this page, sorry!",
            "```json\n[\"useful fact\"]\n```",
            "Summary of the useful fact.",
        ]));

        let tool = ContentExtractionTool::new(
            driver,
            provider,
            "gpt-4-vision-preview",
            "gpt-4-turbo-2024-04-09",
        );

        let mut history = History::new();
        let mut records = Records::new();
        let mut feedback = Vec::new();
        let mut ctx = StepContext {
            task: "test",
            history: &mut history,
            records: &mut records,
            feedback: &mut feedback,
        };

        let mut params = ToolParams::new();
        params.insert("topic".into(), serde_json::json!("anything"));

        let outcome = tool.invoke(&params, &mut ctx).await.unwrap();
        assert!(matches!(outcome, ToolOutcome::Text(_)));
    }
}
