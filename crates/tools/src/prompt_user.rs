//! Human-in-the-loop prompting.
//!
//! Tools that need an answer from the operator mid-task (login, captchas,
//! missing details) go through the [`UserPrompt`] surface. The stdin
//! implementation blocks on one line of terminal input; tests inject a
//! scripted implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use webpilot_core::error::ToolError;
use webpilot_core::message::Message;
use webpilot_core::tool::{Tool, ToolDefinition, ToolOutcome, ToolParams};
use webpilot_core::StepContext;

/// A blocking question → answer surface.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, ToolError>;
}

/// Terminal implementation: prints the question and reads one line.
pub struct StdinPrompt;

#[async_trait]
impl UserPrompt for StdinPrompt {
    async fn ask(&self, question: &str) -> Result<String, ToolError> {
        // cyan, so the question stands out from the agent's log lines
        println!("\x1b[36m{question}\x1b[0m");
        println!("Type your answer:");

        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) => Err(ToolError::PromptFailed("stdin closed".into())),
            Err(e) => Err(ToolError::PromptFailed(e.to_string())),
        }
    }
}

/// Tool that asks the operator a question and folds the answer into history
/// as a user message.
pub struct PromptUserTool {
    prompt: Arc<dyn UserPrompt>,
}

impl PromptUserTool {
    pub fn new(prompt: Arc<dyn UserPrompt>) -> Self {
        Self { prompt }
    }
}

#[async_trait]
impl Tool for PromptUserTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "prompt_user".into(),
            description: "Prompt the user with a message".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Prompt to show to the user"
                    }
                },
                "required": ["prompt"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let question = params
            .get("prompt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'prompt'".into()))?;

        let answer = self.prompt.ask(question).await?;
        ctx.history.push(Message::user(answer));
        Ok(ToolOutcome::Done)
    }
}
