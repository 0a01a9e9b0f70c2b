//! Subordinate-agent delegation.
//!
//! Wraps a child agent as a tool: the parent's callback composes a subtask
//! from the model's instructions, runs the child's loop to completion
//! (synchronous call/return — the parent blocks), and records a summary of
//! the child's finish outcome in the parent's history. Parent and child
//! share nothing beyond the task string and the returned result.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use webpilot_core::StepContext;
use webpilot_core::error::ToolError;
use webpilot_core::message::Message;
use webpilot_core::tool::{Tool, ToolDefinition, ToolOutcome, ToolParams};

use crate::loop_runner::{Agent, TaskOutcome};

pub struct DelegateTool {
    name: String,
    description: String,
    agent: Mutex<Agent>,
}

impl DelegateTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, agent: Agent) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent: Mutex::new(agent),
        }
    }

    fn summarize(task: &str, outcome: TaskOutcome) -> String {
        match outcome {
            TaskOutcome::Finished(ToolOutcome::Structured(map)) => {
                let success = map.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
                let conclusion = map
                    .get("conclusion")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                format!(
                    "Delegated task: {task} was {}. {conclusion}",
                    if success { "successful" } else { "unsuccessful" }
                )
            }
            TaskOutcome::Finished(ToolOutcome::Text(text)) => {
                format!("Delegated task: {task} completed. {text}")
            }
            TaskOutcome::Finished(ToolOutcome::Done) => {
                format!("Delegated task: {task} completed.")
            }
            TaskOutcome::Cancelled => format!("Delegated task: {task} was cancelled."),
            TaskOutcome::CycleLimit => {
                format!("Delegated task: {task} stopped at its cycle limit.")
            }
        }
    }
}

#[async_trait]
impl Tool for DelegateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "instructions": {
                        "type": "string",
                        "description": "Instructions for the agent"
                    },
                    "expected_destination": {
                        "type": "string",
                        "description": "What is the expected destination of the navigation"
                    }
                },
                "required": ["instructions"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let instructions = params
            .get("instructions")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'instructions'".into()))?;

        let task = match params.get("expected_destination").and_then(|v| v.as_str()) {
            Some(destination) => format!("{instructions} until you find: {destination}"),
            None => instructions.to_string(),
        };

        debug!(%task, agent = %self.name, "Delegating to subordinate agent");

        let mut agent = self.agent.lock().await;
        let outcome = agent
            .run(&task)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        ctx.history
            .push(Message::assistant(Self::summarize(&task, outcome)));
        Ok(ToolOutcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{ExecutionStep, Frequency};
    use crate::test_support::{SequentialMockProvider, tool_call_response};
    use std::sync::Arc;
    use webpilot_core::context::Records;
    use webpilot_core::message::History;
    use webpilot_tools::FinishTool;

    fn child_agent() -> Agent {
        let provider = Arc::new(SequentialMockProvider::new(vec![tool_call_response(
            "finish",
            serde_json::json!({"success": true, "conclusion": "reached the docs page"}),
        )]));
        let step = ExecutionStep::builder()
            .model("gpt-4-0125-preview")
            .frequency(Frequency::Every(1))
            .tools(vec![Arc::new(FinishTool) as Arc<dyn Tool>])
            .build()
            .unwrap();
        Agent::new(provider, vec![step])
    }

    #[tokio::test]
    async fn child_outcome_summarized_into_parent_history() {
        let tool = DelegateTool::new("navigation_agent", "Delegate navigation", child_agent());

        let mut history = History::new();
        let mut records = Records::new();
        let mut feedback = Vec::new();
        let mut ctx = StepContext {
            task: "parent task",
            history: &mut history,
            records: &mut records,
            feedback: &mut feedback,
        };

        let mut params = ToolParams::new();
        params.insert("instructions".into(), serde_json::json!("open the docs"));
        params.insert(
            "expected_destination".into(),
            serde_json::json!("the API reference"),
        );

        tool.invoke(&params, &mut ctx).await.unwrap();

        assert_eq!(history.len(), 1);
        let summary = history.entries()[0].content.as_text();
        assert!(summary.contains("open the docs until you find: the API reference"));
        assert!(summary.contains("successful"));
        assert!(summary.contains("reached the docs page"));
    }

    #[tokio::test]
    async fn missing_instructions_is_invalid() {
        let tool = DelegateTool::new("navigation_agent", "d", child_agent());

        let mut history = History::new();
        let mut records = Records::new();
        let mut feedback = Vec::new();
        let mut ctx = StepContext {
            task: "t",
            history: &mut history,
            records: &mut records,
            feedback: &mut feedback,
        };

        let err = tool.invoke(&ToolParams::new(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
