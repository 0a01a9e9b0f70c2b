//! The terminal `finish` tool.
//!
//! Selecting this tool ends the reasoning loop; its structured outcome
//! (success flag + conclusion) becomes the loop's result.

use async_trait::async_trait;
use webpilot_core::error::ToolError;
use webpilot_core::tool::{FINISH_TOOL, Tool, ToolDefinition, ToolOutcome, ToolParams};
use webpilot_core::StepContext;

pub struct FinishTool;

#[async_trait]
impl Tool for FinishTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: FINISH_TOOL.into(),
            description: "Finish the given task".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "success": {
                        "type": "boolean",
                        "description": "Was the task successful?"
                    },
                    "conclusion": {
                        "type": "string",
                        "description": "What is the conclusion of the task you performed?"
                    }
                },
                "required": ["success", "conclusion"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        Ok(ToolOutcome::Structured(params.clone()))
    }
}
