//! Prompt assembly — from step declaration to model request messages.
//!
//! The system message is the step's resolved prompt source with `{{key}}`
//! placeholders filled from records (plus a synthetic `task` key), the task
//! restated, and a tool-usage addendum chosen by the target model's calling
//! convention. The optional user turn comes from the step's factory.

use webpilot_core::context::Records;
use webpilot_core::error::Result;
use webpilot_core::message::Message;
use webpilot_core::prompt::PromptTree;
use webpilot_core::provider::supports_native_tool_calls;
use webpilot_core::tool::ToolSet;

use crate::step::StepCommon;
use crate::template;

/// The fenced-JSON example shown to models without native tool calling.
const FENCED_EXAMPLE: &str = "```json\n{\n    \"name\": \"navigate\",\n    \"arguments\": {\n        \"url\": \"https://www.google.com\"\n    }\n}\n```";

/// Build the system message for one step on one cycle.
pub fn build_system_prompt(
    common: &StepCommon,
    tools: Option<&ToolSet>,
    task: &str,
    records: &Records,
) -> String {
    let mut vars = records.clone();
    vars.set("task", task);

    let mut prompt = template::render(&common.system_prompt.resolve(), &vars);

    prompt.push_str("\n\n## Given task\n");
    prompt.push_str(task);

    if let Some(tools) = tools.filter(|t| !t.is_empty()) {
        if supports_native_tool_calls(&common.model) {
            prompt.push_str(
                "\n\nOnly respond by calling one of the provided tools. Do not reply with free text.",
            );
        } else {
            prompt.push_str("\n\n");
            prompt.push_str(&fenced_tool_addendum(tools));
        }
    }

    prompt
}

/// The addendum steering fenced-JSON models: tool schemas + response format.
fn fenced_tool_addendum(tools: &ToolSet) -> String {
    let schemas =
        serde_json::to_string_pretty(&tools.definitions()).unwrap_or_else(|_| "[]".into());
    PromptTree::new()
        .text(
            "You can use the following tools to complete the task",
            schemas,
        )
        .text(
            "Response format",
            format!(
                "Only respond using function calling as a JSON object, for example:\n{FENCED_EXAMPLE}"
            ),
        )
        .compile()
}

/// Build the step's user turn for this cycle, if any.
///
/// Requires a factory, a passing append predicate (absent = pass), and a
/// non-empty part list.
pub async fn build_user_message(common: &StepCommon, task: &str) -> Result<Option<Message>> {
    let Some(factory) = &common.user_message else {
        return Ok(None);
    };

    if let Some(pred) = &common.append_user_message
        && !pred()
    {
        return Ok(None);
    }

    let parts = factory(task.to_string()).await?;
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(Message::user_parts(parts)))
}
