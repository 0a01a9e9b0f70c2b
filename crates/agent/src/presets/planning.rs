//! Planning step — first-cycle task analysis.
//!
//! Fires once, asks the planner model to break the task down, and stores
//! the response under the `plan` record for later steps to template in.

use tracing::debug;
use webpilot_core::error::Error;
use webpilot_core::prompt::PromptTree;

use crate::step::{Frequency, Step, ThinkingStep};

pub fn planning_step(model: &str) -> Result<Step, Error> {
    ThinkingStep::builder()
        .model(model)
        .frequency(Frequency::First)
        .system_prompt(
            PromptTree::new()
                .text("Role", "{{role}}")
                .text("Task", "Given task: {{task}}")
                .text(
                    "Expected response",
                    "You have to analyze the given task and provide a concise plan to perform the task.",
                ),
        )
        .on_response(|response, ctx| {
            debug!("Plan recorded");
            ctx.records.set("plan", response);
            Ok(())
        })
        .build()
}
