//! Evaluation step — a supervisor watching the execution trail.
//!
//! On its cadence, asks the model to judge the run so far and reply with a
//! JSON feedback payload. Well-formed feedback lands in the feedback log
//! and history; malformed payloads are logged and dropped so a sloppy
//! supervisor never aborts the task.

use serde::Deserialize;
use tracing::warn;
use webpilot_core::context::{Feedback, FeedbackKind};
use webpilot_core::error::Error;
use webpilot_core::fence::extract_json_block;
use webpilot_core::prompt::PromptTree;

use crate::step::{Frequency, Step, ThinkingStep, UserMessageFactory};

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    feedback_type: FeedbackKind,
    feedback_message: String,
}

/// Build an evaluation step firing every `cadence` cycles, optionally with
/// a user-message factory (e.g. a page snapshot for a vision supervisor).
pub fn evaluate_step(
    model: &str,
    cadence: u64,
    user_message: Option<UserMessageFactory>,
) -> Result<Step, Error> {
    let mut builder = ThinkingStep::builder()
        .model(model)
        .frequency(Frequency::Every(cadence))
        .system_prompt(
            PromptTree::new()
                .text(
                    "Role",
                    "You are an AI agent who is performing a task step by step, your job is to \
                     evaluate the current state of the execution and provide a feedback.",
                )
                .text(
                    "Response Format",
                    "You only speak JSON, and you must provide the following fields:\n\
                     - feedback_type: The type of feedback you want to provide. It can be one of \
                     the following: 'positive', 'negative' or 'neutral'\n\
                     - feedback_message: The message you want to provide to the AI agent.",
                )
                .text(
                    "Example response",
                    "```json\n{\n    \"feedback_type\": \"negative\",\n    \"feedback_message\": \"The ai agent is stuck in a loop, it keeps repeating the same action over and over again.\"\n}\n```",
                )
                .text(
                    "Task",
                    "The AI agent is performing the following task: {{task}}",
                ),
        )
        .on_response(|response, ctx| {
            let payload = extract_json_block(response);
            match serde_json::from_str::<EvaluationPayload>(payload) {
                Ok(parsed) => ctx.push_feedback(Feedback {
                    message: parsed.feedback_message,
                    kind: parsed.feedback_type,
                }),
                Err(e) => warn!(error = %e, "Ignoring malformed evaluation payload"),
            }
            Ok(())
        });

    if let Some(factory) = user_message {
        builder = builder.user_message(factory);
    }
    builder.build()
}
