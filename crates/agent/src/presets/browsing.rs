//! Browser-facing preset steps: session bootstrap and crawling.

use futures::FutureExt;
use std::sync::Arc;
use webpilot_core::browser::BrowserDriver;
use webpilot_core::error::Error;
use webpilot_core::message::ContentPart;
use webpilot_core::prompt::PromptTree;
use webpilot_core::tool::Tool;
use webpilot_tools::{FinishTool, NavigateTool, crawling_tools};

use crate::step::{ExecutionStep, Frequency, Step, UserMessageFactory};

/// User-message factory producing the annotated page view: screenshot,
/// current URL, UI hint map. Yields no parts while no session is open, so
/// steps using it simply skip their user turn before the first navigation.
pub fn snapshot_user_message(driver: Arc<dyn BrowserDriver>) -> UserMessageFactory {
    Arc::new(move |_task: String| {
        let driver = driver.clone();
        async move {
            if !driver.session_open() {
                return Ok(vec![]);
            }
            let snapshot = driver.annotated_snapshot().await.map_err(Error::from)?;
            Ok(vec![
                ContentPart::image(snapshot.image_data_uri),
                ContentPart::text(format!(
                    "current url: {}",
                    snapshot.url.unwrap_or_default()
                )),
                ContentPart::text(format!("UI map: {}", snapshot.ui_map)),
            ])
        }
        .boxed()
    })
}

/// Execution step that opens the browser session: gated on "no session
/// open", sole tool `navigate`.
pub fn session_bootstrap_step(
    driver: Arc<dyn BrowserDriver>,
    model: &str,
) -> Result<Step, Error> {
    let gate = driver.clone();
    ExecutionStep::builder()
        .model(model)
        .frequency(Frequency::If(Arc::new(move || !gate.session_open())))
        .system_prompt(
            PromptTree::new()
                .text("Role", "{{role}}")
                .text(
                    "Expected response",
                    "Think of a url to start crawling the web and use the navigate tool to navigate to the URL.",
                )
                .text("Task", "Perform the following task: {{task}}"),
        )
        .tools(vec![Arc::new(NavigateTool::new(driver)) as Arc<dyn Tool>])
        .build()
}

/// The main crawling step: vision model, annotated snapshot as user turn,
/// full browser tool family plus `finish`.
pub fn crawling_step(driver: Arc<dyn BrowserDriver>, vision_model: &str) -> Result<Step, Error> {
    let mut tools = crawling_tools(driver.clone());
    tools.push(Arc::new(FinishTool));

    ExecutionStep::builder()
        .model(vision_model)
        .frequency(Frequency::Every(1))
        .system_prompt(
            PromptTree::new()
                .text("Role", "{{role}}")
                .text("Task", "Given task: {{task}}")
                .text(
                    "How you operate",
                    "You are given a screenshot of the browser with a set of marks that indicates the elements to interact with.",
                )
                .text(
                    "How you should perform the task",
                    "Follow this plan: {{plan}}",
                )
                .list(
                    "notes",
                    [
                        "When you need to login, ask the user to do so and then continue with the task",
                        "Pay special attention to avoid repeating actions that are already done",
                        "Try to scroll down if you can't find the element you are looking for",
                    ],
                )
                .text(
                    "finish",
                    "Once you have completed the task, you should use the finish tool to finish the task.",
                ),
        )
        .tools(tools)
        .user_message(snapshot_user_message(driver))
        .build()
}
