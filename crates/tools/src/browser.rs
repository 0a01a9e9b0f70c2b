//! Browser tool family — the actuator capabilities offered to crawling steps.
//!
//! Every tool schema carries the shared reasoning block (`analysis`,
//! `expected_results`, `next_steps`) so the model narrates what it expects
//! each action to achieve. The callbacks stay thin: parameter extraction,
//! one driver call, error mapping.

use async_trait::async_trait;
use std::sync::Arc;
use webpilot_core::browser::{BrowserDriver, ScrollDirection, TypeOptions};
use webpilot_core::error::{BrowserError, ToolError};
use webpilot_core::tool::{Tool, ToolDefinition, ToolOutcome, ToolParams};
use webpilot_core::StepContext;

/// The reasoning properties merged into every browser tool schema.
fn reasoning_properties() -> serde_json::Value {
    serde_json::json!({
        "analysis": {
            "type": "string",
            "description": "Create a brief analysis of what you learned"
        },
        "expected_results": {
            "type": "string",
            "description": "What are the expected results of this action?"
        },
        "next_steps": {
            "type": "string",
            "description": "What are the next steps to take after this action?"
        }
    })
}

/// Merge tool-specific properties over the shared reasoning block.
fn with_reasoning(properties: serde_json::Value) -> serde_json::Value {
    let mut merged = reasoning_properties();
    if let (Some(base), Some(extra)) = (merged.as_object_mut(), properties.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    merged
}

fn required_str<'a>(params: &'a ToolParams, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing '{key}'")))
}

fn optional_bool(params: &ToolParams, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn browser_failure(tool_name: &str, err: BrowserError) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: err.to_string(),
    }
}

// --- navigate ---

pub struct NavigateTool {
    driver: Arc<dyn BrowserDriver>,
}

impl NavigateTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for NavigateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "navigate".into(),
            description: "Navigate to the given URL".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": with_reasoning(serde_json::json!({
                    "url": {
                        "type": "string",
                        "description": "URL to navigate to"
                    }
                })),
                "required": ["url", "analysis"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let url = required_str(params, "url")?;
        self.driver
            .navigate(url)
            .await
            .map_err(|e| browser_failure("navigate", e))?;
        Ok(ToolOutcome::Done)
    }
}

// --- click ---

pub struct ClickTool {
    driver: Arc<dyn BrowserDriver>,
}

impl ClickTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for ClickTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "click".into(),
            description: "Click on element".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": with_reasoning(serde_json::json!({
                    "element_id": {
                        "type": "string",
                        "description": "Use the hint (placed in the top left corner of the element) to specify the character string to click on"
                    }
                })),
                "required": ["element_id", "analysis"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let element_id = required_str(params, "element_id")?;
        self.driver
            .click(element_id)
            .await
            .map_err(|e| browser_failure("click", e))?;
        Ok(ToolOutcome::Done)
    }
}

// --- type ---

pub struct TypeTool {
    driver: Arc<dyn BrowserDriver>,
}

impl TypeTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for TypeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "type".into(),
            description: "Type text into the focused element".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": with_reasoning(serde_json::json!({
                    "text": {
                        "type": "string",
                        "description": "Text to type"
                    },
                    "element_id": {
                        "type": "string",
                        "description": "The character string to focus on"
                    },
                    "press_enter": {
                        "type": "boolean",
                        "description": "Press enter after typing the text (useful for search boxes)"
                    },
                    "replace_existing": {
                        "type": "boolean",
                        "description": "Replace existing text in the input field"
                    }
                })),
                "required": ["text", "element_id", "analysis"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let text = required_str(params, "text")?;
        let element_id = required_str(params, "element_id")?;
        let options = TypeOptions {
            press_enter: optional_bool(params, "press_enter"),
            replace_existing: optional_bool(params, "replace_existing"),
        };
        self.driver
            .type_text(element_id, text, options)
            .await
            .map_err(|e| browser_failure("type", e))?;
        Ok(ToolOutcome::Done)
    }
}

// --- scroll ---

pub struct ScrollTool {
    driver: Arc<dyn BrowserDriver>,
}

impl ScrollTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for ScrollTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "scroll".into(),
            description: "Scroll up or down".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": with_reasoning(serde_json::json!({
                    "direction": {
                        "type": "string",
                        "enum": ["up", "down"],
                        "description": "Direction to scroll"
                    },
                    "element_id": {
                        "type": "string",
                        "description": "Use it if you want to scroll to a specific element"
                    }
                })),
                "required": ["direction", "analysis"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let direction: ScrollDirection = required_str(params, "direction")?
            .parse()
            .map_err(|e: BrowserError| ToolError::InvalidArguments(e.to_string()))?;
        let element_id = params.get("element_id").and_then(|v| v.as_str());
        self.driver
            .scroll(direction, element_id)
            .await
            .map_err(|e| browser_failure("scroll", e))?;
        Ok(ToolOutcome::Done)
    }
}

// --- go_back ---

pub struct GoBackTool {
    driver: Arc<dyn BrowserDriver>,
}

impl GoBackTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for GoBackTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "go_back".into(),
            description: "Go back to the previous page".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "times": {
                        "type": "number",
                        "description": "Number of times to go back"
                    }
                }
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let times = params.get("times").and_then(|v| v.as_u64()).unwrap_or(1) as u32;
        self.driver
            .go_back(times)
            .await
            .map_err(|e| browser_failure("go_back", e))?;
        Ok(ToolOutcome::Done)
    }
}

// --- wait_load ---

pub struct WaitLoadTool {
    driver: Arc<dyn BrowserDriver>,
}

impl WaitLoadTool {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Tool for WaitLoadTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "wait_load".into(),
            description: "Wait for a few seconds when the page is loading".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "seconds": {
                        "type": "number",
                        "description": "Number of seconds to wait"
                    }
                },
                "required": ["seconds"]
            }),
        }
    }

    async fn invoke(
        &self,
        params: &ToolParams,
        _ctx: &mut StepContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let seconds = params
            .get("seconds")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'seconds'".into()))?;
        self.driver
            .wait_for_load(seconds)
            .await
            .map_err(|e| browser_failure("wait_load", e))?;
        Ok(ToolOutcome::Done)
    }
}

/// The crawling tool family over one driver, in declaration order.
pub fn crawling_tools(driver: Arc<dyn BrowserDriver>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(NavigateTool::new(driver.clone())),
        Arc::new(ClickTool::new(driver.clone())),
        Arc::new(TypeTool::new(driver.clone())),
        Arc::new(ScrollTool::new(driver.clone())),
        Arc::new(GoBackTool::new(driver.clone())),
        Arc::new(WaitLoadTool::new(driver)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubDriver;
    use webpilot_core::context::Records;
    use webpilot_core::message::History;

    fn params(pairs: &[(&str, serde_json::Value)]) -> ToolParams {
        let mut map = ToolParams::new();
        for (k, v) in pairs {
            map.insert((*k).into(), v.clone());
        }
        map
    }

    macro_rules! ctx {
        ($history:ident, $records:ident, $feedback:ident, $ctx:ident) => {
            let mut $history = History::new();
            let mut $records = Records::new();
            let mut $feedback = Vec::new();
            let mut $ctx = StepContext {
                task: "test",
                history: &mut $history,
                records: &mut $records,
                feedback: &mut $feedback,
            };
        };
    }

    #[test]
    fn reasoning_block_present_on_every_crawling_tool() {
        let driver = Arc::new(StubDriver::new());
        for tool in crawling_tools(driver) {
            let def = tool.definition();
            if matches!(def.name.as_str(), "go_back" | "wait_load") {
                continue;
            }
            let props = &def.parameters["properties"];
            assert!(
                props.get("analysis").is_some(),
                "{} is missing the reasoning block",
                def.name
            );
        }
    }

    #[tokio::test]
    async fn navigate_opens_session() {
        let driver = Arc::new(StubDriver::new());
        ctx!(history, records, feedback, ctx);

        let tool = NavigateTool::new(driver.clone());
        tool.invoke(
            &params(&[("url", serde_json::json!("https://example.com"))]),
            &mut ctx,
        )
        .await
        .unwrap();

        assert!(driver.session_open());
        assert_eq!(driver.actions(), vec!["navigate https://example.com"]);
    }

    #[tokio::test]
    async fn click_without_session_fails() {
        let driver = Arc::new(StubDriver::new());
        ctx!(history, records, feedback, ctx);

        let tool = ClickTool::new(driver);
        let err = tool
            .invoke(&params(&[("element_id", serde_json::json!("3f"))]), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn type_passes_options() {
        let driver = Arc::new(StubDriver::new());
        driver.navigate("https://example.com").await.unwrap();
        ctx!(history, records, feedback, ctx);

        let tool = TypeTool::new(driver.clone());
        tool.invoke(
            &params(&[
                ("text", serde_json::json!("rust browser agent")),
                ("element_id", serde_json::json!("2a")),
                ("press_enter", serde_json::json!(true)),
            ]),
            &mut ctx,
        )
        .await
        .unwrap();

        assert!(
            driver
                .actions()
                .iter()
                .any(|a| a.contains("type") && a.contains("enter"))
        );
    }

    #[tokio::test]
    async fn scroll_rejects_bad_direction() {
        let driver = Arc::new(StubDriver::new());
        driver.navigate("https://example.com").await.unwrap();
        ctx!(history, records, feedback, ctx);

        let tool = ScrollTool::new(driver);
        let err = tool
            .invoke(
                &params(&[("direction", serde_json::json!("sideways"))]),
                &mut ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn go_back_defaults_to_one() {
        let driver = Arc::new(StubDriver::new());
        driver.navigate("https://example.com").await.unwrap();
        ctx!(history, records, feedback, ctx);

        GoBackTool::new(driver.clone())
            .invoke(&ToolParams::new(), &mut ctx)
            .await
            .unwrap();
        assert!(driver.actions().iter().any(|a| a == "go_back 1"));
    }
}
