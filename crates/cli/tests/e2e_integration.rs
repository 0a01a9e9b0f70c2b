//! End-to-end integration tests for the WebPilot agent runtime.
//!
//! These exercise the full pipeline from task string to terminal outcome:
//! prompt assembly, frequency gating, selection resolution, tool dispatch
//! and transcript persistence — over scripted model responses and the stub
//! browser driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use webpilot_agent::presets::{crawler_pilot, snapshot_user_message};
use webpilot_agent::{Agent, ExecutionStep, Frequency, TaskOutcome, ThinkingStep};
use webpilot_config::ModelsConfig;
use webpilot_core::browser::BrowserDriver;
use webpilot_core::error::ProviderError;
use webpilot_core::message::{ContentPart, MessageContent};
use webpilot_core::provider::{ModelRequest, ModelResponse, ModelToolCall, Provider};
use webpilot_core::tool::{Tool, ToolOutcome};
use webpilot_tools::{FinishTool, StubDriver};

// ── Scripted provider ────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence and records
/// every request for assertions.
struct ScriptedProvider {
    responses: std::sync::Mutex<Vec<ModelResponse>>,
    requests: std::sync::Mutex<Vec<ModelRequest>>,
    call_count: std::sync::Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            requests: std::sync::Mutex::new(Vec::new()),
            call_count: std::sync::Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        if *count >= responses.len() {
            panic!("ScriptedProvider: out of responses at call #{}", *count);
        }
        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        content: text.into(),
        tool_calls: vec![],
        model: "mock-model".into(),
        usage: None,
    }
}

fn tool_response(name: &str, args: serde_json::Value) -> ModelResponse {
    ModelResponse {
        content: String::new(),
        tool_calls: vec![ModelToolCall {
            name: name.into(),
            arguments: args.to_string(),
        }],
        model: "mock-model".into(),
        usage: None,
    }
}

fn image_part_count(request: &ModelRequest) -> usize {
    request
        .messages
        .iter()
        .filter_map(|m| match &m.content {
            MessageContent::Parts(parts) => Some(
                parts
                    .iter()
                    .filter(|p| matches!(p, ContentPart::ImageUrl { .. }))
                    .count(),
            ),
            _ => None,
        })
        .sum()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn crawler_pilot_finishes_and_writes_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let transcript_path = dir.path().join("output.json");

    let provider = Arc::new(ScriptedProvider::new(vec![
        // cycle 1: plan, bootstrap navigate, crawl types a query
        text_response("1. open the site 2. search 3. finish"),
        tool_response("navigate", serde_json::json!({"url": "https://example.com"})),
        text_response(
            "```json\n{\"name\":\"type\",\"arguments\":{\"element_id\":\"1\",\"text\":\"socks\",\"press_enter\":true,\"analysis\":\"search box\"}}\n```",
        ),
        // cycle 2: crawl finishes
        text_response(
            "```json\n{\"name\":\"finish\",\"arguments\":{\"success\":true,\"conclusion\":\"ordered socks\"}}\n```",
        ),
    ]));

    let driver = Arc::new(StubDriver::new());
    let mut agent = crawler_pilot(provider.clone(), driver.clone(), &ModelsConfig::default())
        .unwrap()
        .with_transcript_path(&transcript_path);

    let outcome = agent.run("buy socks on example.com").await.unwrap();

    match outcome {
        TaskOutcome::Finished(ToolOutcome::Structured(map)) => {
            assert_eq!(map["success"], serde_json::json!(true));
            assert_eq!(map["conclusion"], serde_json::json!("ordered socks"));
        }
        other => panic!("Expected structured finish outcome, got {other:?}"),
    }

    assert_eq!(agent.cycle(), 2);
    assert_eq!(provider.calls(), 4);
    assert_eq!(
        driver.actions(),
        vec!["navigate https://example.com", "type 1 'socks' +enter"]
    );

    // transcript written on terminal completion
    let transcript: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&transcript_path).unwrap()).unwrap();
    assert_eq!(transcript["task"], "buy socks on example.com");
    assert!(transcript["messages"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn first_fires_once_and_if_false_never_fires_across_five_cycles() {
    let thoughts = Arc::new(AtomicUsize::new(0));
    let probe = thoughts.clone();

    let planning = ThinkingStep::builder()
        .model("gpt-4-turbo-2024-04-09")
        .frequency(Frequency::First)
        .on_response(move |_, _| {
            probe.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build()
        .unwrap();

    let never = ExecutionStep::builder()
        .model("gpt-4-0125-preview")
        .frequency(Frequency::If(Arc::new(|| false)))
        .tools(vec![Arc::new(FinishTool) as Arc<dyn Tool>])
        .build()
        .unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![text_response("the plan")]));
    let mut agent = Agent::new(provider.clone(), vec![planning, never]).with_max_cycles(5);

    let outcome = agent.run("idle around").await.unwrap();

    assert_eq!(outcome, TaskOutcome::CycleLimit);
    assert_eq!(agent.cycle(), 5);
    // only the FIRST step ever reached the model, exactly once
    assert_eq!(provider.calls(), 1);
    assert_eq!(thoughts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn screenshots_are_not_resent_on_later_cycles() {
    let driver = Arc::new(StubDriver::new());
    driver.navigate("https://example.com").await.unwrap();

    let crawl = ExecutionStep::builder()
        .model("gpt-4-0125-preview")
        .user_message(snapshot_user_message(driver.clone()))
        .tools(vec![Arc::new(FinishTool) as Arc<dyn Tool>])
        .build()
        .unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("hmm, not selecting anything this cycle"),
        tool_response(
            "finish",
            serde_json::json!({"success": true, "conclusion": "done"}),
        ),
    ]));

    let mut agent = Agent::new(provider.clone(), vec![crawl]);
    agent.run("look at the page").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    // each request carries exactly the current snapshot, never stale ones
    assert_eq!(image_part_count(&requests[0]), 1);
    assert_eq!(image_part_count(&requests[1]), 1);
}

#[tokio::test]
async fn fenced_json_convention_when_model_lacks_native_tool_calls() {
    let step = ExecutionStep::builder()
        .model("gpt-4-vision-preview")
        .tools(vec![Arc::new(FinishTool) as Arc<dyn Tool>])
        .build()
        .unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![text_response(
        "Looks done to me.\n```json\n{\"name\":\"finish\",\"params\":{\"success\":true,\"conclusion\":\"all set\"}}\n```",
    )]));

    let mut agent = Agent::new(provider.clone(), vec![step]);
    let outcome = agent.run("wrap up").await.unwrap();

    assert!(matches!(outcome, TaskOutcome::Finished(_)));

    let request = &provider.requests()[0];
    // no native tool schemas on the request...
    assert!(request.tools.is_empty());
    // ...they are rendered into the system prompt with the fence example
    let system = request.messages[0].content.as_text();
    assert!(system.contains("You can use the following tools"));
    assert!(system.contains("```json"));
    assert!(system.contains("\"finish\""));
}
