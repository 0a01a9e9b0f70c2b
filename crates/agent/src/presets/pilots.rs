//! Composed pilots — ready-made agents over one browser driver.

use std::sync::Arc;
use webpilot_config::ModelsConfig;
use webpilot_core::browser::BrowserDriver;
use webpilot_core::error::Error;
use webpilot_core::prompt::PromptTree;
use webpilot_core::provider::Provider;
use webpilot_core::tool::Tool;
use webpilot_tools::{ContentExtractionTool, FinishTool, PromptUserTool, UserPrompt};

use crate::loop_runner::Agent;
use crate::presets::browsing::{crawling_step, session_bootstrap_step, snapshot_user_message};
use crate::presets::delegate::DelegateTool;
use crate::presets::evaluate::evaluate_step;
use crate::presets::planning::planning_step;
use crate::step::ExecutionStep;

const CRAWLER_ROLE: &str = "You are an AI agent who's job is to operate a web browser and only \
                            focuses to crawl the web and navigate to the expected destination.";

const SUPERVISOR_ROLE: &str = "You are an AI agent that controls other agents to complete the \
                               given task. You are operating in a web browser and you must use \
                               the subordinate agents to complete the task.";

/// How often the evaluation step reviews the execution trail.
const EVALUATION_CADENCE: u64 = 3;

/// A single-browser crawling agent: plan once, open a session when none
/// exists, crawl every cycle, get supervised on a cadence.
pub fn crawler_pilot(
    provider: Arc<dyn Provider>,
    driver: Arc<dyn BrowserDriver>,
    models: &ModelsConfig,
) -> Result<Agent, Error> {
    let steps = vec![
        planning_step(&models.planner)?,
        session_bootstrap_step(driver.clone(), &models.executor)?,
        crawling_step(driver.clone(), &models.vision)?,
        evaluate_step(
            &models.vision,
            EVALUATION_CADENCE,
            Some(snapshot_user_message(driver)),
        )?,
    ];

    let mut agent = Agent::new(provider, steps);
    agent.records_mut().set("role", CRAWLER_ROLE);
    Ok(agent)
}

/// A supervisor agent that splits the task across subordinates: a crawling
/// agent for navigation, content extraction for reading pages, the operator
/// for missing information, and `finish` to conclude.
pub fn mission_pilot(
    provider: Arc<dyn Provider>,
    driver: Arc<dyn BrowserDriver>,
    user_prompt: Arc<dyn UserPrompt>,
    models: &ModelsConfig,
) -> Result<Agent, Error> {
    let crawler = crawler_pilot(provider.clone(), driver.clone(), models)?;
    let navigation = DelegateTool::new(
        "navigation_agent",
        "Delegate navigation and crawling to the subordinate browser agent",
        crawler,
    );

    let supervisor = ExecutionStep::builder()
        .model(&models.executor)
        .system_prompt(
            PromptTree::new()
                .text("Role", SUPERVISOR_ROLE)
                .tree(
                    "Subordinate agents",
                    PromptTree::new()
                        .text(
                            "navigation_agent",
                            "Use this agent to navigate and crawl the web.",
                        )
                        .text(
                            "extract_relevant_information",
                            "Use this tool to summarize the page content or to extract general information from the current page.",
                        )
                        .text(
                            "prompt_user",
                            "Use this tool to ask the user for missing information or manual intervention.",
                        ),
                )
                .text(
                    "How you operate",
                    "Each agent has a speciality to operate the web browser, so you must separate \
                     the task into subtasks and assign each subtask to the agent that can complete it.",
                )
                .text(
                    "Finish",
                    "Once you have completed the task, use the finish tool to finish the task and provide feedback.",
                )
                .text("Task", "Perform the following task: {{task}}"),
        )
        .tools(vec![
            Arc::new(navigation) as Arc<dyn Tool>,
            Arc::new(ContentExtractionTool::new(
                driver.clone(),
                provider.clone(),
                &models.vision,
                &models.planner,
            )),
            Arc::new(PromptUserTool::new(user_prompt)),
            Arc::new(FinishTool),
        ])
        .build()?;

    let steps = vec![
        supervisor,
        evaluate_step(
            &models.vision,
            EVALUATION_CADENCE,
            Some(snapshot_user_message(driver)),
        )?,
    ];

    Ok(Agent::new(provider, steps))
}
