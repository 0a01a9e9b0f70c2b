//! `webpilot run` — capture a task and drive the agent to completion.

use anyhow::{Context, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use webpilot_agent::TaskOutcome;
use webpilot_agent::presets::mission_pilot;
use webpilot_config::AppConfig;
use webpilot_core::tool::ToolOutcome;
use webpilot_providers::OpenAiCompatProvider;
use webpilot_tools::{StdinPrompt, StubDriver, UserPrompt};

pub async fn run(
    task: Option<String>,
    max_cycles: Option<u64>,
    transcript: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    WEBPILOT_API_KEY");
        eprintln!("    OPENAI_API_KEY");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    let provider =
        Arc::new(OpenAiCompatProvider::from_config(&config).context("Failed to build provider")?);
    let prompt = Arc::new(StdinPrompt);

    let task = match task {
        Some(task) => task,
        None => prompt.ask("What task would you like to perform?").await?,
    };

    // The stub driver stands in until a real browser driver is wired behind
    // the BrowserDriver seam; embedders pass their own implementation.
    let driver = Arc::new(StubDriver::new());
    info!("Using the stub browser driver");

    let mut agent = mission_pilot(provider, driver, prompt.clone(), &config.models)?
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_transcript_path(transcript.unwrap_or_else(|| config.transcript_path.clone()));

    if let Some(max) = max_cycles.or(config.max_cycles) {
        agent = agent.with_max_cycles(max);
    }

    match agent.run(&task).await? {
        TaskOutcome::Finished(ToolOutcome::Structured(map)) => {
            let success = map.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
            let conclusion = map
                .get("conclusion")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            println!();
            println!(
                "Task {}: {conclusion}",
                if success { "completed" } else { "failed" }
            );
        }
        TaskOutcome::Finished(outcome) => {
            println!();
            println!("Task completed: {outcome:?}");
        }
        TaskOutcome::Cancelled => println!("Run cancelled."),
        TaskOutcome::CycleLimit => println!("Stopped: cycle limit reached."),
    }

    Ok(())
}
