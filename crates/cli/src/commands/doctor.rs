//! `webpilot doctor` — diagnose configuration and provider health.

use std::sync::Arc;
use webpilot_config::AppConfig;
use webpilot_core::provider::Provider;
use webpilot_providers::OpenAiCompatProvider;

fn status(ok: bool) -> &'static str {
    if ok { "ok" } else { "MISSING" }
}

pub async fn run() -> anyhow::Result<()> {
    println!("WebPilot doctor");
    println!();

    let config_path = AppConfig::config_dir().join("config.toml");
    println!(
        "  config file     {} ({})",
        status(config_path.exists()),
        config_path.display()
    );

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("  config load     FAILED: {e}");
            return Ok(());
        }
    };
    println!("  config load     ok");
    println!("  api key         {}", status(config.has_api_key()));
    println!("  api url         {}", config.api_url);
    println!(
        "  models          planner={} executor={} vision={}",
        config.models.planner, config.models.executor, config.models.vision
    );

    if config.has_api_key() {
        match OpenAiCompatProvider::from_config(&config) {
            Ok(provider) => {
                let provider: Arc<dyn Provider> = Arc::new(provider);
                match provider.health_check().await {
                    Ok(true) => println!("  provider        reachable"),
                    Ok(false) => println!("  provider        UNREACHABLE (endpoint error)"),
                    Err(e) => println!("  provider        UNREACHABLE ({e})"),
                }
            }
            Err(e) => println!("  provider        FAILED to build: {e}"),
        }
    } else {
        println!("  provider        skipped (no api key)");
    }

    Ok(())
}
