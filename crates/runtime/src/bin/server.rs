use anyhow::Result;
use kindred_config::AppConfig;
use kindred_runtime::AppState;
use tracing_subscriber::EnvFilter;

/// No HTTP listener here by design; this entry point proves the wiring
/// boots cleanly end to end and is where a transport layer would attach
/// in a full deployment.
#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::load_from("kindred.toml")?;
    let prompt_dir = std::env::var("KINDRED_PROMPT_DIR").unwrap_or_else(|_| "prompts".to_string());

    let state = AppState::bootstrap(config, prompt_dir).await?;
    tracing::info!(
        model = %state.config.llm.default_model,
        collection = %state.config.vector_store.chroma_collection_name,
        "kindred orchestrator ready"
    );

    Ok(())
}
