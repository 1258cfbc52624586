use itinerary_planner::{
    api::{start_server, ApiState},
    config::AppConfig,
    i18n::Catalog,
    provider::GeminiProvider,
    validation::create_default_validator,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("📌 Set API_KEY (or GEMINI_API_KEY) in the environment or .env");
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
    };

    info!("🚀 Itinerary Planner - API Server");
    info!("📍 Port: {}", config.port);
    info!("🤖 Model: {}", config.gemini.model);

    let catalog = match &config.translations_path {
        Some(path) => {
            info!("Loading translations from {}", path.display());
            Catalog::load(path)?
        }
        None => Catalog::builtin(),
    };

    let provider = Arc::new(GeminiProvider::new(config.gemini.clone())?);
    let state = ApiState::new(
        provider,
        create_default_validator(),
        catalog,
        config.public_base_url.clone(),
    )
    .with_session_limits(config.session_idle, config.max_sessions);

    info!("✅ Planner initialized");
    info!("📡 Starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
