//! `frontdesk serve` — start the HTTP gateway.

use frontdesk_config::AppConfig;
use frontdesk_core::provider::ChatProvider;
use frontdesk_gateway::AppState;
use frontdesk_provider::{credentials, OpenAiChatProvider};
use frontdesk_store::{MemoryStore, SqliteStore, Store};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(
    config_path: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from(Path::new(&path))?,
        None => AppConfig::load()?,
    };

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let store: Arc<dyn Store> = match config.store.backend.as_str() {
        "memory" => {
            info!("Using in-memory store (data is lost on shutdown)");
            Arc::new(MemoryStore::new())
        }
        _ => Arc::new(SqliteStore::new(&config.store.path).await?),
    };

    let creds = credentials::load()?;
    let provider: Arc<dyn ChatProvider> =
        Arc::new(OpenAiChatProvider::new("openai", &config.provider.base_url, creds)?);

    println!("Frontdesk gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store: {} ({})", config.store.backend, config.store.path);
    println!("   Model: {}", config.chat.model);

    let state = Arc::new(AppState::new(store, provider, &config));
    frontdesk_gateway::serve(state, &config.gateway.host, config.gateway.port).await?;

    Ok(())
}
