//! `appify serve`: wire the stack together and run the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use appify_chat::{ChatSettings, ConversationController, Locale};
use appify_config::AppifyConfig;
use appify_gateway::{start_server, GatewayState};
use appify_generator::{GeneratorRegistry, GeneratorSettings};
use appify_store::SqliteChatStore;

pub async fn run(config: AppifyConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        db = %config.db_path.display(),
        script = %config.script_path.display(),
        "Starting Appify runtime"
    );

    let store = Arc::new(
        SqliteChatStore::open(&config.db_path)
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?,
    );

    let settings = GeneratorSettings {
        base_url: config.generator.base_url.clone(),
        model: config.generator.model.clone(),
        temperature: config.generator.temperature,
        max_tokens: config.generator.max_tokens,
    };
    let generators = GeneratorRegistry::openai(settings, config.generator.api_key.clone());
    if generators.has_shared() {
        info!(model = %config.generator.model, "Registered shared OpenAI-compatible generator");
    } else {
        warn!("No shared API key; users must supply their own before generating");
    }

    let locale: Locale = config.lang.parse().map_err(anyhow::Error::msg)?;
    let controller = ConversationController::new(
        store,
        generators,
        config.script_path.clone(),
        ChatSettings {
            locale,
            max_tries: config.max_tries,
            history_cap: config.history_cap,
        },
    );

    start_server(&config.bind_addr(), GatewayState::new(controller)).await
}
