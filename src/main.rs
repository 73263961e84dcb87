use std::sync::Arc;

use convo_bridge::bridge::ws;
use convo_bridge::config::BridgeConfig;
use convo_bridge::store::{ConversationStore, FileBackend, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BridgeConfig::from_env()?;

    eprintln!("🔗 Convo Bridge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Bridge WS: ws://0.0.0.0:{}/ws/bridge", config.port);
    eprintln!("   Health: http://0.0.0.0:{}/health", config.port);
    eprintln!("   Data dir: {}", config.data_dir.display());
    match &config.allowed_origin {
        Some(origin) => eprintln!("   Allowed origin: {}", origin),
        None => eprintln!("   Allowed origin: any (set CONVO_BRIDGE_ALLOWED_ORIGIN to restrict)"),
    }
    eprintln!();

    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(config.data_dir.clone()));
    let store = Arc::new(ConversationStore::new(backend));

    ws::serve(store, &config).await?;

    Ok(())
}
