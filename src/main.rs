use beesmart_lexicon::db::ViolationStorage;
use beesmart_lexicon::dictionary::{DefinitionCache, DictionaryApi, DictionaryResolver, LexiconSlot};
use beesmart_lexicon::filter::{BlockListClassifier, TrackerSettings, tracker};
use beesmart_lexicon::router::{LexiconState, lexicon_router};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &beesmart_lexicon::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
        dictionary_api = %cfg.dictionary.api_base_url,
    );

    // The violation log is optional; the tracker keeps working in memory.
    let storage = match ViolationStorage::connect(&cfg.database_url).await {
        Ok(storage) => Some(storage),
        Err(e) => {
            warn!(error = %e, "violation log unavailable; tracking in memory only");
            None
        }
    };
    let tracker = tracker::spawn(
        TrackerSettings::from(&cfg.filter),
        storage,
        Arc::new(BlockListClassifier),
    )
    .await?;

    let cache = DefinitionCache::open_or_recover(&cfg.dictionary.cache_path);

    let api = DictionaryApi::new(&cfg.dictionary, cfg.proxy.as_ref())?;
    let lexicon = LexiconSlot::new();
    lexicon.spawn_load(cfg.dictionary.lexicon_path.clone());

    let resolver = Arc::new(DictionaryResolver::new(lexicon, Arc::new(cache), api));
    let state = LexiconState::new(resolver, tracker, &cfg.admin_key);
    let app = lexicon_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
