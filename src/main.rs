//! Plan Compass service binary.
//!
//! Loads configuration, wires the dialogue engine to its providers, and
//! serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::info;

use plan_compass::adapters::http::{app, AppState};
use plan_compass::adapters::nlu::{GeminiConfig, GeminiProvider};
use plan_compass::adapters::search::{YdcConfig, YdcSearchClient};
use plan_compass::adapters::store::InMemorySessionStore;
use plan_compass::config::AppConfig;
use plan_compass::domain::catalog::{IntentRegistry, QuestionSource};
use plan_compass::domain::dialogue::{DialogueEngine, EntityExtractor, RelevanceFilter};
use plan_compass::domain::retrieval::RetrievalOrchestrator;
use plan_compass::ports::{NluProvider, SearchProvider, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;
    info!("plan-compass starting");

    let nlu_key = config
        .nlu
        .api_key
        .as_ref()
        .map(|key| key.expose_secret().clone())
        .unwrap_or_default();
    let nlu: Arc<dyn NluProvider> = Arc::new(GeminiProvider::new(
        GeminiConfig::new(nlu_key)
            .with_model(config.nlu.model.clone())
            .with_base_url(config.nlu.base_url.clone())
            .with_timeout(config.nlu.timeout()),
    )?);

    let search_key = config
        .search
        .api_key
        .as_ref()
        .map(|key| key.expose_secret().clone())
        .unwrap_or_default();
    let search: Arc<dyn SearchProvider> = Arc::new(YdcSearchClient::new(
        YdcConfig::new(search_key)
            .with_base_url(config.search.base_url.clone())
            .with_timeout(config.search.timeout()),
    )?);

    let question_source = if config.nlu.dynamic_questions {
        QuestionSource::Generated {
            provider: nlu.clone(),
        }
    } else {
        QuestionSource::Template
    };

    let registry = Arc::new(IntentRegistry::load(
        &config.dialogue.catalog_path,
        question_source,
    )?);
    let catalog = registry.snapshot();
    info!(
        intents = catalog.intent_ids().len(),
        entities = catalog.entity_ids().len(),
        path = %config.dialogue.catalog_path,
        "catalog loaded"
    );

    let store: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.dialogue.session_ttl()));

    let retrieval = Arc::new(RetrievalOrchestrator::new(
        search,
        nlu.clone(),
        config.search.max_results,
    ));

    let engine = Arc::new(DialogueEngine::new(
        registry.clone(),
        store.clone(),
        RelevanceFilter::new(),
        EntityExtractor::new(nlu),
        retrieval,
        config.dialogue.completion_policy,
    ));

    let state = AppState {
        engine,
        registry,
        store,
        nlu_configured: config.nlu.has_api_key(),
        search_configured: config.search.has_api_key(),
    };
    let router = app(state, Duration::from_secs(config.server.request_timeout_secs));

    let addr = config.server.socket_addr()?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
