//! Server assembly
//!
//! Loads configuration, wires the gateway's collaborators together, starts
//! the background cache sweeper, and runs the axum server until a shutdown
//! signal arrives.

pub mod config;

use anyhow::{Context, Result};
use axum::Extension;
use sluice_gateway::{sweeper, Gateway, GatewayConfig};
use sluice_llm::{
    HttpEmbeddingConfig, HttpEmbeddingProvider, OllamaConfig, OllamaProvider, OpenAiCompatConfig,
    OpenAiCompatProvider, ProviderRegistry, SharedEmbeddingProvider, UnavailableEmbedder,
};
use sluice_router::{Engine, RoutingConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::{AppConfig, ProviderKind, ProviderSpec};

/// Run the gateway server until shutdown
pub async fn serve(config_path: &Path) -> Result<()> {
    let app_config = AppConfig::load(config_path)?;
    let routing = RoutingConfig::load(&app_config.routing_config).with_context(|| {
        format!(
            "Failed to load routing config {}",
            app_config.routing_config
        )
    })?;

    let engine = Engine::new(routing);
    let registry = build_registry(&app_config.providers, &engine);
    let embedder = build_embedder(&app_config);

    let gateway = Arc::new(Gateway::new(
        engine,
        registry,
        embedder,
        GatewayConfig {
            cache_max_size: app_config.cache.max_size,
            cache_default_ttl: Duration::from_secs(app_config.cache.default_ttl_secs),
            semantic_threshold: app_config.semantic.threshold,
        },
    ));

    let shutdown = CancellationToken::new();
    let sweeper_handle = sweeper::spawn(
        gateway.exact_cache(),
        Duration::from_secs(app_config.cache.sweep_interval_secs),
        shutdown.child_token(),
    );

    let app = crate::api::api_router()
        .layer(Extension(gateway))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Sluice gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown.cancel();
    let _ = sweeper_handle.await;
    info!("Shutdown complete");
    Ok(())
}

/// Construct the provider registry from config blocks.
///
/// Misconfigured blocks are skipped with a warning rather than failing
/// startup; their models simply stay unregistered and fail over at request
/// time.
fn build_registry(specs: &[ProviderSpec], engine: &Engine) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for spec in specs {
        match spec.kind {
            ProviderKind::OpenaiCompat => {
                let Some(base_url) = spec.base_url.as_deref() else {
                    warn!(provider = %spec.label, "Skipping provider without base_url");
                    continue;
                };
                let Some(key_env) = spec.api_key_env.as_deref() else {
                    warn!(provider = %spec.label, "Skipping provider without api_key_env");
                    continue;
                };
                let Ok(api_key) = std::env::var(key_env) else {
                    warn!(provider = %spec.label, env = %key_env, "Skipping provider: API key env not set");
                    continue;
                };
                let provider = Arc::new(OpenAiCompatProvider::new(
                    OpenAiCompatConfig::new(&spec.label, api_key, base_url),
                    spec.models.clone(),
                ));
                for model in &spec.models {
                    registry.register(model, provider.clone());
                }
            }
            ProviderKind::Ollama => {
                let config = match spec.base_url.as_deref() {
                    Some(url) => OllamaConfig::new(url),
                    None => OllamaConfig::default(),
                };
                let provider = Arc::new(OllamaProvider::new(config, spec.models.clone()));
                for model in &spec.models {
                    registry.register(model, provider.clone());
                }
            }
        }
    }

    for candidate in engine.candidates() {
        if !registry.has_model(&candidate.name) {
            warn!(
                model = %candidate.name,
                "Routing config lists a model with no registered provider"
            );
        }
    }

    registry
}

/// Construct the embedding provider, or a disabled placeholder.
fn build_embedder(app_config: &AppConfig) -> SharedEmbeddingProvider {
    let semantic = &app_config.semantic;
    let Some(base_url) = semantic.embedding_base_url.as_deref() else {
        info!("No embedding endpoint configured; semantic cache disabled");
        return Arc::new(UnavailableEmbedder);
    };
    let Ok(api_key) = std::env::var(&semantic.api_key_env) else {
        warn!(env = %semantic.api_key_env, "Embedding API key not set; semantic cache disabled");
        return Arc::new(UnavailableEmbedder);
    };

    Arc::new(HttpEmbeddingProvider::new(HttpEmbeddingConfig::new(
        api_key,
        base_url,
        &semantic.embedding_model,
        semantic.embedding_dimensions,
    )))
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
