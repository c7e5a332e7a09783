mod backend;
mod cache;
mod catalog;
mod config;
mod errors;
mod protocol;
mod server;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::ServiceExt;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use backend::{Backend, GitHubModels, GitHubModelsConfig};
use cache::MemoryCache;
use catalog::{ModelSource, StaticCatalog, UpstreamCatalog};
use config::{parse_list, Config};
use server::handlers::AppState;
use server::RouterOptions;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Configure logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    let backend: Arc<dyn Backend> = match GitHubModels::new(GitHubModelsConfig {
        base_url: Some(config.upstream_base_url.clone()),
        catalog_path: Some(config.catalog_path.clone()),
        chat_path: Some(config.chat_path.clone()),
        api_version: config.api_version.clone(),
    }) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            error!(error = %e, "UPSTREAM_API_VERSION is not a valid header value");
            std::process::exit(1);
        }
    };

    info!(
        backend = backend.name(),
        base_url = backend.base_url(),
        "using backend"
    );

    // HTTP client for proxying
    let http_client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let upstream_timeout = config.upstream_timeout_secs.map(Duration::from_secs);

    let static_models = config
        .static_models
        .as_deref()
        .map(parse_list)
        .unwrap_or_default();
    let models: Arc<dyn ModelSource> = if static_models.is_empty() {
        Arc::new(UpstreamCatalog::new(
            backend.clone(),
            http_client.clone(),
            upstream_timeout,
        ))
    } else {
        Arc::new(StaticCatalog::new(&static_models))
    };
    info!(
        source = models.name(),
        count = static_models.len(),
        "model catalog source"
    );

    let cache = Arc::new(MemoryCache::new(config.cache_capacity));

    // Cleanup task, dropped automatically when the Tokio runtime shuts down
    let cleanup_cache = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let removed = cleanup_cache.cleanup().await;
            if removed > 0 {
                info!(removed, "evicted expired catalog responses");
            }
        }
    });

    let state = Arc::new(AppState {
        backend,
        models,
        cache,
        http_client,
        upstream_timeout,
    });

    let options = RouterOptions {
        cors: config.cors,
        root_alias_chat: config.root_alias_chat,
        health_fallback: config.health_fallback,
    };
    info!(
        cors = options.cors,
        root_alias_chat = options.root_alias_chat,
        health_fallback = ?options.health_fallback,
        "routing options"
    );

    let app = server::build_app(state, options);

    let addr = normalize_addr(&config.addr);
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(addr = addr, error = %e, "failed to bind");
        std::process::exit(1);
    });

    info!(addr = addr, "server starting");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "server error");
            std::process::exit(1);
        });

    info!("server stopped");
}

/// Convert Go-style ":8787" to "0.0.0.0:8787".
fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
