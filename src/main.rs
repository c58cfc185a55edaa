use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use notes_app::{
    backend::{Backend, BackendOutputs},
    build_router,
    config::{self, BackendMode},
    controller::NotesController,
};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!("Successfully loaded notes app config");

    // Backend façade, configured once
    let backend = match cfg.backend.mode {
        BackendMode::Memory => Backend::in_memory(cfg.memory_user()),
        BackendMode::Remote => {
            let outputs = BackendOutputs::load(&cfg.backend.outputs_path).unwrap_or_else(|e| {
                tracing::error!("Failed to load backend outputs: {e}");
                panic!("failed to load backend outputs: {e}");
            });
            Backend::configure(&outputs, &cfg.client_settings()).unwrap_or_else(|e| {
                tracing::error!("Failed to configure backend: {e}");
                panic!("failed to configure backend: {e}");
            })
        }
    };

    let controller = Arc::new(NotesController::new(backend, cfg.controller_settings()));

    // Initial list load; the page still serves if it fails
    if let Err(e) = controller.refresh().await {
        tracing::warn!("Initial refresh failed: {e}");
    }

    let router = build_router(controller);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes app starting, listening on {}", addr),
        Err(e) => tracing::warn!("Notes app starting, local address unknown: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
