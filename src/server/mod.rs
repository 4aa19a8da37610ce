//! # HTTP Server for Label Printing
//!
//! JSON API for previewing, printing and batch printing labels, plus the
//! static label editor client.
//!
//! ## Usage
//!
//! ```bash
//! tapelabel serve --listen 0.0.0.0:5000 --client-dir dist-client
//! ```
//!
//! ## Routes
//!
//! | Method | Path                       | Response |
//! |--------|----------------------------|----------|
//! | POST   | `/api/print`               | `{status, message}` |
//! | POST   | `/api/preview`             | PNG |
//! | POST   | `/api/batch-print`         | event stream |
//! | POST   | `/api/batch-print/cancel`  | `{status: "ok"}` |
//! | GET    | `/api/printers`            | `{printers: [...]}` |
//! | POST   | `/api/upload-image`        | `{filename}` |
//! | GET    | `/api/uploads/:filename`   | PNG |
//!
//! Every other path is served from the client directory, falling back to
//! `index.html`.

mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::{AppState, ServerConfig};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::error::LabelError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let client_dir = &state.config.client_dir;
    let client = ServeDir::new(client_dir).fallback(ServeFile::new(client_dir.join("index.html")));

    Router::new()
        .route("/api/print", post(handlers::label::print))
        .route("/api/preview", post(handlers::label::preview))
        .route("/api/batch-print", post(handlers::batch::start))
        .route("/api/batch-print/cancel", post(handlers::batch::cancel))
        .route("/api/printers", get(handlers::printers::list))
        .route(
            "/api/upload-image",
            post(handlers::uploads::upload).layer(DefaultBodyLimit::max(handlers::uploads::MAX_UPLOAD_BYTES)),
        )
        .route("/api/uploads/:filename", get(handlers::uploads::get))
        .fallback_service(client)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server. Runs until Ctrl-C.
///
/// ## Example
///
/// ```no_run
/// use tapelabel::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), tapelabel::error::LabelError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:5000".to_string(),
///     upload_dir: "/var/lib/tapelabel/uploads".into(),
///     client_dir: "dist-client".into(),
///     virtual_printers: Vec::new(),
///     print_command: None,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), LabelError> {
    let app_state = Arc::new(AppState::new(config.clone())?);
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| LabelError::Config(format!("Failed to bind to {}: {}", config.listen_addr, e)))?;

    tracing::info!(
        listen = %config.listen_addr,
        uploads = %config.upload_dir.display(),
        client = %config.client_dir.display(),
        "tapelabel server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
