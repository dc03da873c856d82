use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::{routes, state::ApiState};

/// Start the API server and run it until a shutdown signal arrives.
pub async fn start_api_server(state: ApiState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr = format!("{}:{}", host, port);
    let socket_addr: SocketAddr = addr.parse()?;

    info!(address = %addr, "Starting API server");

    let listener = TcpListener::bind(socket_addr).await?;

    info!(address = %addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    warn!("Shutdown signal received, stopping API server");
}

/// Create the Axum application with middleware
fn create_app(state: ApiState) -> Router {
    let router = routes::create_router(state);

    router
        // The browser front-end is served from a different origin in dev
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
