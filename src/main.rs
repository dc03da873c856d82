use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::anime::client::{AnimeClient, MetadataProvider};
use crate::api::state::ApiState;
use crate::global::config::{AppConfig, LogRotation};
use crate::global::http;

mod anime;
mod api;
mod global;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = match AppConfig::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!("Please ensure config.toml exists in the project root directory");
            return Err(e.into());
        }
    };

    // Keep the non-blocking file writer alive for the whole run
    let _log_guard = init_logging(&config);

    info!("Starting anime-gateway...");
    debug!(?config, "Loaded configuration");

    config.validate()?;

    let http_client = http::build_client(&config.http);

    // The upstream base URL is injected here, once; nothing else reads it.
    let provider: Arc<dyn MetadataProvider> = Arc::new(AnimeClient::new(
        http_client.clone(),
        config.upstream.base_url.clone(),
    ));

    let state = ApiState::new(config.clone(), http_client, provider);

    api::server::start_api_server(state, &config.server.host, config.server.port).await?;

    info!("Shutdown complete");
    Ok(())
}

fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logging = &config.app.logging;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("anime_gateway={},info", config.app.log_level).into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.log_to_file {
        let appender = match logging.log_rotation {
            LogRotation::Daily => {
                tracing_appender::rolling::daily(&logging.log_directory, &logging.log_file_prefix)
            }
            LogRotation::Hourly => {
                tracing_appender::rolling::hourly(&logging.log_directory, &logging.log_file_prefix)
            }
            LogRotation::Never => {
                tracing_appender::rolling::never(&logging.log_directory, &logging.log_file_prefix)
            }
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);

        if logging.log_to_console {
            registry
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer())
                .init();
        } else {
            registry.with(file_layer).init();
        }

        Some(guard)
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        None
    }
}
