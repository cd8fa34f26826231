use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use popscale_service::api;
use popscale_service::config::{self, PlayerSourceKind, ServiceConfig};
use popscale_service::coordinator::UpdateCoordinator;
use popscale_service::document::ConfigStore;
use popscale_service::notify::BroadcastNotifier;
use popscale_service::players::{LivePlayerCount, PlayerFile, PlayerSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!("Starting popscale service v{}", env!("CARGO_PKG_VERSION"));

    let config: ServiceConfig = config::load_service_config()?;
    info!(
        document = %config.document.path.display(),
        source = ?config.players.source,
        threshold = config.scaling.threshold,
        divisor = config.scaling.divisor.get(),
        poll_interval_secs = config.scaling.poll_interval_secs,
        change_key = ?config.scaling.change_key,
        "Configuration loaded"
    );

    let source = match config.players.source {
        PlayerSourceKind::Live => PlayerSource::Live(LivePlayerCount::new()),
        PlayerSourceKind::File => PlayerSource::File(PlayerFile::new(
            &config.players.file_path,
            config.players.on_unreadable,
        )),
    };
    let live = source.live().cloned();

    let notifier = BroadcastNotifier::new(config.notify.capacity);
    start_notification_relay(&notifier);

    let coordinator = UpdateCoordinator::new(
        &config.scaling,
        config.notify.tag.clone(),
        ConfigStore::new(&config.document.path),
        source,
        notifier,
    )?;
    let status = coordinator.status_handle();
    let scaling_task = coordinator.start(config.scaling.poll_interval());

    if config.server.enabled {
        let addr = config.server.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {}", addr);

        axum::serve(listener, api::router(status, live))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        shutdown_signal().await;
    }

    info!("Shutting down");
    scaling_task.shutdown().await;

    Ok(())
}

/// Log every update announcement. Keeps one subscriber alive so the
/// broadcast channel accepts messages.
fn start_notification_relay(notifier: &BroadcastNotifier) {
    let mut rx = notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => info!(target: "popscale_service::broadcast", "{}", message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification relay fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("popscale_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
