use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = rss_api::Config::from_env()?;

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
        database = %cfg.database.display(),
        users = cfg.users.len(),
        folders = cfg.folders.len(),
        feeds = cfg.feeds.len(),
        loglevel = %cfg.loglevel
    );
    if cfg.users.is_empty() {
        warn!("no users configured; every request will be rejected");
    }

    // Schema and seed failures abort startup before the listener binds.
    let state = rss_api::router::build_state(&cfg).await?;
    let app = rss_api::router::news_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => warn!("failed to listen for ctrl-c, shutting down: {e}"),
            }
        })
        .await?;
    Ok(())
}
