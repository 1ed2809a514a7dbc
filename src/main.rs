use anyhow::Context;
use pairchat::{app, config::Config, db::Store, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pairchat=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = Store::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;

    let app = app(AppState::new(store), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
