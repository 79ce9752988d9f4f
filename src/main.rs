//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use mediapp_api::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // O .env precisa ser lido antes do logger para valer o RUST_LOG dele.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração ou o banco falharem, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    let app = mediapp_api::app(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
