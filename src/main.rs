use std::sync::Arc;

use anyhow::Context;
use clg_gateway::{
    app, chat::{ChatTokenIssuer, TwilioConversations}, config::Config, db, profiles::SqliteProfileStore, AppState
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_pool = db::connect(&config.database_url)
        .await
        .context("connecting to the profile database")?;
    tracing::info!("connected to profile database");

    let app_state = AppState {
        profiles: Arc::new(SqliteProfileStore::new(db_pool)),
        tokens: Arc::new(ChatTokenIssuer::new(&config.twilio)),
        conversations: Arc::new(TwilioConversations::new(&config.twilio)),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
