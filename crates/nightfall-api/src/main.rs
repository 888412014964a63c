//! Nightfall API server entry point.

use std::error::Error;
use std::sync::Arc;

use nightfall_api::config::ServerConfig;
use nightfall_api::roster::JsonFileRoster;
use nightfall_api::state::AppState;
use nightfall_api::{build_app, ticker};
use nightfall_core::clock::SystemClock;
use nightfall_core::roster::RosterProvider;
use nightfall_session::domain::aggregates::GameSession;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Nightfall moderator API server");

    let config = ServerConfig::from_env()?;
    let roster = JsonFileRoster::load(&config.roster_file)?;

    let players = roster.players();
    let seated = players.len();
    let session =
        GameSession::new(Uuid::new_v4(), players).with_night_seconds(config.night_seconds);
    tracing::info!(
        session_id = %session.id,
        players = seated,
        night_seconds = config.night_seconds,
        "game session created"
    );

    let app_state = AppState::new(session, Arc::new(SystemClock), Arc::new(roster));

    let _ticker = ticker::spawn(app_state.clone());

    let app = build_app(app_state);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
