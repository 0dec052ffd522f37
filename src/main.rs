mod auth;
mod clients;
mod config;
mod docs;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod websocket;
mod ws;

use std::panic;
use std::sync::Arc;
use config::Config;
use clients::profile_client::ProfileClient;
use routes::create_app;
use services::session_resolver::JwtSessionResolver;
use state::AppState;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "gastown_relay=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting relay...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        match Config::fallback(std::env::var("ENVIRONMENT").ok()) {
            Ok(config) => {
                warn!("Using default configuration for environment {}", config.environment);
                config
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    });

    if config.is_production() && config.auth_jwt_secret.is_none() {
        warn!("Production mode without AUTH_JWT_SECRET - every operator connection will be refused");
    }

    // Optional profile lookups for display names and avatars
    let profiles = match (&config.profile_service_url, &config.auth_jwt_secret) {
        (Some(url), Some(secret)) => {
            match ProfileClient::new(url.clone(), secret.clone(), config.service_name.clone()) {
                Ok(client) => {
                    info!("Profile service at {}", url);
                    Some(Arc::new(client))
                }
                Err(e) => {
                    error!("Failed to create profile client: {}", e);
                    None
                }
            }
        }
        (Some(_), None) => {
            warn!("PROFILE_SERVICE_URL is set but AUTH_JWT_SECRET is not - profile lookups disabled");
            None
        }
        _ => None,
    };

    let resolver = Arc::new(JwtSessionResolver::new(config.auth_jwt_secret.clone(), profiles));
    let state = Arc::new(AppState::new(config.clone(), resolver));

    // Idle operators are moved to away in the background
    let sweep = ws::sweep::spawn_away_sweep(state.room.clone(), config.sweep_interval(), config.away_timeout());

    let app = create_app(state);

    // Start the HTTP/WebSocket server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 Relay available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    sweep.abort();
    info!("Relay stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler there is nothing to wait for; keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
