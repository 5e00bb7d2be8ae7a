//! Reflection server - REST backend for journaling and friends' reflections

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reflection_server::{
    auth::JwtValidator,
    config::Args,
    db::Database,
    server::{self, AppState},
    services::{spawn_logging_listener, Services},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("reflection_server={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Reflection Server");
    info!("======================================");
    info!("Listen: {}", args.listen_addr());
    info!("Database: {}", args.database_path);
    info!("CORS origin: {}", args.cors_origin);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("======================================");

    let db = Arc::new(Database::open(&args.database_path)?);
    if let Ok(stats) = db.stats() {
        info!(
            users = stats.user_count,
            reflections = stats.reflection_count,
            friendships = stats.friendship_count,
            reactions = stats.reaction_count,
            "Database ready"
        );
    }

    let secret = args
        .jwt_secret()
        .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required in production mode"))?;
    let jwt = JwtValidator::new(secret, args.jwt_expiry_seconds)?;

    let services = Services::new(db, jwt);
    spawn_logging_listener(Arc::clone(&services.events));

    let state = Arc::new(AppState::new(args, services));

    info!("Press Ctrl+C to stop.");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    tokio::select! {
        result = server::run(state) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                std::process::exit(1);
            }
        }
        _ = shutdown => {}
    }

    Ok(())
}
