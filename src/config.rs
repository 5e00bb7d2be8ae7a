//! Configuration for the reflection server
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};

/// Development-only signing secret. Never used outside `--dev-mode`.
const DEV_JWT_SECRET: &str = "dev-mode-secret-not-for-production-use-123456";

/// Reflection server - journaling, friendships and reactions over REST
#[derive(Parser, Debug, Clone)]
#[command(name = "reflection-server")]
#[command(about = "REST backend for journaling reflections")]
pub struct Args {
    /// Address to listen on (overrides PORT when set)
    #[arg(long, env = "LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Port to listen on when LISTEN is not set
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database file (":memory:" for an ephemeral database)
    #[arg(long, env = "DATABASE_URL", default_value = "reflections.db")]
    pub database_path: String,

    /// JWT secret for token signing (required unless dev mode)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "86400")]
    pub jwt_expiry_seconds: u64,

    /// Allowed CORS origin
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable development mode (built-in JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,
}

impl Args {
    /// Effective bind address
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)))
    }

    /// Get effective JWT secret (falls back to the dev secret in dev mode)
    pub fn jwt_secret(&self) -> Option<String> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Some(secret.clone()),
            (None, true) => Some(DEV_JWT_SECRET.to_string()),
            (None, false) => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret() {
            None => return Err("JWT_SECRET is required in production mode".to_string()),
            Some(secret) if secret.len() < 32 => {
                return Err("JWT_SECRET must be at least 32 characters".to_string())
            }
            Some(_) => {}
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        if self.cors_origin.trim().is_empty() {
            return Err("CORS_ORIGIN must not be empty".to_string());
        }

        Ok(())
    }
}
