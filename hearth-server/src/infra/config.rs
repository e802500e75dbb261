use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

/// Runtime configuration, sourced from the environment (`.env` files are
/// loaded by the binary before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// PostgreSQL connection string. Required to start the server; tests
    /// run against the in-memory store instead.
    pub database_url: Option<String>,
    /// Base URL under which stored uploads are publicly reachable.
    pub public_base_url: String,
    /// Directory for disk-stored uploads, served under `/uploads`.
    pub upload_dir: String,
    /// Secret for signing identity claims returned by login.
    pub auth_token_secret: String,
    /// When set, uploads go to this hosted file-storage endpoint instead
    /// of the local disk.
    pub storage_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let server_port: u16 = load_or("SERVER_PORT", "4000");
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{server_port}"));
        let auth_token_secret = env::var("AUTH_TOKEN_SECRET").unwrap_or_else(|_| {
            warn!("AUTH_TOKEN_SECRET not set, using an insecure development secret");
            "hearth-dev-secret".to_string()
        });

        Self {
            server_port,
            database_url: env::var("DATABASE_URL").ok(),
            public_base_url,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            auth_token_secret,
            storage_endpoint: env::var("STORAGE_ENDPOINT").ok(),
        }
    }
}

fn load_or<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("invalid {key} value {raw:?} ({e}), using default: {default}");
            default
                .parse()
                .unwrap_or_else(|_| unreachable!("default for {key} must parse"))
        }
    }
}
