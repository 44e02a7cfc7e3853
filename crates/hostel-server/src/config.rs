use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Placeholder secret accepted only for local development.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub admin_users: Option<String>,
    pub jwt_secret: String,
    pub require_admin_auth: bool,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let port: u16 = match env::var("HOSTEL_PORT").or_else(|_| env::var("PORT")) {
            Ok(raw) => raw.parse().with_context(|| format!("Invalid port '{raw}'"))?,
            Err(_) => {
                info!("HOSTEL_PORT not set, using default: 5000");
                5000
            }
        };

        let jwt_secret = env::var("HOSTEL_JWT_SECRET").unwrap_or_else(|_| {
            warn!("HOSTEL_JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            host: try_load("HOSTEL_HOST", "0.0.0.0")?,
            port,
            db_path: try_load::<String>("HOSTEL_DB_PATH", "hostel.db")?.into(),
            admin_users: env::var("ADMIN_USERS").ok(),
            jwt_secret,
            require_admin_auth: try_load("HOSTEL_REQUIRE_ADMIN_AUTH", "true")?,
            static_dir: env::var("HOSTEL_STATIC_DIR").ok().map(PathBuf::from),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}
