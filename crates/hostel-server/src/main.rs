mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use hostel_api::{AdminRegistry, AppState, AppStateInner};

use crate::config::{Config, DEV_JWT_SECRET};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel=debug,hostel_api=debug,hostel_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::load()?;

    let db = hostel_db::Database::open(&config.db_path)?;
    let admins = AdminRegistry::from_config(config.admin_users.as_deref())?;

    if !config.require_admin_auth {
        warn!("Admin auth disabled: complaint updates and deletes are open to anyone");
    } else if config.jwt_secret == DEV_JWT_SECRET {
        warn!("Admin tokens are signed with the development secret");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        admins,
        jwt_secret: config.jwt_secret,
        require_admin_auth: config.require_admin_auth,
    });

    let mut app = hostel_api::router(state);

    // Portal pages, if deployed alongside the API
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Hostel complaint server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
