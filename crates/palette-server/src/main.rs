mod config;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use palette_api::state::{AppState, AppStateInner};
use palette_core::ColorExtractor;
use palette_db::Database;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palette_server=debug,palette_api=debug,palette_core=debug,tower_http=debug".into()),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    let db = Database::open(&config.db_path)?;
    for id in &config.admin_ids {
        db.ensure_user(id, None, None)?;
        db.set_admin(id, true)?;
        info!("Granted admin to {}", id);
    }

    let extractor = ColorExtractor::new(&config.extractor)?;
    let http = reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .build()?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        extractor,
        http,
        max_image_bytes: config.max_image_bytes,
    });

    // base64 inflates inline images by a third
    let body_limit = config.max_image_bytes / 3 * 4 + 64 * 1024;

    let app = palette_api::router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Palette server listening on {}", config.addr);
    info!(
        "Extraction: stride {}, alpha >= {}, {} excluded colors",
        config.extractor.sample_stride,
        config.extractor.alpha_threshold,
        config.extractor.excluded_colors.len()
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
