use anyhow::Result;
use aws_config::{BehaviorVersion, Region};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use photo_stream::{
    config::AppConfig,
    routes,
    services::{rooms::RoomBroadcaster, storage_gateway::S3Gateway, stream_service::StreamService},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting photo-stream with config: {:?}", cfg);

    // --- Initialize storage gateway ---
    let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(cfg.region.clone()))
        .load()
        .await;
    let s3 = aws_sdk_s3::Client::new(&aws_cfg);
    let gateway = Arc::new(S3Gateway::new(s3, cfg.bucket.clone()));

    // --- Initialize core services ---
    let rooms = RoomBroadcaster::new();
    let streams = StreamService::new(gateway, rooms.clone(), cfg.base_prefix.clone());

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(AppState { streams, rooms });

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
