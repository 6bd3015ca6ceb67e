//! Galerie server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use galerie_api::{auth_middleware, router as api_router, AppState};
use galerie_common::{Config, IdGenerator};
use galerie_core::{
    AlbumService, CommentService, FfmpegCodec, GalleryService, MediaService, MetadataStore,
    ShareService, TagService, UserService,
};
use galerie_db::repositories::{SharedAccessRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload batches can carry several videos at once.
const MAX_BODY_BYTES: usize = 512 * 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galerie=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting galerie server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = galerie_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    galerie_db::migrate(&db).await?;
    info!("Migrations completed");

    // Media directories
    for dir in [
        &config.media.upload_dir,
        &config.media.data_dir,
        &config.media.thumbnail_dir,
    ] {
        tokio::fs::create_dir_all(dir).await?;
    }

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let share_repo = SharedAccessRepository::new(Arc::clone(&db));

    // Initialize services
    let id_gen = IdGenerator::new();
    let store = MetadataStore::new(config.media.data_dir.clone());
    let codec = Arc::new(FfmpegCodec::new(&config.media));

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), id_gen.clone()),
        gallery_service: GalleryService::new(store.clone(), config.media.clone()),
        media_service: MediaService::new(
            share_repo.clone(),
            store.clone(),
            codec,
            id_gen.clone(),
            config.media.clone(),
        ),
        tag_service: TagService::new(store.clone(), config.media.clone()),
        album_service: AlbumService::new(store.clone()),
        comment_service: CommentService::new(share_repo.clone(), store, config.media.clone()),
        share_service: ShareService::new(user_repo, share_repo, id_gen),
    };

    // Build the application router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
