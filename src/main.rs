use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shooter::{
    clock::{Clock, SystemClock},
    config::ServerConfig,
    room::{self, cleanup_task::start_cleanup_task},
    websockets::{websocket_handler, ConnectionManager, InMemoryConnectionManager},
    AppState, InMemoryRoomRepository, RoomRepository,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shooter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(port = config.port, origins = ?config.allowed_origins, "Starting arena room server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let room_repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::with_config(
        config.limits,
        Arc::clone(&clock),
    ));
    let connection_manager: Arc<dyn ConnectionManager> = Arc::new(InMemoryConnectionManager::new());

    tokio::spawn(start_cleanup_task(
        Arc::clone(&room_repository),
        Arc::clone(&connection_manager),
        clock,
        config.cleanup.clone(),
    ));

    let app_state = AppState::new(room_repository, connection_manager, config.limits);

    let app = Router::new()
        .route("/hi", get(|| async { "hi" }))
        .route("/rooms", get(room::list_rooms))
        .route("/rooms/:room_id", get(room::get_room))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_credentials(true)
}
