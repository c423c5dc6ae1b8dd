use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RoomLimits;
use crate::room::repository::RoomRepository;
use crate::websockets::{ConnectionManager, WebsocketReceiveHandler};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_repository: Arc<dyn RoomRepository>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub receive_handler: Arc<WebsocketReceiveHandler>,
    pub limits: RoomLimits,
}

impl AppState {
    /// Wires the event gateway on top of the given registry and connection manager
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
        limits: RoomLimits,
    ) -> Self {
        let receive_handler = Arc::new(WebsocketReceiveHandler::new(
            Arc::clone(&room_repository),
            Arc::clone(&connection_manager),
        ));

        Self {
            room_repository,
            connection_manager,
            receive_handler,
            limits,
        }
    }
}

/// Errors surfaced by the HTTP endpoints
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
