use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{models::Room, types::RoomSummary};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing all rooms
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    let max_players = state.limits.max_players;
    let mut rooms: Vec<RoomSummary> = state
        .room_repository
        .list_rooms()
        .iter()
        .map(|room| RoomSummary::from_room(room, max_players))
        .collect();
    rooms.sort_by(|a, b| a.id.cmp(&b.id));

    info!(room_count = rooms.len(), "Rooms listed");

    Json(rooms)
}

/// Full snapshot of one room
///
/// GET /rooms/:room_id
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, AppError> {
    state
        .room_repository
        .find_room(&room_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Room {room_id} not found")))
}
