//! Radar item API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::radar_item::{NewRadarItem, RadarItem},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub count: usize,
    pub items: Vec<RadarItem>,
}

/// Lists items waiting for the next radar.
pub async fn list_items(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = state.radar_items.list_open().await?;
    Ok(Json(ListItemsResponse {
        count: items.len(),
        items,
    }))
}

/// Adds a link to the next radar.
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewRadarItem>,
) -> AppResult<impl IntoResponse> {
    let url = payload.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::BadRequest("url must be an http(s) link".to_string()));
    }

    let item = state.radar_items.create(&payload).await?;
    info!("Created radar item {} via API", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .radar_items
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("radar item {id}")))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if state.radar_items.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("radar item {id}")))
    }
}

/// Fallback for unknown paths under `/api`.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such API endpoint".to_string())
}
