use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{debug, instrument};

use crate::common::di::AppState;

/// Lista el historial de búsquedas, más reciente primero
#[instrument(skip(state))]
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    let items = state.history_service.get_all().await;
    debug!("Historial con {} entradas", items.len());
    (StatusCode::OK, Json(items))
}

/// Borra todo el historial
#[instrument(skip(state))]
pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    state.history_service.clear().await;
    StatusCode::NO_CONTENT
}

/// Borra una entrada del historial
#[instrument(skip(state))]
pub async fn remove_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.history_service.remove_one(&id).await;
    StatusCode::NO_CONTENT
}
