//! Preference endpoints

use axum::{extract::State, Json};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/preferences
pub async fn get(State(state): State<AppState>) -> Json<Preferences> {
    Json(Preferences::load(state.preferences.as_ref()))
}

/// PUT /api/preferences
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<Preferences>> {
    if let Some(muted) = request.muted {
        persist_muted(&state, muted).await?;
    }
    Ok(Json(Preferences::load(state.preferences.as_ref())))
}

/// Write the mute flag off the async runtime; stores may touch the disk.
pub async fn persist_muted(state: &AppState, muted: bool) -> Result<()> {
    let store = state.preferences.clone();
    tokio::task::spawn_blocking(move || store.save_muted(muted))
        .await
        .map_err(|e| ApiError::Internal(format!("Preference write task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}
