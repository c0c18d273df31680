//! Game session endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use matchup_core::{LayoutTree, MatchSession, Subscription};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::preferences::persist_muted;
use crate::services::sessions::{SessionEntry, SharedEffects};
use crate::AppState;

fn respond<T>(state: &AppState, id: Uuid, f: impl FnOnce(&mut SessionEntry) -> T) -> Result<Json<ActionResponse<T>>> {
    let response = state.sessions.with_session(id, |entry| {
        let outcome = f(entry);
        ActionResponse {
            outcome,
            session: entry.view(id),
        }
    })?;
    Ok(Json(response))
}

/// POST /api/sessions
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>> {
    let lesson = state
        .lessons
        .load(&request.lesson_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lesson {}", request.lesson_id)))?;

    let effects = SharedEffects::default();
    let board = MatchSession::builder(lesson.board_pairs())
        .config(state.config.game_config(lesson.scoring(), request.seed))
        .viewport_width(request.viewport_width.unwrap_or(f64::INFINITY))
        .effects(Box::new(effects.clone()))
        .preferences(state.preferences.as_ref())
        .build();

    let Some(session) = board.into_session() else {
        return Ok(Json(StartSessionResponse::Empty {
            lesson_id: lesson.id,
        }));
    };

    let id = state
        .sessions
        .insert(SessionEntry::new(session, lesson.id, effects))?;
    let view = state.sessions.with_session(id, |entry| entry.view(id))?;
    Ok(Json(StartSessionResponse::Active(view)))
}

/// GET /api/sessions/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let view = state.sessions.with_session(id, |entry| entry.view(id))?;
    Ok(Json(view))
}

/// DELETE /api/sessions/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    if !state.sessions.remove(id)? {
        return Err(ApiError::NotFound(format!("Session {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /api/sessions/{id}/click
pub async fn click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<ActionResponse<ClickOutcome>>> {
    respond(&state, id, |entry| entry.session.click(&request.target))
}

/// POST /api/sessions/{id}/place
pub async fn place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PlaceRequest>,
) -> Result<Json<ActionResponse<Placement>>> {
    respond(&state, id, |entry| {
        entry.session.place_answer(
            &request.answer_id,
            &request.slot_id,
            request.source_slot_id.as_ref(),
        )
    })
}

/// POST /api/sessions/{id}/return
pub async fn return_to_pool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReturnRequest>,
) -> Result<Json<ActionResponse<Option<PairId>>>> {
    respond(&state, id, |entry| entry.session.return_to_pool(&request.slot_id))
}

/// POST /api/sessions/{id}/drag/start
///
/// The browser owns the pointer listeners, so the server-side drag holds a
/// detached subscription.
pub async fn drag_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragStartRequest>,
) -> Result<Json<ActionResponse<DragStartResponse>>> {
    respond(&state, id, |entry| {
        let started = entry
            .session
            .begin_drag(&request.target, request.point, Subscription::detached);
        DragStartResponse { started }
    })
}

/// POST /api/sessions/{id}/drag/move
pub async fn drag_move(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragMoveRequest>,
) -> Result<Json<DragMoveResponse>> {
    let prevent_default = state
        .sessions
        .with_session(id, |entry| entry.session.drag_move(request.point))?;
    Ok(Json(DragMoveResponse { prevent_default }))
}

/// POST /api/sessions/{id}/drag/cancel
///
/// For `pointercancel` / `touchcancel`: the token stays where it was.
pub async fn drag_cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse<bool>>> {
    respond(&state, id, |entry| entry.session.cancel_drag())
}

/// POST /api/sessions/{id}/drag/end
pub async fn drag_end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragEndRequest>,
) -> Result<Json<ActionResponse<DropOutcome>>> {
    let mut layout =
        LayoutTree::from_targets(request.targets.into_iter().map(|t| (t.slot_id, t.rect)));
    if let Some(overlay) = request.overlay {
        layout.add_overlay(overlay);
    }
    respond(&state, id, |entry| entry.session.end_drag(request.point, &mut layout))
}

/// POST /api/sessions/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse<Option<ScoreView>>>> {
    let response = respond(&state, id, |entry| {
        entry.session.submit().map(|result| ScoreView {
            correct: result.correct,
            total: result.total,
            perfect: result.is_perfect(),
        })
    })?;
    state.sessions.schedule_finish(id)?;
    Ok(response)
}

/// POST /api/sessions/{id}/reset
pub async fn reset(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let view = state.sessions.with_session(id, |entry| {
        entry.cancel_finish();
        entry.session.reset_game();
        entry.view(id)
    })?;
    Ok(Json(view))
}

/// POST /api/sessions/{id}/mute
///
/// The flag flips under the registry lock; the preference write happens
/// after it is released.
pub async fn toggle_mute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse<bool>>> {
    let response = respond(&state, id, |entry| entry.session.flip_mute())?;
    let muted = response.outcome;
    if let Err(e) = persist_muted(&state, muted).await {
        tracing::warn!(session = %id, error = %e, "failed to persist mute preference");
    }
    Ok(response)
}
