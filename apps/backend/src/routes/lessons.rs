//! Lesson endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/lessons
pub async fn list(State(state): State<AppState>) -> Result<Json<LessonListResponse>> {
    let lessons = state.lessons.list().await?;
    Ok(Json(LessonListResponse { lessons }))
}

/// GET /api/lessons/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<Json<Lesson>> {
    let lesson = state
        .lessons
        .load(&lesson_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lesson {}", lesson_id)))?;
    Ok(Json(lesson))
}

/// PUT /api/lessons/{id}
pub async fn save(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    Json(lesson): Json<Lesson>,
) -> Result<Json<SaveLessonResponse>> {
    if lesson.id != lesson_id {
        return Err(ApiError::BadRequest(format!(
            "Lesson id {} does not match path {}",
            lesson.id, lesson_id
        )));
    }

    let saved = state.lessons.save(&lesson).await?;
    Ok(Json(saved))
}
