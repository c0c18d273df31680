//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from matchup-core
pub use matchup_core::{
    ClickOutcome, DragItem, DropOutcome, EffectEvent, GameKind, Lesson, PairId, Phase, Placement,
    Point, PoolItem, Preferences, Rect, Selection, Target,
};

// === Lessons ===

/// Lesson listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub game: GameKind,
    pub pair_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonListResponse {
    pub lessons: Vec<LessonSummary>,
}

/// Result of saving a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLessonResponse {
    pub id: String,
    /// SHA-256 of the stored document
    pub revision: String,
    pub updated_at: DateTime<Utc>,
}

// === Sessions ===

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub lesson_id: String,
    /// Client viewport width, used once to pick the drop tolerance
    pub viewport_width: Option<f64>,
    pub seed: Option<u64>,
}

/// Response to starting a session; lessons without pairs have no board.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartSessionResponse {
    Empty { lesson_id: String },
    Active(SessionView),
}

/// One question slot as rendered
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub id: PairId,
    pub question: String,
    pub occupant: Option<PoolItem>,
    /// Set once the board is submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreView {
    pub correct: usize,
    pub total: usize,
    pub perfect: bool,
}

/// Full render state of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub lesson_id: String,
    pub phase: Phase,
    pub slots: Vec<SlotView>,
    pub pool: Vec<PoolItem>,
    pub selection: Option<Selection>,
    pub drag: Option<DragItem>,
    pub score: Option<ScoreView>,
    pub muted: bool,
    /// Effects fired since the previous response
    pub effects: Vec<EffectEvent>,
    pub started_at: DateTime<Utc>,
}

/// Outcome of an action plus the resulting state
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub outcome: T,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub target: Target,
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub answer_id: PairId,
    pub slot_id: PairId,
    pub source_slot_id: Option<PairId>,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub slot_id: PairId,
}

#[derive(Debug, Deserialize)]
pub struct DragStartRequest {
    pub target: Target,
    pub point: Point,
}

#[derive(Debug, Deserialize)]
pub struct DragMoveRequest {
    pub point: Point,
}

/// Drop target as measured by the client at release time
#[derive(Debug, Clone, Deserialize)]
pub struct MeasuredTarget {
    pub slot_id: PairId,
    pub rect: Rect,
}

#[derive(Debug, Deserialize)]
pub struct DragEndRequest {
    pub point: Point,
    pub targets: Vec<MeasuredTarget>,
    /// Drag ghost bounds, if rendered
    pub overlay: Option<Rect>,
}

#[derive(Debug, Serialize)]
pub struct DragMoveResponse {
    pub prevent_default: bool,
}

#[derive(Debug, Serialize)]
pub struct DragStartResponse {
    pub started: bool,
}

// === Preferences ===

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub muted: Option<bool>,
}
