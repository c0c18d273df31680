//! Matching-game engine shared by the lesson player and the backend.
//!
//! Provides:
//! - Inventory model (pool and slots) with the placement algorithm
//! - Click-to-place and drag-to-place interaction on a game session
//! - Drop-target resolution with viewport-dependent tolerance
//! - Scoring and the `playing -> submitted -> finished` phase machine
//! - Lesson content loaders (JSON contract, plain-text pairs, unjumble)

pub mod content;
pub mod drop_target;
pub mod effects;
pub mod error;
pub mod interaction;
pub mod inventory;
pub mod preferences;
pub mod scoring;
pub mod session;
pub mod types;

pub use content::{parse_lesson_json, parse_pairs_markdown, unjumble_pairs, GameKind, Lesson};
pub use drop_target::{DropResolver, DropSurface, DropTolerance, LayoutTree, Point, Rect};
pub use effects::{EffectEvent, EffectLog, GameEffects, NoEffects, SoundCue};
pub use error::{ContentError, EffectError, PreferenceError, Result};
pub use interaction::{ClickOutcome, DragItem, DragOrigin, DropOutcome, Selection, Subscription, Target};
pub use inventory::{Inventory, Location, Placement, Rejection};
pub use preferences::{MemoryPreferences, PreferenceStore, Preferences};
pub use scoring::{ScoringRule, SessionResult, SlotVerdict};
pub use session::{GameBoard, MatchSession, PendingFinish, SessionBuilder};
pub use types::{GameConfig, Pair, PairId, Phase, PoolItem};
