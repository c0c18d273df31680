//! Click-to-place and drag-to-place input, normalized into inventory moves.
//!
//! Selection and drag are mutually exclusive: starting a drag clears the
//! selection, and clicks are ignored while a drag is in flight.

use crate::drop_target::{DropSurface, Point};
use crate::effects::SoundCue;
use crate::inventory::{Location, Placement};
use crate::session::MatchSession;
use crate::types::PairId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token on the board the player can click or grab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    /// An answer token in the pool, by answer id.
    PoolItem(PairId),
    /// A question slot (and its occupant, if any), by slot id.
    Slot(PairId),
}

/// The single pending click selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum Selection {
    Pool { answer: PairId },
    Slot { slot: PairId, answer: PairId },
}

impl Selection {
    pub fn answer(&self) -> &PairId {
        match self {
            Self::Pool { answer } | Self::Slot { answer, .. } => answer,
        }
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickOutcome {
    Selected { selection: Selection },
    Deselected,
    Placed { placement: Placement },
    Ignored,
}

/// Where a dragged token was picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum DragOrigin {
    Pool,
    Slot { slot: PairId },
}

impl DragOrigin {
    fn source_slot(&self) -> Option<&PairId> {
        match self {
            Self::Pool => None,
            Self::Slot { slot } => Some(slot),
        }
    }
}

/// The token being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragItem {
    pub id: PairId,
    pub text: String,
    pub origin: DragOrigin,
}

/// Registration of the pointer listeners that follow a drag.
///
/// Released exactly once, when dropped. The session drops it whenever the
/// drag ends, however it ends.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Nothing to release (hosts that do not register listeners).
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

/// An active drag gesture.
#[derive(Debug)]
pub struct DragState {
    pub item: DragItem,
    pub start: Point,
    pub pointer: Point,
    _subscription: Subscription,
}

/// What a drag release did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "drop", rename_all = "snake_case")]
pub enum DropOutcome {
    /// No drag was active.
    NoDrag,
    /// Released away from every slot.
    Void,
    Dropped { slot: PairId, placement: Placement },
}

impl MatchSession {
    /// Apply one click of the click-to-place protocol.
    pub fn click(&mut self, target: &Target) -> ClickOutcome {
        if !self.is_playing() || self.drag.is_some() {
            return ClickOutcome::Ignored;
        }

        let outcome = match (self.selection.take(), target) {
            (None, Target::PoolItem(answer)) => self.select_pool_item(answer, None),
            (None, Target::Slot(slot)) => match self.inventory.occupant(slot) {
                Some(answer) => {
                    let selection = Selection::Slot {
                        slot: slot.clone(),
                        answer: answer.clone(),
                    };
                    self.select(selection)
                }
                None => ClickOutcome::Ignored,
            },
            (Some(Selection::Pool { answer }), Target::PoolItem(clicked)) if answer == *clicked => {
                ClickOutcome::Deselected
            }
            (Some(Selection::Slot { slot, .. }), Target::Slot(clicked)) if slot == *clicked => {
                ClickOutcome::Deselected
            }
            (Some(previous), Target::PoolItem(answer)) => self.select_pool_item(answer, Some(previous)),
            (Some(Selection::Pool { answer }), Target::Slot(slot)) => {
                self.click_place(&answer, slot, None)
            }
            (Some(Selection::Slot { slot: source, answer }), Target::Slot(slot)) => {
                self.click_place(&answer, slot, Some(&source))
            }
        };

        if !matches!(outcome, ClickOutcome::Ignored) {
            self.cue(SoundCue::Click);
        }
        outcome
    }

    fn select(&mut self, selection: Selection) -> ClickOutcome {
        self.selection = Some(selection.clone());
        ClickOutcome::Selected { selection }
    }

    /// Select a pool token, keeping `previous` if the token is not in the pool.
    fn select_pool_item(&mut self, answer: &PairId, previous: Option<Selection>) -> ClickOutcome {
        if self.inventory.locate(answer) == Some(Location::Pool) {
            return self.select(Selection::Pool {
                answer: answer.clone(),
            });
        }
        tracing::debug!(%answer, "click ignored: token not in pool");
        self.selection = previous;
        ClickOutcome::Ignored
    }

    fn click_place(&mut self, answer: &PairId, slot: &PairId, source: Option<&PairId>) -> ClickOutcome {
        let placement = self.place_answer(answer, slot, source);
        if matches!(placement, Placement::Rejected { .. }) {
            return ClickOutcome::Ignored;
        }
        ClickOutcome::Placed { placement }
    }

    /// Begin a drag on a pool token or a slot's occupant.
    ///
    /// `subscribe` registers the host's move/release listeners and is only
    /// invoked when the drag actually starts, so a second press while a
    /// drag is active cannot register them twice.
    pub fn begin_drag<F>(&mut self, target: &Target, point: Point, subscribe: F) -> bool
    where
        F: FnOnce() -> Subscription,
    {
        if !self.is_playing() || self.drag.is_some() {
            return false;
        }

        let (answer, origin) = match target {
            Target::PoolItem(answer) => {
                if self.inventory.locate(answer) != Some(Location::Pool) {
                    return false;
                }
                (answer.clone(), DragOrigin::Pool)
            }
            Target::Slot(slot) => match self.inventory.occupant(slot) {
                Some(answer) => (answer.clone(), DragOrigin::Slot { slot: slot.clone() }),
                None => return false,
            },
        };
        let Some(token) = self.inventory.item(&answer) else {
            return false;
        };

        self.selection = None;
        self.drag = Some(DragState {
            item: DragItem {
                id: token.id,
                text: token.text,
                origin,
            },
            start: point,
            pointer: point,
            _subscription: subscribe(),
        });
        true
    }

    /// Track the pointer. Returns whether default touch scrolling should be
    /// suppressed, i.e. whether a drag is active.
    pub fn drag_move(&mut self, point: Point) -> bool {
        match self.drag.as_mut() {
            Some(drag) => {
                drag.pointer = point;
                true
            }
            None => false,
        }
    }

    /// Release the drag at `point`, placing the token into the slot under it.
    ///
    /// The drag state and its listeners are discarded whatever the outcome.
    pub fn end_drag<S>(&mut self, point: Point, surface: &mut S) -> DropOutcome
    where
        S: DropSurface + ?Sized,
    {
        let Some(drag) = self.drag.take() else {
            return DropOutcome::NoDrag;
        };

        let Some(slot) = self.resolver.resolve(surface, point) else {
            tracing::debug!(answer = %drag.item.id, x = point.x, y = point.y, "void drop");
            return DropOutcome::Void;
        };

        let placement = self.place_answer(&drag.item.id, &slot, drag.item.origin.source_slot());
        if placement.is_placed() {
            self.cue(SoundCue::Click);
        }
        DropOutcome::Dropped { slot, placement }
    }

    /// Abandon the drag without moving anything.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }
}
