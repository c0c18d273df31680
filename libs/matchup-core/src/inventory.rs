//! Pairing state: which answers sit in the pool and which fill a slot.
//!
//! `place_answer` and `return_to_pool` are the only mutation paths. Both
//! keep two invariants:
//! - every pair id appears exactly once across pool and slots;
//! - a slot holds at most one answer.

use crate::types::{Pair, PairId, PoolItem};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of a placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Placement {
    /// The answer moved into the target slot, possibly evicting an occupant.
    Placed { evicted: Option<PairId> },
    /// The target already holds this answer.
    Unchanged,
    /// Nothing moved.
    Rejected { reason: Rejection },
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

/// Why a placement was turned into a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    UnknownSlot { slot: PairId },
    UnknownAnswer { answer: PairId },
    /// The answer is not where the caller said it was (stale input).
    NotAtSource {
        answer: PairId,
        source: Option<PairId>,
    },
    /// The session no longer accepts moves.
    Frozen,
}

/// Where an answer token currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Pool,
    Slot(PairId),
}

/// Pool and slot contents for one game.
#[derive(Debug, Clone)]
pub struct Inventory {
    pairs: Vec<Pair>,
    index: HashMap<PairId, usize>,
    pool: Vec<PairId>,
    slots: Vec<Option<PairId>>,
}

impl Inventory {
    /// Build an inventory with every answer shuffled into the pool.
    ///
    /// Pairs repeating an earlier id are dropped; content loaders reject
    /// such input before it gets here.
    pub fn new<R: Rng + ?Sized>(pairs: Vec<Pair>, rng: &mut R) -> Self {
        let mut seen = HashSet::new();
        let pairs: Vec<Pair> = pairs
            .into_iter()
            .filter(|pair| {
                let fresh = seen.insert(pair.id.clone());
                if !fresh {
                    tracing::warn!(id = %pair.id, "dropping pair with duplicate id");
                }
                fresh
            })
            .collect();

        let index = pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| (pair.id.clone(), i))
            .collect();

        let mut inventory = Self {
            slots: vec![None; pairs.len()],
            pool: Vec::with_capacity(pairs.len()),
            pairs,
            index,
        };
        inventory.reshuffle(rng);
        inventory
    }

    /// Clear every slot and refill the pool in a fresh random order.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.pool = self.pairs.iter().map(|pair| pair.id.clone()).collect();
        self.pool.shuffle(rng);
    }

    /// Move `answer` into `target`.
    ///
    /// `source` names the slot the answer currently occupies; `None` means
    /// it comes from the pool. A different occupant of `target` is appended
    /// to the pool. Repeating a placement that already holds returns
    /// `Unchanged`, whatever source the caller names.
    pub fn place_answer(
        &mut self,
        answer: &PairId,
        target: &PairId,
        source: Option<&PairId>,
    ) -> Placement {
        let Some(&target_idx) = self.index.get(target) else {
            return self.reject(Rejection::UnknownSlot {
                slot: target.clone(),
            });
        };
        if !self.index.contains_key(answer) {
            return self.reject(Rejection::UnknownAnswer {
                answer: answer.clone(),
            });
        }
        if self.slots[target_idx].as_ref() == Some(answer) {
            return Placement::Unchanged;
        }

        match source {
            Some(source) => {
                let Some(&source_idx) = self.index.get(source) else {
                    return self.reject(Rejection::UnknownSlot {
                        slot: source.clone(),
                    });
                };
                if self.slots[source_idx].as_ref() != Some(answer) {
                    return self.reject(Rejection::NotAtSource {
                        answer: answer.clone(),
                        source: Some(source.clone()),
                    });
                }
                self.slots[source_idx] = None;
            }
            None => {
                let Some(pos) = self.pool.iter().position(|id| id == answer) else {
                    return self.reject(Rejection::NotAtSource {
                        answer: answer.clone(),
                        source: None,
                    });
                };
                self.pool.remove(pos);
            }
        }

        let evicted = self.slots[target_idx].replace(answer.clone());
        if let Some(prev) = &evicted {
            self.pool.push(prev.clone());
        }

        tracing::trace!(%answer, %target, evicted = ?evicted, "answer placed");
        Placement::Placed { evicted }
    }

    /// Send a slot's occupant back to the pool. Returns the moved answer.
    pub fn return_to_pool(&mut self, slot: &PairId) -> Option<PairId> {
        let Some(&idx) = self.index.get(slot) else {
            tracing::debug!(%slot, "return to pool ignored: unknown slot");
            return None;
        };
        let answer = self.slots[idx].take()?;
        self.pool.push(answer.clone());
        Some(answer)
    }

    fn reject(&self, reason: Rejection) -> Placement {
        tracing::debug!(?reason, "placement ignored");
        Placement::Rejected { reason }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn pair(&self, id: &PairId) -> Option<&Pair> {
        self.index.get(id).map(|&i| &self.pairs[i])
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Answer ids in the pool, in display order.
    pub fn pool(&self) -> &[PairId] {
        &self.pool
    }

    pub fn pool_items(&self) -> Vec<PoolItem> {
        self.pool
            .iter()
            .filter_map(|id| self.item(id))
            .collect()
    }

    /// Token for an answer id, wherever it currently lives.
    pub fn item(&self, answer: &PairId) -> Option<PoolItem> {
        self.pair(answer).map(|pair| PoolItem {
            id: pair.id.clone(),
            text: pair.answer.clone(),
        })
    }

    pub fn occupant(&self, slot: &PairId) -> Option<&PairId> {
        self.index.get(slot).and_then(|&i| self.slots[i].as_ref())
    }

    /// Slots in pair order with their current occupant.
    pub fn slots(&self) -> impl Iterator<Item = (&Pair, Option<&PairId>)> {
        self.pairs.iter().zip(self.slots.iter().map(Option::as_ref))
    }

    pub fn locate(&self, answer: &PairId) -> Option<Location> {
        if self.pool.contains(answer) {
            return Some(Location::Pool);
        }
        self.slots()
            .find(|(_, occupant)| *occupant == Some(answer))
            .map(|(pair, _)| Location::Slot(pair.id.clone()))
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled_count() == self.pairs.len()
    }

    /// Conservation and single-occupancy check.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        let all_unique = self
            .pool
            .iter()
            .chain(self.slots.iter().flatten())
            .all(|id| seen.insert(id) && self.index.contains_key(id));
        all_unique && seen.len() == self.pairs.len()
    }
}
