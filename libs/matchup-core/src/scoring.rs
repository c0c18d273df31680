//! Scoring of a submitted board.

use crate::inventory::Inventory;
use crate::types::PairId;
use serde::{Deserialize, Serialize};

/// How a slot's occupant is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Correct iff the occupant came from the slot's own pair.
    #[default]
    PairId,
    /// Correct iff the occupant's text equals the slot's expected answer.
    /// Unjumble boards use this so repeated words are interchangeable.
    AnswerText,
}

/// Verdict for a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotVerdict {
    pub slot: PairId,
    pub answer: Option<PairId>,
    pub correct: bool,
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub verdicts: Vec<SlotVerdict>,
    pub correct: usize,
    pub total: usize,
}

impl SessionResult {
    /// Judge every slot in pair order. Empty slots count as incorrect.
    pub fn evaluate(inventory: &Inventory, rule: ScoringRule) -> Self {
        let verdicts: Vec<SlotVerdict> = inventory
            .slots()
            .map(|(pair, occupant)| {
                let correct = match (rule, occupant) {
                    (_, None) => false,
                    (ScoringRule::PairId, Some(answer)) => *answer == pair.id,
                    (ScoringRule::AnswerText, Some(answer)) => inventory
                        .pair(answer)
                        .is_some_and(|placed| placed.answer == pair.answer),
                };
                SlotVerdict {
                    slot: pair.id.clone(),
                    answer: occupant.cloned(),
                    correct,
                }
            })
            .collect();

        let correct = verdicts.iter().filter(|v| v.correct).count();
        Self {
            total: verdicts.len(),
            correct,
            verdicts,
        }
    }

    /// Every pair matched. An empty board is never perfect.
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }

    pub fn verdict(&self, slot: &PairId) -> Option<&SlotVerdict> {
        self.verdicts.iter().find(|v| &v.slot == slot)
    }
}
