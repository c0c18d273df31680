//! Core types for the matching game.

use crate::drop_target::DropTolerance;
use crate::scoring::ScoringRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of an authored pair.
///
/// Authors may use numbers or strings; the two forms never compare equal,
/// so `1` and `"1"` are distinct pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PairId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PairId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PairId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PairId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Author-defined question/answer unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: PairId,
    pub question: String,
    pub answer: String,
}

impl Pair {
    pub fn new(id: impl Into<PairId>, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// An answer token as shown in the pool or inside a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolItem {
    pub id: PairId,
    pub text: String,
}

/// Coarse game state gating which mutations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Playing,
    Submitted,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Submitted => "submitted",
            Self::Finished => "finished",
        }
    }
}

/// Per-session game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Delay between a perfect submit and the `finished` phase.
    pub finish_delay_ms: u64,
    pub drop_tolerance: DropTolerance,
    pub scoring: ScoringRule,
    /// Fixed shuffle seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            finish_delay_ms: 2000,
            drop_tolerance: DropTolerance::default(),
            scoring: ScoringRule::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }
}
