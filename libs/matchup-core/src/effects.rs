//! Side-effect hooks fired by a session: sound cues and celebration.

use crate::error::EffectError;
use serde::{Deserialize, Serialize};

/// Sound cue requested by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Selection or placement.
    Click,
    /// Perfect submit.
    Success,
    /// Imperfect submit.
    Error,
}

/// Renderer-side effects. Fire-and-forget: the session swallows failures.
pub trait GameEffects: Send {
    fn play(&mut self, cue: SoundCue) -> Result<(), EffectError>;

    fn celebrate(&mut self);
}

/// Effects sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEffects;

impl GameEffects for NoEffects {
    fn play(&mut self, _cue: SoundCue) -> Result<(), EffectError> {
        Ok(())
    }

    fn celebrate(&mut self) {}
}

/// An effect that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "cue", rename_all = "snake_case")]
pub enum EffectEvent {
    Sound(SoundCue),
    Celebrate,
}

/// Records fired effects so a remote client can replay them.
#[derive(Debug, Default, Clone)]
pub struct EffectLog {
    events: Vec<EffectEvent>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[EffectEvent] {
        &self.events
    }

    /// Take every event recorded since the last drain.
    pub fn drain(&mut self) -> Vec<EffectEvent> {
        std::mem::take(&mut self.events)
    }
}

impl GameEffects for EffectLog {
    fn play(&mut self, cue: SoundCue) -> Result<(), EffectError> {
        self.events.push(EffectEvent::Sound(cue));
        Ok(())
    }

    fn celebrate(&mut self) {
        self.events.push(EffectEvent::Celebrate);
    }
}
