//! A single play-through of a matching board.
//!
//! The session owns the inventory, the phase machine
//! (`playing -> submitted -> finished`, back to `playing` only via reset)
//! and the transient selection/drag state driven by [`crate::interaction`].

use crate::drop_target::DropResolver;
use crate::effects::{GameEffects, NoEffects, SoundCue};
use crate::interaction::{DragState, Selection};
use crate::inventory::{Inventory, Placement, Rejection};
use crate::preferences::PreferenceStore;
use crate::scoring::SessionResult;
use crate::types::{GameConfig, Pair, PairId, Phase};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Outcome of starting a session.
pub enum GameBoard {
    /// The lesson has no pairs; there is nothing to play.
    Empty,
    Ready(Box<MatchSession>),
}

impl GameBoard {
    pub fn into_session(self) -> Option<MatchSession> {
        match self {
            Self::Empty => None,
            Self::Ready(session) => Some(*session),
        }
    }
}

/// Deferred `submitted -> finished` transition after a perfect score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFinish {
    pub due: Instant,
}

/// Builder for [`MatchSession`].
pub struct SessionBuilder<'a> {
    pairs: Vec<Pair>,
    config: GameConfig,
    viewport_width: f64,
    effects: Box<dyn GameEffects>,
    preferences: Option<&'a dyn PreferenceStore>,
}

impl<'a> SessionBuilder<'a> {
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Width used once to pick the drop tolerance.
    pub fn viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn effects(mut self, effects: Box<dyn GameEffects>) -> Self {
        self.effects = effects;
        self
    }

    /// Store the mute flag is read from at start.
    pub fn preferences(mut self, store: &'a dyn PreferenceStore) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn build(self) -> GameBoard {
        if self.pairs.is_empty() {
            tracing::info!("lesson has no pairs, not starting a session");
            return GameBoard::Empty;
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let inventory = Inventory::new(self.pairs, &mut rng);
        let resolver = DropResolver::for_viewport(&self.config.drop_tolerance, self.viewport_width);
        let muted = self
            .preferences
            .and_then(|store| store.load_muted())
            .unwrap_or(false);

        tracing::debug!(
            pairs = inventory.pairs().len(),
            tolerance_px = resolver.tolerance_px(),
            muted,
            "session started"
        );

        GameBoard::Ready(Box::new(MatchSession {
            inventory,
            phase: Phase::Playing,
            selection: None,
            drag: None,
            result: None,
            pending_finish: None,
            resolver,
            rng,
            effects: self.effects,
            muted,
            config: self.config,
        }))
    }
}

/// Game session state.
pub struct MatchSession {
    pub(crate) inventory: Inventory,
    pub(crate) phase: Phase,
    pub(crate) selection: Option<Selection>,
    pub(crate) drag: Option<DragState>,
    pub(crate) result: Option<SessionResult>,
    pub(crate) pending_finish: Option<PendingFinish>,
    pub(crate) resolver: DropResolver,
    rng: StdRng,
    effects: Box<dyn GameEffects>,
    muted: bool,
    config: GameConfig,
}

impl MatchSession {
    pub fn builder<'a>(pairs: Vec<Pair>) -> SessionBuilder<'a> {
        SessionBuilder {
            pairs,
            config: GameConfig::default(),
            viewport_width: f64::INFINITY,
            effects: Box::new(NoEffects),
            preferences: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn pending_finish(&self) -> Option<PendingFinish> {
        self.pending_finish
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn drop_resolver(&self) -> DropResolver {
        self.resolver
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Move an answer into a slot. Frozen outside the `playing` phase.
    pub fn place_answer(
        &mut self,
        answer: &PairId,
        target: &PairId,
        source: Option<&PairId>,
    ) -> Placement {
        if !self.is_playing() {
            tracing::debug!(phase = self.phase.as_str(), %answer, "placement ignored: board frozen");
            return Placement::Rejected {
                reason: Rejection::Frozen,
            };
        }
        let placement = self.inventory.place_answer(answer, target, source);
        if placement.is_placed() {
            self.selection = None;
        }
        placement
    }

    /// Send a slot's occupant back to the pool.
    pub fn return_to_pool(&mut self, slot: &PairId) -> Option<PairId> {
        if !self.is_playing() {
            tracing::debug!(phase = self.phase.as_str(), %slot, "return ignored: board frozen");
            return None;
        }
        let returned = self.inventory.return_to_pool(slot);
        if returned.is_some() {
            self.selection = None;
        }
        returned
    }

    pub fn submit(&mut self) -> Option<&SessionResult> {
        self.submit_at(Instant::now())
    }

    /// Score the board at any fill level and freeze it.
    ///
    /// A perfect score schedules the `finished` transition at
    /// `now + finish_delay`; see [`MatchSession::tick`].
    pub fn submit_at(&mut self, now: Instant) -> Option<&SessionResult> {
        if !self.is_playing() {
            tracing::debug!(phase = self.phase.as_str(), "submit ignored");
            return None;
        }

        self.selection = None;
        self.drag = None;

        let result = SessionResult::evaluate(&self.inventory, self.config.scoring);
        self.phase = Phase::Submitted;
        tracing::info!(correct = result.correct, total = result.total, "board submitted");

        if result.is_perfect() {
            self.cue(SoundCue::Success);
            self.effects.celebrate();
            self.pending_finish = Some(PendingFinish {
                due: now + self.config.finish_delay(),
            });
        } else {
            self.cue(SoundCue::Error);
        }

        self.result = Some(result);
        self.result.as_ref()
    }

    /// Fire the pending finish if it is due. Returns whether the phase moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_finish {
            Some(pending) if now >= pending.due && self.phase == Phase::Submitted => {
                self.pending_finish = None;
                self.phase = Phase::Finished;
                tracing::info!("session finished");
                true
            }
            _ => false,
        }
    }

    /// Start over: reshuffle, clear every slot and transient state.
    pub fn reset_game(&mut self) {
        self.inventory.reshuffle(&mut self.rng);
        self.selection = None;
        self.drag = None;
        self.result = None;
        self.pending_finish = None;
        self.phase = Phase::Playing;
        tracing::debug!("session reset");
    }

    /// Drop everything that could outlive the board view.
    pub fn teardown(&mut self) {
        self.pending_finish = None;
        self.drag = None;
        self.selection = None;
    }

    /// Flip the mute flag and persist it. Returns the new value.
    pub fn toggle_mute(&mut self, store: &dyn PreferenceStore) -> bool {
        let muted = self.flip_mute();
        if let Err(e) = store.save_muted(muted) {
            tracing::warn!(error = %e, "failed to persist mute preference");
        }
        muted
    }

    /// Flip the mute flag for this session only; the caller persists it.
    pub fn flip_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub(crate) fn cue(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        if let Err(e) = self.effects.play(cue) {
            tracing::debug!(?cue, error = %e, "sound cue failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectEvent, EffectLog};
    use crate::error::EffectError;
    use crate::preferences::MemoryPreferences;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn id(n: i64) -> PairId {
        PairId::Number(n)
    }

    fn pairs() -> Vec<Pair> {
        vec![
            Pair::new(1, "A", "X"),
            Pair::new(2, "B", "Y"),
            Pair::new(3, "C", "Z"),
        ]
    }

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<EffectLog>>);

    impl GameEffects for SharedLog {
        fn play(&mut self, cue: SoundCue) -> Result<(), EffectError> {
            self.0.lock().unwrap().play(cue)
        }

        fn celebrate(&mut self) {
            self.0.lock().unwrap().celebrate();
        }
    }

    impl SharedLog {
        fn drain(&self) -> Vec<EffectEvent> {
            self.0.lock().unwrap().drain()
        }
    }

    struct FailingAudio;

    impl GameEffects for FailingAudio {
        fn play(&mut self, _cue: SoundCue) -> Result<(), EffectError> {
            Err(EffectError::Rejected("autoplay blocked".into()))
        }

        fn celebrate(&mut self) {}
    }

    fn session_with(log: &SharedLog) -> MatchSession {
        MatchSession::builder(pairs())
            .config(GameConfig {
                seed: Some(11),
                ..GameConfig::default()
            })
            .effects(Box::new(log.clone()))
            .build()
            .into_session()
            .unwrap()
    }

    fn session() -> MatchSession {
        session_with(&SharedLog::default())
    }

    fn solve(session: &mut MatchSession) {
        for n in 1..=3 {
            session.place_answer(&id(n), &id(n), None);
        }
    }

    #[test]
    fn empty_lesson_is_recognized() {
        assert!(matches!(
            MatchSession::builder(Vec::new()).build(),
            GameBoard::Empty
        ));
    }

    #[test]
    fn partial_submit_scores_and_freezes() {
        let log = SharedLog::default();
        let mut session = session_with(&log);
        session.place_answer(&id(1), &id(1), None);
        session.place_answer(&id(2), &id(1), None);
        session.place_answer(&id(3), &id(2), None);

        let now = Instant::now();
        let result = session.submit_at(now).unwrap().clone();
        assert_eq!(result.correct, 0);
        assert_eq!(result.total, 3);
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.pending_finish(), None);
        assert_eq!(log.drain(), vec![EffectEvent::Sound(SoundCue::Error)]);

        assert!(!session.tick(now + Duration::from_secs(10)));
        assert_eq!(session.phase(), Phase::Submitted);
    }

    #[test]
    fn one_of_three_correct() {
        let mut session = session();
        session.place_answer(&id(2), &id(2), None);
        session.place_answer(&id(1), &id(3), None);
        let result = session.submit().unwrap();
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn perfect_submit_finishes_after_delay() {
        let log = SharedLog::default();
        let mut session = session_with(&log);
        solve(&mut session);

        let now = Instant::now();
        assert!(session.submit_at(now).unwrap().is_perfect());
        assert_eq!(
            log.drain(),
            vec![EffectEvent::Sound(SoundCue::Success), EffectEvent::Celebrate]
        );

        assert!(!session.tick(now + Duration::from_millis(1999)));
        assert_eq!(session.phase(), Phase::Submitted);
        assert!(session.tick(now + Duration::from_secs(2)));
        assert_eq!(session.phase(), Phase::Finished);
        assert!(!session.tick(now + Duration::from_secs(3)));
    }

    #[test]
    fn board_is_frozen_after_submit() {
        let mut session = session();
        session.place_answer(&id(1), &id(1), None);
        session.submit();

        let pool = session.inventory().pool().to_vec();
        assert_eq!(
            session.place_answer(&id(2), &id(2), None),
            Placement::Rejected {
                reason: Rejection::Frozen
            }
        );
        assert_eq!(session.return_to_pool(&id(1)), None);
        assert_eq!(session.inventory().pool(), pool.as_slice());
        assert_eq!(session.inventory().occupant(&id(1)), Some(&id(1)));
        assert!(session.submit().is_none());
    }

    #[test]
    fn reset_cancels_pending_finish() {
        let mut session = session();
        solve(&mut session);
        let now = Instant::now();
        session.submit_at(now);
        session.reset_game();

        assert_eq!(session.pending_finish(), None);
        assert!(!session.tick(now + Duration::from_secs(5)));
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.result(), None);
        assert_eq!(session.inventory().filled_count(), 0);
        assert_eq!(session.inventory().pool().len(), 3);
        assert!(session.inventory().is_consistent());
    }

    #[test]
    fn reset_from_any_phase_restores_playing() {
        let mut session = session();
        session.reset_game();
        assert_eq!(session.phase(), Phase::Playing);

        solve(&mut session);
        let now = Instant::now();
        session.submit_at(now);
        session.tick(now + Duration::from_secs(2));
        assert_eq!(session.phase(), Phase::Finished);

        session.reset_game();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.inventory().filled_count(), 0);
    }

    #[test]
    fn teardown_drops_pending_finish() {
        let mut session = session();
        solve(&mut session);
        let now = Instant::now();
        session.submit_at(now);
        session.teardown();
        assert!(!session.tick(now + Duration::from_secs(5)));
        assert_eq!(session.phase(), Phase::Submitted);
    }

    #[test]
    fn audio_failures_are_swallowed() {
        let mut session = MatchSession::builder(pairs())
            .effects(Box::new(FailingAudio))
            .build()
            .into_session()
            .unwrap();
        solve(&mut session);
        assert!(session.submit().unwrap().is_perfect());
    }

    #[test]
    fn mute_is_read_at_start_and_written_on_toggle() {
        let store = MemoryPreferences::new();
        store.save_muted(true).unwrap();
        let log = SharedLog::default();
        let mut session = MatchSession::builder(pairs())
            .effects(Box::new(log.clone()))
            .preferences(&store)
            .build()
            .into_session()
            .unwrap();
        assert!(session.is_muted());

        solve(&mut session);
        session.submit();
        assert_eq!(log.drain(), vec![EffectEvent::Celebrate]);

        assert!(!session.toggle_mute(&store));
        assert_eq!(store.load_muted(), Some(false));
    }

    #[test]
    fn flip_mute_leaves_store_alone() {
        let store = MemoryPreferences::new();
        let mut session = MatchSession::builder(pairs())
            .preferences(&store)
            .build()
            .into_session()
            .unwrap();

        assert!(session.flip_mute());
        assert!(session.is_muted());
        assert_eq!(store.load_muted(), None);
    }

    #[test]
    fn seeded_sessions_shuffle_identically() {
        let a = session();
        let b = session();
        assert_eq!(a.inventory().pool(), b.inventory().pool());
    }
}
