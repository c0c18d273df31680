//! Live game sessions and their deferred finish timers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use matchup_core::{EffectError, EffectEvent, EffectLog, GameEffects, MatchSession, SoundCue};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{ScoreView, SessionView, SlotView};

/// Effect sink shared between a session and its HTTP views.
#[derive(Clone, Default)]
pub struct SharedEffects(Arc<Mutex<EffectLog>>);

impl SharedEffects {
    pub fn drain(&self) -> Vec<EffectEvent> {
        self.0.lock().map(|mut log| log.drain()).unwrap_or_default()
    }
}

impl GameEffects for SharedEffects {
    fn play(&mut self, cue: SoundCue) -> std::result::Result<(), EffectError> {
        let mut log = self
            .0
            .lock()
            .map_err(|e| EffectError::Unavailable(e.to_string()))?;
        log.play(cue)
    }

    fn celebrate(&mut self) {
        if let Ok(mut log) = self.0.lock() {
            log.celebrate();
        }
    }
}

/// A session plus the bookkeeping the server keeps around it.
pub struct SessionEntry {
    pub session: MatchSession,
    pub lesson_id: String,
    pub started_at: DateTime<Utc>,
    effects: SharedEffects,
    finish_task: Option<JoinHandle<()>>,
    last_access: Instant,
}

impl SessionEntry {
    pub fn new(session: MatchSession, lesson_id: String, effects: SharedEffects) -> Self {
        Self {
            session,
            lesson_id,
            started_at: Utc::now(),
            effects,
            finish_task: None,
            last_access: Instant::now(),
        }
    }

    /// Abort the pending finish timer, if any.
    pub fn cancel_finish(&mut self) {
        if let Some(task) = self.finish_task.take() {
            task.abort();
        }
    }

    /// Render the session, draining effects fired since the last view.
    pub fn view(&self, session_id: Uuid) -> SessionView {
        let session = &self.session;
        let inventory = session.inventory();
        let result = session.result();

        let slots = inventory
            .slots()
            .map(|(pair, occupant)| SlotView {
                id: pair.id.clone(),
                question: pair.question.clone(),
                occupant: occupant.and_then(|answer| inventory.item(answer)),
                correct: result
                    .and_then(|r| r.verdict(&pair.id))
                    .map(|verdict| verdict.correct),
            })
            .collect();

        SessionView {
            session_id,
            lesson_id: self.lesson_id.clone(),
            phase: session.phase(),
            slots,
            pool: inventory.pool_items(),
            selection: session.selection().cloned(),
            drag: session.drag().map(|drag| drag.item.clone()),
            score: result.map(|r| ScoreView {
                correct: r.correct,
                total: r.total,
                perfect: r.is_perfect(),
            }),
            muted: session.is_muted(),
            effects: self.effects.drain(),
            started_at: self.started_at,
        }
    }
}

impl Drop for SessionEntry {
    fn drop(&mut self) {
        self.cancel_finish();
        self.session.teardown();
    }
}

/// All live sessions, keyed by session id.
///
/// Sessions untouched for longer than the idle TTL are dropped, which tears
/// them down and cancels their finish timer.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Option<Duration>,
}

impl SessionRegistry {
    /// `idle_ttl` of `None` keeps sessions until they are deleted.
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn insert(&self, entry: SessionEntry) -> Result<Uuid> {
        self.prune_idle(Instant::now())?;
        let id = Uuid::new_v4();
        self.lock()?.insert(id, entry);
        tracing::info!(session = %id, "session created");
        Ok(id)
    }

    /// Tear down a session. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> Result<bool> {
        let removed = self.lock()?.remove(&id);
        Ok(removed.is_some())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a session after firing any due finish.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionEntry) -> R) -> Result<R> {
        let mut sessions = self.lock()?;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Session {}", id)))?;
        let now = Instant::now();
        entry.last_access = now;
        if entry.session.tick(now) {
            entry.finish_task = None;
        }
        Ok(f(entry))
    }

    /// Drop sessions idle since before `now - ttl`. Returns how many went.
    pub fn prune_idle(&self, now: Instant) -> Result<usize> {
        let Some(ttl) = self.idle_ttl else {
            return Ok(0);
        };

        let expired: Vec<SessionEntry> = {
            let mut sessions = self.lock()?;
            let idle: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| now.saturating_duration_since(entry.last_access) >= ttl)
                .map(|(id, _)| *id)
                .collect();
            idle.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expired idle sessions");
        }
        Ok(expired.len())
    }

    /// Periodically prune idle sessions until the registry is dropped.
    pub fn spawn_reaper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                if let Err(e) = registry.prune_idle(Instant::now()) {
                    tracing::warn!(error = %e, "session pruning failed");
                }
            }
        })
    }

    /// Spawn the timer for a session's pending finish, replacing any old one.
    pub fn schedule_finish(self: &Arc<Self>, id: Uuid) -> Result<()> {
        let mut sessions = self.lock()?;
        let Some(entry) = sessions.get_mut(&id) else {
            return Ok(());
        };
        let Some(pending) = entry.session.pending_finish() else {
            return Ok(());
        };

        entry.cancel_finish();
        let delay = pending.due.saturating_duration_since(Instant::now());
        let registry = Arc::clone(self);
        entry.finish_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let finished = registry.with_session(id, |entry| {
                entry.finish_task = None;
            });
            if let Err(e) = finished {
                tracing::debug!(session = %id, error = %e, "finish timer fired for a closed session");
            }
        }));
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("Session registry lock poisoned".to_string()))
    }
}
