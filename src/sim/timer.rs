//! Scheduled callbacks
//!
//! Timers carry a [`TimerEvent`] instead of a closure, so the simulation
//! decides what a timer does when it fires. Timers are polled at the start
//! of a tick and never preempt it.

use super::pool::Handle;
use super::state::Enemy;

/// Opaque timer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Spawn the next enemy of the current wave
    SpawnEnemy,
    /// Poll whether the current wave has been cleared
    WaveCheck,
    /// Begin spawning the (already incremented) wave
    BeginWave,
    /// A shooter enemy fires at the player
    EnemyFire(Handle<Enemy>),
    /// Invulnerability window has elapsed
    EndInvulnerability,
    /// Spawn a heart pickup
    SpawnPickup,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    deadline_ms: u64,
    period_ms: Option<u64>,
    event: TimerEvent,
}

/// Deterministic timer scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire `delay_ms` after `now_ms`
    ///
    /// Repeating timers fire every `delay_ms` thereafter. Zero delays are
    /// raised to 1 ms.
    pub fn schedule(
        &mut self,
        now_ms: u64,
        delay_ms: u64,
        repeating: bool,
        event: TimerEvent,
    ) -> TimerId {
        let delay_ms = delay_ms.max(1);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline_ms: now_ms + delay_ms,
            period_ms: repeating.then_some(delay_ms),
            event,
        });
        id
    }

    /// Cancel a timer. Returns false if it had already fired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Timers due at `now_ms`, earliest deadline first (ties by id)
    pub fn due(&self, now_ms: u64) -> Vec<TimerId> {
        let mut due: Vec<(u64, TimerId)> = self
            .timers
            .iter()
            .filter(|t| t.deadline_ms <= now_ms)
            .map(|t| (t.deadline_ms, t.id))
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Fire one due timer: one-shots are removed, repeating timers re-arm
    ///
    /// Returns `None` if the timer was cancelled since `due` listed it.
    pub fn fire(&mut self, id: TimerId, now_ms: u64) -> Option<TimerEvent> {
        let idx = self
            .timers
            .iter()
            .position(|t| t.id == id && t.deadline_ms <= now_ms)?;
        let timer = &mut self.timers[idx];
        let event = timer.event;
        match timer.period_ms {
            Some(period) => timer.deadline_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(event)
    }
}
