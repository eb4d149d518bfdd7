//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]; there is no ambient
//! global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::{Handle, Pool};
use super::timer::{Scheduler, TimerId};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{normalize_angle, velocity_from_angle};
use crate::ui::Hud;

/// Overall run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Start overlay shown, waiting for the start action
    Setup,
    /// Active gameplay
    Running,
    /// All lives lost; simulation frozen until restart
    GameOver,
}

/// Player damage state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Normal,
    /// Life loss suppressed until the window expires
    Invulnerable,
}

/// The player sprite. Not stored in any pool and never removed.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Cosmetic gauge, changed only by healing
    pub health: u32,
    /// Decremented only by hostile contact
    pub lives: u32,
    pub status: PlayerStatus,
    /// Always true; the player is hidden, not destroyed
    pub active: bool,
    pub visible: bool,
    /// When the last shot left (ms)
    pub last_shot_ms: Option<u64>,
    pub(crate) invulnerability_timer: Option<TimerId>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            health: tuning.max_health,
            lives: tuning.start_lives,
            status: PlayerStatus::Normal,
            active: true,
            visible: true,
            last_shot_ms: None,
            invulnerability_timer: None,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.status == PlayerStatus::Invulnerable
    }

    /// Whether enemies can aim at / steer toward the player
    pub fn is_available(&self) -> bool {
        self.active && self.visible && self.pos.is_finite()
    }
}

/// A hostile sprite approaching from the left
#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Horizontal drift used when the player is unavailable
    pub approach_speed: f32,
    /// Set on first player contact; an enemy damages the player at most once
    pub has_hit: bool,
    /// Fixed at spawn
    pub is_shooter: bool,
    /// Repeating fire timer owned by this enemy
    pub fire_timer: Option<TimerId>,
}

/// A shot, fired either by the player or by a shooter enemy
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Direction of travel (radians, screen space)
    pub angle: f32,
}

impl Projectile {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        let angle = normalize_angle(angle);
        Self {
            pos,
            vel: velocity_from_angle(angle, speed),
            angle,
        }
    }
}

/// A heart that heals the player when shot
#[derive(Debug, Clone)]
pub struct Pickup {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Per-wave spawner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Spawn timer running
    Spawning,
    /// Quota reached, polling for the last enemy to go
    WaitingForClear,
    /// Wave cleared, short pause before the next one
    Advancing,
}

#[derive(Debug, Clone)]
pub struct WaveState {
    /// Current wave (1-based, monotonic within a run)
    pub wave: u32,
    pub enemies_per_wave: u32,
    /// Enemies spawned so far this wave
    pub spawned_count: u32,
    pub phase: WavePhase,
    pub(crate) spawn_timer: Option<TimerId>,
    pub(crate) check_timer: Option<TimerId>,
}

impl WaveState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            wave: 1,
            enemies_per_wave: tuning.start_enemies_per_wave,
            spawned_count: 0,
            phase: WavePhase::Spawning,
            spawn_timer: None,
            check_timer: None,
        }
    }
}

/// Reference to any entity the collision layer can report
///
/// `Player` carries no handle, so it can never become a pool removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Player,
    Enemy(Handle<Enemy>),
    PlayerShot(Handle<Projectile>),
    EnemyShot(Handle<Projectile>),
    Pickup(Handle<Pickup>),
}

/// Things the host may want to react to (sounds, tints, overlays)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    EnemySpawned { shooter: bool },
    EnemyDestroyed { score: u64 },
    ShotIntercepted,
    PlayerFired,
    EnemyFired,
    PickupSpawned,
    Healed { health: u32 },
    LifeLost { lives: u32 },
    /// Invulnerability started: tint the player
    TintOn,
    /// Invulnerability ended: clear the tint
    TintOff,
    GameOver { score: u64, wave: u32 },
}

/// Complete state of a run
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock (ms since the state was created)
    pub now_ms: u64,
    pub phase: RunPhase,
    pub player: Player,
    pub enemies: Pool<Enemy>,
    pub player_shots: Pool<Projectile>,
    pub enemy_shots: Pool<Projectile>,
    pub pickups: Pool<Pickup>,
    pub wave: WaveState,
    pub score: u64,
    pub scheduler: Scheduler,
    pub(crate) pickup_timer: Option<TimerId>,
    /// Text shown by the host, refreshed every running tick
    pub hud: Hud,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state in `Setup` with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            player: Player::new(&tuning),
            wave: WaveState::new(&tuning),
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0,
            phase: RunPhase::Setup,
            enemies: Pool::new(),
            player_shots: Pool::new(),
            enemy_shots: Pool::new(),
            pickups: Pool::new(),
            score: 0,
            scheduler: Scheduler::new(),
            pickup_timer: None,
            hud: Hud::default(),
            events: Vec::new(),
        };
        state.hud = Hud::from_state(&state);
        state
    }

    /// Restore score, player, wave, pools and RNG to their initial values
    ///
    /// Cancels every timer and reseeds from `seed`, so every run started
    /// from this state plays out the same. The clock carries on.
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.scheduler.clear();
        self.clear_transients();
        self.player = Player::new(&self.tuning);
        self.wave = WaveState::new(&self.tuning);
        self.score = 0;
        self.pickup_timer = None;
        self.hud = Hud::from_state(self);
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    /// Remove an entity from its pool
    ///
    /// Returns false for stale handles. Removing an enemy cancels its fire
    /// timer. Requests to remove the player are refused.
    pub fn remove(&mut self, target: EntityRef) -> bool {
        match target {
            EntityRef::Player => {
                log::warn!("Refused request to remove the player entity");
                false
            }
            EntityRef::Enemy(h) => match self.enemies.remove(h) {
                Some(enemy) => {
                    if let Some(timer) = enemy.fire_timer {
                        self.scheduler.cancel(timer);
                    }
                    true
                }
                None => false,
            },
            EntityRef::PlayerShot(h) => self.player_shots.remove(h).is_some(),
            EntityRef::EnemyShot(h) => self.enemy_shots.remove(h).is_some(),
            EntityRef::Pickup(h) => self.pickups.remove(h).is_some(),
        }
    }

    /// Whether `target` still refers to something live
    pub fn is_active(&self, target: EntityRef) -> bool {
        match target {
            EntityRef::Player => self.player.active,
            EntityRef::Enemy(h) => self.enemies.contains(h),
            EntityRef::PlayerShot(h) => self.player_shots.contains(h),
            EntityRef::EnemyShot(h) => self.enemy_shots.contains(h),
            EntityRef::Pickup(h) => self.pickups.contains(h),
        }
    }

    /// Empty every transient pool, cancelling enemy fire timers
    pub fn clear_transients(&mut self) {
        for enemy in self.enemies.clear() {
            if let Some(timer) = enemy.fire_timer {
                self.scheduler.cancel(timer);
            }
        }
        self.player_shots.clear();
        self.enemy_shots.clear();
        self.pickups.clear();
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Schedule a timer relative to the current clock
    pub(crate) fn schedule(
        &mut self,
        delay_ms: u64,
        repeating: bool,
        event: super::timer::TimerEvent,
    ) -> TimerId {
        self.scheduler.schedule(self.now_ms, delay_ms, repeating, event)
    }
}
