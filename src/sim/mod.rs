//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clock advanced only by `tick`
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod pool;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{Aabb, Overlap, detect_overlaps, resolve, resolve_all};
pub use combat::{heal, lose_life, restart, start_run};
pub use pool::{Handle, Pool};
pub use snapshot::Snapshot;
pub use state::{
    Enemy, EntityRef, GameEvent, GameState, Pickup, Player, PlayerStatus,
    Projectile, RunPhase, WavePhase, WaveState,
};
pub use tick::{TickInput, fire_player_shot, tick};
pub use timer::{Scheduler, TimerEvent, TimerId};
