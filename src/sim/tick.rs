//! Per-frame simulation tick
//!
//! One call per rendered frame. Timers fire first, then input, movement,
//! collisions and cleanup run in a fixed order.

use glam::Vec2;

use super::collision;
use super::combat;
use super::pool::Handle;
use super::spawner;
use super::state::{EntityRef, GameEvent, GameState, Projectile};
use super::timer::TimerEvent;
use crate::angle_between;
use crate::consts::*;
use crate::ui::Hud;

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Shoot key held down (rate limited)
    pub shoot_held: bool,
    /// Discrete click/tap this frame: one immediate shot
    pub pointer_pressed: bool,
    /// Pointer position in screen coordinates
    pub pointer: Vec2,
    /// Start button (only acts in `Setup`)
    pub start: bool,
    /// Restart button (only acts in `GameOver`)
    pub restart: bool,
}

/// Advance the game by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) {
    if input.restart {
        combat::restart(state);
    }
    if input.start {
        combat::start_run(state);
    }

    // Setup and GameOver are frozen
    if !state.is_running() {
        return;
    }

    state.now_ms += dt_ms;
    run_timers(state);

    let dt = dt_ms as f32 / 1000.0;
    apply_movement_input(state, input);
    handle_shooting(state, input);
    spawner::steer_enemies(state);
    integrate(state, dt);

    let overlaps = collision::detect_overlaps(state);
    collision::resolve_all(state, &overlaps);

    cleanup_offscreen(state);
    state.hud = Hud::from_state(state);
}

/// Fire every timer whose deadline has passed
fn run_timers(state: &mut GameState) {
    let now = state.now_ms;
    for id in state.scheduler.due(now) {
        // Cancelled by an earlier handler this frame
        let Some(event) = state.scheduler.fire(id, now) else {
            continue;
        };
        dispatch(state, event);
    }
}

fn dispatch(state: &mut GameState, event: TimerEvent) {
    if !state.is_running() {
        return;
    }
    match event {
        TimerEvent::SpawnEnemy => spawner::on_spawn_timer(state),
        TimerEvent::WaveCheck => spawner::on_wave_check(state),
        TimerEvent::BeginWave => spawner::on_begin_wave(state),
        TimerEvent::EnemyFire(enemy) => {
            spawner::enemy_fire(state, enemy);
        }
        TimerEvent::EndInvulnerability => combat::end_invulnerability(state),
        TimerEvent::SpawnPickup => spawner::on_pickup_timer(state),
    }
}

/// Set player velocity directly from the four directions
///
/// Axes are independent; left wins over right and up over down.
fn apply_movement_input(state: &mut GameState, input: &TickInput) {
    let speed = state.tuning.player_speed;
    let vx = if input.left {
        -speed
    } else if input.right {
        speed
    } else {
        0.0
    };
    let vy = if input.up {
        -speed
    } else if input.down {
        speed
    } else {
        0.0
    };
    state.player.vel = Vec2::new(vx, vy);
}

fn handle_shooting(state: &mut GameState, input: &TickInput) {
    if input.pointer_pressed {
        fire_player_shot(state, input.pointer);
        return;
    }
    if input.shoot_held {
        let interval = state.tuning.hold_fire_interval_ms;
        let now = state.now_ms;
        let ready = state
            .player
            .last_shot_ms
            .is_none_or(|last| now.saturating_sub(last) >= interval);
        if ready {
            fire_player_shot(state, input.pointer);
        }
    }
}

/// Fire one player shot toward `target`
///
/// Non-finite targets, or a target on the muzzle itself, fire straight up.
pub fn fire_player_shot(state: &mut GameState, target: Vec2) -> Handle<Projectile> {
    let origin = state.player.pos - Vec2::new(0.0, SHOT_OFFSET_Y);
    let angle = if target.is_finite() && target != origin {
        angle_between(origin, target)
    } else {
        -std::f32::consts::FRAC_PI_2
    };

    let speed = state.tuning.shot_speed;
    let handle = state
        .player_shots
        .create(Projectile::new(origin, angle, speed));
    state.player.last_shot_ms = Some(state.now_ms);
    state.emit(GameEvent::PlayerFired);
    handle
}

/// Move everything by its velocity; the player stays on screen
fn integrate(state: &mut GameState, dt: f32) {
    let half = PLAYER_HALF_EXTENT;
    let player = &mut state.player;
    player.pos = (player.pos + player.vel * dt).clamp(
        Vec2::splat(half),
        Vec2::new(SCREEN_WIDTH - half, SCREEN_HEIGHT - half),
    );

    for (_, e) in state.enemies.iter_mut() {
        e.pos += e.vel * dt;
    }
    for (_, p) in state.player_shots.iter_mut() {
        p.pos += p.vel * dt;
    }
    for (_, p) in state.enemy_shots.iter_mut() {
        p.pos += p.vel * dt;
    }
    for (_, p) in state.pickups.iter_mut() {
        p.pos += p.vel * dt;
    }
}

/// Remove entities that have left the play area
pub fn cleanup_offscreen(state: &mut GameState) {
    let pm = state.tuning.projectile_margin;
    let em = state.tuning.entity_margin;

    let shot_gone = |p: Vec2| {
        !p.is_finite()
            || p.x < -pm
            || p.x > SCREEN_WIDTH + pm
            || p.y < -pm
            || p.y > SCREEN_HEIGHT + pm
    };
    let sprite_gone = |p: Vec2| !p.is_finite() || p.x < -em || p.x > SCREEN_WIDTH + em;

    let mut doomed: Vec<EntityRef> = Vec::new();
    doomed.extend(
        state
            .player_shots
            .iter()
            .filter(|(_, p)| shot_gone(p.pos))
            .map(|(h, _)| EntityRef::PlayerShot(h)),
    );
    doomed.extend(
        state
            .enemy_shots
            .iter()
            .filter(|(_, p)| shot_gone(p.pos))
            .map(|(h, _)| EntityRef::EnemyShot(h)),
    );
    doomed.extend(
        state
            .enemies
            .iter()
            .filter(|(_, e)| sprite_gone(e.pos))
            .map(|(h, _)| EntityRef::Enemy(h)),
    );
    doomed.extend(
        state
            .pickups
            .iter()
            .filter(|(_, p)| sprite_gone(p.pos))
            .map(|(h, _)| EntityRef::Pickup(h)),
    );

    for target in doomed {
        state.remove(target);
    }
}
