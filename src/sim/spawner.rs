//! Wave spawning, enemy fire and steering
//!
//! Each wave walks `Spawning -> WaitingForClear -> Advancing` and then
//! starts the next wave. All pacing is timer driven; every timer handler
//! re-checks that the run is still going before touching the world.

use glam::Vec2;
use rand::Rng;

use super::pool::Handle;
use super::state::{Enemy, GameEvent, GameState, Pickup, Projectile, WavePhase};
use super::timer::TimerEvent;
use crate::consts::*;
use crate::{angle_between, velocity_toward};

/// Enter `Spawning` for the current wave
pub fn begin_wave(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    let wave = state.wave.wave;
    let delay = state.tuning.spawn_delay_ms(wave);

    state.wave.phase = WavePhase::Spawning;
    state.wave.spawned_count = 0;
    state.wave.spawn_timer = Some(state.schedule(delay, true, TimerEvent::SpawnEnemy));

    log::info!(
        "Wave {}: {} enemies, one every {} ms",
        wave,
        state.wave.enemies_per_wave,
        delay
    );
    state.emit(GameEvent::WaveStarted { wave });
}

/// Spawn timer tick: one enemy, then stop once the quota is met
pub fn on_spawn_timer(state: &mut GameState) {
    if !state.is_running() || state.wave.phase != WavePhase::Spawning {
        return;
    }
    if state.wave.spawned_count < state.wave.enemies_per_wave {
        spawn_enemy(state);
        state.wave.spawned_count += 1;
    }
    if state.wave.spawned_count >= state.wave.enemies_per_wave {
        if let Some(timer) = state.wave.spawn_timer.take() {
            state.scheduler.cancel(timer);
        }
        state.wave.phase = WavePhase::WaitingForClear;
        let interval = state.tuning.wave_check_interval_ms;
        state.wave.check_timer = Some(state.schedule(interval, true, TimerEvent::WaveCheck));
    }
}

/// Poll for wave completion; on clear, bump the wave and pause briefly
pub fn on_wave_check(state: &mut GameState) {
    if !state.is_running() || state.wave.phase != WavePhase::WaitingForClear {
        return;
    }
    let quota_met = state.wave.spawned_count >= state.wave.enemies_per_wave;
    if !quota_met || !state.enemies.is_empty() {
        return;
    }

    if let Some(timer) = state.wave.check_timer.take() {
        state.scheduler.cancel(timer);
    }
    let cleared = state.wave.wave;
    state.emit(GameEvent::WaveCleared { wave: cleared });

    state.wave.wave += 1;
    state.wave.enemies_per_wave =
        (state.wave.enemies_per_wave + 1).min(state.tuning.max_enemies_per_wave);
    state.wave.phase = WavePhase::Advancing;
    log::info!("Wave {} cleared", cleared);

    let delay = state.tuning.wave_advance_delay_ms;
    state.schedule(delay, false, TimerEvent::BeginWave);
}

/// Delayed wave start; does nothing if the run ended in the meantime
pub fn on_begin_wave(state: &mut GameState) {
    if state.wave.phase == WavePhase::Advancing {
        begin_wave(state);
    }
}

fn random_row(state: &mut GameState) -> f32 {
    let margin = state.tuning.spawn_margin;
    let (lo, hi) = (margin, SCREEN_HEIGHT - margin);
    if lo < hi {
        state.rng.random_range(lo..=hi)
    } else {
        SCREEN_HEIGHT / 2.0
    }
}

/// Create one enemy at the left edge, possibly a shooter
pub fn spawn_enemy(state: &mut GameState) -> Handle<Enemy> {
    let wave = state.wave.wave;
    let y = random_row(state);
    let approach = state.tuning.approach_speed(wave);

    let vy = if state.tuning.drifts_in(wave) {
        let drift = approach * state.tuning.vertical_drift_ratio;
        if drift > 0.0 {
            state.rng.random_range(-drift..=drift)
        } else {
            0.0
        }
    } else {
        0.0
    };

    let chance = state.tuning.shooter_chance_for(wave);
    let is_shooter = state.rng.random::<f32>() < chance;

    let handle = state.enemies.create(Enemy {
        pos: Vec2::new(0.0, y),
        vel: Vec2::new(approach, vy),
        approach_speed: approach,
        has_hit: false,
        is_shooter,
        fire_timer: None,
    });

    if is_shooter {
        let (min, max) = (
            state.tuning.fire_period_min_ms,
            state.tuning.fire_period_max_ms,
        );
        let rolled = if min < max {
            state.rng.random_range(min..=max)
        } else {
            min
        };
        let period = state.tuning.fire_period_ms(wave, rolled);
        let timer = state.schedule(period, true, TimerEvent::EnemyFire(handle));
        if let Some(enemy) = state.enemies.get_mut(handle) {
            enemy.fire_timer = Some(timer);
        }
    }

    log::debug!("Enemy spawned at y={:.0} (shooter: {})", y, is_shooter);
    state.emit(GameEvent::EnemySpawned {
        shooter: is_shooter,
    });
    handle
}

/// A shooter fires once at the player's current position
///
/// Stale handles are ignored. Without an available player the shot travels
/// horizontally toward the player's side of the screen.
pub fn enemy_fire(state: &mut GameState, shooter: Handle<Enemy>) -> Option<Handle<Projectile>> {
    if !state.is_running() {
        return None;
    }
    let origin = state.enemies.get(shooter)?.pos;

    let (angle, speed) = if state.player.is_available() {
        (
            angle_between(origin, state.player.pos),
            state.tuning.enemy_shot_speed(state.wave.wave),
        )
    } else {
        (0.0, state.tuning.enemy_fallback_speed)
    };

    let handle = state
        .enemy_shots
        .create(Projectile::new(origin, angle, speed));
    state.emit(GameEvent::EnemyFired);
    Some(handle)
}

/// Retarget every enemy toward the player, or drift when there is none
pub fn steer_enemies(state: &mut GameState) {
    if state.player.is_available() {
        let target = state.player.pos;
        let speed = state.tuning.steer_speed(state.wave.wave);
        for (_, enemy) in state.enemies.iter_mut() {
            enemy.vel = velocity_toward(enemy.pos, target, speed);
        }
    } else {
        for (_, enemy) in state.enemies.iter_mut() {
            enemy.vel = Vec2::new(enemy.approach_speed, 0.0);
        }
    }
}

/// Arm the next heart spawn with a fresh random delay
pub fn schedule_pickup(state: &mut GameState) {
    if let Some(pending) = state.pickup_timer.take() {
        state.scheduler.cancel(pending);
    }
    let (min, max) = (
        state.tuning.pickup_interval_min_ms,
        state.tuning.pickup_interval_max_ms,
    );
    let delay = if min < max {
        state.rng.random_range(min..max)
    } else {
        min
    };
    state.pickup_timer = Some(state.schedule(delay, false, TimerEvent::SpawnPickup));
}

/// Pickup timer tick: drop a heart and re-arm
pub fn on_pickup_timer(state: &mut GameState) {
    state.pickup_timer = None;
    if !state.is_running() {
        return;
    }
    spawn_pickup(state);
    schedule_pickup(state);
}

/// Create a heart at the right edge drifting left
pub fn spawn_pickup(state: &mut GameState) -> Handle<Pickup> {
    let y = random_row(state);
    let speed = state.tuning.pickup_speed;
    let handle = state.pickups.create(Pickup {
        pos: Vec2::new(SCREEN_WIDTH + PICKUP_HALF_EXTENT, y),
        vel: Vec2::new(-speed, 0.0),
    });
    state.emit(GameEvent::PickupSpawned);
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::start_run;
    use crate::sim::state::EntityRef;

    fn running_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        start_run(&mut state);
        state
    }

    #[test]
    fn test_no_shooters_before_wave_three() {
        for seed in 0..20 {
            let mut state = running_state(seed);
            for _ in 0..50 {
                let h = spawn_enemy(&mut state);
                let enemy = state.enemies.get(h).expect("just spawned");
                assert!(!enemy.is_shooter);
                assert!(enemy.fire_timer.is_none());
                assert_eq!(enemy.vel.y, 0.0);
            }
        }
    }

    #[test]
    fn test_shooters_appear_from_wave_three() {
        let mut state = running_state(3);
        state.wave.wave = 3;
        let mut shooters = 0;
        for _ in 0..100 {
            let h = spawn_enemy(&mut state);
            let enemy = state.enemies.get(h).expect("just spawned");
            assert_eq!(enemy.pos.x, 0.0);
            assert!(enemy.pos.y >= 40.0 && enemy.pos.y <= SCREEN_HEIGHT - 40.0);
            if enemy.is_shooter {
                shooters += 1;
                let timer = enemy.fire_timer.expect("shooters own a timer");
                assert!(state.scheduler.is_scheduled(timer));
            }
        }
        // 45% of 100, loosely
        assert!(shooters > 20 && shooters < 70, "shooters = {}", shooters);
    }

    #[test]
    fn test_enemy_fire_aims_at_player() {
        let mut state = running_state(1);
        let h = spawn_enemy(&mut state);
        if let Some(enemy) = state.enemies.get_mut(h) {
            enemy.pos = Vec2::new(100.0, 100.0);
        }
        state.player.pos = Vec2::new(100.0, 300.0);

        let shot = enemy_fire(&mut state, h).expect("enemy is live");
        let p = state.enemy_shots.get(shot).expect("shot exists");
        // Straight down at 180 + 12
        assert!(p.vel.x.abs() < 1e-3);
        assert!((p.vel.y - 192.0).abs() < 1e-3);
    }

    #[test]
    fn test_enemy_fire_without_player_goes_horizontal() {
        let mut state = running_state(1);
        let h = spawn_enemy(&mut state);
        state.player.visible = false;

        let shot = enemy_fire(&mut state, h).expect("enemy is live");
        let p = state.enemy_shots.get(shot).expect("shot exists");
        assert!((p.vel.x - 200.0).abs() < 1e-3);
        assert!(p.vel.y.abs() < 1e-3);
    }

    #[test]
    fn test_enemy_fire_from_removed_enemy_is_noop() {
        let mut state = running_state(1);
        let h = spawn_enemy(&mut state);
        state.remove(EntityRef::Enemy(h));
        assert!(enemy_fire(&mut state, h).is_none());
        assert!(state.enemy_shots.is_empty());
    }

    #[test]
    fn test_steering_tracks_player() {
        let mut state = running_state(1);
        state.wave.wave = 2;
        let h = spawn_enemy(&mut state);
        if let Some(enemy) = state.enemies.get_mut(h) {
            enemy.pos = Vec2::new(0.0, 0.0);
        }
        state.player.pos = Vec2::new(30.0, 40.0);

        steer_enemies(&mut state);
        let vel = state.enemies.get(h).map(|e| e.vel).unwrap_or_default();
        // speed 60 along (0.6, 0.8)
        assert!((vel.x - 36.0).abs() < 1e-3);
        assert!((vel.y - 48.0).abs() < 1e-3);

        state.player.visible = false;
        steer_enemies(&mut state);
        let enemy = state.enemies.get(h).expect("still live");
        assert_eq!(enemy.vel, Vec2::new(enemy.approach_speed, 0.0));
    }

    #[test]
    fn test_wave_check_waits_for_last_enemy() {
        let mut state = running_state(1);
        state.wave.phase = WavePhase::WaitingForClear;
        state.wave.spawned_count = state.wave.enemies_per_wave;
        let h = spawn_enemy(&mut state);

        on_wave_check(&mut state);
        assert_eq!(state.wave.wave, 1);

        state.remove(EntityRef::Enemy(h));
        on_wave_check(&mut state);
        assert_eq!(state.wave.wave, 2);
        assert_eq!(state.wave.enemies_per_wave, 5);
        assert_eq!(state.wave.phase, WavePhase::Advancing);

        // A second poll in the same state does nothing
        on_wave_check(&mut state);
        assert_eq!(state.wave.wave, 2);
    }

    #[test]
    fn test_enemies_per_wave_capped() {
        let mut state = running_state(1);
        state.wave.enemies_per_wave = 12;
        state.wave.spawned_count = 12;
        state.wave.phase = WavePhase::WaitingForClear;
        on_wave_check(&mut state);
        assert_eq!(state.wave.enemies_per_wave, 12);
    }

    #[test]
    fn test_pickup_spawns_at_right_edge() {
        let mut state = running_state(1);
        let h = spawn_pickup(&mut state);
        let p = state.pickups.get(h).expect("spawned");
        assert!(p.pos.x > SCREEN_WIDTH);
        assert_eq!(p.vel, Vec2::new(-110.0, 0.0));
        assert!(state.pickup_timer.is_some());
    }
}
