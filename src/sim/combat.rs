//! Player bookkeeping and the run state machine
//!
//! `Setup -> Running -> GameOver -> (restart) -> Setup`. Lives drop only on
//! hostile contact and health rises only through healing; the two counters
//! never feed into each other.

use super::spawner;
use super::state::{GameEvent, GameState, PlayerStatus, RunPhase};
use super::timer::TimerEvent;

/// Begin a run from the start overlay
///
/// Returns false (and does nothing) outside `Setup`.
pub fn start_run(state: &mut GameState) -> bool {
    if state.phase != RunPhase::Setup {
        return false;
    }
    state.reset();
    state.phase = RunPhase::Running;
    log::info!("Run started (seed {})", state.seed);
    state.emit(GameEvent::RunStarted);

    spawner::schedule_pickup(state);
    spawner::begin_wave(state);
    true
}

/// Reset everything after a game over and return to the start overlay
pub fn restart(state: &mut GameState) -> bool {
    if state.phase != RunPhase::GameOver {
        return false;
    }
    state.reset();
    state.phase = RunPhase::Setup;
    log::info!("Run reset, waiting for start");
    true
}

/// Apply one life loss
///
/// Ignored while invulnerable or when the run is not active. Returns whether
/// a life was actually lost.
pub fn lose_life(state: &mut GameState) -> bool {
    if !state.is_running() || state.player.is_invulnerable() {
        return false;
    }

    state.player.lives = state.player.lives.saturating_sub(1);
    let lives = state.player.lives;
    log::debug!("Life lost, {} remaining", lives);
    state.emit(GameEvent::LifeLost { lives });

    if lives == 0 {
        game_over(state);
    } else {
        state.player.status = PlayerStatus::Invulnerable;
        let window = state.tuning.invulnerable_ms;
        state.player.invulnerability_timer =
            Some(state.schedule(window, false, TimerEvent::EndInvulnerability));
        state.emit(GameEvent::TintOn);
    }
    true
}

/// Close the invulnerability window
pub fn end_invulnerability(state: &mut GameState) {
    if let Some(timer) = state.player.invulnerability_timer.take() {
        state.scheduler.cancel(timer);
    }
    if state.player.status == PlayerStatus::Invulnerable {
        state.player.status = PlayerStatus::Normal;
        state.emit(GameEvent::TintOff);
    }
}

/// Heal the player, clamped to `[0, max_health]`
pub fn heal(state: &mut GameState, amount: u32) -> u32 {
    let max = state.tuning.max_health;
    state.player.health = state.player.health.saturating_add(amount).min(max);
    let health = state.player.health;
    state.emit(GameEvent::Healed { health });
    health
}

/// Credit the player for destroying an enemy
pub fn award_kill(state: &mut GameState) {
    state.score += state.tuning.kill_score;
    let score = state.score;
    state.emit(GameEvent::EnemyDestroyed { score });
}

/// End the run: freeze the simulation and clear the world
fn game_over(state: &mut GameState) {
    if state.phase == RunPhase::GameOver {
        return;
    }
    state.phase = RunPhase::GameOver;
    state.scheduler.clear();
    state.clear_transients();
    state.pickup_timer = None;
    state.wave.spawn_timer = None;
    state.wave.check_timer = None;

    let player = &mut state.player;
    player.vel = glam::Vec2::ZERO;
    player.visible = false;
    player.status = PlayerStatus::Normal;
    player.invulnerability_timer = None;

    let (score, wave) = (state.score, state.wave.wave);
    log::info!("Game over: score {} on wave {}", score, wave);
    state.emit(GameEvent::GameOver { score, wave });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running_state() -> GameState {
        let mut state = GameState::new(7);
        assert!(start_run(&mut state));
        state.drain_events();
        state
    }

    #[test]
    fn test_start_only_from_setup() {
        let mut state = GameState::new(7);
        assert!(start_run(&mut state));
        assert_eq!(state.phase, RunPhase::Running);
        assert!(!start_run(&mut state));
        assert!(!restart(&mut state));
    }

    #[test]
    fn test_life_loss_grants_invulnerability() {
        let mut state = running_state();
        assert!(lose_life(&mut state));
        assert_eq!(state.player.lives, 2);
        assert!(state.player.is_invulnerable());

        // Suppressed during the window
        assert!(!lose_life(&mut state));
        assert_eq!(state.player.lives, 2);

        end_invulnerability(&mut state);
        assert!(!state.player.is_invulnerable());
        assert!(lose_life(&mut state));
        assert_eq!(state.player.lives, 1);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::TintOn));
        assert!(events.contains(&GameEvent::TintOff));
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = running_state();
        state.player.lives = 1;
        state.player_shots.create(super::super::state::Projectile::new(
            glam::Vec2::ZERO,
            0.0,
            1.0,
        ));

        assert!(lose_life(&mut state));
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, RunPhase::GameOver);
        assert!(state.player_shots.is_empty());
        assert!(state.scheduler.is_empty());
        assert!(state.player.active);
        assert!(!state.player.visible);

        // Frozen: nothing more happens
        assert!(!lose_life(&mut state));
        assert_eq!(state.player.lives, 0);
    }

    #[test]
    fn test_health_untouched_by_life_loss() {
        let mut state = running_state();
        state.player.health = 40;
        lose_life(&mut state);
        assert_eq!(state.player.health, 40);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut state = running_state();
        state.player.health = 90;
        assert_eq!(heal(&mut state, 28), 100);
        state.player.health = 10;
        assert_eq!(heal(&mut state, 28), 38);
    }

    #[test]
    fn test_restart_returns_to_setup() {
        let mut state = running_state();
        state.score = 120;
        state.player.lives = 1;
        lose_life(&mut state);
        assert!(restart(&mut state));

        assert_eq!(state.phase, RunPhase::Setup);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.wave.wave, 1);
        assert!(state.player.visible);
    }

    proptest! {
        #[test]
        fn prop_lives_monotonic_and_game_over_once(
            steps in prop::collection::vec(any::<bool>(), 0..40)
        ) {
            let mut state = running_state();
            let mut last = state.player.lives;
            let mut game_overs = 0;

            // true = contact, false = invulnerability expires
            for contact in steps {
                if contact {
                    lose_life(&mut state);
                } else {
                    end_invulnerability(&mut state);
                }
                prop_assert!(state.player.lives <= last);
                last = state.player.lives;
                game_overs += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                    .count();
            }

            if state.player.lives == 0 {
                prop_assert_eq!(game_overs, 1);
                prop_assert_eq!(state.phase, RunPhase::GameOver);
            } else {
                prop_assert_eq!(game_overs, 0);
            }
        }

        #[test]
        fn prop_health_stays_in_range(
            start in 0u32..=100,
            heals in prop::collection::vec(0u32..200, 0..20),
            hits in 0usize..5,
        ) {
            let mut state = running_state();
            state.player.health = start;
            let mut expected = start;
            for amount in heals {
                expected = (expected + amount).min(100);
                heal(&mut state, amount);
                prop_assert!(state.player.health <= state.tuning.max_health);
            }
            for _ in 0..hits {
                lose_life(&mut state);
                end_invulnerability(&mut state);
            }
            prop_assert_eq!(state.player.health, expected);
        }
    }
}
