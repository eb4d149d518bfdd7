//! Game balance and tuning
//!
//! Every number that shapes difficulty lives here so a host can override it
//! from a JSON file. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Balance table for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub start_lives: u32,
    pub max_health: u32,
    pub heal_amount: u32,
    /// Player movement speed (px/s)
    pub player_speed: f32,
    /// Invulnerability window after a life loss (ms)
    pub invulnerable_ms: u64,

    // === Shooting ===
    pub shot_speed: f32,
    /// Minimum interval between shots while the shoot key is held (ms)
    pub hold_fire_interval_ms: u64,
    pub kill_score: u64,

    // === Waves ===
    pub start_enemies_per_wave: u32,
    /// Spawn delay before wave scaling (ms)
    pub spawn_delay_base_ms: u64,
    /// Spawn delay shaved off per wave (ms)
    pub spawn_delay_per_wave_ms: u64,
    pub spawn_delay_max_reduction_ms: u64,
    pub min_spawn_delay_ms: u64,
    pub max_enemies_per_wave: u32,
    pub wave_check_interval_ms: u64,
    pub wave_advance_delay_ms: u64,
    /// Shooters, vertical drift and faster fire all start at this wave
    pub shooter_min_wave: u32,
    pub shooter_chance: f32,
    /// Fraction of the approach speed used as random vertical drift
    pub vertical_drift_ratio: f32,
    /// Distance kept from the top/bottom edge when picking a spawn row
    pub spawn_margin: f32,

    // === Enemy movement (px/s) ===
    pub approach_base_speed: f32,
    pub approach_speed_per_wave: f32,
    pub approach_max_bonus: f32,
    pub steer_base_speed: f32,
    /// Added to the steer speed for every wave after the first
    pub steer_speed_per_wave: f32,

    // === Enemy fire ===
    pub fire_period_min_ms: u64,
    pub fire_period_max_ms: u64,
    /// Fire period shaved off per wave past `shooter_min_wave` (ms)
    pub fire_speedup_per_wave_ms: u64,
    pub fire_speedup_max_ms: u64,
    /// Lower bound for any shooter's fire period (ms)
    pub min_fire_period_ms: u64,
    pub enemy_shot_base_speed: f32,
    pub enemy_shot_speed_per_wave: f32,
    pub enemy_shot_max_bonus: f32,
    /// Speed of enemy shots when the player cannot be aimed at
    pub enemy_fallback_speed: f32,

    // === Pickups ===
    pub pickup_interval_min_ms: u64,
    pub pickup_interval_max_ms: u64,
    pub pickup_speed: f32,

    // === Cleanup ===
    pub projectile_margin: f32,
    pub entity_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_lives: 3,
            max_health: 100,
            heal_amount: 28,
            player_speed: 260.0,
            invulnerable_ms: 700,

            shot_speed: 520.0,
            hold_fire_interval_ms: 160,
            kill_score: 10,

            start_enemies_per_wave: 4,
            spawn_delay_base_ms: 900,
            spawn_delay_per_wave_ms: 60,
            spawn_delay_max_reduction_ms: 600,
            min_spawn_delay_ms: 220,
            max_enemies_per_wave: 12,
            wave_check_interval_ms: 500,
            wave_advance_delay_ms: 700,
            shooter_min_wave: 3,
            shooter_chance: 0.45,
            vertical_drift_ratio: 0.25,
            spawn_margin: 40.0,

            approach_base_speed: 40.0,
            approach_speed_per_wave: 18.0,
            approach_max_bonus: 220.0,
            steer_base_speed: 50.0,
            steer_speed_per_wave: 10.0,

            fire_period_min_ms: 1200,
            fire_period_max_ms: 2200,
            fire_speedup_per_wave_ms: 50,
            fire_speedup_max_ms: 500,
            min_fire_period_ms: 400,
            enemy_shot_base_speed: 180.0,
            enemy_shot_speed_per_wave: 12.0,
            enemy_shot_max_bonus: 360.0,
            enemy_fallback_speed: 200.0,

            pickup_interval_min_ms: 7000,
            pickup_interval_max_ms: 10000,
            pickup_speed: 110.0,

            projectile_margin: 60.0,
            entity_margin: 80.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning table from JSON (partial tables are allowed)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Delay between enemy spawns for a wave (ms)
    pub fn spawn_delay_ms(&self, wave: u32) -> u64 {
        let reduction = (u64::from(wave) * self.spawn_delay_per_wave_ms)
            .min(self.spawn_delay_max_reduction_ms);
        self.spawn_delay_base_ms
            .saturating_sub(reduction)
            .max(self.min_spawn_delay_ms)
    }

    /// Horizontal approach speed of a freshly spawned enemy
    pub fn approach_speed(&self, wave: u32) -> f32 {
        self.approach_base_speed
            + (wave as f32 * self.approach_speed_per_wave).min(self.approach_max_bonus)
    }

    /// Speed at which enemies home in on the player
    pub fn steer_speed(&self, wave: u32) -> f32 {
        self.steer_base_speed + wave.saturating_sub(1) as f32 * self.steer_speed_per_wave
    }

    /// Speed of projectiles fired by shooter enemies
    pub fn enemy_shot_speed(&self, wave: u32) -> f32 {
        self.enemy_shot_base_speed
            + (wave as f32 * self.enemy_shot_speed_per_wave).min(self.enemy_shot_max_bonus)
    }

    /// Whether enemies spawned in this wave drift vertically
    pub fn drifts_in(&self, wave: u32) -> bool {
        wave >= self.shooter_min_wave
    }

    /// Probability that an enemy spawned in this wave is a shooter
    pub fn shooter_chance_for(&self, wave: u32) -> f32 {
        if wave >= self.shooter_min_wave {
            self.shooter_chance
        } else {
            0.0
        }
    }

    /// Fire period for a shooter, given the uniformly rolled base period
    ///
    /// Each wave past `shooter_min_wave` shaves a little off, capped at
    /// `fire_speedup_max_ms` and never going below `min_fire_period_ms`.
    pub fn fire_period_ms(&self, wave: u32, rolled_ms: u64) -> u64 {
        let waves_past = u64::from(wave.saturating_sub(self.shooter_min_wave));
        let speedup = (waves_past * self.fire_speedup_per_wave_ms).min(self.fire_speedup_max_ms);
        rolled_ms
            .saturating_sub(speedup)
            .max(self.min_fire_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_delay_curve() {
        let t = Tuning::default();
        assert_eq!(t.spawn_delay_ms(1), 840);
        assert_eq!(t.spawn_delay_ms(5), 600);
        // Saturates at 900 - 600
        assert_eq!(t.spawn_delay_ms(10), 300);
        assert_eq!(t.spawn_delay_ms(50), 300);
    }

    #[test]
    fn test_speed_curves() {
        let t = Tuning::default();
        assert_eq!(t.approach_speed(1), 58.0);
        assert_eq!(t.approach_speed(100), 260.0);
        assert_eq!(t.steer_speed(1), 50.0);
        assert_eq!(t.steer_speed(4), 80.0);
        assert_eq!(t.enemy_shot_speed(2), 204.0);
        assert_eq!(t.enemy_shot_speed(99), 540.0);
    }

    #[test]
    fn test_shooter_chance_gated_by_wave() {
        let t = Tuning::default();
        assert_eq!(t.shooter_chance_for(1), 0.0);
        assert_eq!(t.shooter_chance_for(2), 0.0);
        assert_eq!(t.shooter_chance_for(3), 0.45);
    }

    #[test]
    fn test_fire_period_has_floor() {
        let t = Tuning::default();
        assert_eq!(t.fire_period_ms(3, 1200), 1200);
        assert_eq!(t.fire_period_ms(5, 1500), 1400);
        assert_eq!(t.fire_period_ms(40, 1200), 700);

        let harsh = Tuning {
            min_fire_period_ms: 900,
            ..Tuning::default()
        };
        assert_eq!(harsh.fire_period_ms(40, 1200), 900);
    }

    #[test]
    fn test_wave_gates_follow_shooter_min_wave() {
        let late = Tuning {
            shooter_min_wave: 5,
            ..Tuning::default()
        };
        assert!(!late.drifts_in(4));
        assert!(late.drifts_in(5));
        assert_eq!(late.shooter_chance_for(4), 0.0);
        // No speedup until the shooters themselves arrive
        assert_eq!(late.fire_period_ms(5, 1500), 1500);
        assert_eq!(late.fire_period_ms(7, 1500), 1400);
    }

    #[test]
    fn test_curves_read_the_table() {
        let t = Tuning::from_json(
            r#"{ "spawn_delay_base_ms": 1000, "min_spawn_delay_ms": 500,
                 "approach_base_speed": 10.0, "steer_speed_per_wave": 0.0,
                 "enemy_shot_base_speed": 100.0 }"#,
        )
        .expect("valid json");
        assert_eq!(t.spawn_delay_ms(1), 940);
        assert_eq!(t.spawn_delay_ms(50), 500);
        assert_eq!(t.approach_speed(1), 28.0);
        assert_eq!(t.steer_speed(9), 50.0);
        assert_eq!(t.enemy_shot_speed(2), 124.0);
    }

    #[test]
    fn test_partial_json_override() {
        let t = Tuning::from_json(r#"{ "start_lives": 5, "heal_amount": 10 }"#)
            .expect("valid json");
        assert_eq!(t.start_lives, 5);
        assert_eq!(t.heal_amount, 10);
        assert_eq!(t.max_health, 100);

        assert!(Tuning::from_json("{ not json").is_err());
    }
}
