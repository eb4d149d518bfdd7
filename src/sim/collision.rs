//! Overlap detection and the collision rule table
//!
//! Detection is a plain axis-aligned box test over the current positions.
//! Resolution walks the detected pairs in order; every rule looks its
//! operands up again first, so an entity removed by an earlier pair is never
//! processed twice.

use glam::Vec2;

use super::combat;
use super::pool::Handle;
use super::state::{Enemy, EntityRef, GameEvent, GameState, Pickup, Projectile};
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extent: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: f32) -> Self {
        Self {
            center,
            half_extent: Vec2::splat(half),
        }
    }

    /// Touching edges do not count as overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extent + other.half_extent;
        d.x < reach.x && d.y < reach.y
    }
}

/// A detected overlap, tagged by the pair of kinds involved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Player shot hits an enemy. `target` is what the host reported as
    /// the enemy; anything other than an enemy is refused.
    ShotEnemy {
        shot: Handle<Projectile>,
        target: EntityRef,
    },
    /// Player shot meets an enemy shot
    ShotIntercept {
        shot: Handle<Projectile>,
        bolt: Handle<Projectile>,
    },
    /// Enemy shot reaches the player
    BoltPlayer { bolt: Handle<Projectile> },
    /// Enemy body touches the player
    EnemyPlayer { enemy: Handle<Enemy> },
    /// Player shot collects a heart
    ShotPickup {
        shot: Handle<Projectile>,
        pickup: Handle<Pickup>,
    },
}

/// Find every overlapping pair the rule table cares about
pub fn detect_overlaps(state: &GameState) -> Vec<Overlap> {
    let mut found = Vec::new();

    let shots: Vec<_> = state
        .player_shots
        .iter()
        .map(|(h, p)| (h, Aabb::new(p.pos, PROJECTILE_HALF_EXTENT)))
        .collect();
    let bolts: Vec<_> = state
        .enemy_shots
        .iter()
        .map(|(h, p)| (h, Aabb::new(p.pos, PROJECTILE_HALF_EXTENT)))
        .collect();
    let player_box = Aabb::new(state.player.pos, PLAYER_HALF_EXTENT);

    for (shot, shot_box) in &shots {
        for (enemy, e) in state.enemies.iter() {
            if shot_box.overlaps(&Aabb::new(e.pos, ENEMY_HALF_EXTENT)) {
                found.push(Overlap::ShotEnemy {
                    shot: *shot,
                    target: EntityRef::Enemy(enemy),
                });
            }
        }
        for (bolt, bolt_box) in &bolts {
            if shot_box.overlaps(bolt_box) {
                found.push(Overlap::ShotIntercept {
                    shot: *shot,
                    bolt: *bolt,
                });
            }
        }
    }

    if state.player.visible {
        for (bolt, bolt_box) in &bolts {
            if bolt_box.overlaps(&player_box) {
                found.push(Overlap::BoltPlayer { bolt: *bolt });
            }
        }
        for (enemy, e) in state.enemies.iter() {
            if player_box.overlaps(&Aabb::new(e.pos, ENEMY_HALF_EXTENT)) {
                found.push(Overlap::EnemyPlayer { enemy });
            }
        }
    }

    for (shot, shot_box) in &shots {
        for (pickup, p) in state.pickups.iter() {
            if shot_box.overlaps(&Aabb::new(p.pos, PICKUP_HALF_EXTENT)) {
                found.push(Overlap::ShotPickup {
                    shot: *shot,
                    pickup,
                });
            }
        }
    }

    found
}

/// Apply the rule for one overlap. Returns whether it had any effect.
pub fn resolve(state: &mut GameState, overlap: Overlap) -> bool {
    match overlap {
        Overlap::ShotEnemy { shot, target } => {
            let enemy = match target {
                EntityRef::Enemy(h) => h,
                EntityRef::Player => {
                    log::warn!("Player shot reported hitting the player; ignoring");
                    return false;
                }
                other => {
                    log::debug!("Shot overlap with non-enemy {:?} ignored", other);
                    return false;
                }
            };
            if !state.player_shots.contains(shot) || !state.enemies.contains(enemy) {
                return false;
            }
            state.remove(EntityRef::PlayerShot(shot));
            state.remove(EntityRef::Enemy(enemy));
            combat::award_kill(state);
            true
        }

        Overlap::ShotIntercept { shot, bolt } => {
            if !state.player_shots.contains(shot) || !state.enemy_shots.contains(bolt) {
                return false;
            }
            state.remove(EntityRef::PlayerShot(shot));
            state.remove(EntityRef::EnemyShot(bolt));
            state.emit(GameEvent::ShotIntercepted);
            true
        }

        Overlap::BoltPlayer { bolt } => {
            if !state.remove(EntityRef::EnemyShot(bolt)) {
                return false;
            }
            combat::lose_life(state);
            true
        }

        Overlap::EnemyPlayer { enemy } => {
            if !state.is_running() || state.player.is_invulnerable() {
                return false;
            }
            match state.enemies.get_mut(enemy) {
                Some(e) if !e.has_hit => e.has_hit = true,
                _ => return false,
            }
            combat::lose_life(state);
            // No-op if the life loss ended the run and cleared the pools
            state.remove(EntityRef::Enemy(enemy));
            true
        }

        Overlap::ShotPickup { shot, pickup } => {
            if !state.player_shots.contains(shot) || !state.pickups.contains(pickup) {
                return false;
            }
            state.remove(EntityRef::PlayerShot(shot));
            state.remove(EntityRef::Pickup(pickup));
            let amount = state.tuning.heal_amount;
            combat::heal(state, amount);
            true
        }
    }
}

/// Resolve a batch of overlaps, stopping if the run ends midway
pub fn resolve_all(state: &mut GameState, overlaps: &[Overlap]) -> usize {
    let mut applied = 0;
    for overlap in overlaps {
        if !state.is_running() {
            break;
        }
        if resolve(state, *overlap) {
            applied += 1;
        }
    }
    applied
}
