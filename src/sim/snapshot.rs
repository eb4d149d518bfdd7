//! Render snapshot handed to the host each frame

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Pool;
use super::state::{GameState, Projectile, RunPhase};
use crate::ui::{EndSummary, Hud};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub visible: bool,
    /// Invulnerability tint
    pub tinted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub pos: Vec2,
    pub shooter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub angle: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: RunPhase,
    pub time_ms: u64,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub player_shots: Vec<ProjectileView>,
    pub enemy_shots: Vec<ProjectileView>,
    pub pickups: Vec<Vec2>,
    pub hud: Hud,
    pub summary: Option<EndSummary>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn shot_views(pool: &Pool<Projectile>) -> Vec<ProjectileView> {
    pool.iter()
        .map(|(_, p)| ProjectileView {
            pos: p.pos,
            angle: p.angle,
        })
        .collect()
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            time_ms: self.now_ms,
            player: PlayerView {
                pos: self.player.pos,
                visible: self.player.visible && self.phase != RunPhase::Setup,
                tinted: self.player.is_invulnerable(),
            },
            enemies: self
                .enemies
                .iter()
                .map(|(_, e)| EnemyView {
                    pos: e.pos,
                    shooter: e.is_shooter,
                })
                .collect(),
            player_shots: shot_views(&self.player_shots),
            enemy_shots: shot_views(&self.enemy_shots),
            pickups: self.pickups.iter().map(|(_, p)| p.pos).collect(),
            hud: self.hud.clone(),
            summary: EndSummary::from_state(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::start_run;
    use crate::sim::spawner::spawn_enemy;

    #[test]
    fn test_snapshot_lists_entities() {
        let mut state = GameState::new(5);
        start_run(&mut state);
        spawn_enemy(&mut state);

        let snap = state.snapshot();
        assert_eq!(snap.phase, RunPhase::Running);
        assert_eq!(snap.enemies.len(), 1);
        assert!(snap.player.visible);
        assert!(snap.summary.is_none());
    }

    #[test]
    fn test_snapshot_json() {
        let state = GameState::new(5);
        let json = state.snapshot().to_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["phase"], "Setup");
        assert_eq!(value["hud"]["lives"], "Lives: 3");
    }
}
