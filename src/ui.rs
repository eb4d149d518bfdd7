//! HUD text and the end-of-run summary
//!
//! The host draws these strings; nothing here knows about fonts or layout.

use serde::{Deserialize, Serialize};

use crate::sim::{GameState, RunPhase};

/// Text lines shown while a run is in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub score: String,
    pub health: String,
    pub lives: String,
    pub wave: String,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: format!("Score: {}", state.score),
            health: format!("Health: {}", state.player.health),
            lives: format!("Lives: {}", state.player.lives),
            wave: format!("Wave: {}", state.wave.wave),
        }
    }
}

/// Game-over overlay contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSummary {
    pub final_score: u64,
    pub wave_reached: u32,
}

impl EndSummary {
    /// Summary for a finished run, `None` while the run is not over
    pub fn from_state(state: &GameState) -> Option<Self> {
        (state.phase == RunPhase::GameOver).then(|| Self {
            final_score: state.score,
            wave_reached: state.wave.wave,
        })
    }

    pub fn title(&self) -> &'static str {
        "Game Over"
    }

    pub fn score_line(&self) -> String {
        format!("Final score: {}", self.final_score)
    }

    pub fn wave_line(&self) -> String {
        format!("Reached wave {}", self.wave_reached)
    }

    /// Label for the restart button
    pub fn restart_label(&self) -> &'static str {
        "Restart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text() {
        let mut state = GameState::new(1);
        state.score = 30;
        state.player.lives = 2;
        let hud = Hud::from_state(&state);
        assert_eq!(hud.score, "Score: 30");
        assert_eq!(hud.health, "Health: 100");
        assert_eq!(hud.lives, "Lives: 2");
        assert_eq!(hud.wave, "Wave: 1");
    }

    #[test]
    fn test_summary_only_after_game_over() {
        let mut state = GameState::new(1);
        assert!(EndSummary::from_state(&state).is_none());

        state.phase = RunPhase::GameOver;
        state.score = 250;
        let summary = EndSummary::from_state(&state).expect("run is over");
        assert_eq!(summary.score_line(), "Final score: 250");
        assert_eq!(summary.wave_line(), "Reached wave 1");
        assert_eq!(summary.title(), "Game Over");
        assert_eq!(summary.restart_label(), "Restart");
    }
}
