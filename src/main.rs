//! Heart Raid headless runner
//!
//! Plays a seeded run with a simple autopilot and logs how it went.
//!
//! Usage: `heart-raid [seed] [max_seconds] [--tuning FILE]`. The tuning file
//! can also come from `HEART_RAID_TUNING`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use glam::Vec2;

    use heart_raid::Tuning;
    use heart_raid::consts::*;
    use heart_raid::sim::{GameEvent, GameState, TickInput, tick};
    use heart_raid::ui::EndSummary;

    #[derive(Parser)]
    #[command(name = "heart-raid")]
    #[command(about = "Play a seeded Heart Raid run headless with an autopilot")]
    struct Cli {
        /// RNG seed for the run
        #[arg(default_value_t = 42)]
        seed: u64,
        /// Stop after this much simulated time
        #[arg(default_value_t = 300)]
        max_seconds: u64,
        /// JSON file overriding balance values
        #[arg(long, env = "HEART_RAID_TUNING")]
        tuning: Option<PathBuf>,
    }

    /// Distance at which the autopilot starts dodging an incoming shot
    const DODGE_RADIUS: f32 = 90.0;

    fn load_tuning(path: Option<&Path>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}; using defaults", path.display(), e);
                    Tuning::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}; using defaults", path.display(), e);
                Tuning::default()
            }
        }
    }

    /// Log the interesting events emitted at `now`
    fn log_events(state: &mut GameState, now: u64) {
        for event in state.drain_events() {
            match event {
                GameEvent::LifeLost { lives } => {
                    log::info!("[{:>6} ms] hit! {} lives left", now, lives)
                }
                GameEvent::Healed { health } => {
                    log::info!("[{:>6} ms] heart collected, health {}", now, health)
                }
                GameEvent::WaveStarted { wave } => {
                    log::info!("[{:>6} ms] wave {} begins", now, wave)
                }
                _ => {}
            }
        }
    }

    fn nearest(me: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
        points.min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
    }

    /// Aim at the closest enemy (or heart), sidestep the closest enemy shot
    fn autopilot(state: &GameState) -> TickInput {
        let me = state.player.pos;
        let target = nearest(me, state.enemies.iter().map(|(_, e)| e.pos))
            .or_else(|| nearest(me, state.pickups.iter().map(|(_, p)| p.pos)));

        let mut input = TickInput {
            shoot_held: target.is_some(),
            pointer: target.unwrap_or(Vec2::new(0.0, me.y)),
            ..Default::default()
        };

        let threat = nearest(me, state.enemy_shots.iter().map(|(_, p)| p.pos))
            .filter(|p| p.distance(me) < DODGE_RADIUS);
        match threat {
            Some(shot) if shot.y >= me.y => input.up = true,
            Some(_) => input.down = true,
            None => {
                // Drift back toward the home row
                if me.y < PLAYER_START_Y - 8.0 {
                    input.down = true;
                } else if me.y > PLAYER_START_Y + 8.0 {
                    input.up = true;
                }
            }
        }
        input
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();

        let cli = Cli::parse();

        log::info!("Heart Raid (headless) starting with seed {}", cli.seed);
        let tuning = load_tuning(cli.tuning.as_deref());
        let mut state = GameState::with_tuning(cli.seed, tuning);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        // The run begins before the start tick advances the clock
        let started_at = state.now_ms;
        tick(&mut state, &start, FRAME_MS);
        log_events(&mut state, started_at);

        let limit_ms = cli.max_seconds.saturating_mul(1000);
        while state.is_running() && state.now_ms < limit_ms {
            let input = autopilot(&state);
            tick(&mut state, &input, FRAME_MS);
            let now = state.now_ms;
            log_events(&mut state, now);
        }

        match EndSummary::from_state(&state) {
            Some(summary) => {
                println!("{}", summary.title());
                println!("{}", summary.score_line());
                println!("{}", summary.wave_line());
                println!("[{}]", summary.restart_label());
            }
            None => {
                println!("Time limit reached");
                println!("{} | {} | {}", state.hud.score, state.hud.lives, state.hud.wave);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let cli = Cli::try_parse_from(["heart-raid"]).expect("defaults parse");
            assert_eq!(cli.seed, 42);
            assert_eq!(cli.max_seconds, 300);

            let cli = Cli::try_parse_from(["heart-raid", "7", "12"]).expect("numbers parse");
            assert_eq!(cli.seed, 7);
            assert_eq!(cli.max_seconds, 12);
        }

        #[test]
        fn test_cli_rejects_bad_numbers() {
            assert!(Cli::try_parse_from(["heart-raid", "notanumber", "1"]).is_err());
            assert!(Cli::try_parse_from(["heart-raid", "1", "-5"]).is_err());
        }

        #[test]
        fn test_missing_tuning_file_falls_back() {
            let tuning = load_tuning(Some(Path::new("/nonexistent/heart-raid.json")));
            assert_eq!(tuning, Tuning::default());
            assert_eq!(load_tuning(None), Tuning::default());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding host on the web
}
