//! Brick Breaker headless runner
//!
//! Plays rounds with the autopilot at a steady 60 Hz frame rate and logs the
//! events. Progress goes to a per-mode JSON file in the `--progress`
//! directory when one is given.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use brick_breaker::consts::TICK_DT;
    use brick_breaker::driver::LatestInput;
    use brick_breaker::levels::{ChallengeDifficulty, Mode};
    use brick_breaker::progress::{JsonFileProgressStore, MemoryProgressStore};
    use brick_breaker::sim::{GameEvent, RoundPhase};
    use brick_breaker::{GameDriver, GameSettings, ProgressStore};
    use clap::{Parser, ValueEnum};

    #[derive(ValueEnum, Clone, Copy, Debug)]
    enum ModeArg {
        BrickMania,
        ChallengeEasy,
        ChallengeMedium,
        ChallengeHard,
        TrophyRoad,
    }

    impl From<ModeArg> for Mode {
        fn from(mode: ModeArg) -> Self {
            match mode {
                ModeArg::BrickMania => Mode::BrickMania,
                ModeArg::ChallengeEasy => Mode::Challenge(ChallengeDifficulty::Easy),
                ModeArg::ChallengeMedium => Mode::Challenge(ChallengeDifficulty::Medium),
                ModeArg::ChallengeHard => Mode::Challenge(ChallengeDifficulty::Hard),
                ModeArg::TrophyRoad => Mode::TrophyRoad,
            }
        }
    }

    #[derive(Parser, Debug)]
    #[command(about = "Play brick breaker rounds with the autopilot", version)]
    struct Args {
        #[arg(long, value_enum, default_value = "brick-mania")]
        mode: ModeArg,
        /// First level to play
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Number of levels to play (stops early when the mode runs out)
        #[arg(long, default_value_t = 1)]
        rounds: u32,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Give up on a round after this many frames
        #[arg(long, default_value_t = 60 * 60 * 10)]
        max_frames: u32,
        /// Game settings override (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Progress directory (one JSON document per mode); progress is kept
        /// in memory when omitted
        #[arg(long)]
        progress: Option<PathBuf>,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        brick_breaker::init_logging();
        let args = Args::parse();

        let settings = match &args.settings {
            Some(path) => GameSettings::from_json(&std::fs::read_to_string(path)?)?,
            None => GameSettings::default(),
        };
        let mode = Mode::from(args.mode);
        log::info!("Brick Breaker (headless) - {} from level {}", mode.as_str(), args.level);

        match &args.progress {
            Some(dir) => {
                let store = JsonFileProgressStore::for_mode(dir, mode)?;
                play(settings, mode, &args, store)
            }
            None => play(settings, mode, &args, MemoryProgressStore::new()),
        }
    }

    fn play<S: ProgressStore>(
        settings: GameSettings,
        mode: Mode,
        args: &Args,
        store: S,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut driver = GameDriver::new(settings, mode, args.level, args.seed, store)?;
        driver.set_idle_mode(true);
        let mut input = LatestInput::new();

        for round in 0..args.rounds {
            if round > 0 {
                if driver.snapshot().phase != RoundPhase::Won {
                    break;
                }
                if let Err(e) = driver.next_level() {
                    log::info!("{}", e);
                    break;
                }
            }

            let mut frames = 0;
            while !driver.snapshot().phase.is_terminal() && frames < args.max_frames {
                for event in driver.update(TICK_DT, &mut input) {
                    match event {
                        GameEvent::BrickDestroyed { index, points, .. } => {
                            log::debug!("Brick {} destroyed (+{})", index, points)
                        }
                        GameEvent::LifeLost { lives_left } => log::info!("Life lost, {} left", lives_left),
                        GameEvent::RoundWon { score, stars } => {
                            log::info!("Won with {} points, {} stars", score, stars)
                        }
                        GameEvent::RoundFailed { score } => log::info!("Failed with {} points", score),
                        _ => {}
                    }
                }
                frames += 1;
            }

            let snapshot = driver.snapshot();
            if !snapshot.phase.is_terminal() {
                log::warn!(
                    "Level {} unfinished after {} frames ({} bricks left)",
                    snapshot.level,
                    frames,
                    snapshot.remaining_bricks
                );
                break;
            }
        }

        log::info!("Total stars in {}: {}", mode.as_str(), driver.store().book().total_stars());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    brick_breaker::init_logging();
}
