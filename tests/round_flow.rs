//! Full rounds played through the driver

use brick_breaker::consts::*;
use brick_breaker::driver::LatestInput;
use brick_breaker::levels::{ChallengeDifficulty, Mode};
use brick_breaker::progress::{JsonFileProgressStore, MemoryProgressStore};
use brick_breaker::settings::Tier;
use brick_breaker::sim::{
    BallConfig, Brick, BrickKind, GameEvent, Level, LevelDescriptor, Material, PaddleConfig, RoundPhase,
};
use brick_breaker::{GameDriver, GameSettings, ProgressStore};
use glam::Vec2;

fn level_with(bricks: Vec<Brick>) -> Level {
    Level {
        descriptor: LevelDescriptor::handcrafted(1, "Flow", Tier::Easy, 100.0, 5.0),
        bricks,
        paddle: PaddleConfig {
            width: 100.0,
            height: PADDLE_HEIGHT,
            y: PADDLE_Y,
        },
        ball: BallConfig {
            radius: BALL_RADIUS,
            speed: 5.0,
        },
    }
}

/// A brick wider than any launch can miss
fn ceiling(kind: BrickKind) -> Brick {
    Brick::new(Vec2::new(0.0, 100.0), Vec2::new(CANVAS_WIDTH, 25.0), kind)
}

/// A brick the ball can never touch (the ball is clamped to the field)
fn unreachable_brick() -> Brick {
    Brick::new(Vec2::ZERO, Vec2::new(1.0, 1.0), BrickKind::Normal)
}

#[test]
fn won_round_records_progress_once() {
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        Mode::BrickMania,
        level_with(vec![ceiling(BrickKind::Material(Material::Gold))]),
        5,
        MemoryProgressStore::new(),
    );
    let mut input = LatestInput::new();
    input.press_launch();

    let mut wins = 0;
    let mut destroyed_points = 0;
    for _ in 0..3000 {
        for event in driver.update(TICK_DT, &mut input) {
            match event {
                GameEvent::RoundWon { score, stars } => {
                    wins += 1;
                    assert_eq!(score, 100);
                    assert_eq!(stars, 3);
                }
                GameEvent::BrickDestroyed { points, .. } => destroyed_points += points,
                _ => {}
            }
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(destroyed_points, 100);
    let store = driver.store();
    // One write for the record, one for unlocking level 2
    assert_eq!(store.flushes, 2);
    assert_eq!(store.load_progress("level_1").score, 100);
    assert!(store.book().is_unlocked(2));
    assert!(!store.book().is_unlocked(3));
}

#[test]
fn losing_every_life_fails_the_round() {
    let settings = GameSettings {
        lives: 2,
        ..GameSettings::default()
    };
    let mut driver = GameDriver::from_level(
        settings,
        Mode::BrickMania,
        level_with(vec![unreachable_brick()]),
        11,
        MemoryProgressStore::new(),
    );
    let mut input = LatestInput::new();

    let mut lives_seen = Vec::new();
    let mut failed_score = None;
    for _ in 0..20_000 {
        let snapshot = driver.snapshot();
        if snapshot.phase.is_terminal() {
            break;
        }
        if snapshot.phase == RoundPhase::Ready {
            input.press_launch();
        }
        // Keep the paddle on the far side of the field from the ball
        let ball_x = snapshot.ball.pos.x;
        input.set_paddle_x(if ball_x < CANVAS_WIDTH / 2.0 { CANVAS_WIDTH } else { 0.0 });

        for event in driver.update(TICK_DT, &mut input) {
            match event {
                GameEvent::LifeLost { lives_left } => lives_seen.push(lives_left),
                GameEvent::RoundFailed { score } => failed_score = Some(score),
                GameEvent::PaddleBounce { .. } => panic!("paddle was kept away from the ball"),
                _ => {}
            }
        }
    }

    assert_eq!(lives_seen, vec![1, 0]);
    assert_eq!(failed_score, Some(0));
    let snapshot = driver.snapshot();
    assert_eq!(snapshot.phase, RoundPhase::Failed);
    assert_eq!(snapshot.lives, 0);
    assert_eq!(snapshot.stars, 0);

    // A failed round writes nothing
    assert_eq!(driver.store().flushes, 0);
    assert!(!driver.store().book().is_unlocked(2));
}

#[test]
fn autopilot_round_keeps_invariants() {
    let settings = GameSettings::default();
    let mut driver =
        GameDriver::new(settings, Mode::BrickMania, 10, 77, MemoryProgressStore::new()).expect("level 10");
    driver.set_idle_mode(true);
    let mut input = LatestInput::new();

    let total = driver.snapshot().bricks.len();
    let mut last_score = 0;
    let mut last_destroyed = 0;
    for _ in 0..20_000 {
        driver.update(TICK_DT, &mut input);
        let snapshot = driver.snapshot();

        assert!(snapshot.score >= last_score);
        let destroyed = snapshot.bricks.iter().filter(|b| b.destroyed).count();
        assert!(destroyed >= last_destroyed);
        assert_eq!(snapshot.bricks.len(), total);

        let paddle = snapshot.paddle;
        assert!(paddle.x >= 0.0 && paddle.x + paddle.width <= CANVAS_WIDTH + 1e-3);

        let ball = snapshot.ball;
        if ball.is_moving() {
            assert!((ball.vel.length() - ball.speed).abs() < 1e-3);
            assert!(ball.speed >= ball.base_speed - 1e-4);
            assert!(ball.speed <= ball.max_speed() + 1e-4);
        }

        last_score = snapshot.score;
        last_destroyed = destroyed;
        if snapshot.phase.is_terminal() {
            break;
        }
    }
}

#[test]
fn best_result_survives_a_worse_retry() {
    let mut store = MemoryProgressStore::new();

    // First clear: gold brick, all lives
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        Mode::BrickMania,
        level_with(vec![ceiling(BrickKind::Material(Material::Gold))]),
        1,
        store,
    );
    play_until_terminal(&mut driver);
    store = driver.into_store();
    assert_eq!(store.load_progress("level_1").score, 100);

    // Second clear of a cheaper layout must not lower the record
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        Mode::BrickMania,
        level_with(vec![ceiling(BrickKind::Normal)]),
        2,
        store,
    );
    play_until_terminal(&mut driver);
    let store = driver.into_store();
    let progress = store.load_progress("level_1");
    assert_eq!(progress.score, 100);
    assert_eq!(progress.stars, 3);
    assert!(progress.unlocked);
}

#[test]
fn pause_freezes_the_round() {
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        Mode::BrickMania,
        level_with(vec![ceiling(BrickKind::Normal)]),
        3,
        MemoryProgressStore::new(),
    );
    let mut input = LatestInput::new();
    input.press_launch();
    for _ in 0..5 {
        driver.update(TICK_DT, &mut input);
    }
    let before = *driver.snapshot().ball;
    assert!(before.is_moving());

    driver.pause();
    for _ in 0..120 {
        assert!(driver.update(TICK_DT, &mut input).is_empty());
    }
    assert_eq!(*driver.snapshot().ball, before);

    // Resuming after a long gap moves the ball by at most one tick
    driver.resume();
    driver.update(10.0, &mut input);
    assert_eq!(*driver.snapshot().ball, before);
    driver.update(TICK_DT, &mut input);
    let after = *driver.snapshot().ball;
    assert!(after.pos.distance(before.pos) <= before.speed + 1e-3);
}

#[test]
fn modes_sharing_a_progress_dir_keep_separate_records() {
    let dir = std::env::temp_dir().join(format!("brick_breaker_flow_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let challenge = Mode::Challenge(ChallengeDifficulty::Easy);

    // Challenge Easy level 1 cleared with a gold brick
    let store = JsonFileProgressStore::for_mode(&dir, challenge).expect("opens");
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        challenge,
        level_with(vec![ceiling(BrickKind::Material(Material::Gold))]),
        8,
        store,
    );
    play_until_terminal(&mut driver);
    assert_eq!(driver.snapshot().phase, RoundPhase::Won);

    // Brick Mania level 1 cleared with a normal brick
    let store = JsonFileProgressStore::for_mode(&dir, Mode::BrickMania).expect("opens");
    assert!(store.book().is_empty());
    let mut driver = GameDriver::from_level(
        GameSettings::default(),
        Mode::BrickMania,
        level_with(vec![ceiling(BrickKind::Normal)]),
        9,
        store,
    );
    play_until_terminal(&mut driver);
    assert_eq!(driver.snapshot().phase, RoundPhase::Won);

    let mania = JsonFileProgressStore::for_mode(&dir, Mode::BrickMania).expect("reopens");
    let easy = JsonFileProgressStore::for_mode(&dir, challenge).expect("reopens");
    assert_eq!(mania.load_progress("level_1").score, 10);
    assert!(mania.book().is_unlocked(2));
    assert_eq!(easy.load_progress("level_1").score, 100);
    // Challenge Easy has a single level, so nothing was unlocked there
    assert!(!easy.book().is_unlocked(2));

    let _ = std::fs::remove_dir_all(&dir);
}

fn play_until_terminal<S: ProgressStore>(driver: &mut GameDriver<S>) {
    let mut input = LatestInput::new();
    for _ in 0..5000 {
        if driver.snapshot().phase == RoundPhase::Ready {
            input.press_launch();
        }
        driver.update(TICK_DT, &mut input);
        if driver.snapshot().phase.is_terminal() {
            return;
        }
    }
    panic!("round did not finish");
}
