/// Engine integration tests: action, expression and lip-sync behaviour over
/// virtual time, rebuild ordering and configuration loading.
use avatar_engine::core::action::WAVE_KEY;
use avatar_engine::core::config::AvatarConfig;
use avatar_engine::core::engine::AvatarEngine;
use avatar_engine::core::expression::expression_pose;
use avatar_engine::core::timer::TimerKind;
use avatar_engine::schema::appearance::{AppearanceSettings, OutfitPattern};
use avatar_engine::schema::state::{Action, Expression};
use glam::Vec3;

fn engine() -> AvatarEngine {
    AvatarEngine::builder().seed(42).build().unwrap()
}

fn mouth_scale(engine: &AvatarEngine) -> Vec3 {
    let fig = engine.figure().unwrap();
    fig.node(&fig.parts.mouth).unwrap().transform.scale
}

#[test]
fn at_most_one_gesture_timer() {
    let mut e = engine();
    for action in [Action::TellStory, Action::TellStory, Action::TellStory] {
        e.apply_action(action);
        assert_eq!(e.timers().active_count(TimerKind::Gesture), 1);
    }
    for action in [
        Action::Wave,
        Action::Listen,
        Action::Celebrate,
        Action::Love,
        Action::Idle,
    ] {
        e.apply_action(Action::TellStory);
        e.apply_action(action);
        assert_eq!(e.timers().active_count(TimerKind::Gesture), 0, "{action:?}");
    }
}

#[test]
fn wave_after_story_runs_to_completion() {
    let mut e = engine();
    e.apply_action(Action::TellStory);
    e.tick(2.4);
    e.apply_action(Action::Wave);
    assert!(!e.gesture_active());
    // The story cycle would have fired at 2.5s and rested the arms
    e.tick(0.2);
    let fig = e.figure().unwrap();
    let p = fig.parts.clone();
    assert!(e.animator().is_running(&p.right_shoulder, WAVE_KEY));
    e.tick(3.0);
    let fig = e.figure().unwrap();
    assert!(fig.node(&p.right_shoulder).unwrap().transform.rotation.length() < 1e-4);
}

#[test]
fn rapid_speaking_toggle_leaves_expression_mouth() {
    for &expr in Expression::ALL {
        let mut e = engine();
        e.apply_expression(expr);
        e.apply_lip_sync(true);
        e.tick(0.16);
        e.apply_lip_sync(false);
        assert_eq!(mouth_scale(&e), expression_pose(expr).mouth_scale, "{expr:?}");
        assert_eq!(e.timers().active_count(TimerKind::LipSync), 0);
    }
}

#[test]
fn lip_sync_survives_rebuild() {
    let mut e = engine();
    e.apply_lip_sync(true);
    e.tick(0.5);
    let settings = AppearanceSettings {
        outfit_pattern: OutfitPattern::Stripes,
        ..e.settings().clone()
    };
    e.update_settings(settings).unwrap();
    assert!(e.is_speaking());
    assert_eq!(e.timers().active_count(TimerKind::LipSync), 1);
    e.tick(0.2);
    let y = mouth_scale(&e).y;
    assert!((0.5..=1.5).contains(&y));
}

#[test]
fn silence_after_rebuild_snaps_mouth() {
    let mut e = engine();
    e.apply_lip_sync(true);
    e.tick(0.3);
    e.update_settings(e.settings().clone()).unwrap();
    e.apply_lip_sync(false);
    assert_eq!(mouth_scale(&e), expression_pose(e.expression()).mouth_scale);
}

#[test]
fn blink_never_stacks() {
    let mut e = engine();
    for _ in 0..5 {
        e.apply_action(Action::Idle);
        e.apply_action(Action::Listen);
    }
    assert_eq!(e.timers().active_count(TimerKind::Blink), 1);
    for _ in 0..200 {
        e.tick(0.1);
        assert_eq!(e.timers().active_count(TimerKind::Blink), 1);
    }
}

#[test]
fn eyes_reopen_after_blink() {
    let mut e = engine();
    e.tick(10.0);
    // Whatever blinks happened, after a quiet stretch the eyes are open
    let mut settled = false;
    for _ in 0..400 {
        e.tick(0.01);
        let fig = e.figure().unwrap();
        let l = fig.node(&fig.parts.eye_l).unwrap().transform.scale;
        let r = fig.node(&fig.parts.eye_r).unwrap().transform.scale;
        assert_eq!(l, r);
        if l == Vec3::ONE {
            settled = true;
        }
    }
    assert!(settled);
}

#[test]
fn story_cycle_moves_arms() {
    let mut e = engine();
    e.apply_action(Action::TellStory);
    // Each tick spans one gesture firing plus time for its tween to land
    e.tick(0.9);
    let mut rotations = Vec::new();
    for _ in 0..4 {
        e.tick(2.5);
        let fig = e.figure().unwrap();
        rotations.push(fig.node(&fig.parts.right_shoulder).unwrap().transform.rotation);
    }
    // Spread, forward, rest, spread
    assert!((rotations[0] - Vec3::new(0.0, -0.2, -0.3)).length() < 1e-5);
    assert!((rotations[1] - Vec3::new(-0.4, 0.0, 0.0)).length() < 1e-5);
    assert!(rotations[2].length() < 1e-5);
    assert_eq!(rotations[3], rotations[0]);
}

#[test]
fn love_and_celebrate_poses() {
    let mut e = engine();
    e.apply_action(Action::Love);
    e.tick(1.0);
    let fig = e.figure().unwrap();
    let left = fig.node(&fig.parts.left_shoulder).unwrap().transform.rotation;
    let right = fig.node(&fig.parts.right_shoulder).unwrap().transform.rotation;
    assert!((left - Vec3::new(-1.2, 0.5, 0.0)).length() < 1e-5);
    assert!((right - Vec3::new(-1.2, -0.5, 0.0)).length() < 1e-5);

    e.apply_action(Action::Celebrate);
    e.tick(1.0);
    let fig = e.figure().unwrap();
    let left = fig.node(&fig.parts.left_shoulder).unwrap().transform.rotation;
    assert!((left - Vec3::new(-2.5, 0.0, 0.2)).length() < 1e-5);
}

#[test]
fn idle_returns_arms_to_rest() {
    let mut e = engine();
    e.apply_action(Action::Celebrate);
    e.tick(1.0);
    e.apply_action(Action::Idle);
    e.tick(1.0);
    let fig = e.figure().unwrap();
    for path in [&fig.parts.left_shoulder, &fig.parts.right_shoulder] {
        assert!(fig.node(path).unwrap().transform.rotation.length() < 1e-5);
    }
}

#[test]
fn config_file_drives_timing() {
    let mut e = AvatarEngine::builder()
        .config_path("tests/fixtures/config.ron")
        .build()
        .unwrap();
    assert_eq!(e.config().gesture_interval, 1.0);
    assert_eq!(e.config().seed, Some(7));
    e.apply_action(Action::TellStory);
    e.tick(1.05);
    let fig = e.figure().unwrap();
    let right = fig.node(&fig.parts.right_shoulder).unwrap().transform.rotation;
    assert!(right.z < 0.0);
}

#[test]
fn direct_config_overrides_path() {
    let config = AvatarConfig {
        gesture_interval: 3.0,
        ..AvatarConfig::default()
    };
    let e = AvatarEngine::builder()
        .config(config)
        .config_path("tests/fixtures/does_not_exist.ron")
        .seed(1)
        .build()
        .unwrap();
    assert_eq!(e.config().gesture_interval, 3.0);
}

#[test]
fn missing_config_file_is_error() {
    let result = AvatarEngine::builder()
        .config_path("tests/fixtures/does_not_exist.ron")
        .build();
    assert!(result.is_err());
}

#[test]
fn virtual_clock_advances() {
    let mut e = engine();
    e.tick(0.25);
    e.tick(0.25);
    assert!((e.now() - 0.5).abs() < 1e-9);
    e.tick(-1.0);
    assert!((e.now() - 0.5).abs() < 1e-9);
}

#[test]
fn zero_blink_delay_is_rejected_at_build() {
    let config = AvatarConfig {
        blink_delay: (0.0, 0.0),
        ..AvatarConfig::default()
    };
    let result = AvatarEngine::builder().config(config).seed(1).build();
    assert!(result.is_err());
}

#[test]
fn non_finite_tick_is_ignored() {
    let mut e = engine();
    e.apply_action(Action::TellStory);
    e.apply_lip_sync(true);
    e.tick(0.5);
    for dt in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
        e.tick(dt);
        assert!((e.now() - 0.5).abs() < 1e-9);
    }
    e.tick(0.5);
    assert!((e.now() - 1.0).abs() < 1e-9);
}
