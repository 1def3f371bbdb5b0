/// Action state machine: body language for idle, wave, tellStory, listen,
/// celebrate and love.
///
/// Application is level-triggered. Re-applying the current action after a
/// rebuild restores its looping parts (idle tilt, blink cycle, gesture
/// timer) without stacking duplicates.
use glam::Vec3;
use tracing::debug;

use crate::core::blink::BlinkScheduler;
use crate::core::engine::Rig;
use crate::core::figure::{FigureParts, ELBOW_SETTLE_X};
use crate::core::motion::Motion;
use crate::core::timer::{TimerId, TimerKind, TimerSlot, Timers};
use crate::schema::state::Action;

pub const ARMS_KEY: &str = "arms";
pub const WAVE_KEY: &str = "wave";
pub const WAVE_ELBOW_KEY: &str = "waveElbow";
pub const IDLE_TILT_KEY: &str = "idleTilt";
pub const HEAD_KEY: &str = "head";

/// Phases of the storytelling gesture cycle.
const STORY_PHASES: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ActionMachine {
    current: Action,
    gesture: TimerSlot,
    phase: usize,
}

impl ActionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Action {
        self.current
    }

    /// Whether the periodic gesture timer is live.
    pub fn gesture_active(&self, timers: &Timers) -> bool {
        self.gesture.is_active(timers)
    }

    /// Next storytelling phase to play.
    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn apply(&mut self, action: Action, rig: &mut Rig<'_>, blink: &mut BlinkScheduler) {
        if action != self.current {
            debug!(from = ?self.current, to = ?action, "action change");
        }
        self.current = action;

        if !action.keeps_gesture_timer() {
            self.gesture.cancel(rig.timers);
        }

        match action {
            Action::Idle => {
                rest_arms(rig);
                start_idle_tilt(rig);
                blink.ensure_running(rig);
            }
            Action::Wave => wave(rig),
            Action::TellStory => {
                if !self.gesture.is_active(rig.timers) {
                    self.phase = 0;
                    let id = rig.timers.schedule_repeating(
                        TimerKind::Gesture,
                        f64::from(rig.config.gesture_interval),
                    );
                    self.gesture.replace(rig.timers, id);
                    debug!("gesture cycle started");
                }
            }
            Action::Listen => {
                rest_arms(rig);
                if let Some(parts) = rig.parts() {
                    rig.animator.stop(&parts.head, IDLE_TILT_KEY);
                    rig.animator.run(
                        &parts.head,
                        HEAD_KEY,
                        Motion::rotate_to(Vec3::new(0.1, 0.1, 0.0), rig.config.listen_tween),
                    );
                }
            }
            Action::Celebrate => pose_arms(
                rig,
                Vec3::new(-2.5, 0.0, 0.2),
                Vec3::new(-2.5, 0.0, -0.2),
                0.5,
            ),
            Action::Love => pose_arms(
                rig,
                Vec3::new(-1.2, 0.5, 0.0),
                Vec3::new(-1.2, -0.5, 0.0),
                0.6,
            ),
        }
    }

    /// Play the next storytelling phase. Returns false for timers this
    /// machine doesn't own.
    pub fn on_timer(&mut self, id: TimerId, rig: &mut Rig<'_>) -> bool {
        if !self.gesture.is(id) {
            return false;
        }
        match self.phase {
            0 => pose_arms(
                rig,
                Vec3::new(0.0, 0.2, 0.3),
                Vec3::new(0.0, -0.2, -0.3),
                0.8,
            ),
            1 => {
                rest_arms(rig);
                if let Some(parts) = rig.parts() {
                    rig.animator.run(
                        &parts.right_shoulder,
                        ARMS_KEY,
                        Motion::rotate_to(Vec3::new(-0.4, 0.0, 0.0), 0.6),
                    );
                }
            }
            _ => rest_arms(rig),
        }
        self.phase = (self.phase + 1) % STORY_PHASES;
        true
    }
}

/// Cut an in-flight wave short, letting the elbow straighten.
fn cancel_wave(rig: &mut Rig<'_>, parts: &FigureParts) {
    rig.animator.stop(&parts.right_shoulder, WAVE_KEY);
    if rig.animator.stop(&parts.right_elbow, WAVE_ELBOW_KEY) {
        rig.animator.run(
            &parts.right_elbow,
            ARMS_KEY,
            Motion::rotate_to(Vec3::ZERO, rig.config.rest_tween),
        );
    }
}

fn pose_arms(rig: &mut Rig<'_>, left: Vec3, right: Vec3, duration: f32) {
    let Some(parts) = rig.parts() else {
        return;
    };
    cancel_wave(rig, &parts);
    rig.animator
        .run(&parts.left_shoulder, ARMS_KEY, Motion::rotate_to(left, duration));
    rig.animator
        .run(&parts.right_shoulder, ARMS_KEY, Motion::rotate_to(right, duration));
}

fn rest_arms(rig: &mut Rig<'_>) {
    let duration = rig.config.rest_tween;
    pose_arms(rig, Vec3::ZERO, Vec3::ZERO, duration);
}

fn start_idle_tilt(rig: &mut Rig<'_>) {
    let Some(parts) = rig.parts() else {
        return;
    };
    rig.animator.stop(&parts.head, HEAD_KEY);
    if rig.animator.is_running(&parts.head, IDLE_TILT_KEY) {
        return;
    }
    let angle = rig.config.idle_tilt_angle;
    let period = rig.config.idle_tilt_period;
    let tilt = Motion::rotate_to(Vec3::new(0.0, 0.0, angle), period)
        .then(Motion::rotate_to(Vec3::new(0.0, 0.0, -angle), period))
        .repeat_forever();
    rig.animator.run(&parts.head, IDLE_TILT_KEY, tilt);
}

/// Right arm waves while the elbow bends, holds and settles.
fn wave(rig: &mut Rig<'_>) {
    let Some(parts) = rig.parts() else {
        return;
    };
    if rig.animator.is_running(&parts.right_shoulder, WAVE_KEY) {
        return;
    }
    rig.animator.stop(&parts.right_shoulder, ARMS_KEY);
    rig.animator.stop(&parts.right_elbow, ARMS_KEY);

    let swing = Vec3::new(0.0, 0.0, 0.4);
    let mut arm = Motion::rotate_to(Vec3::new(-0.8, 0.0, -0.4), 0.4);
    for _ in 0..3 {
        arm = arm
            .then(Motion::rotate_by(-swing, 0.2))
            .then(Motion::rotate_by(swing, 0.2));
    }
    arm = arm.then(Motion::rotate_to(Vec3::ZERO, 0.5));

    let elbow = Motion::sequence([
        Motion::rotate_to(Vec3::new(-2.0, 0.0, 0.0), 0.4),
        Motion::wait(1.2),
        Motion::rotate_to(Vec3::new(ELBOW_SETTLE_X, 0.0, 0.0), 0.5),
    ]);

    rig.animator.run(&parts.right_shoulder, WAVE_KEY, arm);
    rig.animator.run(&parts.right_elbow, WAVE_ELBOW_KEY, elbow);
    debug!("wave started");
}
