/// Blink scheduler: a self-rescheduling one-shot that closes and reopens
/// both eyes at random intervals, independent of actions and expressions.
use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::core::config::AvatarConfig;
use crate::core::engine::Rig;
use crate::core::motion::Motion;
use crate::core::timer::{TimerId, TimerKind, TimerSlot, Timers};

pub const BLINK_KEY: &str = "blink";

/// Close, hold, open.
pub fn blink_motion(config: &AvatarConfig) -> Motion {
    Motion::sequence([
        Motion::scale_to(Vec3::new(1.0, config.blink_squash, 1.0), config.blink_close),
        Motion::wait(config.blink_hold),
        Motion::scale_to(Vec3::ONE, config.blink_open),
    ])
}

#[derive(Debug, Clone, Default)]
pub struct BlinkScheduler {
    slot: TimerSlot,
}

impl BlinkScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the cycle unless a blink is already pending.
    pub fn ensure_running(&mut self, rig: &mut Rig<'_>) {
        if !self.slot.is_active(rig.timers) {
            self.schedule(rig);
        }
    }

    pub fn is_pending(&self, timers: &Timers) -> bool {
        self.slot.is_active(timers)
    }

    pub fn stop(&mut self, timers: &mut Timers) {
        self.slot.cancel(timers);
    }

    fn schedule(&mut self, rig: &mut Rig<'_>) {
        let (lo, hi) = rig.config.blink_delay;
        let delay = if hi > lo { rig.rng.gen_range(lo..=hi) } else { lo };
        let id = rig.timers.schedule_once(TimerKind::Blink, f64::from(delay));
        self.slot.replace(rig.timers, id);
        debug!(delay, "next blink scheduled");
    }

    /// Blink and queue the next cycle. Returns false for timers this
    /// scheduler doesn't own.
    pub fn on_timer(&mut self, id: TimerId, rig: &mut Rig<'_>) -> bool {
        if !self.slot.is(id) {
            return false;
        }
        self.slot.release();
        if let Some(parts) = rig.parts() {
            let motion = blink_motion(rig.config);
            rig.animator.run(&parts.eye_l, BLINK_KEY, motion.clone());
            rig.animator.run(&parts.eye_r, BLINK_KEY, motion);
        }
        self.schedule(rig);
        true
    }
}
