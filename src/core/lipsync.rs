/// Lip-sync driver: jitters the mouth's vertical scale while speaking.
use rand::Rng;
use tracing::debug;

use crate::core::engine::Rig;
use crate::core::expression::apply_expression;
use crate::core::motion::{Easing, Motion};
use crate::core::timer::{TimerId, TimerKind, TimerSlot, Timers};
use crate::schema::state::Expression;

pub const LIP_SYNC_KEY: &str = "lipSync";

#[derive(Debug, Clone, Default)]
pub struct LipSync {
    slot: TimerSlot,
}

impl LipSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level-triggered: start while `speaking`, otherwise stop and settle
    /// the mouth back into `expression`.
    pub fn apply(&mut self, speaking: bool, expression: Expression, rig: &mut Rig<'_>) {
        if speaking {
            self.start(rig);
        } else {
            self.stop(expression, rig);
        }
    }

    pub fn is_active(&self, timers: &Timers) -> bool {
        self.slot.is_active(timers)
    }

    fn start(&mut self, rig: &mut Rig<'_>) {
        if self.slot.is_active(rig.timers) {
            return;
        }
        let id = rig
            .timers
            .schedule_repeating(TimerKind::LipSync, f64::from(rig.config.lip_sync_period));
        self.slot.replace(rig.timers, id);
        debug!("lip sync started");
    }

    fn stop(&mut self, expression: Expression, rig: &mut Rig<'_>) {
        if self.slot.is_active(rig.timers) {
            debug!("lip sync stopped");
        }
        self.slot.cancel(rig.timers);
        if let Some(figure) = rig.figure.as_deref_mut() {
            rig.animator.stop(&figure.parts.mouth, LIP_SYNC_KEY);
            apply_expression(figure, expression);
        }
    }

    pub fn on_timer(&mut self, id: TimerId, rig: &mut Rig<'_>) -> bool {
        if !self.slot.is(id) {
            return false;
        }
        let Some(parts) = rig.parts() else {
            return true;
        };
        let (lo, hi) = rig.config.lip_sync_range;
        let open = if hi > lo { rig.rng.gen_range(lo..=hi) } else { lo };
        rig.animator.run(
            &parts.mouth,
            LIP_SYNC_KEY,
            Motion::scale_y_to(open, rig.config.lip_sync_tween).eased(Easing::EaseInOut),
        );
        true
    }
}
