/// Transform motions: timed tweens, waits and loops that the animator plays
/// against scene nodes.
///
/// A motion is a flat sequence of steps, optionally looped forever. Tweens
/// capture their start value when the step begins, so chained `By` steps
/// accumulate from wherever the previous step left the node.
use glam::Vec3;

use crate::core::scene::{Node, NodePath, Property};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseInOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Target of a tween relative to its start value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    To(Vec3),
    By(Vec3),
    /// Only the y component moves.
    ToY(f32),
}

impl Change {
    fn sample(&self, start: Vec3, t: f32) -> Vec3 {
        if t >= 1.0 {
            return self.end(start);
        }
        match *self {
            Change::To(end) => start.lerp(end, t),
            Change::By(delta) => start + delta * t,
            Change::ToY(y) => Vec3::new(start.x, start.y + (y - start.y) * t, start.z),
        }
    }

    fn end(&self, start: Vec3) -> Vec3 {
        match *self {
            Change::To(end) => end,
            Change::By(delta) => start + delta,
            Change::ToY(y) => Vec3::new(start.x, y, start.z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Tween {
        property: Property,
        change: Change,
        duration: f32,
        easing: Easing,
    },
    Wait(f32),
}

impl Step {
    pub fn duration(&self) -> f32 {
        match *self {
            Step::Tween { duration, .. } => duration.max(0.0),
            Step::Wait(duration) => duration.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Motion {
    steps: Vec<Step>,
    repeat: bool,
}

impl Motion {
    pub fn tween(property: Property, change: Change, duration: f32) -> Self {
        Self {
            steps: vec![Step::Tween {
                property,
                change,
                duration,
                easing: Easing::Linear,
            }],
            repeat: false,
        }
    }

    pub fn rotate_to(target: Vec3, duration: f32) -> Self {
        Self::tween(Property::Rotation, Change::To(target), duration)
    }

    pub fn rotate_by(delta: Vec3, duration: f32) -> Self {
        Self::tween(Property::Rotation, Change::By(delta), duration)
    }

    pub fn scale_to(target: Vec3, duration: f32) -> Self {
        Self::tween(Property::Scale, Change::To(target), duration)
    }

    pub fn scale_y_to(y: f32, duration: f32) -> Self {
        Self::tween(Property::Scale, Change::ToY(y), duration)
    }

    pub fn wait(duration: f32) -> Self {
        Self {
            steps: vec![Step::Wait(duration)],
            repeat: false,
        }
    }

    /// Run every step of `motions` back to back.
    pub fn sequence<I: IntoIterator<Item = Motion>>(motions: I) -> Self {
        motions
            .into_iter()
            .fold(Self::default(), |acc, m| acc.then(m))
    }

    /// Append `next`'s steps after this motion's.
    pub fn then(mut self, next: Motion) -> Self {
        self.steps.extend(next.steps);
        self
    }

    /// Use `easing` for every tween in the motion.
    pub fn eased(mut self, easing: Easing) -> Self {
        for step in &mut self.steps {
            if let Step::Tween { easing: e, .. } = step {
                *e = easing;
            }
        }
        self
    }

    pub fn repeat_forever(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Length of one pass through the steps.
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(Step::duration).sum()
    }
}

#[derive(Debug, Clone)]
struct Running {
    path: NodePath,
    key: &'static str,
    motion: Motion,
    step: usize,
    elapsed: f32,
    start: Option<Vec3>,
}

impl Running {
    /// Advance by `dt` against `node`. Returns false once finished.
    fn advance(&mut self, mut dt: f32, node: &mut Node) -> bool {
        let steps = self.motion.steps.len();
        loop {
            if self.step >= steps {
                if !self.motion.repeat || steps == 0 {
                    return false;
                }
                self.step = 0;
                // A zero-length loop plays one pass per tick
                if self.motion.duration() <= 0.0 {
                    return true;
                }
            }

            let step = self.motion.steps[self.step];
            let duration = step.duration();
            let left = duration - self.elapsed;
            let finishing = dt >= left;
            let elapsed = if finishing { duration } else { self.elapsed + dt };

            if let Step::Tween { property, change, easing, .. } = step {
                let start = *self
                    .start
                    .get_or_insert_with(|| node.transform.get(property));
                let t = if duration > 0.0 { elapsed / duration } else { 1.0 };
                node.transform.set(property, change.sample(start, easing.apply(t)));
            }

            if !finishing {
                self.elapsed = elapsed;
                return true;
            }
            dt -= left.max(0.0);
            self.step += 1;
            self.elapsed = 0.0;
            self.start = None;
        }
    }
}

/// Plays keyed motions against a node tree.
///
/// A motion is identified by its target path plus a key; running a motion
/// under a key that is already playing on the same node replaces it.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    running: Vec<Running>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, path: &NodePath, key: &'static str, motion: Motion) {
        self.stop(path, key);
        self.running.push(Running {
            path: path.clone(),
            key,
            motion,
            step: 0,
            elapsed: 0.0,
            start: None,
        });
    }

    /// Stop a motion, leaving the node wherever it got to.
    pub fn stop(&mut self, path: &NodePath, key: &'static str) -> bool {
        let before = self.running.len();
        self.running.retain(|r| !(r.key == key && r.path == *path));
        self.running.len() != before
    }

    pub fn is_running(&self, path: &NodePath, key: &'static str) -> bool {
        self.running.iter().any(|r| r.key == key && r.path == *path)
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Advance every motion by `dt` seconds. Motions whose node no longer
    /// resolves are dropped.
    pub fn advance(&mut self, dt: f32, root: &mut Node) {
        let dt = dt.max(0.0);
        self.running.retain_mut(|r| match root.get_mut(&r.path) {
            Some(node) => r.advance(dt, node),
            None => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Node, NodePath) {
        let mut root = Node::pivot("root");
        let idx = root.add_child(Node::pivot("arm"));
        (root, NodePath::root().child(idx))
    }

    fn rot(root: &Node, path: &NodePath) -> Vec3 {
        root.get(path).unwrap().transform.rotation
    }

    #[test]
    fn tween_reaches_target_and_finishes() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        anim.run(&arm, "raise", Motion::rotate_to(Vec3::new(-1.0, 0.0, 0.0), 0.5));
        anim.advance(0.25, &mut root);
        assert!((rot(&root, &arm).x + 0.5).abs() < 1e-5);
        anim.advance(0.5, &mut root);
        assert_eq!(rot(&root, &arm).x, -1.0);
        assert!(!anim.is_running(&arm, "raise"));
    }

    #[test]
    fn leftover_time_carries_into_next_step() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        let m = Motion::rotate_to(Vec3::new(1.0, 0.0, 0.0), 0.5)
            .then(Motion::rotate_by(Vec3::new(0.0, 0.0, 1.0), 1.0));
        anim.run(&arm, "m", m);
        anim.advance(1.0, &mut root);
        let r = rot(&root, &arm);
        assert_eq!(r.x, 1.0);
        assert!((r.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn by_steps_accumulate() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        let wiggle = Motion::sequence([
            Motion::rotate_by(Vec3::new(0.0, 0.0, -0.4), 0.2),
            Motion::rotate_by(Vec3::new(0.0, 0.0, 0.4), 0.2),
            Motion::rotate_by(Vec3::new(0.0, 0.0, -0.4), 0.2),
        ]);
        anim.run(&arm, "w", wiggle);
        anim.advance(1.0, &mut root);
        assert!((rot(&root, &arm).z + 0.4).abs() < 1e-5);
    }

    #[test]
    fn repeating_motion_keeps_running() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        let tilt = Motion::rotate_to(Vec3::new(0.0, 0.0, 0.03), 2.0)
            .then(Motion::rotate_to(Vec3::new(0.0, 0.0, -0.03), 2.0))
            .repeat_forever();
        anim.run(&arm, "tilt", tilt);
        anim.advance(10.0, &mut root);
        assert!(anim.is_running(&arm, "tilt"));
        assert!((rot(&root, &arm).z - 0.03).abs() < 1e-5);
    }

    #[test]
    fn zero_length_loop_does_not_spin() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        anim.run(&arm, "snap", Motion::rotate_to(Vec3::ONE, 0.0).repeat_forever());
        anim.advance(1.0, &mut root);
        assert_eq!(rot(&root, &arm), Vec3::ONE);
        assert!(anim.is_running(&arm, "snap"));
    }

    #[test]
    fn same_key_replaces() {
        let (mut root, arm) = tree();
        let mut anim = Animator::new();
        anim.run(&arm, "k", Motion::rotate_to(Vec3::X, 1.0));
        anim.run(&arm, "k", Motion::rotate_to(Vec3::Y, 1.0));
        assert_eq!(anim.len(), 1);
        anim.advance(1.0, &mut root);
        assert_eq!(rot(&root, &arm), Vec3::Y);
    }

    #[test]
    fn stale_path_is_dropped() {
        let (mut root, _) = tree();
        let mut anim = Animator::new();
        let ghost = NodePath::root().child(9);
        anim.run(&ghost, "k", Motion::rotate_to(Vec3::X, 1.0));
        anim.advance(0.1, &mut root);
        assert!(anim.is_empty());
    }

    #[test]
    fn scale_y_keeps_other_axes() {
        let (mut root, arm) = tree();
        root.get_mut(&arm).unwrap().transform.scale = Vec3::new(1.2, 0.8, 1.0);
        let mut anim = Animator::new();
        anim.run(&arm, "jaw", Motion::scale_y_to(1.5, 0.1).eased(Easing::EaseInOut));
        anim.advance(0.2, &mut root);
        assert_eq!(root.get(&arm).unwrap().transform.scale, Vec3::new(1.2, 1.5, 1.0));
    }

    #[test]
    fn ease_in_out_endpoints() {
        assert_eq!(Easing::EaseInOut.apply(0.0), 0.0);
        assert_eq!(Easing::EaseInOut.apply(1.0), 1.0);
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
        assert!(Easing::EaseInOut.apply(0.25) < 0.25);
    }
}
