/// Expression engine: poses the mouth and eyebrows for an [`Expression`].
use glam::Vec3;

use crate::core::figure::{Figure, BROW_REST_Y, FEATURE_REST_ROLL};
use crate::schema::state::Expression;

/// Target transforms for one expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionPose {
    pub mouth_scale: Vec3,
    /// Added to the mouth's horizontal resting roll.
    pub mouth_roll: f32,
    pub brow_y: f32,
    /// Left brow roll offset; the right brow gets the negation.
    pub brow_roll: f32,
}

impl ExpressionPose {
    pub fn mouth_rotation(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, FEATURE_REST_ROLL + self.mouth_roll)
    }

    /// Brow rotation for a side; `sign` is +1 for left, -1 for right.
    pub fn brow_rotation(&self, sign: f32) -> Vec3 {
        Vec3::new(0.0, 0.0, FEATURE_REST_ROLL + self.brow_roll * sign)
    }
}

pub fn expression_pose(expression: Expression) -> ExpressionPose {
    let (mouth_scale, mouth_roll, brow_y, brow_roll) = match expression {
        Expression::Neutral => (Vec3::ONE, 0.0, BROW_REST_Y, 0.0),
        Expression::Happy => (Vec3::new(1.2, 0.8, 1.0), 0.2, 0.24, 0.0),
        Expression::Sad => (Vec3::new(1.0, 0.8, 1.0), -0.2, BROW_REST_Y, -0.2),
        Expression::Surprised => (Vec3::new(0.5, 1.5, 1.0), 0.0, 0.28, 0.0),
        // Brows furrow inward
        Expression::Angry => (Vec3::new(1.0, 0.2, 1.0), 0.0, 0.20, 0.3),
    };
    ExpressionPose {
        mouth_scale,
        mouth_roll,
        brow_y,
        brow_roll,
    }
}

/// Snap the face to `expression`. Idempotent; parts that don't resolve are
/// skipped.
pub fn apply_expression(figure: &mut Figure, expression: Expression) {
    let pose = expression_pose(expression);
    let parts = figure.parts.clone();

    if let Some(mouth) = figure.node_mut(&parts.mouth) {
        mouth.transform.scale = pose.mouth_scale;
        mouth.transform.rotation = pose.mouth_rotation();
    }

    for (path, sign) in [(&parts.brow_l, 1.0), (&parts.brow_r, -1.0)] {
        if let Some(brow) = figure.node_mut(path) {
            brow.transform.position.y = pose.brow_y;
            brow.transform.rotation = pose.brow_rotation(sign);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::figure::build_with_rng;
    use crate::schema::appearance::AppearanceSettings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn figure() -> Figure {
        build_with_rng(&AppearanceSettings::default(), &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn neutral_matches_built_pose() {
        let built = figure();
        let mut posed = built.clone();
        apply_expression(&mut posed, Expression::Neutral);
        assert_eq!(built, posed);
    }

    #[test]
    fn apply_twice_is_apply_once() {
        for &expr in Expression::ALL {
            let mut once = figure();
            apply_expression(&mut once, expr);
            let mut twice = once.clone();
            apply_expression(&mut twice, expr);
            assert_eq!(once, twice, "{expr:?}");
        }
    }

    #[test]
    fn brows_mirror() {
        for &expr in Expression::ALL {
            let mut fig = figure();
            apply_expression(&mut fig, expr);
            let l = fig.node(&fig.parts.brow_l).unwrap().transform;
            let r = fig.node(&fig.parts.brow_r).unwrap().transform;
            assert_eq!(l.position.y, r.position.y);
            let lo = l.rotation.z - FEATURE_REST_ROLL;
            let ro = r.rotation.z - FEATURE_REST_ROLL;
            assert!((lo + ro).abs() < 1e-6, "{expr:?}");
            assert_eq!(expr.is_asymmetric(), lo.abs() > 1e-6);
        }
    }

    #[test]
    fn surprised_mouth_is_tall() {
        let mut fig = figure();
        apply_expression(&mut fig, Expression::Surprised);
        let mouth = fig.node(&fig.parts.mouth).unwrap();
        assert_eq!(mouth.transform.scale, Vec3::new(0.5, 1.5, 1.0));
    }

    #[test]
    fn switching_expressions_fully_overwrites() {
        let mut a = figure();
        apply_expression(&mut a, Expression::Angry);
        apply_expression(&mut a, Expression::Happy);
        let mut b = figure();
        apply_expression(&mut b, Expression::Happy);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_parts_are_skipped() {
        let mut fig = figure();
        fig.root.clear_children();
        apply_expression(&mut fig, Expression::Sad);
        assert!(fig.root.is_leaf());
    }
}
