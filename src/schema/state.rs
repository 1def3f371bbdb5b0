use serde::{Deserialize, Serialize};

use super::appearance::FacialExpression;

/// Body language the figure is performing.
///
/// `Idle` is both the initial state and the natural rest state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    #[default]
    Idle,
    Wave,
    TellStory,
    Listen,
    Celebrate,
    Love,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::Idle,
        Action::Wave,
        Action::TellStory,
        Action::Listen,
        Action::Celebrate,
        Action::Love,
    ];

    /// Whether entering this state keeps the periodic gesture timer alive.
    pub fn keeps_gesture_timer(&self) -> bool {
        matches!(self, Self::TellStory)
    }
}

/// Facial expression driving the mouth and eyebrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    #[default]
    Neutral,
    Happy,
    Sad,
    Surprised,
    Angry,
}

impl Expression {
    pub const ALL: &'static [Expression] = &[
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Surprised,
        Expression::Angry,
    ];

    /// Expressions whose eyebrows tilt in opposite directions.
    pub fn is_asymmetric(&self) -> bool {
        matches!(self, Self::Sad | Self::Angry)
    }
}

impl FacialExpression {
    /// The expression the face rests in for this customizer choice.
    pub fn baseline(&self) -> Expression {
        match self {
            Self::Neutral => Expression::Neutral,
            Self::Smile | Self::Laughing => Expression::Happy,
            Self::Surprised => Expression::Surprised,
        }
    }
}
