//! Avatar Engine: procedural 3D avatar construction and animation.
//!
//! Assembles a parametrized humanoid figure from primitive geometry driven
//! by appearance settings, generates tileable outfit textures, and drives
//! the figure's body and face through idle, gesture, expression, lip-sync
//! and blink behaviour on a caller-supplied clock.

pub mod core;
pub mod schema;
