/// Colour values and the per-enum colour tables used by the figure builder.
use serde::{Deserialize, Serialize};

use super::appearance::{BackgroundTheme, CameraFilter, EyeColor, HairColor, OutfitColor, SkinTone};

/// A linear RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque grey with the given white level.
    pub const fn white(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Perceptual white level (Rec. 601 luma), ignoring alpha.
    pub fn white_level(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// True when the colour reads as light: white level of at least 0.5.
    pub fn is_light(&self) -> bool {
        self.white_level() >= 0.5
    }

    /// Component-wise linear interpolation toward `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Quantize to 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Silver the hair is pulled toward as grey intensity rises.
pub const SILVER: Color = Color::rgb(0.88, 0.88, 0.92);

/// Fixed lip colour; not driven by skin tone.
pub const DUSTY_ROSE: Color = Color::rgb(0.82, 0.52, 0.50);

impl HairColor {
    pub fn color(&self) -> Color {
        match self {
            Self::Gray => SILVER,
            Self::White => Color::white(0.98),
            Self::Blonde => Color::rgb(0.96, 0.87, 0.60),
            Self::Brown => Color::rgb(0.45, 0.35, 0.25),
            Self::Black => Color::white(0.2),
            Self::Red => Color::rgb(0.70, 0.30, 0.20),
        }
    }
}

impl OutfitColor {
    pub fn color(&self) -> Color {
        match self {
            Self::Lavender => Color::rgb(0.80, 0.75, 0.92),
            Self::Teal => Color::rgb(0.30, 0.60, 0.65),
            Self::Rose => Color::rgb(0.85, 0.55, 0.55),
            Self::Navy => Color::rgb(0.20, 0.25, 0.40),
            // Cream base meant to sit under a pattern
            Self::Floral => Color::rgb(0.95, 0.90, 0.80),
        }
    }
}

impl SkinTone {
    pub fn color(&self) -> Color {
        match self {
            Self::Light => Color::rgb(0.96, 0.87, 0.78),
            Self::Medium => Color::rgb(0.92, 0.80, 0.70),
            Self::Olive => Color::rgb(0.85, 0.75, 0.60),
            Self::Tan => Color::rgb(0.75, 0.60, 0.45),
            Self::Deep => Color::rgb(0.55, 0.40, 0.30),
        }
    }
}

impl EyeColor {
    pub fn color(&self) -> Color {
        match self {
            Self::Green => Color::rgb(0.30, 0.60, 0.35),
            Self::Blue => Color::rgb(0.35, 0.55, 0.80),
            Self::Brown => Color::rgb(0.45, 0.30, 0.18),
            Self::Hazel => Color::rgb(0.55, 0.45, 0.25),
            Self::Grey => Color::rgb(0.55, 0.60, 0.62),
        }
    }
}

impl BackgroundTheme {
    /// Top and bottom stops of the backdrop gradient behind the figure.
    pub fn backdrop(&self) -> (Color, Color) {
        match self {
            Self::CozyRoom => (Color::rgb(0.96, 0.86, 0.72), Color::rgb(0.70, 0.50, 0.38)),
            Self::Garden => (Color::rgb(0.80, 0.93, 0.98), Color::rgb(0.55, 0.75, 0.45)),
            Self::Library => (Color::rgb(0.55, 0.42, 0.32), Color::rgb(0.28, 0.20, 0.16)),
            Self::Gradient => (Color::rgb(0.99, 0.93, 0.92), Color::rgb(0.90, 0.85, 0.96)),
        }
    }
}

impl CameraFilter {
    /// Apply the filter's look to a single colour. Alpha is preserved.
    pub fn grade(&self, c: Color) -> Color {
        match self {
            Self::None => c,
            Self::Warm => Color::rgba(
                (c.r * 1.08).min(1.0),
                c.g * 0.98,
                c.b * 0.85,
                c.a,
            ),
            Self::Cool => Color::rgba(c.r * 0.88, c.g * 0.97, (c.b * 1.08).min(1.0), c.a),
            Self::Sepia => Color::rgba(
                (0.393 * c.r + 0.769 * c.g + 0.189 * c.b).min(1.0),
                (0.349 * c.r + 0.686 * c.g + 0.168 * c.b).min(1.0),
                (0.272 * c.r + 0.534 * c.g + 0.131 * c.b).min(1.0),
                c.a,
            ),
            Self::Noir => {
                let w = c.white_level();
                Color::rgba(w, w, w, c.a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noir_is_greyscale() {
        let graded = CameraFilter::Noir.grade(OutfitColor::Teal.color());
        assert_eq!(graded.r, graded.g);
        assert_eq!(graded.g, graded.b);
    }

    #[test]
    fn unfiltered_grade_is_identity() {
        let c = Color::rgba(0.3, 0.6, 0.65, 0.4);
        assert_eq!(CameraFilter::None.grade(c), c);
    }

    #[test]
    fn warm_and_cool_shift_balance() {
        let c = Color::white(0.5);
        let warm = CameraFilter::Warm.grade(c);
        let cool = CameraFilter::Cool.grade(c);
        assert!(warm.r > warm.b);
        assert!(cool.b > cool.r);
    }

    #[test]
    fn light_and_dark_classification() {
        assert!(Color::WHITE.is_light());
        assert!(!Color::BLACK.is_light());
        assert!(OutfitColor::Lavender.color().is_light());
        assert!(!OutfitColor::Navy.color().is_light());
        assert!(!OutfitColor::Teal.color().is_light());
    }

    #[test]
    fn lerp_endpoints() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 2.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rgba8_quantization() {
        assert_eq!(Color::WHITE.to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(Color::CLEAR.to_rgba8(), [0, 0, 0, 0]);
        assert_eq!(Color::rgba(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn every_palette_entry_is_opaque() {
        for c in HairColor::ALL {
            assert_eq!(c.color().a, 1.0);
        }
        for c in SkinTone::ALL {
            assert_eq!(c.color().a, 1.0);
        }
        for c in EyeColor::ALL {
            assert_eq!(c.color().a, 1.0);
        }
    }
}
