/// Outfit pattern textures: tileable 512×512 bitmaps tinted by a base colour.
///
/// Every pattern except `floral` is a pure function of its inputs; floral
/// draws its rosettes from the supplied random source.
use glam::Vec2;
use image::{Rgba, RgbaImage};
use rand::Rng;
use std::f32::consts::TAU;
use std::fmt;
use thiserror::Error;

use crate::schema::appearance::OutfitPattern;
use crate::schema::palette::Color;

/// Edge length of every generated texture, in pixels.
pub const TEXTURE_SIZE: u32 = 512;

const STRIPE_WIDTH: f32 = 20.0;
const STRIPE_SPACING: f32 = 40.0;
const DOT_RADIUS: f32 = 16.0;
const DOT_SPACING: f32 = 64.0;
const PLAID_THICK: f32 = 40.0;
const PLAID_THIN: f32 = 10.0;
const PLAID_SPACING: f32 = 120.0;
const ROSETTE_COUNT: usize = 80;
const PETALS: usize = 5;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
}

/// A generated pattern image, tagged with the inputs that produced it.
#[derive(Clone, PartialEq)]
pub struct Texture {
    pattern: OutfitPattern,
    base: Color,
    image: RgbaImage,
}

impl Texture {
    pub fn pattern(&self) -> OutfitPattern {
        self.pattern
    }

    pub fn base(&self) -> Color {
        self.base
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("pattern", &self.pattern)
            .field("base", &self.base)
            .field("size", &(self.image.width(), self.image.height()))
            .finish()
    }
}

/// Generate a texture using the thread-local random source for floral.
pub fn generate_texture(pattern: OutfitPattern, base: Color) -> Result<Texture, TextureError> {
    generate_texture_with_rng(pattern, base, &mut rand::thread_rng())
}

/// Generate a texture, drawing any randomness from `rng`.
pub fn generate_texture_with_rng<R: Rng + ?Sized>(
    pattern: OutfitPattern,
    base: Color,
    rng: &mut R,
) -> Result<Texture, TextureError> {
    let mut canvas = Canvas::new(TEXTURE_SIZE, TEXTURE_SIZE)?;
    canvas.fill_all(base.with_alpha(1.0));

    // Accent that stays visible on any base
    let accent = if base.is_light() {
        Color::BLACK.with_alpha(0.3)
    } else {
        Color::WHITE.with_alpha(0.4)
    };

    match pattern {
        OutfitPattern::Solid => {}
        OutfitPattern::Stripes => draw_stripes(&mut canvas, accent),
        OutfitPattern::PolkaDots => draw_polka_dots(&mut canvas, accent),
        OutfitPattern::Plaid => draw_plaid(&mut canvas, base),
        OutfitPattern::Floral => draw_floral(&mut canvas, accent, rng),
    }

    Ok(Texture {
        pattern,
        base,
        image: canvas.image,
    })
}

fn draw_stripes(canvas: &mut Canvas, accent: Color) {
    let w = canvas.width();
    let h = canvas.height();
    let mut y = -h;
    while y < h * 2.0 {
        canvas.stroke_line(Vec2::new(0.0, y), Vec2::new(w, y + h), STRIPE_WIDTH, accent);
        y += STRIPE_SPACING;
    }
}

fn draw_polka_dots(canvas: &mut Canvas, accent: Color) {
    let w = canvas.width();
    let h = canvas.height();
    let radii = Vec2::splat(DOT_RADIUS);
    let mut offset_row = false;
    let mut y = 0.0;
    while y < h + DOT_SPACING {
        let mut x = if offset_row { DOT_SPACING / 2.0 } else { 0.0 };
        while x < w + DOT_SPACING {
            canvas.fill_ellipse(Vec2::new(x, y), radii, 0.0, accent, Blend::SourceOver);
            x += DOT_SPACING;
        }
        offset_row = !offset_row;
        y += DOT_SPACING;
    }
}

fn draw_plaid(canvas: &mut Canvas, base: Color) {
    let w = canvas.width();
    let h = canvas.height();
    let (dark, light) = if base.is_light() {
        (Color::BLACK.with_alpha(0.2), Color::WHITE.with_alpha(0.4))
    } else {
        (Color::WHITE.with_alpha(0.2), Color::BLACK.with_alpha(0.4))
    };

    let mut x = 0.0;
    while x < w + PLAID_SPACING {
        canvas.fill_rect(x, 0.0, PLAID_THICK, h, dark);
        x += PLAID_SPACING;
    }
    // Crossing the vertical bands darkens the intersections
    let mut y = 0.0;
    while y < h + PLAID_SPACING {
        canvas.fill_rect(0.0, y, w, PLAID_THICK, dark);
        y += PLAID_SPACING;
    }

    let mut x = PLAID_THICK / 2.0;
    while x < w + PLAID_SPACING {
        canvas.fill_rect(x - PLAID_THIN / 2.0, 0.0, PLAID_THIN, h, light);
        x += PLAID_SPACING;
    }
    let mut y = PLAID_THICK / 2.0;
    while y < h + PLAID_SPACING {
        canvas.fill_rect(0.0, y - PLAID_THIN / 2.0, w, PLAID_THIN, light);
        y += PLAID_SPACING;
    }
}

fn draw_floral<R: Rng + ?Sized>(canvas: &mut Canvas, accent: Color, rng: &mut R) {
    let w = canvas.width();
    let h = canvas.height();
    for _ in 0..ROSETTE_COUNT {
        let center = Vec2::new(rng.gen_range(0.0..=w), rng.gen_range(0.0..=h));
        let radius: f32 = rng.gen_range(8.0..=24.0);
        let mut angle: f32 = rng.gen_range(0.0..TAU);

        // Each petal is the ellipse inscribed in (0, 0, r, 1.5r) of a frame
        // rotated a further fifth of a turn per petal.
        let local_center = Vec2::new(radius / 2.0, radius * 0.75);
        let petal_radii = Vec2::new(radius / 2.0, radius * 0.75);
        for _ in 0..PETALS {
            angle += TAU / PETALS as f32;
            let petal_center = center + Vec2::from_angle(angle).rotate(local_center);
            canvas.fill_ellipse(petal_center, petal_radii, angle, accent, Blend::SourceOver);
        }

        // Punch the flower core back out
        canvas.fill_ellipse(center, Vec2::splat(radius / 3.0), 0.0, Color::CLEAR, Blend::Clear);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blend {
    SourceOver,
    Clear,
}

/// Minimal raster target: axis-aligned rects, rotated ellipses and thick
/// lines, sampled at pixel centres.
struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        let len = width as usize * height as usize * 4;
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| TextureError::Allocation { width, height })?;
        buf.resize(len, 0);
        let image = RgbaImage::from_raw(width, height, buf)
            .ok_or(TextureError::Allocation { width, height })?;
        Ok(Self { image })
    }

    fn width(&self) -> f32 {
        self.image.width() as f32
    }

    fn height(&self) -> f32 {
        self.image.height() as f32
    }

    fn fill_all(&mut self, color: Color) {
        let px = Rgba(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn paint(&mut self, x: u32, y: u32, color: Color, blend: Blend) {
        let p = self.image.get_pixel_mut(x, y);
        match blend {
            Blend::Clear => *p = Rgba([0, 0, 0, 0]),
            Blend::SourceOver => {
                let [r, g, b, a] = p.0;
                let dst = Color::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                );
                let sa = color.a;
                let out_a = sa + dst.a * (1.0 - sa);
                if out_a <= 0.0 {
                    *p = Rgba([0, 0, 0, 0]);
                    return;
                }
                let mix = |s: f32, d: f32| (s * sa + d * dst.a * (1.0 - sa)) / out_a;
                let out = Color::rgba(
                    mix(color.r, dst.r),
                    mix(color.g, dst.g),
                    mix(color.b, dst.b),
                    out_a,
                );
                *p = Rgba(out.to_rgba8());
            }
        }
    }

    /// Pixel index range whose centres fall inside `[lo, hi)`.
    fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<u32> {
        let start = (lo - 0.5).ceil().max(0.0) as u32;
        let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u32;
        start.min(limit)..end
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let xs = Self::span(x, x + w, self.image.width());
        let ys = Self::span(y, y + h, self.image.height());
        for py in ys {
            for px in xs.clone() {
                self.paint(px, py, color, Blend::SourceOver);
            }
        }
    }

    /// Fill an ellipse with semi-axes `radii`, rotated by `angle` radians.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, angle: f32, color: Color, blend: Blend) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let reach = radii.max_element();
        let xs = Self::span(center.x - reach, center.x + reach + 1.0, self.image.width());
        let ys = Self::span(center.y - reach, center.y + reach + 1.0, self.image.height());
        let unrotate = Vec2::from_angle(-angle);
        for py in ys {
            for px in xs.clone() {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let local = unrotate.rotate(p - center) / radii;
                if local.length_squared() <= 1.0 {
                    self.paint(px, py, color, blend);
                }
            }
        }
    }

    /// Stroke the segment `a → b` with butt caps.
    fn stroke_line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color) {
        let along = b - a;
        let length = along.length();
        if length <= f32::EPSILON {
            return;
        }
        let dir = along / length;
        let half = width / 2.0;
        let limit_w = self.image.width();
        for py in 0..self.image.height() {
            let y = py as f32 + 0.5;
            let xs = if dir.y.abs() < 1e-6 {
                if (y - a.y).abs() > half {
                    continue;
                }
                Self::span(a.x.min(b.x), a.x.max(b.x), limit_w)
            } else {
                let center_x = a.x + (y - a.y) * dir.x / dir.y;
                let reach = half / dir.y.abs();
                Self::span(center_x - reach, center_x + reach, limit_w)
            };
            for px in xs {
                let p = Vec2::new(px as f32 + 0.5, y);
                let t = (p - a).dot(dir);
                if (0.0..=length).contains(&t) {
                    self.paint(px, py, color, Blend::SourceOver);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::appearance::OutfitColor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gen(pattern: OutfitPattern, base: Color) -> Texture {
        let mut rng = StdRng::seed_from_u64(1);
        generate_texture_with_rng(pattern, base, &mut rng).unwrap()
    }

    #[test]
    fn every_pattern_is_full_size() {
        for pattern in OutfitPattern::ALL {
            for color in OutfitColor::ALL {
                let t = gen(*pattern, color.color());
                assert_eq!((t.width(), t.height()), (TEXTURE_SIZE, TEXTURE_SIZE));
                assert_eq!(t.pattern(), *pattern);
            }
        }
    }

    #[test]
    fn solid_is_flat() {
        let base = OutfitColor::Rose.color();
        let t = gen(OutfitPattern::Solid, base);
        let expected = base.to_rgba8();
        assert!(t.image().pixels().all(|p| p.0 == expected));
    }

    #[test]
    fn stripes_are_deterministic() {
        let red = Color::rgb(0.8, 0.1, 0.1);
        let a = generate_texture(OutfitPattern::Stripes, red).unwrap();
        let b = generate_texture(OutfitPattern::Stripes, red).unwrap();
        assert_eq!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn stripes_follow_the_diagonal() {
        let base = OutfitColor::Lavender.color();
        let t = gen(OutfitPattern::Stripes, base);
        let plain = base.to_rgba8();
        // On the stripe through the origin
        assert_ne!(t.pixel(100, 100), plain);
        // Midway between two stripes
        assert_eq!(t.pixel(120, 100), plain);
    }

    #[test]
    fn light_base_gets_darker_accent() {
        let base = OutfitColor::Lavender.color();
        let t = gen(OutfitPattern::Stripes, base);
        let plain = base.to_rgba8();
        let striped = t.pixel(100, 100);
        assert!(striped[0] < plain[0]);
        assert_eq!(striped[3], 255);
    }

    #[test]
    fn dark_base_gets_lighter_accent() {
        let base = OutfitColor::Navy.color();
        let t = gen(OutfitPattern::Stripes, base);
        let plain = base.to_rgba8();
        let striped = t.pixel(100, 100);
        assert!(striped[0] > plain[0]);
        assert!(striped[2] > plain[2]);
    }

    #[test]
    fn polka_dots_stagger_alternate_rows() {
        let base = OutfitColor::Teal.color();
        let t = gen(OutfitPattern::PolkaDots, base);
        let plain = base.to_rgba8();
        // First row: dots on multiples of the spacing
        assert_ne!(t.pixel(64, 0), plain);
        assert_eq!(t.pixel(32, 0), plain);
        // Second row: shifted by half the spacing
        assert_ne!(t.pixel(32, 64), plain);
        assert_eq!(t.pixel(0, 64), plain);
    }

    #[test]
    fn plaid_intersections_are_darker() {
        let base = OutfitColor::Lavender.color();
        let t = gen(OutfitPattern::Plaid, base);
        let plain = base.to_rgba8();
        let single = t.pixel(10, 200);
        let crossed = t.pixel(10, 10);
        assert_eq!(t.pixel(200, 200), plain);
        assert!(single[0] < plain[0]);
        assert!(crossed[0] < single[0]);
        // Thin light band brightens the thick dark one it crosses
        assert!(t.pixel(20, 200)[0] > single[0]);
    }

    #[test]
    fn floral_depends_on_random_source() {
        let base = OutfitColor::Floral.color();
        let a = generate_texture_with_rng(OutfitPattern::Floral, base, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = generate_texture_with_rng(OutfitPattern::Floral, base, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let c = generate_texture_with_rng(OutfitPattern::Floral, base, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a.image().as_raw(), b.image().as_raw());
        assert_ne!(a.image().as_raw(), c.image().as_raw());
    }

    #[test]
    fn floral_cores_are_transparent() {
        let t = gen(OutfitPattern::Floral, OutfitColor::Floral.color());
        assert!(t.image().pixels().any(|p| p.0[3] == 0));
        assert!(t.image().pixels().any(|p| p.0[3] == 255));
    }

    #[test]
    fn debug_omits_pixels() {
        let t = gen(OutfitPattern::Solid, Color::WHITE);
        let text = format!("{:?}", t);
        assert!(text.contains("Solid"));
        assert!(text.len() < 200);
    }
}
