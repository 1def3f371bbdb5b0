/// Appearance settings: the closed enumerations and slider values that
/// parametrize the figure.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Declares a closed appearance enumeration with its persistence keys,
/// display labels, the full case list and the default case.
macro_rules! appearance_enum {
    (
        $(#[$meta:meta])*
        $name:ident (default $default:ident) {
            $($variant:ident => $key:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every case, in presentation order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Stable key used for persistence.
            pub fn key(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Inverse of [`Self::key`].
            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Inverse of [`Self::label`].
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Parse a persisted value written either as a key or, by older
            /// stores, as the display label.
            pub fn from_stored(raw: &str) -> Option<Self> {
                Self::from_key(raw).or_else(|| Self::from_label(raw))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

appearance_enum! {
    HairColor (default Gray) {
        Gray => "gray", "Silver Gray";
        White => "white", "Snow White";
        Blonde => "blonde", "Golden Blonde";
        Brown => "brown", "Chestnut Brown";
        Black => "black", "Midnight Black";
        Red => "red", "Auburn Red";
    }
}

appearance_enum! {
    HairStyle (default Bun) {
        Bun => "bun", "Classic Bun";
        Bob => "bob", "Short Bob";
        Long => "long", "Loose Waves";
        Pixie => "pixie", "Pixie Cut";
    }
}

appearance_enum! {
    GlassesStyle (default Round) {
        Round => "round", "Round";
        Square => "square", "Square";
        CatEye => "catEye", "Cat Eye";
        None => "none", "None";
    }
}

appearance_enum! {
    OutfitColor (default Lavender) {
        Lavender => "lavender", "Lavender";
        Teal => "teal", "Teal";
        Rose => "rose", "Dusty Rose";
        Navy => "navy", "Navy Blue";
        Floral => "floral", "Spring Floral";
    }
}

appearance_enum! {
    /// Necklace-level accessory worn on the chest.
    AccessoryType (default Pearl) {
        Pearl => "pearl", "Pearls";
        Gold => "gold", "Gold Chain";
        Scarf => "scarf", "Silk Scarf";
        Brooch => "brooch", "Ruby Brooch";
        None => "none", "None";
    }
}

appearance_enum! {
    SkinTone (default Light) {
        Light => "light", "Light";
        Medium => "medium", "Medium";
        Olive => "olive", "Olive";
        Tan => "tan", "Tan";
        Deep => "deep", "Deep";
    }
}

appearance_enum! {
    HatStyle (default None) {
        None => "none", "None";
        SunHat => "sunHat", "Sun Hat";
        Beanie => "beanie", "Cozy Beanie";
        Beret => "beret", "Vintage Beret";
    }
}

appearance_enum! {
    EarringStyle (default None) {
        None => "none", "None";
        Pearl => "pearl", "Pearl Drops";
        GoldHoop => "goldHoop", "Gold Hoops";
        Diamond => "diamond", "Diamond Studs";
    }
}

appearance_enum! {
    BackgroundTheme (default Gradient) {
        CozyRoom => "cozyRoom", "Cozy Room";
        Garden => "garden", "Spring Garden";
        Library => "library", "Old Library";
        Gradient => "gradient", "Soft Gradient";
    }
}

appearance_enum! {
    /// Resting facial expression chosen in the customizer.
    FacialExpression (default Smile) {
        Neutral => "neutral", "Neutral";
        Smile => "smile", "Smile";
        Laughing => "laughing", "Laughing";
        Surprised => "surprised", "Surprised";
    }
}

appearance_enum! {
    OutfitPattern (default Solid) {
        Solid => "solid", "Solid";
        Stripes => "stripes", "Stripes";
        PolkaDots => "polkaDots", "Polka Dots";
        Plaid => "plaid", "Plaid";
        Floral => "floral", "Floral";
    }
}

appearance_enum! {
    EyeColor (default Green) {
        Green => "green", "Green";
        Blue => "blue", "Blue";
        Brown => "brown", "Brown";
        Hazel => "hazel", "Hazel";
        Grey => "grey", "Grey";
    }
}

appearance_enum! {
    OutfitStyle (default Cardigan) {
        Cardigan => "cardigan", "Knit Cardigan";
        Dress => "dress", "Sunday Dress";
        Blouse => "blouse", "Silk Blouse";
    }
}

appearance_enum! {
    CameraFilter (default None) {
        None => "none", "Original";
        Warm => "warm", "Warm";
        Cool => "cool", "Cool";
        Sepia => "sepia", "Sepia";
        Noir => "noir", "Noir";
    }
}

/// A slider value clamped to `0.0..=1.0`. NaN collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Intensity(f32);

impl Intensity {
    pub const ZERO: Intensity = Intensity(0.0);
    pub const HALF: Intensity = Intensity(0.5);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f32> for Intensity {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Intensity> for f32 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

/// The complete appearance of the figure. Every field always holds a valid
/// value; missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub hair_color: HairColor,
    pub hair_style: HairStyle,
    pub glasses_style: GlassesStyle,
    pub outfit_color: OutfitColor,
    pub accessory: AccessoryType,
    pub skin_tone: SkinTone,
    pub hat_style: HatStyle,
    pub earring_style: EarringStyle,
    pub background_theme: BackgroundTheme,
    pub facial_expression: FacialExpression,
    pub outfit_pattern: OutfitPattern,
    pub eye_color: EyeColor,
    pub outfit_style: OutfitStyle,
    pub camera_filter: CameraFilter,
    pub wrinkle_intensity: Intensity,
    pub grey_intensity: Intensity,
    pub brow_thickness: Intensity,
    pub has_lashes: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            hair_color: HairColor::default(),
            hair_style: HairStyle::default(),
            glasses_style: GlassesStyle::default(),
            outfit_color: OutfitColor::default(),
            accessory: AccessoryType::default(),
            skin_tone: SkinTone::default(),
            hat_style: HatStyle::default(),
            earring_style: EarringStyle::default(),
            background_theme: BackgroundTheme::default(),
            facial_expression: FacialExpression::default(),
            outfit_pattern: OutfitPattern::default(),
            eye_color: EyeColor::default(),
            outfit_style: OutfitStyle::default(),
            camera_filter: CameraFilter::default(),
            wrinkle_intensity: Intensity::ZERO,
            grey_intensity: Intensity::ZERO,
            brow_thickness: Intensity::HALF,
            has_lashes: false,
        }
    }
}

fn pick<T: Copy + Default, R: Rng + ?Sized>(all: &[T], rng: &mut R) -> T {
    all.choose(rng).copied().unwrap_or_default()
}

impl AppearanceSettings {
    /// A copy with every look-defining choice drawn at random.
    ///
    /// Background, camera filter and the sliders are scene preferences
    /// rather than part of the look, so they are carried over unchanged.
    pub fn randomized<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            hair_color: pick(HairColor::ALL, rng),
            hair_style: pick(HairStyle::ALL, rng),
            glasses_style: pick(GlassesStyle::ALL, rng),
            outfit_color: pick(OutfitColor::ALL, rng),
            accessory: pick(AccessoryType::ALL, rng),
            skin_tone: pick(SkinTone::ALL, rng),
            hat_style: pick(HatStyle::ALL, rng),
            earring_style: pick(EarringStyle::ALL, rng),
            facial_expression: pick(FacialExpression::ALL, rng),
            outfit_pattern: pick(OutfitPattern::ALL, rng),
            eye_color: pick(EyeColor::ALL, rng),
            outfit_style: pick(OutfitStyle::ALL, rng),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn keys_round_trip_for_every_case() {
        for c in HairColor::ALL {
            assert_eq!(HairColor::from_key(c.key()), Some(*c));
        }
        for c in GlassesStyle::ALL {
            assert_eq!(GlassesStyle::from_key(c.key()), Some(*c));
        }
        for c in HatStyle::ALL {
            assert_eq!(HatStyle::from_key(c.key()), Some(*c));
        }
        for c in OutfitPattern::ALL {
            assert_eq!(OutfitPattern::from_key(c.key()), Some(*c));
        }
        assert_eq!(HairStyle::from_key("mohawk"), None);
    }

    #[test]
    fn labels_match_customizer() {
        assert_eq!(HairColor::Gray.label(), "Silver Gray");
        assert_eq!(EarringStyle::GoldHoop.label(), "Gold Hoops");
        assert_eq!(CameraFilter::None.label(), "Original");
    }

    #[test]
    fn defaults() {
        let s = AppearanceSettings::default();
        assert_eq!(s.hair_color, HairColor::Gray);
        assert_eq!(s.hair_style, HairStyle::Bun);
        assert_eq!(s.glasses_style, GlassesStyle::Round);
        assert_eq!(s.accessory, AccessoryType::Pearl);
        assert_eq!(s.hat_style, HatStyle::None);
        assert_eq!(s.facial_expression, FacialExpression::Smile);
        assert_eq!(s.background_theme, BackgroundTheme::Gradient);
        assert_eq!(s.brow_thickness.get(), 0.5);
        assert!(!s.has_lashes);
    }

    #[test]
    fn intensity_clamps() {
        assert_eq!(Intensity::new(1.7).get(), 1.0);
        assert_eq!(Intensity::new(-0.3).get(), 0.0);
        assert_eq!(Intensity::new(f32::NAN).get(), 0.0);
        assert_eq!(Intensity::new(0.25).get(), 0.25);
    }

    #[test]
    fn intensity_clamps_when_deserialized() {
        let s: AppearanceSettings =
            ron::from_str("(wrinkle_intensity: 3.5, grey_intensity: -1.0)").unwrap();
        assert_eq!(s.wrinkle_intensity.get(), 1.0);
        assert_eq!(s.grey_intensity.get(), 0.0);
        // Unspecified fields fall back to defaults
        assert_eq!(s.brow_thickness.get(), 0.5);
        assert_eq!(s.hair_style, HairStyle::Bun);
    }

    #[test]
    fn ron_round_trip() {
        let s = AppearanceSettings {
            glasses_style: GlassesStyle::CatEye,
            hat_style: HatStyle::SunHat,
            outfit_pattern: OutfitPattern::PolkaDots,
            has_lashes: true,
            ..AppearanceSettings::default()
        };
        let text = ron::to_string(&s).unwrap();
        assert!(text.contains("catEye"));
        let back: AppearanceSettings = ron::from_str(&text).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn labels_parse_as_stored_values() {
        assert_eq!(HairColor::from_label("Silver Gray"), Some(HairColor::Gray));
        assert_eq!(HairColor::from_stored("Silver Gray"), Some(HairColor::Gray));
        assert_eq!(HairColor::from_stored("gray"), Some(HairColor::Gray));
        assert_eq!(CameraFilter::from_stored("Original"), Some(CameraFilter::None));
        assert_eq!(HairColor::from_stored("silver gray"), None);
        for c in OutfitStyle::ALL {
            assert_eq!(OutfitStyle::from_stored(c.label()), Some(*c));
        }
    }

    #[test]
    fn randomized_keeps_scene_preferences() {
        let base = AppearanceSettings {
            camera_filter: CameraFilter::Noir,
            background_theme: BackgroundTheme::Library,
            wrinkle_intensity: Intensity::new(0.8),
            ..AppearanceSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let r = base.randomized(&mut rng);
            assert_eq!(r.camera_filter, CameraFilter::Noir);
            assert_eq!(r.background_theme, BackgroundTheme::Library);
            assert_eq!(r.wrinkle_intensity.get(), 0.8);
        }
    }

    #[test]
    fn randomized_varies() {
        let base = AppearanceSettings::default();
        let mut rng = StdRng::seed_from_u64(42);
        let differs = (0..20).any(|_| base.randomized(&mut rng) != base);
        assert!(differs, "Expected at least one randomized look to differ");
    }
}
