/// Preference persistence: a flat string key-value store, loaded from and
/// saved to RON, plus the appearance settings mapping onto its keys.
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::schema::appearance::{
    AccessoryType, AppearanceSettings, BackgroundTheme, CameraFilter, EarringStyle, EyeColor,
    FacialExpression, GlassesStyle, HairColor, HairStyle, HatStyle, Intensity, OutfitColor,
    OutfitPattern, OutfitStyle, SkinTone,
};

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceStore {
    values: FxHashMap<String, String>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, PrefsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(ron_str: &str) -> Result<Self, PrefsError> {
        let values: FxHashMap<String, String> = ron::from_str(ron_str)?;
        Ok(Self { values })
    }

    /// Serialize with keys in sorted order.
    pub fn to_ron(&self) -> Result<String, PrefsError> {
        let sorted: BTreeMap<&str, &str> = self
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        Ok(ron::ser::to_string_pretty(&sorted, ron::ser::PrettyConfig::default())?)
    }

    pub fn save_to_ron(&self, path: &Path) -> Result<(), PrefsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read a field through `parse`, falling back to `fallback` when the key is
/// missing or the stored value doesn't parse.
fn read<T>(store: &PreferenceStore, key: &str, fallback: T, parse: impl Fn(&str) -> Option<T>) -> T {
    match store.get(key) {
        None => fallback,
        Some(raw) => parse(raw).unwrap_or_else(|| {
            warn!(key, value = raw, "unrecognized preference value, using default");
            fallback
        }),
    }
}

fn parse_intensity(raw: &str) -> Option<Intensity> {
    raw.trim().parse::<f32>().ok().filter(|v| v.is_finite()).map(Intensity::new)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl AppearanceSettings {
    /// Restore settings from stored preferences. Enum values are accepted as
    /// keys or as display labels.
    pub fn load_from(store: &PreferenceStore) -> Self {
        let d = Self::default();
        Self {
            hair_color: read(store, "hairColor", d.hair_color, HairColor::from_stored),
            hair_style: read(store, "hairStyle", d.hair_style, HairStyle::from_stored),
            glasses_style: read(store, "glassesStyle", d.glasses_style, GlassesStyle::from_stored),
            outfit_color: read(store, "outfitColor", d.outfit_color, OutfitColor::from_stored),
            accessory: read(store, "accessory", d.accessory, AccessoryType::from_stored),
            skin_tone: read(store, "skinTone", d.skin_tone, SkinTone::from_stored),
            hat_style: read(store, "hatStyle", d.hat_style, HatStyle::from_stored),
            earring_style: read(store, "earringStyle", d.earring_style, EarringStyle::from_stored),
            background_theme: read(
                store,
                "backgroundTheme",
                d.background_theme,
                BackgroundTheme::from_stored,
            ),
            facial_expression: read(
                store,
                "facialExpression",
                d.facial_expression,
                FacialExpression::from_stored,
            ),
            outfit_pattern: read(store, "outfitPattern", d.outfit_pattern, OutfitPattern::from_stored),
            eye_color: read(store, "eyeColor", d.eye_color, EyeColor::from_stored),
            outfit_style: read(store, "outfitStyle", d.outfit_style, OutfitStyle::from_stored),
            camera_filter: read(store, "cameraFilter", d.camera_filter, CameraFilter::from_stored),
            wrinkle_intensity: read(store, "wrinkleIntensity", d.wrinkle_intensity, parse_intensity),
            grey_intensity: read(store, "greyIntensity", d.grey_intensity, parse_intensity),
            brow_thickness: read(store, "browThickness", d.brow_thickness, parse_intensity),
            has_lashes: read(store, "hasLashes", d.has_lashes, parse_bool),
        }
    }

    /// Write every field to the store under its preference key.
    pub fn save_to(&self, store: &mut PreferenceStore) {
        store.set("hairColor", self.hair_color.key());
        store.set("hairStyle", self.hair_style.key());
        store.set("glassesStyle", self.glasses_style.key());
        store.set("outfitColor", self.outfit_color.key());
        store.set("accessory", self.accessory.key());
        store.set("skinTone", self.skin_tone.key());
        store.set("hatStyle", self.hat_style.key());
        store.set("earringStyle", self.earring_style.key());
        store.set("backgroundTheme", self.background_theme.key());
        store.set("facialExpression", self.facial_expression.key());
        store.set("outfitPattern", self.outfit_pattern.key());
        store.set("eyeColor", self.eye_color.key());
        store.set("outfitStyle", self.outfit_style.key());
        store.set("cameraFilter", self.camera_filter.key());
        store.set("wrinkleIntensity", self.wrinkle_intensity.get().to_string());
        store.set("greyIntensity", self.grey_intensity.get().to_string());
        store.set("browThickness", self.brow_thickness.get().to_string());
        store.set("hasLashes", self.has_lashes.to_string());
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, PrefsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(ron_str: &str) -> Result<Self, PrefsError> {
        Ok(ron::from_str(ron_str)?)
    }
}
