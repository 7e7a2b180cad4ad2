//! Material presets and the catalog the viewer cycles through
//!
//! A preset is plain data: a display name plus the parameters of a physically
//! based surface. The catalog is fixed once the viewer is built.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// An sRGB color with components in `0.0..=1.0`
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Converts to linear space for shading
    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

fn default_ior() -> f32 {
    1.5
}

fn default_reflectivity() -> f32 {
    0.5
}

/// Named appearance preset
///
/// Optional parameters default to a plain dielectric: no transmission, no
/// clearcoat, an index of refraction of 1.5 and a reflectivity of 0.5.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialPreset {
    pub name: String,
    pub base_color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    #[serde(default)]
    pub transmission: f32,
    #[serde(default)]
    pub clearcoat: f32,
    #[serde(default)]
    pub clearcoat_roughness: f32,
    #[serde(default = "default_ior")]
    pub ior: f32,
    #[serde(default = "default_reflectivity")]
    pub reflectivity: f32,
}

impl MaterialPreset {
    /// Creates a preset with the basic PBR parameters
    ///
    /// # Arguments
    /// * `name` - Display label, unique within a catalog
    /// * `base_color` - sRGB base color
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    /// * `metalness` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub fn new(name: &str, base_color: Rgb, roughness: f32, metalness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            roughness: roughness.clamp(0.0, 1.0),
            metalness: metalness.clamp(0.0, 1.0),
            transmission: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            ior: default_ior(),
            reflectivity: default_reflectivity(),
        }
    }

    /// Builder pattern: Set transmission
    pub fn with_transmission(mut self, transmission: f32) -> Self {
        self.transmission = transmission.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set clearcoat strength and roughness
    pub fn with_clearcoat(mut self, clearcoat: f32, roughness: f32) -> Self {
        self.clearcoat = clearcoat.clamp(0.0, 1.0);
        self.clearcoat_roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set index of refraction
    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior.max(1.0);
        self
    }

    /// Builder pattern: Set reflectivity
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }

    /// Brings deserialized values back into their valid ranges
    fn clamped(self) -> Self {
        let name = self.name.clone();
        MaterialPreset::new(&name, self.base_color, self.roughness, self.metalness)
            .with_transmission(self.transmission)
            .with_clearcoat(self.clearcoat, self.clearcoat_roughness)
            .with_ior(self.ior)
            .with_reflectivity(self.reflectivity)
    }
}

/// Ordered, non-empty list of presets with unique names
#[derive(Clone, Debug)]
pub struct MaterialCatalog {
    presets: Vec<MaterialPreset>,
}

impl MaterialCatalog {
    pub fn new(presets: Vec<MaterialPreset>) -> Result<Self, CatalogError> {
        if presets.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for preset in &presets {
            if !seen.insert(preset.name.as_str()) {
                return Err(CatalogError::DuplicateName(preset.name.clone()));
            }
        }

        Ok(Self {
            presets: presets.into_iter().map(MaterialPreset::clamped).collect(),
        })
    }

    /// Returns the preset at `index`.
    ///
    /// Callers keep `index < len()`; the cursor wraps before it gets here.
    pub fn get(&self, index: usize) -> &MaterialPreset {
        &self.presets[index]
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialPreset> {
        self.presets.iter()
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self {
            presets: default_presets(),
        }
    }
}

/// The built-in palette
pub fn default_presets() -> Vec<MaterialPreset> {
    vec![
        MaterialPreset::new("Wood", Rgb::from_hex(0x8b5a2b), 0.8, 0.0),
        MaterialPreset::new("Mahogany", Rgb::from_hex(0x6b2d1a), 0.45, 0.0)
            .with_clearcoat(0.6, 0.2),
        MaterialPreset::new("Redwood", Rgb::from_hex(0xa45a52), 0.7, 0.0),
        MaterialPreset::new("Leaf", Rgb::from_hex(0x3a7d2c), 0.9, 0.0).with_transmission(0.15),
        MaterialPreset::new("Gold", Rgb::from_hex(0xffd700), 0.25, 1.0).with_reflectivity(1.0),
        MaterialPreset::new("Ruby", Rgb::from_hex(0xe0115f), 0.1, 0.0)
            .with_transmission(0.6)
            .with_ior(1.77)
            .with_clearcoat(1.0, 0.05),
        MaterialPreset::new("Silver", Rgb::from_hex(0xc0c0c0), 0.2, 1.0),
        MaterialPreset::new("Diamond", Rgb::WHITE, 0.0, 0.0)
            .with_transmission(0.95)
            .with_ior(2.42)
            .with_clearcoat(1.0, 0.0)
            .with_reflectivity(1.0),
    ]
}
