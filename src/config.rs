//! Viewer configuration
//!
//! Every section has defaults reproducing the chair showroom scene, so a
//! config file only needs to list what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::viewer::catalog::{MaterialPreset, Rgb};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        match extension(path).as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            "ron" => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = match extension(path).as_str() {
            "toml" => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            "ron" => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Catalog index selected before the model loads
    pub initial_material: usize,
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub camera: CameraConfig,
    pub light: SpotLightConfig,
    pub ground: GroundConfig,
    /// Replaces the built-in catalog when present
    pub materials: Option<Vec<MaterialPreset>>,
}

impl Config for ViewerConfig {}

impl ViewerConfig {
    /// Rejects values the camera and window cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        self.camera.validate()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Showroom".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub placement: Placement,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("public/model/Chair_1v2.gltf"),
            placement: Placement::default(),
        }
    }
}

/// Fixed placement of the loaded model in the world
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub position: [f32; 3],
    /// XYZ Euler angles in radians
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [-1.0, 2.40, -1.0],
            rotation: [-std::f32::consts::FRAC_PI_2, 0.0, 0.0],
            scale: [0.005, 0.005, 0.005],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle bounds in radians, measured from +Y
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Fraction of the remaining orbit velocity applied per frame; 0 disables damping
    pub damping: f32,
    pub auto_rotate: bool,
    /// Orbit speed while auto-rotating; 2.0 is one turn every 30 seconds
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        let scalars = [
            ("fov_y", self.fov_y),
            ("near", self.near),
            ("far", self.far),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("min_polar_angle", self.min_polar_angle),
            ("max_polar_angle", self.max_polar_angle),
            ("damping", self.damping),
            ("auto_rotate_speed", self.auto_rotate_speed),
            ("rotate_speed", self.rotate_speed),
            ("zoom_speed", self.zoom_speed),
        ];
        let vectors = [("position", self.position), ("target", self.target)];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("camera.{name} must be finite, got {value}"));
        }
        if let Some((name, _)) = vectors.iter().find(|(_, v)| v.iter().any(|c| !c.is_finite())) {
            return invalid(format!("camera.{name} must be finite"));
        }

        if self.fov_y <= 0.0 || self.fov_y >= 180.0 {
            return invalid(format!("camera.fov_y {} is outside (0, 180)", self.fov_y));
        }
        if self.near <= 0.0 || self.near >= self.far {
            return invalid(format!(
                "camera clip range {}..{} is empty",
                self.near, self.far
            ));
        }
        if self.min_distance < 0.0 || self.min_distance > self.max_distance {
            return invalid(format!(
                "camera distance bounds {}..{} are inverted",
                self.min_distance, self.max_distance
            ));
        }
        if self.min_polar_angle < 0.0
            || self.max_polar_angle > std::f32::consts::PI
            || self.min_polar_angle > self.max_polar_angle
        {
            return invalid(format!(
                "camera polar bounds {}..{} must be ordered within 0..pi",
                self.min_polar_angle, self.max_polar_angle
            ));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            near: 1.0,
            far: 1000.0,
            position: [4.0, 5.0, 11.0],
            target: [0.0, 1.0, 0.0],
            min_distance: 5.0,
            max_distance: 20.0,
            min_polar_angle: 0.5,
            max_polar_angle: 1.5,
            damping: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLightConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub color: Rgb,
    pub intensity: f32,
    /// Cutoff distance; 0 means unlimited
    pub distance: f32,
    /// Half-angle of the cone in radians
    pub angle: f32,
    /// Fraction of the cone that fades out
    pub penumbra: f32,
    pub decay: f32,
    pub shadow_bias: f32,
    pub shadow_map_size: u32,
    pub ambient: f32,
}

impl Default for SpotLightConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 25.0, 0.0],
            target: [0.0, 0.0, 0.0],
            color: Rgb::WHITE,
            intensity: 3000.0,
            distance: 100.0,
            angle: 0.22,
            penumbra: 1.0,
            decay: 2.0,
            shadow_bias: -0.0001,
            shadow_map_size: 2048,
            ambient: 0.02,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub size: f32,
    pub segments: u32,
    pub color: Rgb,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            segments: 32,
            color: Rgb::from_hex(0x555555),
        }
    }
}
