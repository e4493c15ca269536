//! Editor configuration.
//!
//! All tunables live in [`EditorConfig`]. Every section uses
//! `#[serde(default)]`, so a RON file only needs to name the values it
//! overrides:
//!
//! ```
//! let config = editor_core::EditorConfig::from_ron_str(
//!     "(camera: (fov_y_degrees: 60.0), render: (tick_interval_ms: 16))",
//! ).unwrap();
//! assert_eq!(config.camera.fov_y_degrees, 60.0);
//! assert_eq!(config.camera.near, 0.01);
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub camera: CameraConfig,
    pub controller: ControllerConfig,
    pub render: RenderConfig,
}

/// Camera placement and projection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position, relative to the root node.
    pub eye: [f32; 3],
    /// Initial look-at target, relative to the root node.
    pub target: [f32; 3],
}

/// Sensitivities of the transform operators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distance moved per unit step.
    pub translate_sensitivity: f32,
    /// Rotation per unit step, in degrees.
    pub rotate_step_degrees: f32,
    /// Lower clamp applied to `step + 1` before scaling.
    pub scale_floor: f32,
    /// Exponent damping the scale response.
    pub scale_exponent: f32,
    /// Pointer pixels per unit step when dragging.
    pub drag_divisor: f32,
}

/// Frame loop and initial scene layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tick_interval_ms: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Edge length of the skybox cube.
    pub skybox_size: f32,
    /// Fixed offset applied by the root node.
    pub root_offset: [f32; 3],
    /// Initial light position, relative to the root node.
    pub light_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.01,
            far: 1000.0,
            eye: [-8.0, 8.0, -8.0],
            target: [0.0, 6.0, 0.0],
        }
    }
}

impl CameraConfig {
    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.eye)
    }

    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            translate_sensitivity: 0.5,
            rotate_step_degrees: 5.0,
            scale_floor: 0.1,
            scale_exponent: 0.5,
            drag_divisor: 50.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
            viewport_width: 1280,
            viewport_height: 720,
            skybox_size: 500.0,
            root_offset: [0.0, -1.0, 0.0],
            light_position: [0.0, 12.0, 0.0],
        }
    }
}

impl RenderConfig {
    /// Viewport aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height.max(1) as f32
    }

    pub fn root_offset(&self) -> Vec3 {
        Vec3::from_array(self.root_offset)
    }

    pub fn light_position(&self) -> Vec3 {
        Vec3::from_array(self.light_position)
    }
}

impl EditorConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron_str(text: &str) -> std::result::Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Read and parse the RON configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|err| Error::Internal(err.to_string()))
    }
}
