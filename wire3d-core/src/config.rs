//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//! ```json
//! { "fov": 90.0, "position": [0.0, 1.0, -6.0] }
//! ```

use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraError};
use crate::geometry::Color;
use crate::transform::Orientation;
use crate::viewport::Resolution;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid camera settings: {0}")]
    Camera(#[from] CameraError),
}

/// Initial camera state and control tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub resolution: Resolution,
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub focal_length: f32,
    pub position: Point3<f32>,
    pub orientation: Orientation,
    /// World units per second
    pub move_speed: f32,
    pub fast_move_speed: f32,
    /// Radians per pixel of mouse drag
    pub mouse_sensitivity: f32,
    /// Radians per key press
    pub rotate_step: f32,
    /// Degrees per key press
    pub fov_step: f32,
    /// Multiplier applied per focal length key press
    pub focal_step: f32,
    pub edge_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fov: 120.0,
            focal_length: 1.0,
            position: Point3::new(0.0, 0.0, -5.0),
            orientation: Orientation::zero(),
            move_speed: 2.0,
            fast_move_speed: 5.0,
            mouse_sensitivity: 1.0 / 100.0,
            rotate_step: 0.05,
            fov_step: 1.0,
            focal_step: 2.0,
            edge_color: Color::WHITE,
        }
    }
}

impl ViewConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects settings that would produce a degenerate camera
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera()?;
        Ok(())
    }

    pub fn camera(&self) -> Result<Camera, CameraError> {
        self.camera_with_resolution(self.resolution)
    }

    /// Builds the configured camera for a render target of another size
    pub fn camera_with_resolution(&self, resolution: Resolution) -> Result<Camera, CameraError> {
        let mut camera = Camera::new(resolution, self.fov, self.focal_length)?;
        camera.position = self.position;
        camera.orientation = self.orientation;
        Ok(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        let camera = config.camera().unwrap();
        assert_eq!(camera.resolution(), Resolution::new(960, 720).unwrap());
        assert_eq!(camera.fov().horizontal, 120.0);
        assert_eq!(camera.fov().vertical, 90.0);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = ViewConfig::from_json(
            r#"{ "fov": 90.0, "position": [1.0, 2.0, 3.0], "orientation": { "yaw": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.fov, 90.0);
        assert_eq!(config.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(config.orientation, Orientation::new(0.5, 0.0, 0.0));
        assert_eq!(config.focal_length, 1.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ViewConfig {
            fov: 75.0,
            edge_color: Color::new(10, 20, 30),
            ..ViewConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(ViewConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ViewConfig::from_json(r#"{ "focal_length": -1.0 }"#),
            Err(ConfigError::Camera(CameraError::InvalidFocalLength(_)))
        ));
        assert!(matches!(
            ViewConfig::from_json(r#"{ "resolution": { "width": 0, "height": 10 } }"#),
            Err(ConfigError::Camera(CameraError::InvalidResolution { .. }))
        ));
        assert!(matches!(ViewConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }
}
