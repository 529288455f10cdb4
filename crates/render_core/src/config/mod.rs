//! Configuration system
//!
//! Small trait-based layer for reading and writing settings files in
//! TOML or RON, picked by file extension. Scene data that belongs in
//! files rather than code, like camera tuning and the lighting rig,
//! implements [`Config`] and gets the load/save plumbing for free.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Point3, Vec3};
use crate::render::camera::Camera;
use crate::render::lighting::LightingRig;

/// Configuration trait
///
/// Types implementing this serialize to and from `.toml` and `.ron`
/// files. The format is chosen by extension so configs can move
/// between formats without code changes.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Camera placement and control tuning
///
/// Everything needed to reconstruct a [`Camera`] from a settings file.
/// Angles are degrees, matching how the camera stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Starting position in world space
    pub position: Vec3,
    /// Starting yaw in degrees
    pub yaw: f32,
    /// Starting pitch in degrees
    pub pitch: f32,
    /// Keyboard movement speed in units per second
    pub speed: f32,
    /// Mouse look sensitivity in degrees per pixel
    pub sensitivity: f32,
    /// Field of view in degrees
    pub zoom: f32,
}

impl CameraConfig {
    /// Validate the configuration against the camera's own limits
    pub fn validate(&self) -> Result<(), String> {
        if self.pitch.abs() > Camera::PITCH_LIMIT {
            return Err(format!(
                "Camera pitch {} exceeds the {} degree limit",
                self.pitch,
                Camera::PITCH_LIMIT
            ));
        }
        if !(Camera::MIN_ZOOM..=Camera::MAX_ZOOM).contains(&self.zoom) {
            return Err(format!(
                "Camera zoom {} outside the {}..{} degree range",
                self.zoom,
                Camera::MIN_ZOOM,
                Camera::MAX_ZOOM
            ));
        }
        if self.speed <= 0.0 {
            return Err("Camera speed must be positive".to_string());
        }
        if self.sensitivity <= 0.0 {
            return Err("Camera sensitivity must be positive".to_string());
        }
        Ok(())
    }

    /// Build a camera from this configuration
    pub fn to_camera(&self) -> Camera {
        let mut camera = Camera::new(
            Point3::from(self.position),
            Vec3::new(0.0, 1.0, 0.0),
            self.yaw,
            self.pitch,
        );
        camera.set_movement_speed(self.speed);
        camera.set_mouse_sensitivity(self.sensitivity);
        camera.set_zoom(self.zoom);
        camera
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            yaw: Camera::DEFAULT_YAW,
            pitch: Camera::DEFAULT_PITCH,
            speed: Camera::DEFAULT_SPEED,
            sensitivity: Camera::DEFAULT_SENSITIVITY,
            zoom: Camera::DEFAULT_ZOOM,
        }
    }
}

impl Config for CameraConfig {}

impl Config for LightingRig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_config_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.ron");

        let config = CameraConfig {
            position: Vec3::new(1.0, 2.0, 8.0),
            yaw: -45.0,
            pitch: 15.0,
            speed: 4.0,
            sensitivity: 0.2,
            zoom: 30.0,
        };
        config.save_to_file(&path).unwrap();

        let loaded = CameraConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_camera_config_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.toml");

        let config = CameraConfig::default();
        config.save_to_file(&path).unwrap();

        let loaded = CameraConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.yaml");

        match CameraConfig::default().save_to_file(&path) {
            Err(ConfigError::UnsupportedFormat(name)) => assert!(name.ends_with("camera.yaml")),
            other => panic!("Expected unsupported-format error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = CameraConfig {
            pitch: 120.0,
            ..CameraConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("pitch"));

        config.pitch = 0.0;
        config.zoom = 90.0;
        assert!(config.validate().unwrap_err().contains("zoom"));

        config.zoom = 45.0;
        config.speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_camera_applies_tuning() {
        let config = CameraConfig {
            position: Vec3::new(0.0, 1.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            speed: 5.0,
            sensitivity: 0.25,
            zoom: 20.0,
        };
        let camera = config.to_camera();

        assert_relative_eq!(camera.position(), Point3::new(0.0, 1.0, 3.0));
        assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_eq!(camera.movement_speed(), 5.0);
        assert_eq!(camera.mouse_sensitivity(), 0.25);
        assert_eq!(camera.zoom(), 20.0);
    }

    #[test]
    fn test_lighting_rig_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lighting_rig.ron");

        let rig = LightingRig::showroom();
        rig.save_to_file(&path).unwrap();

        let loaded = LightingRig::load_from_file(&path).unwrap();
        assert_eq!(loaded, rig);
    }
}
