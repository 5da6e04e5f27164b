//! Application configuration
//!
//! Everything the demo shell needs to start up — window, camera, scene
//! content, and lights — lives in one [`AppConfig`] that can be loaded from
//! a RON file. Every field has a default, so a partial (or absent) config
//! file still yields a runnable scene.

use crate::foundation::math::Vec3;
use crate::render::lighting::{DirLight, PointLight, SceneLights, SpotLight};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file missing or unreadable
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid RON
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Window creation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 720,
            title: "Lighting Scene".to_string(),
        }
    }
}

impl WindowConfig {
    /// Width over height as f32
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Initial camera placement and tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position in world space
    pub position: Vec3,
    /// World-up reference
    pub world_up: Vec3,
    /// Starting heading in degrees
    pub yaw: f32,
    /// Starting elevation in degrees
    pub pitch: f32,
    /// Movement speed in units per second
    pub movement_speed: f32,
    /// Look sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 8.0),
            world_up: Vec3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 3.0,
            mouse_sensitivity: 0.1,
        }
    }
}

/// Scene content: asset paths and object placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// OBJ model drawn at every entry of `cube_positions`
    pub container_model: String,
    /// Diffuse texture for the containers
    pub diffuse_texture: String,
    /// Specular map for the containers
    pub specular_texture: String,
    /// OBJ model surrounding the scene
    pub skybox_model: String,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order
    pub skybox_faces: [String; 6],
    /// World positions of the container instances
    pub cube_positions: Vec<Vec3>,
    /// Specular exponent of the container material
    pub shininess: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            container_model: "assets/box.obj".to_string(),
            diffuse_texture: "assets/container2.png".to_string(),
            specular_texture: "assets/container2_specular.png".to_string(),
            skybox_model: "assets/skybox.obj".to_string(),
            skybox_faces: [
                "assets/skybox/right.jpg".to_string(),
                "assets/skybox/left.jpg".to_string(),
                "assets/skybox/top.jpg".to_string(),
                "assets/skybox/bottom.jpg".to_string(),
                "assets/skybox/front.jpg".to_string(),
                "assets/skybox/back.jpg".to_string(),
            ],
            cube_positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(3.0, 1.0, -5.0),
                Vec3::new(-3.0, 0.5, -4.0),
                Vec3::new(-2.0, -1.0, -8.0),
                Vec3::new(2.5, -0.5, -3.0),
                Vec3::new(-1.5, 2.0, -6.0),
                Vec3::new(1.5, -1.5, -2.0),
                Vec3::new(2.0, 1.5, -7.0),
                Vec3::new(0.5, 0.5, -1.5),
                Vec3::new(-2.5, 0.0, -3.5),
            ],
            shininess: 32.0,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window parameters
    pub window: WindowConfig,
    /// Camera start state
    pub camera: CameraConfig,
    /// Scene content
    pub scene: SceneConfig,
    /// Scene lights; defaults to one of each kind
    pub lights: SceneLights,
}

impl AppConfig {
    /// Load configuration from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = ron::from_str(&text)?;
        log::info!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it is absent
    ///
    /// A file that exists but fails to parse is still an error; only a
    /// missing file silently falls back.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "config {} not found, using defaults",
                    path.as_ref().display()
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// The demo scene: a warm/cool three-point-light arrangement
    ///
    /// Dim directional fill, three colored point lights (purple, pink,
    /// orange), and a bright camera-following flashlight. Used when no
    /// config file overrides the lights.
    pub fn demo_scene() -> Self {
        let colored_point = |position: Vec3, diffuse: Vec3| PointLight {
            position,
            constant: 1.0,
            linear: 0.07,
            quadratic: 0.017,
            ambient: diffuse * 0.1,
            specular: diffuse,
            diffuse,
        };

        let lights = SceneLights {
            dir_lights: vec![DirLight {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                ambient: Vec3::new(0.08, 0.08, 0.08),
                diffuse: Vec3::new(0.3, 0.3, 0.3),
                specular: Vec3::new(0.4, 0.4, 0.4),
            }],
            point_lights: vec![
                colored_point(Vec3::new(4.0, 3.0, -2.0), Vec3::new(0.6, 0.2, 0.8)),
                colored_point(Vec3::new(-4.0, 3.0, -5.0), Vec3::new(1.0, 0.4, 0.7)),
                colored_point(Vec3::new(0.0, 4.0, -8.0), Vec3::new(1.0, 0.55, 0.1)),
            ],
            spot_lights: vec![SpotLight {
                ambient: Vec3::zeros(),
                diffuse: Vec3::new(2.0, 2.0, 2.0),
                specular: Vec3::new(2.5, 2.5, 2.5),
                linear: 0.045,
                quadratic: 0.0075,
                ..SpotLight::default()
            }],
        };

        Self {
            lights,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_describe_a_square_window() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 720);
        assert_eq!(config.window.height, 720);
        assert!((config.window.aspect_ratio() - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.scene.cube_positions.len(), 10);
    }

    #[test]
    fn demo_scene_has_three_colored_point_lights() {
        let config = AppConfig::demo_scene();
        assert_eq!(config.lights.point_lights.len(), 3);
        let purple = &config.lights.point_lights[0];
        assert_eq!(purple.diffuse, Vec3::new(0.6, 0.2, 0.8));
        assert_eq!(purple.ambient, purple.diffuse * 0.1);
        assert_eq!(purple.specular, purple.diffuse);
        assert_eq!(config.lights.spot_lights[0].diffuse, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn partial_ron_falls_back_to_field_defaults() {
        let config: AppConfig =
            ron::from_str("(window: (width: 1280, height: 800))").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.title, WindowConfig::default().title);
        assert_eq!(config.camera.yaw, -90.0);
    }

    #[test]
    fn load_reads_a_ron_file() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        // nalgebra vectors (de)serialize as tuples in RON
        write!(file, "(camera: (position: (1.0, 2.0, 3.0)))").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn default_config_round_trips_through_ron() {
        let config = AppConfig::default();
        let text = ron::ser::to_string(&config).unwrap();
        let back: AppConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.camera.position, config.camera.position);
        assert_eq!(back.scene.cube_positions, config.scene.cube_positions);
        assert_eq!(back.window.title, config.window.title);
    }

    #[test]
    fn shipped_scene_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scene.ron");
        let config = AppConfig::load(path).unwrap();
        assert_eq!(config.camera.position, Vec3::new(0.0, 2.0, 8.0));
        assert_eq!(config.scene.cube_positions.len(), 10);
        assert_eq!(config.lights.point_lights.len(), 3);
        assert_eq!(
            config.lights.point_lights[2].diffuse,
            Vec3::new(1.0, 0.55, 0.1)
        );
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(file, "(window: (width: \"wide\"))").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("does/not/exist.ron").unwrap();
        assert_eq!(config.window.width, AppConfig::default().window.width);
    }
}
