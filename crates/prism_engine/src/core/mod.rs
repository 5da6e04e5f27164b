//! Application-level services

pub mod config;

pub use config::{AppConfig, CameraConfig, ConfigError, SceneConfig, WindowConfig};
