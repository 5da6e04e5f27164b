//! Light configuration and uniform application
//!
//! Plain-data light descriptions plus helpers that push them into any
//! [`UniformBinder`] using the `dirLights[i].field` / `numDirLights` naming
//! convention the shaders declare. Counts are always written, including
//! zero, so a shader never loops over stale lights from a previous frame.

use crate::foundation::math::Vec3;
use crate::render::shader::UniformBinder;
use serde::{Deserialize, Serialize};

/// Directional light: parallel rays, no position or falloff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirLight {
    /// Direction the light travels, not normalized here
    pub direction: Vec3,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::new(0.05, 0.05, 0.05),
            diffuse: Vec3::new(0.6, 0.6, 0.6),
            specular: Vec3::new(0.8, 0.8, 0.8),
        }
    }
}

/// Point light with quadratic distance attenuation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    /// Position in world space
    pub position: Vec3,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation coefficient
    pub linear: f32,
    /// Quadratic attenuation coefficient
    pub quadratic: f32,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.5, 0.0, 0.0),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            ambient: Vec3::new(0.05, 0.05, 0.05),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Spot light: a point light restricted to a soft-edged cone
///
/// `cut_off` and `outer_cut_off` are stored as cosines of the half-angles,
/// matching what the fragment shader compares against directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    /// Position in world space
    pub position: Vec3,
    /// Cone axis
    pub direction: Vec3,
    /// Cosine of the inner cone half-angle
    pub cut_off: f32,
    /// Cosine of the outer cone half-angle
    pub outer_cut_off: f32,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation coefficient
    pub linear: f32,
    /// Quadratic attenuation coefficient
    pub quadratic: f32,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, -1.0),
            cut_off: 12.5f32.to_radians().cos(),
            outer_cut_off: 17.5f32.to_radians().cos(),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            ambient: Vec3::zeros(),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// All lights illuminating a scene
///
/// Counts are variable; the shaders read `numDirLights` etc. and iterate
/// only over the populated prefix of each array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLights {
    /// Directional lights
    pub dir_lights: Vec<DirLight>,
    /// Point lights
    pub point_lights: Vec<PointLight>,
    /// Spot lights
    pub spot_lights: Vec<SpotLight>,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self {
            dir_lights: vec![DirLight::default()],
            point_lights: vec![PointLight::default()],
            spot_lights: vec![SpotLight::default()],
        }
    }
}

impl SceneLights {
    /// Scene with no lights at all
    pub fn empty() -> Self {
        Self {
            dir_lights: Vec::new(),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
        }
    }

    /// Push every light array into the binder
    pub fn apply(&self, binder: &mut impl UniformBinder) {
        apply_dir_lights(binder, &self.dir_lights);
        apply_point_lights(binder, &self.point_lights);
        apply_spot_lights(binder, &self.spot_lights);
    }
}

/// Write `dirLights[i].*` and `numDirLights` into the binder
pub fn apply_dir_lights(binder: &mut impl UniformBinder, lights: &[DirLight]) {
    binder.set_uniform("numDirLights", (lights.len() as i32).into());
    for (i, light) in lights.iter().enumerate() {
        let base = format!("dirLights[{i}]");
        binder.set_uniform(&format!("{base}.direction"), light.direction.into());
        binder.set_uniform(&format!("{base}.ambient"), light.ambient.into());
        binder.set_uniform(&format!("{base}.diffuse"), light.diffuse.into());
        binder.set_uniform(&format!("{base}.specular"), light.specular.into());
    }
}

/// Write `pointLights[i].*` and `numPointLights` into the binder
pub fn apply_point_lights(binder: &mut impl UniformBinder, lights: &[PointLight]) {
    binder.set_uniform("numPointLights", (lights.len() as i32).into());
    for (i, light) in lights.iter().enumerate() {
        let base = format!("pointLights[{i}]");
        binder.set_uniform(&format!("{base}.position"), light.position.into());
        binder.set_uniform(&format!("{base}.constant"), light.constant.into());
        binder.set_uniform(&format!("{base}.linear"), light.linear.into());
        binder.set_uniform(&format!("{base}.quadratic"), light.quadratic.into());
        binder.set_uniform(&format!("{base}.ambient"), light.ambient.into());
        binder.set_uniform(&format!("{base}.diffuse"), light.diffuse.into());
        binder.set_uniform(&format!("{base}.specular"), light.specular.into());
    }
}

/// Write `spotLights[i].*` and `numSpotLights` into the binder
pub fn apply_spot_lights(binder: &mut impl UniformBinder, lights: &[SpotLight]) {
    binder.set_uniform("numSpotLights", (lights.len() as i32).into());
    for (i, light) in lights.iter().enumerate() {
        let base = format!("spotLights[{i}]");
        binder.set_uniform(&format!("{base}.position"), light.position.into());
        binder.set_uniform(&format!("{base}.direction"), light.direction.into());
        binder.set_uniform(&format!("{base}.cutOff"), light.cut_off.into());
        binder.set_uniform(&format!("{base}.outerCutOff"), light.outer_cut_off.into());
        binder.set_uniform(&format!("{base}.constant"), light.constant.into());
        binder.set_uniform(&format!("{base}.linear"), light.linear.into());
        binder.set_uniform(&format!("{base}.quadratic"), light.quadratic.into());
        binder.set_uniform(&format!("{base}.ambient"), light.ambient.into());
        binder.set_uniform(&format!("{base}.diffuse"), light.diffuse.into());
        binder.set_uniform(&format!("{base}.specular"), light.specular.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shader::UniformValue;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingBinder {
        writes: HashMap<String, UniformValue>,
    }

    impl UniformBinder for RecordingBinder {
        fn set_uniform(&mut self, name: &str, value: UniformValue) {
            self.writes.insert(name.to_string(), value);
        }
    }

    #[test]
    fn default_scene_has_one_of_each() {
        let lights = SceneLights::default();
        assert_eq!(lights.dir_lights.len(), 1);
        assert_eq!(lights.point_lights.len(), 1);
        assert_eq!(lights.spot_lights.len(), 1);
    }

    #[test]
    fn point_lights_write_indexed_names_and_count() {
        let mut binder = RecordingBinder::default();
        let lights = vec![PointLight::default(), PointLight::default()];
        apply_point_lights(&mut binder, &lights);

        assert_eq!(binder.writes.get("numPointLights"), Some(&UniformValue::Int(2)));
        assert!(binder.writes.contains_key("pointLights[0].position"));
        assert!(binder.writes.contains_key("pointLights[1].quadratic"));
        assert_eq!(
            binder.writes.get("pointLights[0].linear"),
            Some(&UniformValue::Float(0.09))
        );
    }

    #[test]
    fn empty_light_list_still_writes_zero_count() {
        let mut binder = RecordingBinder::default();
        apply_dir_lights(&mut binder, &[]);
        assert_eq!(binder.writes.get("numDirLights"), Some(&UniformValue::Int(0)));
        assert_eq!(binder.writes.len(), 1);
    }

    #[test]
    fn spot_light_cutoffs_are_cosines() {
        let spot = SpotLight::default();
        assert!(spot.cut_off > spot.outer_cut_off);
        assert!((spot.cut_off - 12.5f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn scene_apply_writes_all_counts() {
        let mut binder = RecordingBinder::default();
        SceneLights::default().apply(&mut binder);
        for name in ["numDirLights", "numPointLights", "numSpotLights"] {
            assert_eq!(binder.writes.get(name), Some(&UniformValue::Int(1)));
        }
        assert!(binder.writes.contains_key("spotLights[0].outerCutOff"));
    }

    #[test]
    fn lights_round_trip_through_ron() {
        let lights = SceneLights::default();
        let text = ron::ser::to_string(&lights).unwrap();
        let back: SceneLights = ron::from_str(&text).unwrap();
        assert_eq!(back.point_lights[0].position, lights.point_lights[0].position);
        assert_eq!(back.spot_lights[0].cut_off, lights.spot_lights[0].cut_off);
    }
}
