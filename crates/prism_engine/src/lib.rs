//! # Prism Engine
//!
//! A small real-time rendering library built around three pieces:
//!
//! - **Geometry ingestion**: OBJ polygon meshes are parsed into a polygon
//!   soup, fan-triangulated, and rebuilt with consistent outward-facing flat
//!   normals into an interleaved vertex/index buffer.
//! - **Fly camera**: yaw/pitch orientation with a derived orthonormal basis,
//!   producing view and perspective projection matrices.
//! - **Shader and light plumbing**: GLSL programs reflected into a
//!   name-addressed uniform table, plus plain-data light descriptors that
//!   serialize into array-style shader uniforms.
//!
//! GPU submission itself sits behind the [`render::RenderDevice`] trait; the
//! library ships a headless reference device for tests and tooling.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_engine::render::{FlyCamera, Mesh, HeadlessDevice};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = HeadlessDevice::new();
//!     let mut mesh = Mesh::from_obj("assets/box.obj")?;
//!     mesh.upload(&mut device)?;
//!
//!     let camera = FlyCamera::default();
//!     let _view = camera.view_matrix();
//!     let _proj = camera.projection_matrix(16.0 / 9.0);
//!
//!     mesh.release(&mut device);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod core;
pub mod foundation;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::{ImageData, LoadError, PolygonSoup, TextureError},
        core::config::{AppConfig, CameraConfig, ConfigError, SceneConfig, WindowConfig},
        foundation::{
            math::{Mat4, Transform, Vec2, Vec3},
            time::FrameClock,
        },
        render::{
            apply_dir_lights, apply_point_lights, apply_spot_lights,
            CameraMovement, DirLight, FlyCamera, HeadlessDevice, Mesh, PointLight,
            RenderDevice, SceneLights, ShaderProgram, SpotLight, TextureHandle,
            UniformBinder, UniformValue, Vertex,
        },
    };
}
